// ============================================================================
// Graph Change Module
// ============================================================================
//
// Changesets batch retractions and assertions so a subgraph rewrite and the
// root's own attribute changes are committed as a single unit.
//
// ============================================================================

pub mod change;

pub use change::{Changeset, GraphChange};
