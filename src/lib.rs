// ============================================================================
// Ordered Aggregation Library
// ============================================================================
//
// Persists ordered membership ("the pages of this book, in order") in a
// triple store that only holds unordered statements, by materializing the
// sequence as a doubly linked list of proxy nodes.
//
// ============================================================================

//! Append to a fresh aggregation, save it, and read the order back.
//!
//! ```
//! use ordered_aggregation::{AggregationConfig, GraphSession, ListSource, Subject};
//!
//! # #[tokio::main]
//! # async fn main() -> ordered_aggregation::Result<()> {
//! let (session, _store) = GraphSession::in_memory(AggregationConfig::default());
//! let book = Subject::new("http://example.org/book/1/list_source");
//!
//! let mut pages = ListSource::new(&session, book.clone());
//! pages.append_target(Subject::new("http://example.org/page/1"))?;
//! pages.append_target(Subject::new("http://example.org/page/2"))?;
//! pages.save(&session).await?;
//!
//! let reloaded = ListSource::load(&session, &book).await?;
//! let mut loader = session.proxy_loader();
//! let order = reloaded.ordered_by(&mut loader).await?;
//! assert_eq!(
//!     order,
//!     vec![
//!         Subject::new("http://example.org/page/1"),
//!         Subject::new("http://example.org/page/2"),
//!     ]
//! );
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod config;
pub mod core;
pub mod index;
pub mod persist;
pub mod prelude;
pub mod resolve;
pub mod storage;
pub mod transaction;

// Re-export main types for convenience
pub use aggregation::{
    HeadSource, ListSource, OrderedList, OrderedReader, PendingTarget, ProxyAttributes,
    ProxyDescriptor, ProxyLoader, ProxyNode, SaveReport, TargetRef,
};
pub use config::{AggregationConfig, IndexFieldNames};
pub use crate::core::{
    AggregationError, Graph, Predicate, Result, Statement, Subject, Term, TriplePattern,
    Vocabulary,
};
pub use index::{IndexDocument, ListSourceIndexer};
pub use persist::{EntitySaver, GraphSession, SaveRequest, StoreEntitySaver};
pub use resolve::{EntityKind, EntityResolver, GraphEntityResolver, LoadedEntity, TypeRegistry};
pub use storage::{InMemoryStatementStore, StatementStore};
pub use transaction::{Changeset, GraphChange};
