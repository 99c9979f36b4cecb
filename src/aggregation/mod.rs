// ============================================================================
// Ordered Aggregation Module
// ============================================================================
//
// Ordered membership in an unordered triple store: each position is a proxy
// node linked to its neighbours through next/prev statements. The aggregation
// root keeps head/tail/nodes bookkeeping and rewrites the proxy subgraph when
// its ordered list is dirty.
//
// ============================================================================

pub mod list;
pub mod list_source;
pub mod proxy;
pub mod reader;

pub use list::{OrderedList, PendingTarget, ProxyDescriptor, TargetRef};
pub use list_source::{ListSource, SaveReport};
pub use proxy::{ProxyAttributes, ProxyLoader, ProxyNode};
pub use reader::{HeadSource, OrderedReader};
