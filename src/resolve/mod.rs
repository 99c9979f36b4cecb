pub mod registry;
pub mod resolver;

pub use registry::{EntityKind, LIST_SOURCE_KIND, PROXY_KIND, TypeRegistry};
pub use resolver::{EntityResolver, GraphEntityResolver, LoadedEntity};
