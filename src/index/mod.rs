pub mod document;

pub use document::{IndexDocument, ListSourceIndexer, serialize_attributes};
