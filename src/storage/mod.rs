pub mod engine;
pub mod memory;

pub use engine::StatementStore;
pub use memory::InMemoryStatementStore;
