pub mod error;
pub mod graph;
pub mod term;
pub mod vocab;

pub use error::{AggregationError, Result};
pub use graph::Graph;
pub use term::{Predicate, Statement, Subject, Term, TriplePattern};
pub use vocab::Vocabulary;
