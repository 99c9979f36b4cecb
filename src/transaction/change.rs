// ============================================================================
// Graph Change Tracking
// ============================================================================
//
// A Changeset is an ordered batch of graph changes committed as one unit.
// Retractions always run before assertions so a rewrite can delete a
// subgraph and re-assert parts of it in the same batch.
//
// ============================================================================

use crate::core::{Statement, Subject, TriplePattern};

/// Represents a single change to the statement store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphChange {
    /// Add a statement
    Assert(Statement),

    /// Remove every statement matching a pattern
    Retract(TriplePattern),
}

impl GraphChange {
    /// Subject affected by this change, if the change is bound to one
    pub fn subject(&self) -> Option<&Subject> {
        match self {
            GraphChange::Assert(statement) => Some(&statement.subject),
            GraphChange::Retract(pattern) => pattern.subject.as_ref(),
        }
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, GraphChange::Assert(_))
    }

    pub fn is_retraction(&self) -> bool {
        matches!(self, GraphChange::Retract(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    changes: Vec<GraphChange>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assert(&mut self, statement: Statement) {
        self.changes.push(GraphChange::Assert(statement));
    }

    pub fn assert_all<I>(&mut self, statements: I)
    where
        I: IntoIterator<Item = Statement>,
    {
        self.changes
            .extend(statements.into_iter().map(GraphChange::Assert));
    }

    pub fn retract(&mut self, pattern: TriplePattern) {
        self.changes.push(GraphChange::Retract(pattern));
    }

    pub fn append(&mut self, other: Changeset) {
        self.changes.extend(other.changes);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[GraphChange] {
        &self.changes
    }

    pub fn assertions(&self) -> impl Iterator<Item = &Statement> {
        self.changes.iter().filter_map(|c| match c {
            GraphChange::Assert(statement) => Some(statement),
            GraphChange::Retract(_) => None,
        })
    }

    pub fn retractions(&self) -> impl Iterator<Item = &TriplePattern> {
        self.changes.iter().filter_map(|c| match c {
            GraphChange::Retract(pattern) => Some(pattern),
            GraphChange::Assert(_) => None,
        })
    }
}
