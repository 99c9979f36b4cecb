use crate::core::{Result, Statement, Subject, TriplePattern};
use crate::transaction::{Changeset, GraphChange};
use async_trait::async_trait;

/// Statement store trait - allows pluggable triple store backends
///
/// Transport failures surface as `AggregationError::StoreError` and are
/// propagated unmodified; callers never retry.
#[async_trait]
pub trait StatementStore: Send + Sync {
    /// Query statements matching a pattern
    async fn query(&self, pattern: &TriplePattern) -> Result<Vec<Statement>>;

    /// Assert a set of statements
    async fn insert(&self, statements: Vec<Statement>) -> Result<()>;

    /// Delete statements matching a pattern, returning the count removed
    async fn delete_matching(&self, pattern: &TriplePattern) -> Result<usize>;

    /// Total number of stored statements
    async fn len(&self) -> Result<usize>;

    /// Every statement whose subject is a structural node of `root`
    /// (`<root>#...`), whether or not the root still lists it.
    ///
    /// The default scans the whole store; backends with a subject index
    /// should answer with a prefix lookup instead.
    async fn structural_statements(&self, root: &Subject) -> Result<Vec<Statement>> {
        let all = self.query(&TriplePattern::any()).await?;
        Ok(all
            .into_iter()
            .filter(|s| s.subject.is_structural_of(root))
            .collect())
    }

    /// Apply a changeset: every retraction, then every assertion.
    ///
    /// Backends with native transactions should override this to commit
    /// the changeset atomically.
    async fn apply(&self, changeset: &Changeset) -> Result<()> {
        for change in changeset.changes() {
            if let GraphChange::Retract(pattern) = change {
                self.delete_matching(pattern).await?;
            }
        }
        let assertions: Vec<Statement> = changeset.assertions().cloned().collect();
        if !assertions.is_empty() {
            self.insert(assertions).await?;
        }
        Ok(())
    }
}
