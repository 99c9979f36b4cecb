use super::StatementStore;
use crate::core::{Graph, Result, Statement, Subject, TriplePattern};
use crate::transaction::Changeset;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Statement store held entirely in memory.
///
/// Changesets are applied under a single write lock, so readers never see a
/// half-rewritten subgraph.
#[derive(Default)]
pub struct InMemoryStatementStore {
    graph: RwLock<Graph>,
    applied_changesets: AtomicUsize,
}

impl InMemoryStatementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statements<I>(statements: I) -> Self
    where
        I: IntoIterator<Item = Statement>,
    {
        Self {
            graph: RwLock::new(statements.into_iter().collect()),
            applied_changesets: AtomicUsize::new(0),
        }
    }

    /// Number of non-empty changesets applied so far
    pub fn applied_changesets(&self) -> usize {
        self.applied_changesets.load(Ordering::SeqCst)
    }

    /// Copy of the full stored graph
    pub async fn snapshot(&self) -> Graph {
        self.graph.read().await.clone()
    }
}

#[async_trait]
impl StatementStore for InMemoryStatementStore {
    async fn query(&self, pattern: &TriplePattern) -> Result<Vec<Statement>> {
        let graph = self.graph.read().await;
        Ok(graph.query(pattern).cloned().collect())
    }

    async fn insert(&self, statements: Vec<Statement>) -> Result<()> {
        let mut graph = self.graph.write().await;
        graph.extend(statements);
        Ok(())
    }

    async fn delete_matching(&self, pattern: &TriplePattern) -> Result<usize> {
        let mut graph = self.graph.write().await;
        Ok(graph.remove_matching(pattern))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.graph.read().await.len())
    }

    async fn structural_statements(&self, root: &Subject) -> Result<Vec<Statement>> {
        let graph = self.graph.read().await;
        Ok(graph.structural_of(root).cloned().collect())
    }

    async fn apply(&self, changeset: &Changeset) -> Result<()> {
        if changeset.is_empty() {
            return Ok(());
        }
        let mut graph = self.graph.write().await;
        for pattern in changeset.retractions() {
            graph.remove_matching(pattern);
        }
        graph.extend(changeset.assertions().cloned());
        self.applied_changesets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Predicate, Subject, Term};

    fn stmt(s: &str, p: &str, o: &str) -> Statement {
        Statement::new(Subject::new(s), Predicate::new(p), Term::literal(o))
    }

    #[tokio::test]
    async fn test_insert_query_delete() {
        let store = InMemoryStatementStore::new();
        store
            .insert(vec![stmt("a", "p", "1"), stmt("a", "q", "2"), stmt("b", "p", "3")])
            .await
            .unwrap();

        let a = Subject::new("a");
        assert_eq!(store.query(&TriplePattern::subject(&a)).await.unwrap().len(), 2);
        assert_eq!(store.delete_matching(&TriplePattern::subject(&a)).await.unwrap(), 2);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_structural_statements_ignore_bookkeeping() {
        let store = InMemoryStatementStore::with_statements(vec![
            stmt("http://example.org/r", "p", "root"),
            stmt("http://example.org/r#g1", "p", "listed"),
            stmt("http://example.org/r#gorphan", "p", "unlisted"),
            stmt("http://example.org/other#g1", "p", "foreign"),
        ]);

        let owned = store
            .structural_statements(&Subject::new("http://example.org/r"))
            .await
            .unwrap();
        let mut subjects: Vec<&str> = owned.iter().map(|s| s.subject.as_str()).collect();
        subjects.sort();
        assert_eq!(subjects, vec!["http://example.org/r#g1", "http://example.org/r#gorphan"]);
    }

    #[tokio::test]
    async fn test_apply_retracts_before_asserting() {
        let store = InMemoryStatementStore::with_statements(vec![stmt("a", "p", "old")]);
        let a = Subject::new("a");

        let mut changes = Changeset::new();
        changes.assert(stmt("a", "p", "new"));
        changes.retract(TriplePattern::subject(&a));
        store.apply(&changes).await.unwrap();

        let stored = store.query(&TriplePattern::subject(&a)).await.unwrap();
        assert_eq!(stored, vec![stmt("a", "p", "new")]);
        assert_eq!(store.applied_changesets(), 1);

        store.apply(&Changeset::new()).await.unwrap();
        assert_eq!(store.applied_changesets(), 1);
    }
}
