use super::registry::{EntityKind, TypeRegistry};
use crate::core::{AggregationError, Graph, Predicate, Result, Subject, TriplePattern};
use crate::storage::StatementStore;
use async_trait::async_trait;
use std::sync::Arc;

/// An entity loaded from the store: its subject, resolved kind and
/// outgoing statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedEntity {
    pub subject: Subject,
    pub kind: Option<EntityKind>,
    pub graph: Graph,
}

impl LoadedEntity {
    pub fn first_resource(&self, predicate: &Predicate) -> Option<Subject> {
        self.graph.first_resource(&self.subject, predicate)
    }

    pub fn is_kind(&self, name: &str) -> bool {
        self.kind.as_ref().is_some_and(|k| k.is(name))
    }
}

/// Resolves an opaque identifier to a loaded entity.
#[async_trait]
pub trait EntityResolver: Send + Sync {
    /// Fails with `UnresolvableReference` when the subject has no statements.
    async fn resolve(&self, subject: &Subject) -> Result<LoadedEntity>;
}

/// Resolver backed by a statement store and an explicit type registry.
pub struct GraphEntityResolver {
    store: Arc<dyn StatementStore>,
    registry: TypeRegistry,
    rdf_type: Predicate,
}

impl GraphEntityResolver {
    pub fn new(store: Arc<dyn StatementStore>, registry: TypeRegistry, rdf_type: Predicate) -> Self {
        Self {
            store,
            registry,
            rdf_type,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}

#[async_trait]
impl EntityResolver for GraphEntityResolver {
    async fn resolve(&self, subject: &Subject) -> Result<LoadedEntity> {
        let statements = self.store.query(&TriplePattern::subject(subject)).await?;
        if statements.is_empty() {
            return Err(AggregationError::unresolvable(subject));
        }
        let graph: Graph = statements.into_iter().collect();
        let types: Vec<Subject> = graph
            .objects(subject, &self.rdf_type)
            .filter_map(|o| o.as_resource())
            .cloned()
            .collect();
        let kind = self.registry.classify(&types);

        Ok(LoadedEntity {
            subject: subject.clone(),
            kind,
            graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Statement, Term, Vocabulary};
    use crate::resolve::registry::PROXY_KIND;
    use crate::storage::InMemoryStatementStore;

    #[tokio::test]
    async fn test_resolve_classifies_by_registered_type() {
        let vocab = Vocabulary::default();
        let node = Subject::new("http://example.org/list#g1");
        let store = Arc::new(InMemoryStatementStore::with_statements(vec![
            Statement::link(&node, &vocab.rdf_type, &vocab.proxy_class),
            Statement::new(node.clone(), vocab.proxy_for.clone(), Term::resource("http://example.org/a")),
        ]));
        let resolver = GraphEntityResolver::new(
            store,
            TypeRegistry::with_aggregation_types(&vocab),
            vocab.rdf_type.clone(),
        );

        let entity = resolver.resolve(&node).await.unwrap();
        assert!(entity.is_kind(PROXY_KIND));
        assert_eq!(
            entity.first_resource(&vocab.proxy_for),
            Some(Subject::new("http://example.org/a"))
        );
    }

    #[tokio::test]
    async fn test_resolve_missing_subject_fails() {
        let vocab = Vocabulary::default();
        let resolver = GraphEntityResolver::new(
            Arc::new(InMemoryStatementStore::new()),
            TypeRegistry::new(),
            vocab.rdf_type,
        );

        let err = resolver.resolve(&Subject::new("nope")).await.unwrap_err();
        assert_eq!(err, AggregationError::UnresolvableReference("nope".to_string()));
    }
}
