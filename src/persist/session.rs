use super::saver::{EntitySaver, StoreEntitySaver};
use crate::aggregation::ProxyLoader;
use crate::config::AggregationConfig;
use crate::core::Vocabulary;
use crate::resolve::{EntityResolver, GraphEntityResolver, TypeRegistry};
use crate::storage::{InMemoryStatementStore, StatementStore};
use std::sync::Arc;

/// Bundles the external collaborators an aggregation talks to: the
/// statement store, entity resolution and the generic entity save.
#[derive(Clone)]
pub struct GraphSession {
    store: Arc<dyn StatementStore>,
    resolver: Arc<dyn EntityResolver>,
    saver: Arc<dyn EntitySaver>,
    config: Arc<AggregationConfig>,
}

impl GraphSession {
    /// Creates a session with the store-backed resolver and saver, registering
    /// only the aggregation's own types.
    pub fn new(store: Arc<dyn StatementStore>, config: AggregationConfig) -> Self {
        let registry = TypeRegistry::with_aggregation_types(&config.vocabulary);
        Self::with_registry(store, registry, config)
    }

    /// Creates a session whose resolver classifies entities with `registry`.
    pub fn with_registry(
        store: Arc<dyn StatementStore>,
        registry: TypeRegistry,
        config: AggregationConfig,
    ) -> Self {
        let rdf_type = config.vocabulary.rdf_type.clone();
        let resolver = Arc::new(GraphEntityResolver::new(
            store.clone(),
            registry,
            rdf_type.clone(),
        ));
        let saver = Arc::new(StoreEntitySaver::new(store.clone(), rdf_type));
        Self::with_collaborators(store, resolver, saver, config)
    }

    /// Creates a session from explicitly supplied collaborators.
    pub fn with_collaborators(
        store: Arc<dyn StatementStore>,
        resolver: Arc<dyn EntityResolver>,
        saver: Arc<dyn EntitySaver>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            saver,
            config: Arc::new(config),
        }
    }

    /// Session over a fresh in-memory store, returning the store as well.
    pub fn in_memory(config: AggregationConfig) -> (Self, Arc<InMemoryStatementStore>) {
        let store = Arc::new(InMemoryStatementStore::new());
        (Self::new(store.clone(), config), store)
    }

    pub fn store(&self) -> &Arc<dyn StatementStore> {
        &self.store
    }

    pub fn resolver(&self) -> &Arc<dyn EntityResolver> {
        &self.resolver
    }

    pub fn saver(&self) -> &Arc<dyn EntitySaver> {
        &self.saver
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.config.vocabulary
    }

    /// Fresh proxy node cache for one read session.
    pub fn proxy_loader(&self) -> ProxyLoader {
        ProxyLoader::new(self.resolver.clone(), self.config.vocabulary.clone())
    }
}
