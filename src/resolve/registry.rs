use crate::core::{Subject, Vocabulary};
use std::collections::HashMap;
use std::fmt;

pub const PROXY_KIND: &str = "Proxy";
pub const LIST_SOURCE_KIND: &str = "ListSource";

/// Name of the entity class a resolved subject is instantiated as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKind(String);

impl EntityKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration table mapping declared `rdf:type` IRIs to entity kinds.
///
/// Built up front and handed to the resolver at construction time.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    kinds: HashMap<Subject, EntityKind>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the proxy and list source classes.
    pub fn with_aggregation_types(vocabulary: &Vocabulary) -> Self {
        let mut registry = Self::new();
        registry.register(vocabulary.proxy_class.clone(), EntityKind::new(PROXY_KIND));
        registry.register(
            vocabulary.list_source_class.clone(),
            EntityKind::new(LIST_SOURCE_KIND),
        );
        registry
    }

    /// Registers `kind` for `rdf_type`, returning the previous registration.
    pub fn register(&mut self, rdf_type: Subject, kind: EntityKind) -> Option<EntityKind> {
        self.kinds.insert(rdf_type, kind)
    }

    pub fn kind_of(&self, rdf_type: &Subject) -> Option<&EntityKind> {
        self.kinds.get(rdf_type)
    }

    /// Kind for the first registered type among `rdf_types`.
    pub fn classify<'a, I>(&self, rdf_types: I) -> Option<EntityKind>
    where
        I: IntoIterator<Item = &'a Subject>,
    {
        rdf_types
            .into_iter()
            .find_map(|t| self.kinds.get(t))
            .cloned()
    }

    /// Sorted list of registered type IRIs
    pub fn registered_types(&self) -> Vec<Subject> {
        let mut types = self.kinds.keys().cloned().collect::<Vec<_>>();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
