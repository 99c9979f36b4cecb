use crate::core::{
    AggregationError, Predicate, Result, Statement, Subject, Term, TriplePattern, Vocabulary,
};
use crate::persist::GraphSession;
use crate::resolve::{EntityResolver, LoadedEntity};
use crate::transaction::Changeset;
use async_recursion::async_recursion;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{Level, event};

/// Extra statements carried on a proxy node besides its link structure.
pub type ProxyAttributes = BTreeMap<Predicate, Vec<Term>>;

/// One position in a persisted ordered aggregation.
///
/// Reference fields are stored as identifiers and resolved on demand:
/// `target` and `container` through the entity resolver, `next` and `prev`
/// through a [`ProxyLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyNode {
    subject: Subject,
    target: Subject,
    container: Option<Subject>,
    next: Option<Subject>,
    prev: Option<Subject>,
    attributes: ProxyAttributes,
}

impl ProxyNode {
    pub fn new(subject: Subject, target: Subject) -> Self {
        Self {
            subject,
            target,
            container: None,
            next: None,
            prev: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_container(mut self, container: Subject) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_next(mut self, next: Subject) -> Self {
        self.next = Some(next);
        self
    }

    pub fn with_prev(mut self, prev: Subject) -> Self {
        self.prev = Some(prev);
        self
    }

    pub fn with_attributes(mut self, attributes: ProxyAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builds a node from its outgoing statements. A node must name exactly
    /// one target and at most one container, next and prev.
    pub fn from_entity(entity: &LoadedEntity, vocabulary: &Vocabulary) -> Result<Self> {
        let subject = &entity.subject;
        let single = |predicate: &Predicate, name: &str| -> Result<Option<Subject>> {
            let mut values = entity
                .graph
                .objects(subject, predicate)
                .filter_map(|o| o.as_resource());
            let first = values.next().cloned();
            if values.next().is_some() {
                return Err(AggregationError::malformed(
                    subject,
                    format!("more than one {} reference", name),
                ));
            }
            Ok(first)
        };

        let target = single(&vocabulary.proxy_for, "target")?
            .ok_or_else(|| AggregationError::malformed(subject, "missing target reference"))?;
        let container = single(&vocabulary.proxy_in, "container")?;
        let next = single(&vocabulary.next, "next")?;
        let prev = single(&vocabulary.prev, "prev")?;

        let mut attributes = ProxyAttributes::new();
        for statement in entity.graph.statements_for(subject) {
            if !vocabulary.is_proxy_structure(&statement.predicate) {
                attributes
                    .entry(statement.predicate.clone())
                    .or_default()
                    .push(statement.object.clone());
            }
        }

        Ok(Self {
            subject: subject.clone(),
            target,
            container,
            next,
            prev,
            attributes,
        })
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn target_id(&self) -> &Subject {
        &self.target
    }

    pub fn container_id(&self) -> Option<&Subject> {
        self.container.as_ref()
    }

    pub fn next_id(&self) -> Option<&Subject> {
        self.next.as_ref()
    }

    pub fn prev_id(&self) -> Option<&Subject> {
        self.prev.as_ref()
    }

    pub fn attributes(&self) -> &ProxyAttributes {
        &self.attributes
    }

    pub(crate) fn set_prev(&mut self, prev: Option<Subject>) {
        self.prev = prev;
    }

    /// Resolves the aggregated entity.
    pub async fn target(&self, resolver: &dyn EntityResolver) -> Result<LoadedEntity> {
        resolver.resolve(&self.target).await
    }

    /// Resolves the owning aggregation, if the node names one.
    pub async fn container(&self, resolver: &dyn EntityResolver) -> Result<Option<LoadedEntity>> {
        match &self.container {
            Some(container) => Ok(Some(resolver.resolve(container).await?)),
            None => Ok(None),
        }
    }

    pub async fn next(&self, loader: &mut ProxyLoader) -> Result<Option<ProxyNode>> {
        match &self.next {
            Some(next) => Ok(Some(loader.load(next).await?)),
            None => Ok(None),
        }
    }

    pub async fn prev(&self, loader: &mut ProxyLoader) -> Result<Option<ProxyNode>> {
        match &self.prev {
            Some(prev) => Ok(Some(loader.load(prev).await?)),
            None => Ok(None),
        }
    }

    /// This node followed by every node reachable through `next`.
    ///
    /// Eager and recursive; does not terminate on a cyclic chain. Use
    /// [`OrderedReader`](super::OrderedReader) for production traversal.
    #[async_recursion]
    pub async fn as_list(&self, loader: &mut ProxyLoader) -> Result<Vec<ProxyNode>> {
        let mut list = vec![self.clone()];
        if let Some(next) = self.next(loader).await? {
            list.extend(next.as_list(loader).await?);
        }
        Ok(list)
    }

    pub fn to_statements(&self, vocabulary: &Vocabulary) -> Vec<Statement> {
        let subject = &self.subject;
        let mut statements = vec![
            Statement::link(subject, &vocabulary.rdf_type, &vocabulary.proxy_class),
            Statement::link(subject, &vocabulary.proxy_for, &self.target),
        ];
        if let Some(container) = &self.container {
            statements.push(Statement::link(subject, &vocabulary.proxy_in, container));
        }
        if let Some(next) = &self.next {
            statements.push(Statement::link(subject, &vocabulary.next, next));
        }
        if let Some(prev) = &self.prev {
            statements.push(Statement::link(subject, &vocabulary.prev, prev));
        }
        for (predicate, values) in &self.attributes {
            for value in values {
                statements.push(Statement::new(
                    subject.clone(),
                    predicate.clone(),
                    value.clone(),
                ));
            }
        }
        statements
    }
}

/// Identity map of proxy nodes for one read session.
///
/// Nodes are resolved at most once; back-link repairs made while reading
/// live here and are only written to the store by [`ProxyLoader::flush_repairs`].
pub struct ProxyLoader {
    resolver: Arc<dyn EntityResolver>,
    vocabulary: Vocabulary,
    nodes: HashMap<Subject, ProxyNode>,
    repaired: Vec<Subject>,
    resolved: usize,
}

impl ProxyLoader {
    pub fn new(resolver: Arc<dyn EntityResolver>, vocabulary: Vocabulary) -> Self {
        Self {
            resolver,
            vocabulary,
            nodes: HashMap::new(),
            repaired: Vec::new(),
            resolved: 0,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn resolver(&self) -> &dyn EntityResolver {
        self.resolver.as_ref()
    }

    /// Returns the cached node, resolving it on first access.
    pub async fn load(&mut self, subject: &Subject) -> Result<ProxyNode> {
        if let Some(node) = self.nodes.get(subject) {
            return Ok(node.clone());
        }
        let entity = self.resolver.resolve(subject).await?;
        self.resolved += 1;
        let node = ProxyNode::from_entity(&entity, &self.vocabulary)?;
        self.nodes.insert(subject.clone(), node.clone());
        Ok(node)
    }

    pub fn cached(&self, subject: &Subject) -> Option<&ProxyNode> {
        self.nodes.get(subject)
    }

    /// Number of nodes fetched from the resolver so far.
    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// Subjects whose `prev` link was corrected during reads and not yet flushed.
    pub fn repaired(&self) -> &[Subject] {
        &self.repaired
    }

    pub(crate) fn record_prev(&mut self, node: &ProxyNode) {
        self.nodes.insert(node.subject().clone(), node.clone());
        if !self.repaired.contains(node.subject()) {
            self.repaired.push(node.subject().clone());
        }
    }

    /// Writes pending back-link repairs to the store. Returns how many nodes
    /// were written.
    pub async fn flush_repairs(&mut self, session: &GraphSession) -> Result<usize> {
        if self.repaired.is_empty() {
            return Ok(0);
        }
        let mut changes = Changeset::new();
        for subject in &self.repaired {
            let Some(node) = self.nodes.get(subject) else {
                continue;
            };
            changes.retract(TriplePattern::subject_predicate(subject, &self.vocabulary.prev));
            if let Some(prev) = node.prev_id() {
                changes.assert(Statement::link(subject, &self.vocabulary.prev, prev));
            }
        }
        session.store().apply(&changes).await?;

        let flushed = self.repaired.len();
        event!(Level::DEBUG, nodes = flushed, "proxy back-link repairs flushed");
        self.repaired.clear();
        Ok(flushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::EntityKind;

    fn entity(subject: &Subject, statements: Vec<Statement>) -> LoadedEntity {
        LoadedEntity {
            subject: subject.clone(),
            kind: Some(EntityKind::new("Proxy")),
            graph: statements.into_iter().collect(),
        }
    }

    #[test]
    fn test_from_entity_reads_links_and_extras() {
        let vocab = Vocabulary::default();
        let n1 = Subject::new("http://example.org/list#g1");
        let n2 = Subject::new("http://example.org/list#g2");
        let target = Subject::new("http://example.org/page/1");
        let label = Predicate::new("http://example.org/label");

        let loaded = entity(
            &n1,
            vec![
                Statement::link(&n1, &vocab.rdf_type, &vocab.proxy_class),
                Statement::link(&n1, &vocab.proxy_for, &target),
                Statement::link(&n1, &vocab.next, &n2),
                Statement::new(n1.clone(), label.clone(), Term::literal("cover")),
            ],
        );

        let node = ProxyNode::from_entity(&loaded, &vocab).unwrap();
        assert_eq!(node.target_id(), &target);
        assert_eq!(node.next_id(), Some(&n2));
        assert_eq!(node.prev_id(), None);
        assert_eq!(node.container_id(), None);
        assert_eq!(node.attributes().get(&label), Some(&vec![Term::literal("cover")]));
    }

    #[test]
    fn test_from_entity_requires_exactly_one_target() {
        let vocab = Vocabulary::default();
        let n1 = Subject::new("n1");

        let err = ProxyNode::from_entity(&entity(&n1, vec![]), &vocab).unwrap_err();
        assert!(matches!(err, AggregationError::MalformedProxy { .. }));

        let two_targets = entity(
            &n1,
            vec![
                Statement::link(&n1, &vocab.proxy_for, &Subject::new("a")),
                Statement::link(&n1, &vocab.proxy_for, &Subject::new("b")),
            ],
        );
        let err = ProxyNode::from_entity(&two_targets, &vocab).unwrap_err();
        assert!(err.to_string().contains("more than one target"));
    }

    #[test]
    fn test_to_statements_round_trips_through_from_entity() {
        let vocab = Vocabulary::default();
        let node = ProxyNode::new(Subject::new("n2"), Subject::new("b"))
            .with_container(Subject::new("list"))
            .with_prev(Subject::new("n1"));

        let loaded = entity(node.subject(), node.to_statements(&vocab));
        assert_eq!(ProxyNode::from_entity(&loaded, &vocab).unwrap(), node);
    }
}
