use super::list::{OrderedList, TargetRef};
use super::proxy::{ProxyLoader, ProxyNode};
use super::reader::{HeadSource, OrderedReader};
use crate::config::AggregationConfig;
use crate::core::{
    AggregationError, Graph, Predicate, Result, Statement, Subject, Term, TriplePattern,
};
use crate::persist::{GraphSession, SaveRequest};
use crate::transaction::Changeset;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

/// Outcome of [`ListSource::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// The generic save wrote something to the store
    pub written: bool,
    /// The proxy subgraph was deleted and re-asserted
    pub subgraph_rewritten: bool,
    /// Statements asserted for the chain and the root's bookkeeping links
    pub statements_asserted: usize,
    /// Previously stored node subjects whose statements were deleted
    pub nodes_retracted: usize,
}

/// Aggregation root owning an ordered sequence of proxy nodes.
///
/// `head`, `tail` and `nodes` are persistence bookkeeping: they are written
/// as statements on the root but never exposed as attributes.
#[derive(Debug, Clone)]
pub struct ListSource {
    subject: Subject,
    config: Arc<AggregationConfig>,
    persisted: bool,
    head: Option<Subject>,
    tail: Option<Subject>,
    nodes: BTreeSet<Subject>,
    types: BTreeSet<Subject>,
    attributes: BTreeMap<Predicate, Vec<Term>>,
    changed_attributes: BTreeSet<Predicate>,
    subgraph: Graph,
    ordered_self: Option<OrderedList>,
}

impl ListSource {
    /// New, unsaved aggregation root.
    pub fn new(session: &GraphSession, subject: Subject) -> Self {
        Self {
            subject,
            config: Arc::new(session.config().clone()),
            persisted: false,
            head: None,
            tail: None,
            nodes: BTreeSet::new(),
            types: BTreeSet::new(),
            attributes: BTreeMap::new(),
            changed_attributes: BTreeSet::new(),
            subgraph: Graph::new(),
            ordered_self: None,
        }
    }

    /// Loads the root's own statements and the proxy subgraph: every
    /// structural node named `<root>#...` plus any node the root lists in
    /// `hasPart`. The ordered list itself is built on first access.
    pub async fn load(session: &GraphSession, subject: &Subject) -> Result<Self> {
        let entity = session.resolver().resolve(subject).await?;
        let mut root = Self::new(session, subject.clone());
        root.persisted = true;

        let vocab = &root.config.vocabulary;
        for statement in entity.graph.statements_for(subject) {
            let predicate = &statement.predicate;
            let resource = statement.object.as_resource().cloned();
            if *predicate == vocab.first {
                root.head = resource;
            } else if *predicate == vocab.last {
                root.tail = resource;
            } else if *predicate == vocab.has_part {
                root.nodes.extend(resource);
            } else if *predicate == vocab.rdf_type {
                root.types.extend(resource);
            } else {
                root.attributes
                    .entry(predicate.clone())
                    .or_default()
                    .push(statement.object.clone());
            }
        }

        let mut subgraph: Graph = session
            .store()
            .structural_statements(subject)
            .await?
            .into_iter()
            .collect();
        for node in &root.nodes {
            if !subgraph.has_subject(node) {
                subgraph.extend(session.store().query(&TriplePattern::subject(node)).await?);
            }
        }
        root.subgraph = subgraph;

        event!(
            Level::DEBUG,
            subject = %subject,
            nodes = root.nodes.len(),
            "aggregation loaded"
        );
        Ok(root)
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Persisted head node.
    pub fn head_id(&self) -> Option<&Subject> {
        self.head.as_ref()
    }

    /// Persisted tail node.
    pub fn tail_id(&self) -> Option<&Subject> {
        self.tail.as_ref()
    }

    /// Node subjects asserted for this root by the last save.
    pub fn nodes(&self) -> &BTreeSet<Subject> {
        &self.nodes
    }

    pub fn types(&self) -> &BTreeSet<Subject> {
        &self.types
    }

    pub fn attribute(&self, predicate: &Predicate) -> &[Term] {
        self.attributes
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Replaces the values of an own attribute. Bookkeeping predicates and
    /// `rdf:type` are rejected.
    pub fn set_attribute(&mut self, predicate: Predicate, values: Vec<Term>) -> Result<()> {
        let vocab = &self.config.vocabulary;
        if vocab.is_bookkeeping(&predicate) || predicate == vocab.rdf_type {
            return Err(AggregationError::ReservedPredicate(predicate.to_string()));
        }
        if self.attribute(&predicate) == values.as_slice() {
            return Ok(());
        }
        if values.is_empty() {
            self.attributes.remove(&predicate);
        } else {
            self.attributes.insert(predicate.clone(), values);
        }
        self.changed_attributes.insert(predicate);
        Ok(())
    }

    /// Own attributes as the generic serialization path sees them.
    pub fn serializable_attributes(&self) -> &BTreeMap<Predicate, Vec<Term>> {
        &self.attributes
    }

    pub fn attributes_changed(&self) -> bool {
        !self.changed_attributes.is_empty()
    }

    /// Whether a save would write anything.
    pub fn changed(&self) -> bool {
        !self.persisted
            || self.attributes_changed()
            || self.ordered_self.as_ref().is_some_and(OrderedList::changed)
    }

    /// The change-tracked ordered list, built from the loaded subgraph on
    /// first access.
    pub fn ordered_self(&mut self) -> Result<&mut OrderedList> {
        let list = match self.ordered_self.take() {
            Some(list) => list,
            None => OrderedList::from_graph(
                &self.subgraph,
                self.head.as_ref(),
                self.subject.clone(),
                &self.config.vocabulary,
                self.config.node_prefix.clone(),
            )?,
        };
        Ok(self.ordered_self.insert(list))
    }

    /// Replaces the ordered list wholesale; the replacement is treated as dirty.
    pub fn set_ordered_self(&mut self, mut list: OrderedList) {
        list.order_will_change();
        self.ordered_self = Some(list);
    }

    pub fn append_target(&mut self, target: impl Into<TargetRef>) -> Result<Subject> {
        Ok(self.ordered_self()?.append_target(target))
    }

    /// Target identifiers in order, from the working copy.
    pub fn target_ids(&mut self) -> Result<Vec<Subject>> {
        Ok(self.ordered_self()?.target_ids())
    }

    /// The container every node of this root is `proxyIn`.
    pub fn proxy_in(&self) -> &Subject {
        &self.subject
    }

    /// Reader over the persisted chain starting at the stored head.
    pub fn reader<'a>(&self, loader: &'a mut ProxyLoader) -> OrderedReader<'a> {
        OrderedReader::new(self, loader)
    }

    /// Every persisted proxy node in order, repairing back-links on the way.
    pub async fn ordered_proxies(&self, loader: &mut ProxyLoader) -> Result<Vec<ProxyNode>> {
        self.reader(loader).collect_all().await
    }

    /// Persisted target identifiers in order.
    pub async fn ordered_by(&self, loader: &mut ProxyLoader) -> Result<Vec<Subject>> {
        let proxies = self.ordered_proxies(loader).await?;
        Ok(proxies.iter().map(|p| p.target_id().clone()).collect())
    }

    /// Not derived from the graph for this entity type.
    pub fn create_date(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Not derived from the graph for this entity type.
    pub fn modified_date(&self) -> Option<DateTime<Utc>> {
        None
    }

    pub fn has_model(&self) -> &str {
        &self.config.model_name
    }

    /// Persists pending changes. A dirty ordered list triggers a full rewrite
    /// of the proxy subgraph; the root's attributes and the rewrite are then
    /// committed together by the generic entity save.
    pub async fn save(&mut self, session: &GraphSession) -> Result<SaveReport> {
        let span = info_span!("aggregation.save", subject = %self.subject);
        self.save_changes(session).instrument(span).await
    }

    async fn save_changes(&mut self, session: &GraphSession) -> Result<SaveReport> {
        let mut request = SaveRequest::new(self.subject.clone());
        if !self.persisted {
            request
                .new_types
                .push(self.config.vocabulary.list_source_class.clone());
        }
        for predicate in &self.changed_attributes {
            request.changed_attributes.insert(
                predicate.clone(),
                self.attributes.get(predicate).cloned().unwrap_or_default(),
            );
        }

        let mut report = SaveReport::default();
        let rewrite = match &self.ordered_self {
            Some(list) if list.changed() => {
                let stale = self.stored_node_subjects(session).await?;
                Some(self.prepare_rewrite(list, stale)?)
            }
            _ => None,
        };
        if let Some(rewrite) = &rewrite {
            report.subgraph_rewritten = true;
            report.statements_asserted = rewrite.changeset.assertions().count();
            report.nodes_retracted = rewrite.retracted;
            request.changeset.append(rewrite.changeset.clone());
        } else {
            event!(Level::TRACE, "ordered list clean, subgraph untouched");
        }

        report.written = match session.saver().save_entity(request).await {
            Ok(written) => written,
            Err(err) => {
                event!(Level::ERROR, error = %err, "aggregation save failed");
                return Err(err);
            }
        };

        if let Some(rewrite) = rewrite {
            self.head = rewrite.head;
            self.tail = rewrite.tail;
            self.nodes = rewrite.nodes;
            self.subgraph = rewrite.subgraph;
            if let Some(list) = self.ordered_self.as_mut() {
                list.changes_committed();
            }
            event!(
                Level::DEBUG,
                nodes = self.nodes.len(),
                asserted = report.statements_asserted,
                "proxy subgraph rewritten"
            );
        }
        if !self.persisted {
            self.types
                .insert(self.config.vocabulary.list_source_class.clone());
        }
        self.changed_attributes.clear();
        self.persisted = true;
        Ok(report)
    }

    fn prepare_rewrite(&self, list: &OrderedList, stale: BTreeSet<Subject>) -> Result<SubgraphRewrite> {
        let pending = list.pending_targets();
        if !pending.is_empty() {
            return Err(AggregationError::UnpersistedTargets {
                aggregation: self.subject.to_string(),
                pending: pending.iter().map(|p| p.to_string()).collect(),
            });
        }

        let vocab = &self.config.vocabulary;
        let mut changeset = Changeset::new();

        for node in &stale {
            changeset.retract(TriplePattern::subject(node));
        }
        for predicate in [&vocab.first, &vocab.last, &vocab.has_part] {
            changeset.retract(TriplePattern::subject_predicate(&self.subject, predicate));
        }

        let subgraph = list.to_graph(vocab)?;
        let head = list.head_subject().cloned();
        let tail = list.tail_subject().cloned();
        let nodes = list.node_subjects();

        changeset.assert_all(subgraph.iter().cloned());
        if let Some(head) = &head {
            changeset.assert(Statement::link(&self.subject, &vocab.first, head));
        }
        if let Some(tail) = &tail {
            changeset.assert(Statement::link(&self.subject, &vocab.last, tail));
        }
        for node in &nodes {
            changeset.assert(Statement::link(&self.subject, &vocab.has_part, node));
        }

        Ok(SubgraphRewrite {
            changeset,
            retracted: stale.len(),
            head,
            tail,
            nodes,
            subgraph,
        })
    }

    /// Node subjects currently in the store for this root: every structural
    /// `<root>#...` subject, listed or orphaned, plus the bookkeeping set.
    async fn stored_node_subjects(&self, session: &GraphSession) -> Result<BTreeSet<Subject>> {
        let mut subjects = self.nodes.clone();
        subjects.extend(
            session
                .store()
                .structural_statements(&self.subject)
                .await?
                .into_iter()
                .map(|statement| statement.subject),
        );
        Ok(subjects)
    }

    /// Deletes the root and every proxy node it owns.
    pub async fn destroy(self, session: &GraphSession) -> Result<()> {
        let span = info_span!("aggregation.destroy", subject = %self.subject);
        async move {
            let mut changes = Changeset::new();
            changes.retract(TriplePattern::subject(&self.subject));
            for node in self.stored_node_subjects(session).await? {
                changes.retract(TriplePattern::subject(&node));
            }
            session.store().apply(&changes).await?;
            event!(Level::DEBUG, nodes = self.nodes.len(), "aggregation destroyed");
            Ok(())
        }
        .instrument(span)
        .await
    }
}

impl HeadSource for ListSource {
    fn head_subject(&self) -> Option<&Subject> {
        self.head.as_ref()
    }
}

struct SubgraphRewrite {
    changeset: Changeset,
    retracted: usize,
    head: Option<Subject>,
    tail: Option<Subject>,
    nodes: BTreeSet<Subject>,
    subgraph: Graph,
}
