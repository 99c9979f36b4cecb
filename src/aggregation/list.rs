// ============================================================================
// Ordered List
// ============================================================================
//
// In-memory, change-tracked working copy of a proxy chain. Nodes live in an
// arena owned by the list; `next`/`prev` are arena indices, so mutual links
// can never dangle. Freed slots are recycled through a free list.
//
// ============================================================================

use super::proxy::{ProxyAttributes, ProxyNode};
use crate::core::{AggregationError, Graph, Result, Subject, Vocabulary};
use std::collections::BTreeSet;
use std::fmt;

/// A target that may not have a durable identifier yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetRef {
    Persisted(Subject),
    Pending(PendingTarget),
}

impl TargetRef {
    pub fn id(&self) -> Option<&Subject> {
        match self {
            TargetRef::Persisted(id) => Some(id),
            TargetRef::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TargetRef::Pending(_))
    }
}

impl From<Subject> for TargetRef {
    fn from(id: Subject) -> Self {
        TargetRef::Persisted(id)
    }
}

impl From<&str> for TargetRef {
    fn from(id: &str) -> Self {
        TargetRef::Persisted(Subject::new(id))
    }
}

impl From<PendingTarget> for TargetRef {
    fn from(handle: PendingTarget) -> Self {
        TargetRef::Pending(handle)
    }
}

/// Handle for an entity that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PendingTarget(uuid::Uuid);

impl PendingTarget {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for PendingTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PendingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pending:{}", self.0)
    }
}

/// One position of the working copy: the node subject, what it points at,
/// and any extra statements to carry on the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyDescriptor {
    subject: Subject,
    target: TargetRef,
    attributes: ProxyAttributes,
}

impl ProxyDescriptor {
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn target(&self) -> &TargetRef {
        &self.target
    }

    pub fn target_id(&self) -> Option<&Subject> {
        self.target.id()
    }

    pub fn attributes(&self) -> &ProxyAttributes {
        &self.attributes
    }
}

#[derive(Debug, Clone)]
struct Slot {
    descriptor: ProxyDescriptor,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct OrderedList {
    container: Subject,
    node_prefix: String,
    slots: Vec<Slot>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    changed: bool,
}

impl OrderedList {
    /// Empty list whose nodes belong to `container`.
    pub fn new(container: Subject, node_prefix: impl Into<String>) -> Self {
        Self {
            container,
            node_prefix: node_prefix.into(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            changed: false,
        }
    }

    /// Builds the working copy by following `next` links from `head` through
    /// `graph`. Stored `prev` links are ignored; the arena derives them.
    ///
    /// A head or next reference with no statements in `graph` fails with
    /// `UnresolvableReference`. No cycle detection is performed.
    pub fn from_graph(
        graph: &Graph,
        head: Option<&Subject>,
        container: Subject,
        vocabulary: &Vocabulary,
        node_prefix: impl Into<String>,
    ) -> Result<Self> {
        let mut list = Self::new(container, node_prefix);
        let mut current = head.cloned();
        while let Some(subject) = current {
            if !graph.has_subject(&subject) {
                return Err(AggregationError::unresolvable(&subject));
            }
            let target = graph
                .first_resource(&subject, &vocabulary.proxy_for)
                .ok_or_else(|| AggregationError::malformed(&subject, "missing target reference"))?;

            let mut attributes = ProxyAttributes::new();
            for statement in graph.statements_for(&subject) {
                if !vocabulary.is_proxy_structure(&statement.predicate) {
                    attributes
                        .entry(statement.predicate.clone())
                        .or_default()
                        .push(statement.object.clone());
                }
            }

            current = graph.first_resource(&subject, &vocabulary.next);
            let idx = list.alloc(ProxyDescriptor {
                subject,
                target: TargetRef::Persisted(target),
                attributes,
            });
            list.link_before(idx, None);
        }
        list.changed = false;
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The aggregation every node is `proxyIn`.
    pub fn proxy_in(&self) -> &Subject {
        &self.container
    }

    pub fn head_subject(&self) -> Option<&Subject> {
        self.head.map(|idx| &self.slots[idx].descriptor.subject)
    }

    pub fn tail_subject(&self) -> Option<&Subject> {
        self.tail.map(|idx| &self.slots[idx].descriptor.subject)
    }

    pub fn first(&self) -> Option<&ProxyDescriptor> {
        self.head.map(|idx| &self.slots[idx].descriptor)
    }

    pub fn last(&self) -> Option<&ProxyDescriptor> {
        self.tail.map(|idx| &self.slots[idx].descriptor)
    }

    pub fn get(&self, index: usize) -> Option<&ProxyDescriptor> {
        self.slot_at(index).map(|idx| &self.slots[idx].descriptor)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Appends a node for `target` after the current tail and returns its subject.
    pub fn append(&mut self, target: impl Into<TargetRef>, attributes: ProxyAttributes) -> Subject {
        let idx = self.new_node(target.into(), attributes);
        self.link_before(idx, None);
        self.changed = true;
        self.slots[idx].descriptor.subject.clone()
    }

    /// Shorthand for [`append`](Self::append) without extra attributes.
    pub fn append_target(&mut self, target: impl Into<TargetRef>) -> Subject {
        self.append(target, ProxyAttributes::new())
    }

    /// Inserts a node for `target` so that it ends up at `index`.
    /// `index == len()` appends.
    pub fn insert_at(
        &mut self,
        index: usize,
        target: impl Into<TargetRef>,
        attributes: ProxyAttributes,
    ) -> Result<Subject> {
        if index > self.len {
            return Err(AggregationError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let before = self.slot_at(index);
        let idx = self.new_node(target.into(), attributes);
        self.link_before(idx, before);
        self.changed = true;
        Ok(self.slots[idx].descriptor.subject.clone())
    }

    /// Removes the node at `index`.
    pub fn delete_at(&mut self, index: usize) -> Result<ProxyDescriptor> {
        let idx = self
            .slot_at(index)
            .ok_or(AggregationError::IndexOutOfBounds {
                index,
                len: self.len,
            })?;
        Ok(self.unlink(idx))
    }

    /// Removes the node named `subject`, if it is in the list.
    pub fn delete_node(&mut self, subject: &Subject) -> Option<ProxyDescriptor> {
        let idx = self.find(|d| d.subject == *subject)?;
        Some(self.unlink(idx))
    }

    /// Removes every node pointing at `target`, returning how many were removed.
    pub fn delete_target(&mut self, target: &TargetRef) -> usize {
        let doomed: Vec<usize> = self
            .indices()
            .filter(|idx| self.slots[*idx].descriptor.target == *target)
            .collect();
        for idx in &doomed {
            self.unlink(*idx);
        }
        doomed.len()
    }

    /// Target identifiers in list order; pending targets are skipped.
    pub fn target_ids(&self) -> Vec<Subject> {
        self.iter().filter_map(|d| d.target_id().cloned()).collect()
    }

    pub fn pending_targets(&self) -> Vec<PendingTarget> {
        self.iter()
            .filter_map(|d| match d.target {
                TargetRef::Pending(handle) => Some(handle),
                TargetRef::Persisted(_) => None,
            })
            .collect()
    }

    /// Gives every node pointing at `pending` the durable identifier `id`.
    pub fn assign_target(&mut self, pending: PendingTarget, id: &Subject) -> usize {
        let pending = TargetRef::Pending(pending);
        let mut assigned = 0;
        for slot in self.live_slots_mut() {
            if slot.descriptor.target == pending {
                slot.descriptor.target = TargetRef::Persisted(id.clone());
                assigned += 1;
            }
        }
        if assigned > 0 {
            self.changed = true;
        }
        assigned
    }

    pub fn node_subjects(&self) -> BTreeSet<Subject> {
        self.iter().map(|d| d.subject.clone()).collect()
    }

    /// Serializes the whole chain (target, container, next, prev and extra
    /// statements of every node) into a standalone graph.
    pub fn to_graph(&self, vocabulary: &Vocabulary) -> Result<Graph> {
        let pending = self.pending_targets();
        if !pending.is_empty() {
            return Err(AggregationError::UnpersistedTargets {
                aggregation: self.container.to_string(),
                pending: pending.iter().map(|p| p.to_string()).collect(),
            });
        }

        let mut graph = Graph::new();
        for idx in self.indices() {
            let slot = &self.slots[idx];
            let descriptor = &slot.descriptor;
            let Some(target) = descriptor.target_id() else {
                continue;
            };
            let mut node = ProxyNode::new(descriptor.subject.clone(), target.clone())
                .with_container(self.container.clone())
                .with_attributes(descriptor.attributes.clone());
            if let Some(next) = slot.next {
                node = node.with_next(self.slots[next].descriptor.subject.clone());
            }
            if let Some(prev) = slot.prev {
                node = node.with_prev(self.slots[prev].descriptor.subject.clone());
            }
            graph.extend(node.to_statements(vocabulary));
        }
        Ok(graph)
    }

    /// True if nodes were added, removed or reordered since load or the last commit.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Marks the list dirty without a structural change.
    pub fn order_will_change(&mut self) {
        self.changed = true;
    }

    /// Clears the dirty flag once the chain has been persisted.
    pub fn changes_committed(&mut self) {
        self.changed = false;
    }

    fn new_node(&mut self, target: TargetRef, attributes: ProxyAttributes) -> usize {
        let subject = self.container.mint_structural(&self.node_prefix);
        self.alloc(ProxyDescriptor {
            subject,
            target,
            attributes,
        })
    }

    fn alloc(&mut self, descriptor: ProxyDescriptor) -> usize {
        let slot = Slot {
            descriptor,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    /// Links `idx` in front of `before`; `None` links it after the tail.
    fn link_before(&mut self, idx: usize, before: Option<usize>) {
        let prev = match before {
            Some(b) => self.slots[b].prev,
            None => self.tail,
        };
        self.slots[idx].prev = prev;
        self.slots[idx].next = before;
        match prev {
            Some(p) => self.slots[p].next = Some(idx),
            None => self.head = Some(idx),
        }
        match before {
            Some(b) => self.slots[b].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.len += 1;
    }

    fn unlink(&mut self, idx: usize) -> ProxyDescriptor {
        let Slot { prev, next, .. } = self.slots[idx];
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
        self.free.push(idx);
        self.len -= 1;
        self.changed = true;
        self.slots[idx].descriptor.clone()
    }

    fn indices(&self) -> Indices<'_> {
        Indices {
            slots: &self.slots,
            cursor: self.head,
            remaining: self.len,
        }
    }

    fn slot_at(&self, index: usize) -> Option<usize> {
        self.indices().nth(index)
    }

    fn find<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&ProxyDescriptor) -> bool,
    {
        self.indices()
            .find(|idx| predicate(&self.slots[*idx].descriptor))
    }

    fn live_slots_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        let live: BTreeSet<usize> = self.indices().collect();
        self.slots
            .iter_mut()
            .enumerate()
            .filter(move |(idx, _)| live.contains(idx))
            .map(|(_, slot)| slot)
    }
}

struct Indices<'a> {
    slots: &'a [Slot],
    cursor: Option<usize>,
    remaining: usize,
}

impl Iterator for Indices<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let idx = self.cursor?;
        self.cursor = self.slots[idx].next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Descriptors in list order.
pub struct Iter<'a> {
    list: &'a OrderedList,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ProxyDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let slot = &self.list.slots[idx];
        self.cursor = slot.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&slot.descriptor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a OrderedList {
    type Item = &'a ProxyDescriptor;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Predicate, Statement, Term};

    fn list() -> OrderedList {
        OrderedList::new(Subject::new("http://example.org/book/list_source"), "g")
    }

    fn targets(list: &OrderedList) -> Vec<String> {
        list.target_ids().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_append_preserves_order_and_ends() {
        let mut list = list();
        assert!(!list.changed());

        let n1 = list.append_target("T1");
        list.append_target("T2");
        let n3 = list.append_target("T3");

        assert_eq!(targets(&list), vec!["T1", "T2", "T3"]);
        assert_eq!(list.head_subject(), Some(&n1));
        assert_eq!(list.tail_subject(), Some(&n3));
        assert_eq!(list.len(), 3);
        assert!(list.changed());
    }

    #[test]
    fn test_node_subjects_are_structural_and_unique() {
        let mut list = list();
        let a = list.append_target("T");
        let b = list.append_target("T");

        assert_ne!(a, b);
        assert!(a.is_structural_of(list.proxy_in()));
        assert_eq!(list.node_subjects().len(), 2);
    }

    #[test]
    fn test_insert_at_positions() {
        let mut list = list();
        list.append_target("b");
        list.insert_at(0, "a", ProxyAttributes::new()).unwrap();
        list.insert_at(2, "d", ProxyAttributes::new()).unwrap();
        list.insert_at(2, "c", ProxyAttributes::new()).unwrap();

        assert_eq!(targets(&list), vec!["a", "b", "c", "d"]);
        assert_eq!(list.first().unwrap().target_id(), Some(&Subject::new("a")));
        assert_eq!(list.last().unwrap().target_id(), Some(&Subject::new("d")));

        let err = list.insert_at(9, "z", ProxyAttributes::new()).unwrap_err();
        assert_eq!(err, AggregationError::IndexOutOfBounds { index: 9, len: 4 });
    }

    #[test]
    fn test_delete_operations_relink_neighbours() {
        let mut list = list();
        for t in ["a", "b", "c", "b", "e"] {
            list.append_target(t);
        }
        list.changes_committed();

        let removed = list.delete_at(0).unwrap();
        assert_eq!(removed.target_id(), Some(&Subject::new("a")));
        assert!(list.changed());

        assert_eq!(list.delete_target(&TargetRef::from("b")), 2);
        assert_eq!(targets(&list), vec!["c", "e"]);

        let tail = list.tail_subject().cloned().unwrap();
        assert!(list.delete_node(&tail).is_some());
        assert_eq!(targets(&list), vec!["c"]);
        assert_eq!(list.head_subject(), list.tail_subject());

        assert!(list.delete_at(5).is_err());
        assert!(list.delete_node(&Subject::new("missing")).is_none());
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = list();
        list.append_target("a");
        list.append_target("b");
        list.delete_at(0).unwrap();
        list.append_target("c");

        assert_eq!(list.slots.len(), 2);
        assert_eq!(targets(&list), vec!["b", "c"]);
    }

    #[test]
    fn test_to_graph_links_both_directions() {
        let vocab = Vocabulary::default();
        let mut list = list();
        let n1 = list.append_target("A");
        let n2 = list.append_target("B");

        let graph = list.to_graph(&vocab).unwrap();
        assert!(graph.contains(&Statement::link(&n1, &vocab.next, &n2)));
        assert!(graph.contains(&Statement::link(&n2, &vocab.prev, &n1)));
        assert!(graph.contains(&Statement::link(&n1, &vocab.proxy_in, list.proxy_in())));
        assert_eq!(graph.first_resource(&n1, &vocab.prev), None);
        assert_eq!(graph.first_resource(&n2, &vocab.next), None);
    }

    #[test]
    fn test_from_graph_rebuilds_clean_list() {
        let vocab = Vocabulary::default();
        let label = Predicate::new("http://example.org/label");
        let mut original = list();
        original.append_target("A");
        let mut extras = ProxyAttributes::new();
        extras.insert(label.clone(), vec![Term::literal("second")]);
        original.append(Subject::new("B"), extras);

        let graph = original.to_graph(&vocab).unwrap();
        let rebuilt = OrderedList::from_graph(
            &graph,
            original.head_subject(),
            original.proxy_in().clone(),
            &vocab,
            "g",
        )
        .unwrap();

        assert!(!rebuilt.changed());
        assert_eq!(rebuilt.target_ids(), original.target_ids());
        assert_eq!(rebuilt.node_subjects(), original.node_subjects());
        assert_eq!(
            rebuilt.get(1).unwrap().attributes().get(&label),
            Some(&vec![Term::literal("second")])
        );
    }

    #[test]
    fn test_from_graph_unresolvable_head() {
        let vocab = Vocabulary::default();
        let err = OrderedList::from_graph(
            &Graph::new(),
            Some(&Subject::new("http://example.org/x#g1")),
            Subject::new("http://example.org/x"),
            &vocab,
            "g",
        )
        .unwrap_err();
        assert!(matches!(err, AggregationError::UnresolvableReference(_)));
    }

    #[test]
    fn test_pending_targets_block_serialization_until_assigned() {
        let vocab = Vocabulary::default();
        let mut list = list();
        let pending = PendingTarget::new();
        list.append_target("A");
        list.append_target(pending);

        assert_eq!(list.pending_targets(), vec![pending]);
        assert_eq!(list.target_ids(), vec![Subject::new("A")]);
        assert!(matches!(
            list.to_graph(&vocab),
            Err(AggregationError::UnpersistedTargets { .. })
        ));

        assert_eq!(list.assign_target(pending, &Subject::new("B")), 1);
        assert!(list.pending_targets().is_empty());
        assert!(list.to_graph(&vocab).is_ok());
    }

    #[test]
    fn test_order_will_change_marks_dirty() {
        let mut list = list();
        list.order_will_change();
        assert!(list.changed());
        list.changes_committed();
        assert!(!list.changed());
    }
}
