use super::term::{Predicate, Statement, Subject, Term, TriplePattern};
use std::collections::BTreeSet;

/// An in-memory set of statements with lookup helpers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    statements: BTreeSet<Statement>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Returns `true` if the statement was not already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    pub fn extend<I>(&mut self, statements: I)
    where
        I: IntoIterator<Item = Statement>,
    {
        self.statements.extend(statements);
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    pub fn query<'a>(&'a self, pattern: &'a TriplePattern) -> impl Iterator<Item = &'a Statement> {
        self.statements.iter().filter(move |s| pattern.matches(s))
    }

    /// Removes every statement matching `pattern`, returning how many were removed.
    pub fn remove_matching(&mut self, pattern: &TriplePattern) -> usize {
        let before = self.statements.len();
        self.statements.retain(|s| !pattern.matches(s));
        before - self.statements.len()
    }

    pub fn has_subject(&self, subject: &Subject) -> bool {
        self.statements.iter().any(|s| s.subject == *subject)
    }

    pub fn statements_for<'a>(&'a self, subject: &'a Subject) -> impl Iterator<Item = &'a Statement> {
        self.statements.iter().filter(move |s| s.subject == *subject)
    }

    /// Statements of the structural nodes owned by `root`.
    pub fn structural_of<'a>(&'a self, root: &'a Subject) -> impl Iterator<Item = &'a Statement> {
        self.statements
            .iter()
            .filter(move |s| s.subject.is_structural_of(root))
    }

    pub fn objects<'a>(
        &'a self,
        subject: &'a Subject,
        predicate: &'a Predicate,
    ) -> impl Iterator<Item = &'a Term> {
        self.statements
            .iter()
            .filter(move |s| s.subject == *subject && s.predicate == *predicate)
            .map(|s| &s.object)
    }

    /// First resource object of `(subject, predicate, ?)`.
    pub fn first_resource(&self, subject: &Subject, predicate: &Predicate) -> Option<Subject> {
        self.objects(subject, predicate)
            .find_map(|o| o.as_resource())
            .cloned()
    }

    pub fn subjects(&self) -> BTreeSet<Subject> {
        self.statements.iter().map(|s| s.subject.clone()).collect()
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements.into_iter().collect()
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Statement;
    type IntoIter = std::collections::btree_set::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_lookups() {
        let a = Subject::new("a");
        let b = Subject::new("b");
        let next = Predicate::new("next");
        let label = Predicate::new("label");

        let graph: Graph = vec![
            Statement::link(&a, &next, &b),
            Statement::new(a.clone(), label.clone(), Term::literal("A")),
            Statement::new(b.clone(), label.clone(), Term::literal("B")),
        ]
        .into_iter()
        .collect();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.first_resource(&a, &next), Some(b.clone()));
        assert_eq!(graph.first_resource(&a, &label), None);
        assert_eq!(graph.statements_for(&b).count(), 1);
        assert_eq!(graph.subjects().len(), 2);
    }

    #[test]
    fn test_structural_of_selects_owned_nodes() {
        let root = Subject::new("http://example.org/list");
        let p = Predicate::new("p");
        let graph: Graph = [
            Statement::new(Subject::new("http://example.org/list#g1"), p.clone(), Term::literal("1")),
            Statement::new(Subject::new("http://example.org/list2#g1"), p.clone(), Term::literal("2")),
            Statement::new(root.clone(), p.clone(), Term::literal("3")),
        ]
        .into_iter()
        .collect();

        let owned: Vec<_> = graph.structural_of(&root).collect();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].subject.as_str(), "http://example.org/list#g1");
    }

    #[test]
    fn test_remove_matching() {
        let a = Subject::new("a");
        let p = Predicate::new("p");
        let mut graph = Graph::new();
        graph.insert(Statement::new(a.clone(), p.clone(), Term::literal("1")));
        graph.insert(Statement::new(a.clone(), p.clone(), Term::literal("2")));
        graph.insert(Statement::new(Subject::new("b"), p.clone(), Term::literal("3")));

        assert_eq!(graph.remove_matching(&TriplePattern::subject(&a)), 2);
        assert_eq!(graph.len(), 1);
        assert!(!graph.has_subject(&a));
    }
}
