// ============================================================================
// RDF Terms
// ============================================================================
//
// Minimal subject/predicate/object model. The store is an unordered set of
// statements; nothing here carries ordering.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

const BLANK_PREFIX: &str = "_:";

/// Identifier naming an entity or structural node: an IRI or a graph-local
/// blank identifier (`_:` prefixed).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn blank(label: impl fmt::Display) -> Self {
        Self(format!("{}{}", BLANK_PREFIX, label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.starts_with(BLANK_PREFIX)
    }

    /// Mints a structural subject under `self`: `<self>#<prefix><uuid>`.
    pub fn mint_structural(&self, prefix: &str) -> Subject {
        Subject(format!("{}#{}{}", self.0, prefix, uuid::Uuid::new_v4()))
    }

    /// Whether this subject is a graph-local structural node owned by `root`.
    pub fn is_structural_of(&self, root: &Subject) -> bool {
        self.0.len() > root.0.len() + 1
            && self.0.starts_with(root.as_str())
            && self.0.as_bytes()[root.0.len()] == b'#'
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate(String);

impl Predicate {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Predicate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Object position of a statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Term {
    Resource { id: Subject },
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
}

impl Term {
    pub fn resource(id: impl Into<Subject>) -> Self {
        Term::Resource { id: id.into() }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
        }
    }

    pub fn as_resource(&self) -> Option<&Subject> {
        match self {
            Term::Resource { id } => Some(id),
            Term::Literal { .. } => None,
        }
    }

    /// Lexical form: the IRI for resources, the value for literals.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Resource { id } => id.as_str(),
            Term::Literal { value, .. } => value,
        }
    }
}

impl From<Subject> for Term {
    fn from(id: Subject) -> Self {
        Term::Resource { id }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Resource { id } => write!(f, "<{}>", id),
            Term::Literal {
                value,
                datatype: Some(datatype),
            } => write!(f, "{:?}^^<{}>", value, datatype),
            Term::Literal { value, .. } => write!(f, "{:?}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Subject,
    pub predicate: Predicate,
    pub object: Term,
}

impl Statement {
    pub fn new(subject: Subject, predicate: Predicate, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Statement whose object is another subject.
    pub fn link(subject: &Subject, predicate: &Predicate, object: &Subject) -> Self {
        Self::new(
            subject.clone(),
            predicate.clone(),
            Term::resource(object.clone()),
        )
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// Statement pattern; `None` positions are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: Option<Subject>,
    pub predicate: Option<Predicate>,
    pub object: Option<Term>,
}

impl TriplePattern {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn subject(subject: &Subject) -> Self {
        Self {
            subject: Some(subject.clone()),
            ..Self::default()
        }
    }

    pub fn subject_predicate(subject: &Subject, predicate: &Predicate) -> Self {
        Self {
            subject: Some(subject.clone()),
            predicate: Some(predicate.clone()),
            object: None,
        }
    }

    pub fn with_object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    pub fn matches(&self, statement: &Statement) -> bool {
        self.subject
            .as_ref()
            .is_none_or(|s| *s == statement.subject)
            && self
                .predicate
                .as_ref()
                .is_none_or(|p| *p == statement.predicate)
            && self.object.as_ref().is_none_or(|o| *o == statement.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_subject_convention() {
        let root = Subject::new("http://example.org/book/1/list_source");
        let node = root.mint_structural("g");

        assert!(node.is_structural_of(&root));
        assert!(node.as_str().starts_with("http://example.org/book/1/list_source#g"));
        assert!(!root.is_structural_of(&root));

        let sibling = Subject::new("http://example.org/book/1/list_source2#g1");
        assert!(!sibling.is_structural_of(&root));
    }

    #[test]
    fn test_blank_subjects() {
        let blank = Subject::blank("b0");
        assert!(blank.is_blank());
        assert_eq!(blank.as_str(), "_:b0");
        assert!(!Subject::new("http://example.org/x").is_blank());
    }

    #[test]
    fn test_pattern_wildcards() {
        let s = Subject::new("s");
        let p = Predicate::new("p");
        let stmt = Statement::new(s.clone(), p.clone(), Term::literal("o"));

        assert!(TriplePattern::any().matches(&stmt));
        assert!(TriplePattern::subject(&s).matches(&stmt));
        assert!(TriplePattern::subject_predicate(&s, &p).matches(&stmt));
        assert!(
            !TriplePattern::subject_predicate(&s, &p)
                .with_object(Term::literal("other"))
                .matches(&stmt)
        );
        assert!(!TriplePattern::subject(&Subject::new("t")).matches(&stmt));
    }
}
