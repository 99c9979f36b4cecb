use super::term::{Predicate, Subject};
use serde::{Deserialize, Serialize};

pub const IANA_FIRST: &str = "http://www.iana.org/assignments/relation/first";
pub const IANA_LAST: &str = "http://www.iana.org/assignments/relation/last";
pub const IANA_NEXT: &str = "http://www.iana.org/assignments/relation/next";
pub const IANA_PREV: &str = "http://www.iana.org/assignments/relation/prev";
pub const ORE_PROXY_FOR: &str = "http://www.openarchives.org/ore/terms/proxyFor";
pub const ORE_PROXY_IN: &str = "http://www.openarchives.org/ore/terms/proxyIn";
pub const ORE_PROXY: &str = "http://www.openarchives.org/ore/terms/Proxy";
pub const DC_HAS_PART: &str = "http://purl.org/dc/terms/hasPart";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const LIST_SOURCE_TYPE: &str = "http://example.org/aggregation#ListSource";

/// Predicate and class IRIs used to encode ordered aggregations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub first: Predicate,
    pub last: Predicate,
    pub next: Predicate,
    pub prev: Predicate,
    pub proxy_for: Predicate,
    pub proxy_in: Predicate,
    pub has_part: Predicate,
    pub rdf_type: Predicate,
    pub proxy_class: Subject,
    pub list_source_class: Subject,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            first: Predicate::new(IANA_FIRST),
            last: Predicate::new(IANA_LAST),
            next: Predicate::new(IANA_NEXT),
            prev: Predicate::new(IANA_PREV),
            proxy_for: Predicate::new(ORE_PROXY_FOR),
            proxy_in: Predicate::new(ORE_PROXY_IN),
            has_part: Predicate::new(DC_HAS_PART),
            rdf_type: Predicate::new(RDF_TYPE),
            proxy_class: Subject::new(ORE_PROXY),
            list_source_class: Subject::new(LIST_SOURCE_TYPE),
        }
    }
}

impl Vocabulary {
    /// Predicates stored on a root purely for bookkeeping.
    pub fn is_bookkeeping(&self, predicate: &Predicate) -> bool {
        *predicate == self.first || *predicate == self.last || *predicate == self.has_part
    }

    /// Predicates that make up a proxy node's link structure.
    pub fn is_proxy_structure(&self, predicate: &Predicate) -> bool {
        *predicate == self.next
            || *predicate == self.prev
            || *predicate == self.proxy_for
            || *predicate == self.proxy_in
            || *predicate == self.rdf_type
    }

    pub(crate) fn all_predicates(&self) -> [&Predicate; 8] {
        [
            &self.first,
            &self.last,
            &self.next,
            &self.prev,
            &self.proxy_for,
            &self.proxy_in,
            &self.has_part,
            &self.rdf_type,
        ]
    }
}
