use crate::aggregation::ListSource;
use crate::config::AggregationConfig;
use crate::core::{Predicate, Result, Term};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// A flat set of indexed fields for one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub fields: BTreeMap<String, JsonValue>,
}

impl IndexDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: JsonValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Serializes own attributes the generic way: one field per predicate, each
/// holding the lexical forms of its values.
pub fn serialize_attributes(attributes: &BTreeMap<Predicate, Vec<Term>>) -> BTreeMap<String, JsonValue> {
    attributes
        .iter()
        .map(|(predicate, values)| {
            let lexical = values
                .iter()
                .map(|v| JsonValue::String(v.lexical().to_string()))
                .collect();
            (predicate.to_string(), JsonValue::Array(lexical))
        })
        .collect()
}

/// Builds the index document for an aggregation root.
///
/// Writes the ordered membership field and the reverse-lookup container
/// field alongside the root's own attributes. `head`, `tail` and `nodes`
/// are never written.
pub struct ListSourceIndexer<'a> {
    config: &'a AggregationConfig,
}

impl<'a> ListSourceIndexer<'a> {
    pub fn new(config: &'a AggregationConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, root: &mut ListSource) -> Result<IndexDocument> {
        let fields = &self.config.index_fields;
        let mut document = IndexDocument::new(root.subject().to_string());
        document.fields = serialize_attributes(root.serializable_attributes());

        let targets = root
            .target_ids()?
            .into_iter()
            .map(|t| JsonValue::String(t.to_string()))
            .collect();
        document.insert(fields.ordered_targets.clone(), JsonValue::Array(targets));
        document.insert(
            fields.proxy_in.clone(),
            JsonValue::String(root.proxy_in().to_string()),
        );
        document.insert(
            fields.has_model.clone(),
            JsonValue::Array(vec![JsonValue::String(root.has_model().to_string())]),
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_attributes_uses_lexical_forms() {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Predicate::new("http://purl.org/dc/terms/title"),
            vec![Term::literal("Pages"), Term::resource("http://example.org/x")],
        );

        let fields = serialize_attributes(&attributes);
        assert_eq!(
            fields.get("http://purl.org/dc/terms/title"),
            Some(&serde_json::json!(["Pages", "http://example.org/x"]))
        );
    }

    #[test]
    fn test_document_to_json() {
        let mut document = IndexDocument::new("http://example.org/a");
        document.insert("proxy_in_ssi", serde_json::json!("http://example.org/a"));

        let json = document.to_json().unwrap();
        let parsed: IndexDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, document);
        assert!(parsed.contains("proxy_in_ssi"));
    }
}
