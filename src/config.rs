use crate::core::{AggregationError, Result, Vocabulary};
use serde::{Deserialize, Serialize};

/// Index field names written for an aggregation root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexFieldNames {
    /// Ordered list of target identifiers
    pub ordered_targets: String,
    /// Reverse lookup to the owning container
    pub proxy_in: String,
    /// Fixed model classification
    pub has_model: String,
}

impl Default for IndexFieldNames {
    fn default() -> Self {
        Self {
            ordered_targets: "ordered_targets_ssim".to_string(),
            proxy_in: "proxy_in_ssi".to_string(),
            has_model: "has_model_ssim".to_string(),
        }
    }
}

/// Aggregation mapping configuration
///
/// Defaults encode lists with IANA link relations and ORE proxies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Predicate and class IRIs
    pub vocabulary: Vocabulary,

    /// Fragment prefix for minted proxy node subjects (`<root>#<prefix><uuid>`)
    pub node_prefix: String,

    /// Index field names
    pub index_fields: IndexFieldNames,

    /// Value reported for the model classification field
    pub model_name: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            node_prefix: "g".to_string(),
            index_fields: IndexFieldNames::default(),
            model_name: "ListSource".to_string(),
        }
    }
}

impl AggregationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vocabulary
    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Set the node fragment prefix
    pub fn node_prefix(mut self, prefix: &str) -> Self {
        self.node_prefix = prefix.to_string();
        self
    }

    /// Set the index field names
    pub fn index_fields(mut self, fields: IndexFieldNames) -> Self {
        self.index_fields = fields;
        self
    }

    /// Set the model classification value
    pub fn model_name(mut self, name: &str) -> Self {
        self.model_name = name.to_string();
        self
    }

    /// Parse a (possibly partial) JSON override; missing keys keep their defaults.
    ///
    /// ```
    /// use ordered_aggregation::AggregationConfig;
    ///
    /// let config = AggregationConfig::from_json(r#"{ "node_prefix": "p" }"#).unwrap();
    /// assert_eq!(config.node_prefix, "p");
    /// assert_eq!(config.model_name, "ListSource");
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(empty) = self
            .vocabulary
            .all_predicates()
            .iter()
            .find(|p| p.as_str().is_empty())
        {
            return Err(AggregationError::ConfigError(format!(
                "empty predicate IRI in vocabulary ({:?})",
                empty
            )));
        }
        if self.node_prefix.contains('#') {
            return Err(AggregationError::ConfigError(
                "node prefix must not contain '#'".to_string(),
            ));
        }
        let fields = &self.index_fields;
        if fields.ordered_targets.is_empty()
            || fields.proxy_in.is_empty()
            || fields.has_model.is_empty()
        {
            return Err(AggregationError::ConfigError(
                "index field names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
