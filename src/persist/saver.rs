use crate::core::{Predicate, Result, Statement, Subject, Term, TriplePattern};
use crate::storage::StatementStore;
use crate::transaction::Changeset;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{Level, event};

/// Everything the generic save needs to commit one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub subject: Subject,
    /// `rdf:type` values asserted when the entity is saved for the first time
    pub new_types: Vec<Subject>,
    /// Own scalar attributes that changed, with their full new values
    pub changed_attributes: BTreeMap<Predicate, Vec<Term>>,
    /// Structural changes prepared by the caller (e.g. a subgraph rewrite)
    pub changeset: Changeset,
}

impl SaveRequest {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            new_types: Vec::new(),
            changed_attributes: BTreeMap::new(),
            changeset: Changeset::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.new_types.is_empty() && self.changed_attributes.is_empty() && self.changeset.is_empty()
    }
}

/// Generic entity save collaborator.
#[async_trait]
pub trait EntitySaver: Send + Sync {
    /// Commits the request as a single unit. Returns `false` when there was
    /// nothing to write.
    async fn save_entity(&self, request: SaveRequest) -> Result<bool>;
}

/// Saver that turns a request into one changeset on a statement store.
pub struct StoreEntitySaver {
    store: Arc<dyn StatementStore>,
    rdf_type: Predicate,
}

impl StoreEntitySaver {
    pub fn new(store: Arc<dyn StatementStore>, rdf_type: Predicate) -> Self {
        Self { store, rdf_type }
    }

    fn changeset_for(&self, request: SaveRequest) -> Changeset {
        let SaveRequest {
            subject,
            new_types,
            changed_attributes,
            changeset,
        } = request;

        let mut changes = Changeset::new();
        for rdf_type in new_types {
            changes.assert(Statement::link(&subject, &self.rdf_type, &rdf_type));
        }
        for (predicate, values) in changed_attributes {
            changes.retract(TriplePattern::subject_predicate(&subject, &predicate));
            changes.assert_all(
                values
                    .into_iter()
                    .map(|value| Statement::new(subject.clone(), predicate.clone(), value)),
            );
        }
        changes.append(changeset);
        changes
    }
}

#[async_trait]
impl EntitySaver for StoreEntitySaver {
    async fn save_entity(&self, request: SaveRequest) -> Result<bool> {
        if request.is_noop() {
            event!(Level::TRACE, subject = %request.subject, "entity save skipped, nothing changed");
            return Ok(false);
        }
        let subject = request.subject.clone();
        let changes = self.changeset_for(request);
        if let Err(err) = self.store.apply(&changes).await {
            event!(Level::ERROR, subject = %subject, error = %err, "entity save failed");
            return Err(err);
        }
        event!(Level::DEBUG, subject = %subject, changes = changes.len(), "entity saved");
        Ok(true)
    }
}
