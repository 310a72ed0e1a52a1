use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::database::entities::{elements, models};
use crate::database::store;
use crate::errors::{EntityKind, GraphError, GraphResult};

/// Model metadata without its graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub status: String,
    pub lifecycle_state: String,
    pub versioned_from: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&models::Model> for ModelSummary {
    fn from(model: &models::Model) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            version: model.version.clone(),
            status: model.status.clone(),
            lifecycle_state: model.lifecycle_state.clone(),
            versioned_from: model.versioned_from.clone(),
            created_at: model.created_at,
        }
    }
}

impl From<models::Model> for ModelSummary {
    fn from(model: models::Model) -> Self {
        ModelSummary::from(&model)
    }
}

/// Walk `versioned_from` upwards. Returns root first, `model` last.
///
/// The walk ends at a model without a pointer, at a pointer whose target no
/// longer exists, or at a repeated id.
pub async fn ancestors<C>(conn: &C, model: models::Model) -> GraphResult<Vec<models::Model>>
where
    C: ConnectionTrait,
{
    let mut seen = HashSet::from([model.id.clone()]);
    let mut chain = vec![model];

    while let Some(parent_id) = chain.last().and_then(|m| m.versioned_from.clone()) {
        if !seen.insert(parent_id.clone()) {
            warn!("Lineage cycle detected at model {}", parent_id);
            break;
        }
        match store::find_model_opt(conn, &parent_id).await? {
            Some(parent) => chain.push(parent),
            None => {
                debug!("Lineage ancestor {} no longer exists", parent_id);
                break;
            }
        }
    }

    chain.reverse();
    Ok(chain)
}

/// Every model derived from `model_id`, directly or transitively, breadth-first
pub async fn descendants<C>(conn: &C, model_id: &str) -> GraphResult<Vec<models::Model>>
where
    C: ConnectionTrait,
{
    let mut seen = HashSet::from([model_id.to_string()]);
    let mut queue = VecDeque::from([model_id.to_string()]);
    let mut found = Vec::new();

    while let Some(current) = queue.pop_front() {
        for child in store::models_versioned_from(conn, &current).await? {
            if seen.insert(child.id.clone()) {
                queue.push_back(child.id.clone());
                found.push(child);
            }
        }
    }

    Ok(found)
}

/// Root of the lineage plus everything derived from it
pub async fn lineage_members<C>(conn: &C, model: models::Model) -> GraphResult<Vec<models::Model>>
where
    C: ConnectionTrait,
{
    let chain = ancestors(conn, model).await?;
    let Some(root) = chain.into_iter().next() else {
        return Ok(Vec::new());
    };
    let mut members = descendants(conn, &root.id).await?;
    members.insert(0, root);
    Ok(members)
}

/// Read-side of lineage: every pointer was written once by the clone service
#[derive(Clone)]
pub struct LineageService {
    db: DatabaseConnection,
}

impl LineageService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Ancestors of a model, oldest first, ending with the model itself.
    /// A model with no lineage pointer is its own history head.
    pub async fn history(&self, model_id: &str) -> GraphResult<Vec<ModelSummary>> {
        let txn = self.db.begin().await?;
        let model = store::find_model(&txn, model_id).await?;
        let chain = ancestors(&txn, model).await?;
        txn.commit().await?;

        Ok(chain.iter().map(ModelSummary::from).collect())
    }

    pub async fn descendants(&self, model_id: &str) -> GraphResult<Vec<ModelSummary>> {
        let txn = self.db.begin().await?;
        store::find_model(&txn, model_id).await?;
        let found = descendants(&txn, model_id).await?;
        txn.commit().await?;

        Ok(found.iter().map(ModelSummary::from).collect())
    }

    pub async fn lineage_root(&self, model_id: &str) -> GraphResult<ModelSummary> {
        self.history(model_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GraphError::not_found(EntityKind::Model, model_id))
    }

    /// Follow an element's lineage pointer across models, oldest first
    pub async fn element_origin(&self, element_id: &str) -> GraphResult<Vec<elements::Model>> {
        let txn = self.db.begin().await?;
        let element = store::find_element(&txn, element_id).await?;

        let mut seen = HashSet::from([element.id.clone()]);
        let mut chain = vec![element];
        while let Some(source_id) = chain.last().and_then(|e| e.versioned_from.clone()) {
            if !seen.insert(source_id.clone()) {
                break;
            }
            match elements_find_opt(&txn, &source_id).await? {
                Some(source) => chain.push(source),
                None => break,
            }
        }
        txn.commit().await?;

        chain.reverse();
        Ok(chain)
    }
}

async fn elements_find_opt<C>(conn: &C, id: &str) -> GraphResult<Option<elements::Model>>
where
    C: ConnectionTrait,
{
    match store::find_element(conn, id).await {
        Ok(element) => Ok(Some(element)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
