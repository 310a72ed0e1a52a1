use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction};
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::database::entities::views;
use crate::database::begin_write;
use crate::database::store;
use crate::errors::{EntityKind, GraphError, GraphResult};

/// Row counts removed or rewritten by one delete call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub models_removed: u64,
    pub elements_removed: u64,
    pub relationships_removed: u64,
    pub views_removed: u64,
    /// Views that survived but had element references stripped
    pub views_updated: u64,
}

impl DeleteReport {
    pub fn total_removed(&self) -> u64 {
        self.models_removed + self.elements_removed + self.relationships_removed + self.views_removed
    }
}

/// Deletes that keep the graph free of dangling references.
///
/// Without `cascade` a delete that would orphan a dependent is refused with
/// [`GraphError::Conflict`] and nothing changes. With `cascade` dependents go
/// in the same transaction as the target.
#[derive(Clone)]
pub struct CascadeDeleteService {
    db: DatabaseConnection,
}

impl CascadeDeleteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn delete_element(&self, element_id: &str, cascade: bool) -> GraphResult<DeleteReport> {
        let txn = begin_write(&self.db).await?;
        let result = delete_element_in(&txn, element_id, cascade).await;
        finish(txn, result, EntityKind::Element, element_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_model(&self, model_id: &str, cascade: bool) -> GraphResult<DeleteReport> {
        let txn = begin_write(&self.db).await?;
        let result = delete_model_in(&txn, model_id, cascade).await;
        finish(txn, result, EntityKind::Model, model_id).await
    }

    /// Relationships have no dependents
    pub async fn delete_relationship(&self, relationship_id: &str) -> GraphResult<DeleteReport> {
        let txn = begin_write(&self.db).await?;
        let result = async {
            let relationship = store::find_relationship(&txn, relationship_id).await?;
            let removed = store::delete_relationships(&txn, &[relationship.id]).await?;
            Ok::<_, GraphError>(DeleteReport {
                relationships_removed: removed,
                ..Default::default()
            })
        }
        .await;
        finish(txn, result, EntityKind::Relationship, relationship_id).await
    }

    /// Views reference elements but nothing references a view
    pub async fn delete_view(&self, view_id: &str) -> GraphResult<DeleteReport> {
        let txn = begin_write(&self.db).await?;
        let result = async {
            let view = store::find_view(&txn, view_id).await?;
            let removed = store::delete_view_row(&txn, &view.id).await?;
            Ok::<_, GraphError>(DeleteReport {
                views_removed: removed,
                ..Default::default()
            })
        }
        .await;
        finish(txn, result, EntityKind::View, view_id).await
    }
}

async fn finish(
    txn: DatabaseTransaction,
    result: GraphResult<DeleteReport>,
    entity: EntityKind,
    id: &str,
) -> GraphResult<DeleteReport> {
    match result {
        Ok(report) => {
            txn.commit().await?;
            info!("Deleted {} {}: {:?}", entity, id, report);
            Ok(report)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!("Rollback after failed delete also failed: {}", rollback_err);
            }
            debug!("Delete of {} {} refused: {}", entity, id, err);
            Err(err)
        }
    }
}

async fn delete_element_in<C>(conn: &C, element_id: &str, cascade: bool) -> GraphResult<DeleteReport>
where
    C: ConnectionTrait,
{
    let element = store::find_element(conn, element_id).await?;
    let touching = store::relationships_touching(conn, &[element.id.clone()]).await?;
    let referencing: Vec<views::Model> = store::views_by_model(conn, &element.model_id)
        .await?
        .into_iter()
        .filter(|view| view.references(&element.id))
        .collect();

    if !cascade && (!touching.is_empty() || !referencing.is_empty()) {
        return Err(GraphError::conflict(
            EntityKind::Element,
            &element.id,
            format!(
                "referenced by {} relationships and {} views",
                touching.len(),
                referencing.len()
            ),
        ));
    }

    let mut report = DeleteReport::default();

    let relationship_ids: Vec<String> = touching.into_iter().map(|r| r.id).collect();
    report.relationships_removed = store::delete_relationships(conn, &relationship_ids).await?;

    for view in referencing {
        let configuration = views::without_element(&view.configuration, &element.id);
        store::update_view_configuration(conn, view, configuration).await?;
        report.views_updated += 1;
    }

    report.elements_removed = store::delete_element_row(conn, &element.id).await?;
    Ok(report)
}

async fn delete_model_in<C>(conn: &C, model_id: &str, cascade: bool) -> GraphResult<DeleteReport>
where
    C: ConnectionTrait,
{
    let model = store::find_model(conn, model_id).await?;

    if !cascade {
        let elements = store::count_elements(conn, &model.id).await?;
        let relationships = store::count_relationships(conn, &model.id).await?;
        let views = store::count_views(conn, &model.id).await?;
        if elements + relationships + views > 0 {
            return Err(GraphError::conflict(
                EntityKind::Model,
                &model.id,
                format!(
                    "model still has {} elements, {} relationships and {} views",
                    elements, relationships, views
                ),
            ));
        }
    }

    let element_ids: Vec<String> = store::elements_by_model(conn, &model.id)
        .await?
        .into_iter()
        .map(|e| e.id)
        .collect();

    // relationships owned by the model plus any elsewhere pointing into it
    let mut relationship_ids: Vec<String> = store::relationships_by_model(conn, &model.id)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    relationship_ids.extend(
        store::relationships_touching(conn, &element_ids)
            .await?
            .into_iter()
            .map(|r| r.id),
    );
    relationship_ids.sort();
    relationship_ids.dedup();

    let mut report = DeleteReport::default();
    report.relationships_removed = store::delete_relationships(conn, &relationship_ids).await?;
    report.elements_removed = store::delete_elements_by_model(conn, &model.id).await?;
    report.views_removed = store::delete_views_by_model(conn, &model.id).await?;
    report.models_removed = store::delete_model_row(conn, &model.id).await?;

    Ok(report)
}
