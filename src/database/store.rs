//! Row-level access to the model graph tables.
//!
//! Every helper is generic over [`ConnectionTrait`] so callers decide whether
//! it runs on the pool or inside an open transaction. Graph-level rules live in
//! the services; this module only reads and writes rows.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::database::entities::{
    element_types, elements, models, relationship_types, relationships, views,
};
use crate::errors::{EntityKind, GraphError, GraphResult};

/// Upper bound on ids bound into a single `IN (...)` clause
const ID_BATCH_SIZE: usize = 500;

pub async fn find_model<C>(conn: &C, id: &str) -> GraphResult<models::Model>
where
    C: ConnectionTrait,
{
    models::Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| GraphError::not_found(EntityKind::Model, id))
}

pub async fn find_model_opt<C>(conn: &C, id: &str) -> GraphResult<Option<models::Model>>
where
    C: ConnectionTrait,
{
    Ok(models::Entity::find_by_id(id.to_string()).one(conn).await?)
}

/// Models whose lineage pointer names `parent_id`, oldest first
pub async fn models_versioned_from<C>(conn: &C, parent_id: &str) -> GraphResult<Vec<models::Model>>
where
    C: ConnectionTrait,
{
    Ok(models::Entity::find()
        .filter(models::Column::VersionedFrom.eq(parent_id))
        .order_by_asc(models::Column::CreatedAt)
        .order_by_asc(models::Column::Id)
        .all(conn)
        .await?)
}

pub async fn find_element<C>(conn: &C, id: &str) -> GraphResult<elements::Model>
where
    C: ConnectionTrait,
{
    elements::Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| GraphError::not_found(EntityKind::Element, id))
}

pub async fn elements_by_model<C>(conn: &C, model_id: &str) -> GraphResult<Vec<elements::Model>>
where
    C: ConnectionTrait,
{
    Ok(elements::Entity::find()
        .filter(elements::Column::ModelId.eq(model_id))
        .order_by_asc(elements::Column::CreatedAt)
        .order_by_asc(elements::Column::Id)
        .all(conn)
        .await?)
}

pub async fn count_elements<C>(conn: &C, model_id: &str) -> GraphResult<u64>
where
    C: ConnectionTrait,
{
    Ok(elements::Entity::find()
        .filter(elements::Column::ModelId.eq(model_id))
        .count(conn)
        .await?)
}

pub async fn find_relationship<C>(conn: &C, id: &str) -> GraphResult<relationships::Model>
where
    C: ConnectionTrait,
{
    relationships::Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| GraphError::not_found(EntityKind::Relationship, id))
}

pub async fn relationships_by_model<C>(
    conn: &C,
    model_id: &str,
) -> GraphResult<Vec<relationships::Model>>
where
    C: ConnectionTrait,
{
    Ok(relationships::Entity::find()
        .filter(relationships::Column::ModelId.eq(model_id))
        .order_by_asc(relationships::Column::CreatedAt)
        .order_by_asc(relationships::Column::Id)
        .all(conn)
        .await?)
}

pub async fn count_relationships<C>(conn: &C, model_id: &str) -> GraphResult<u64>
where
    C: ConnectionTrait,
{
    Ok(relationships::Entity::find()
        .filter(relationships::Column::ModelId.eq(model_id))
        .count(conn)
        .await?)
}

/// Relationships in any model that use one of `element_ids` as source or target
pub async fn relationships_touching<C>(
    conn: &C,
    element_ids: &[String],
) -> GraphResult<Vec<relationships::Model>>
where
    C: ConnectionTrait,
{
    let mut found: HashMap<String, relationships::Model> = HashMap::new();
    for batch in element_ids.chunks(ID_BATCH_SIZE) {
        let rows = relationships::Entity::find()
            .filter(
                Condition::any()
                    .add(relationships::Column::SourceElementId.is_in(batch.iter().cloned()))
                    .add(relationships::Column::TargetElementId.is_in(batch.iter().cloned())),
            )
            .all(conn)
            .await?;
        for row in rows {
            found.insert(row.id.clone(), row);
        }
    }

    let mut rows: Vec<_> = found.into_values().collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(rows)
}

pub async fn find_view<C>(conn: &C, id: &str) -> GraphResult<views::Model>
where
    C: ConnectionTrait,
{
    views::Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| GraphError::not_found(EntityKind::View, id))
}

pub async fn views_by_model<C>(conn: &C, model_id: &str) -> GraphResult<Vec<views::Model>>
where
    C: ConnectionTrait,
{
    Ok(views::Entity::find()
        .filter(views::Column::ModelId.eq(model_id))
        .order_by_asc(views::Column::CreatedAt)
        .order_by_asc(views::Column::Id)
        .all(conn)
        .await?)
}

pub async fn count_views<C>(conn: &C, model_id: &str) -> GraphResult<u64>
where
    C: ConnectionTrait,
{
    Ok(views::Entity::find()
        .filter(views::Column::ModelId.eq(model_id))
        .count(conn)
        .await?)
}

pub async fn update_view_configuration<C>(
    conn: &C,
    view: views::Model,
    configuration: serde_json::Value,
) -> GraphResult<views::Model>
where
    C: ConnectionTrait,
{
    let mut active: views::ActiveModel = view.into();
    active.configuration = Set(configuration);
    active.updated_at = Set(chrono::Utc::now());
    Ok(active.update(conn).await?)
}

/// Delete relationships by id, returning how many rows went away
pub async fn delete_relationships<C>(conn: &C, ids: &[String]) -> GraphResult<u64>
where
    C: ConnectionTrait,
{
    let mut removed = 0;
    for batch in ids.chunks(ID_BATCH_SIZE) {
        let result = relationships::Entity::delete_many()
            .filter(relationships::Column::Id.is_in(batch.iter().cloned()))
            .exec(conn)
            .await?;
        removed += result.rows_affected;
    }
    Ok(removed)
}

pub async fn delete_elements_by_model<C>(conn: &C, model_id: &str) -> GraphResult<u64>
where
    C: ConnectionTrait,
{
    let result = elements::Entity::delete_many()
        .filter(elements::Column::ModelId.eq(model_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn delete_views_by_model<C>(conn: &C, model_id: &str) -> GraphResult<u64>
where
    C: ConnectionTrait,
{
    let result = views::Entity::delete_many()
        .filter(views::Column::ModelId.eq(model_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn delete_element_row<C>(conn: &C, id: &str) -> GraphResult<u64>
where
    C: ConnectionTrait,
{
    let result = elements::Entity::delete_by_id(id.to_string())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn delete_view_row<C>(conn: &C, id: &str) -> GraphResult<u64>
where
    C: ConnectionTrait,
{
    let result = views::Entity::delete_by_id(id.to_string()).exec(conn).await?;
    Ok(result.rows_affected)
}

pub async fn delete_model_row<C>(conn: &C, id: &str) -> GraphResult<u64>
where
    C: ConnectionTrait,
{
    let result = models::Entity::delete_by_id(id.to_string()).exec(conn).await?;
    Ok(result.rows_affected)
}

pub async fn element_type_ids<C>(conn: &C) -> GraphResult<HashSet<String>>
where
    C: ConnectionTrait,
{
    Ok(element_types::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|element_type| element_type.id)
        .collect())
}

/// Relationship type id to its directional flag
pub async fn relationship_type_directions<C>(conn: &C) -> GraphResult<HashMap<String, bool>>
where
    C: ConnectionTrait,
{
    Ok(relationship_types::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|relationship_type| (relationship_type.id, relationship_type.directional))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;
    use chrono::Utc;
    use serde_json::json;

    async fn insert_model(db: &sea_orm::DatabaseConnection, id: &str) {
        let now = Utc::now();
        models::ActiveModel {
            id: Set(id.to_string()),
            name: Set(format!("Model {}", id)),
            description: Set(None),
            version: Set("1.0".to_string()),
            lifecycle_state: Set("current".to_string()),
            status: Set("draft".to_string()),
            properties: Set(json!({})),
            versioned_from: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .unwrap();
    }

    async fn insert_relationship(
        db: &sea_orm::DatabaseConnection,
        id: &str,
        model_id: &str,
        source: &str,
        target: &str,
    ) {
        let now = Utc::now();
        relationships::ActiveModel {
            id: Set(id.to_string()),
            model_id: Set(model_id.to_string()),
            relationship_type_id: Set("serves".to_string()),
            source_element_id: Set(source.to_string()),
            target_element_id: Set(target.to_string()),
            is_directional: Set(true),
            name: Set(None),
            description: Set(None),
            status: Set("draft".to_string()),
            properties: Set(json!({})),
            versioned_from: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_find_model_reports_not_found() {
        let db = setup_test_db().await;
        let err = find_model(&db, "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_relationships_touching_matches_either_endpoint_once() {
        let db = setup_test_db().await;
        insert_model(&db, "m1").await;
        insert_relationship(&db, "r1", "m1", "a", "b").await;
        insert_relationship(&db, "r2", "m1", "b", "c").await;
        insert_relationship(&db, "r3", "m1", "c", "d").await;

        let touching = relationships_touching(&db, &["b".to_string()]).await.unwrap();
        let ids: Vec<_> = touching.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);

        let touching = relationships_touching(&db, &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(touching.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_relationships_counts_rows() {
        let db = setup_test_db().await;
        insert_model(&db, "m1").await;
        insert_relationship(&db, "r1", "m1", "a", "b").await;
        insert_relationship(&db, "r2", "m1", "b", "c").await;

        let removed = delete_relationships(&db, &["r1".to_string(), "zzz".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(count_relationships(&db, "m1").await.unwrap(), 1);
    }
}
