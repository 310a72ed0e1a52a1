use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::database::entities::{
    elements,
    models::{self, LifecycleState, ModelStatus},
    relationships,
    views::{self, ViewKind},
};
use crate::database::begin_write;
use crate::database::store;
use crate::errors::{EntityKind, GraphError, GraphResult};
use crate::services::identity_remapper::{IdGenerator, UuidGenerator};
use crate::services::metamodel_service::MetamodelSnapshot;

#[derive(Clone, Debug)]
pub struct ModelCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub lifecycle_state: LifecycleState,
    pub status: ModelStatus,
    pub properties: serde_json::Value,
}

impl ModelCreateRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            version: None,
            lifecycle_state: LifecycleState::Current,
            status: ModelStatus::Draft,
            properties: json!({}),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ElementCreateRequest {
    pub model_id: String,
    pub type_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub position: Option<(f64, f64)>,
    pub properties: serde_json::Value,
    pub external_id: Option<String>,
    pub external_source: Option<String>,
}

impl ElementCreateRequest {
    pub fn new(model_id: impl Into<String>, type_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            type_id: type_id.into(),
            name: name.into(),
            description: None,
            status: None,
            position: None,
            properties: json!({}),
            external_id: None,
            external_source: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RelationshipCreateRequest {
    pub model_id: String,
    pub relationship_type_id: String,
    pub source_element_id: String,
    pub target_element_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub properties: serde_json::Value,
}

impl RelationshipCreateRequest {
    pub fn new(
        model_id: impl Into<String>,
        relationship_type_id: impl Into<String>,
        source_element_id: impl Into<String>,
        target_element_id: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            relationship_type_id: relationship_type_id.into(),
            source_element_id: source_element_id.into(),
            target_element_id: target_element_id.into(),
            name: None,
            description: None,
            status: None,
            properties: json!({}),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViewCreateRequest {
    pub model_id: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: ViewKind,
    pub configuration: serde_json::Value,
}

/// Full contents of one model
#[derive(Debug, Clone, Serialize)]
pub struct ModelGraph {
    pub model: models::Model,
    pub elements: Vec<elements::Model>,
    pub relationships: Vec<relationships::Model>,
    pub views: Vec<views::Model>,
}

impl ModelGraph {
    /// Relationships whose endpoints are not both elements of this model
    pub fn dangling_relationships(&self) -> Vec<&relationships::Model> {
        let ids: HashSet<&str> = self.elements.iter().map(|e| e.id.as_str()).collect();
        self.relationships
            .iter()
            .filter(|r| {
                !ids.contains(r.source_element_id.as_str())
                    || !ids.contains(r.target_element_id.as_str())
            })
            .collect()
    }

    /// (view id, entry) pairs where a view entry names no element of this
    /// model. Entries that are not strings are reported in their JSON form.
    pub fn stale_view_references(&self) -> Vec<(String, String)> {
        let ids: HashSet<&str> = self.elements.iter().map(|e| e.id.as_str()).collect();
        let mut stale = Vec::new();
        for view in &self.views {
            for entry in views::element_entries(&view.configuration).into_iter().flatten() {
                match entry.as_str() {
                    Some(element_id) if ids.contains(element_id) => {}
                    Some(element_id) => stale.push((view.id.clone(), element_id.to_string())),
                    None => stale.push((view.id.clone(), entry.to_string())),
                }
            }
        }
        stale
    }
}

/// Plain creation and read access. Deletes go through the cascade delete service.
#[derive(Clone)]
pub struct GraphService {
    db: DatabaseConnection,
    ids: Arc<dyn IdGenerator>,
}

impl GraphService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_generator(db, Arc::new(UuidGenerator))
    }

    pub fn with_generator(db: DatabaseConnection, ids: Arc<dyn IdGenerator>) -> Self {
        Self { db, ids }
    }

    pub async fn get_model(&self, id: &str) -> GraphResult<models::Model> {
        store::find_model(&self.db, id).await
    }

    pub async fn get_element(&self, id: &str) -> GraphResult<elements::Model> {
        store::find_element(&self.db, id).await
    }

    pub async fn get_view(&self, id: &str) -> GraphResult<views::Model> {
        store::find_view(&self.db, id).await
    }

    /// Read a model with all of its rows from one consistent snapshot
    pub async fn load_graph(&self, model_id: &str) -> GraphResult<ModelGraph> {
        let txn = self.db.begin().await?;
        let model = store::find_model(&txn, model_id).await?;
        let elements = store::elements_by_model(&txn, model_id).await?;
        let relationships = store::relationships_by_model(&txn, model_id).await?;
        let views = store::views_by_model(&txn, model_id).await?;
        txn.commit().await?;

        Ok(ModelGraph {
            model,
            elements,
            relationships,
            views,
        })
    }

    /// Relationships in any model that use `element_id` as an endpoint
    pub async fn relationships_for_element(
        &self,
        element_id: &str,
    ) -> GraphResult<Vec<relationships::Model>> {
        store::relationships_touching(&self.db, &[element_id.to_string()]).await
    }

    pub async fn create_model(&self, request: ModelCreateRequest) -> GraphResult<models::Model> {
        let now = Utc::now();
        let model = models::ActiveModel {
            id: Set(self.ids.generate()),
            name: Set(request.name),
            description: Set(request.description),
            version: Set(request.version.unwrap_or_else(|| "1.0".to_string())),
            lifecycle_state: Set(request.lifecycle_state.into()),
            status: Set(request.status.into()),
            properties: Set(request.properties),
            versioned_from: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        debug!("Created model {} ({})", model.name, model.id);
        Ok(model)
    }

    pub async fn create_element(&self, request: ElementCreateRequest) -> GraphResult<elements::Model> {
        let txn = begin_write(&self.db).await?;
        store::find_model(&txn, &request.model_id).await?;

        let metamodel = MetamodelSnapshot::load(&txn).await?;
        if !metamodel.has_element_type(&request.type_id) {
            return Err(GraphError::not_found(EntityKind::ElementType, request.type_id));
        }

        let now = Utc::now();
        let (position_x, position_y) = match request.position {
            Some((x, y)) => (Some(x), Some(y)),
            None => (None, None),
        };
        let element = elements::ActiveModel {
            id: Set(self.ids.generate()),
            model_id: Set(request.model_id),
            type_id: Set(request.type_id),
            name: Set(request.name),
            description: Set(request.description),
            status: Set(request.status.unwrap_or_else(|| "draft".to_string())),
            position_x: Set(position_x),
            position_y: Set(position_y),
            properties: Set(request.properties),
            external_id: Set(request.external_id),
            external_source: Set(request.external_source),
            versioned_from: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(element)
    }

    /// Both endpoints must already be elements of the relationship's model
    pub async fn create_relationship(
        &self,
        request: RelationshipCreateRequest,
    ) -> GraphResult<relationships::Model> {
        let txn = begin_write(&self.db).await?;
        store::find_model(&txn, &request.model_id).await?;

        for endpoint in [&request.source_element_id, &request.target_element_id] {
            let element = store::find_element(&txn, endpoint).await?;
            if element.model_id != request.model_id {
                return Err(GraphError::InvalidReference(format!(
                    "element {} belongs to model {}, not {}",
                    element.id, element.model_id, request.model_id
                )));
            }
        }

        let metamodel = MetamodelSnapshot::load(&txn).await?;
        let is_directional = metamodel
            .relationship_direction(&request.relationship_type_id)
            .ok_or_else(|| {
                GraphError::not_found(
                    EntityKind::RelationshipType,
                    request.relationship_type_id.clone(),
                )
            })?;

        let now = Utc::now();
        let relationship = relationships::ActiveModel {
            id: Set(self.ids.generate()),
            model_id: Set(request.model_id),
            relationship_type_id: Set(request.relationship_type_id),
            source_element_id: Set(request.source_element_id),
            target_element_id: Set(request.target_element_id),
            is_directional: Set(is_directional),
            name: Set(request.name),
            description: Set(request.description),
            status: Set(request.status.unwrap_or_else(|| "draft".to_string())),
            properties: Set(request.properties),
            versioned_from: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(relationship)
    }

    /// Every element id in the configuration must belong to the view's model
    pub async fn create_view(&self, request: ViewCreateRequest) -> GraphResult<views::Model> {
        let txn = begin_write(&self.db).await?;
        store::find_model(&txn, &request.model_id).await?;

        if let Some(entries) = views::element_entries(&request.configuration) {
            for entry in entries {
                let element_id = entry.as_str().ok_or_else(|| {
                    GraphError::InvalidReference(format!("view element entry {} is not an id", entry))
                })?;
                let element = store::find_element(&txn, element_id).await?;
                if element.model_id != request.model_id {
                    return Err(GraphError::InvalidReference(format!(
                        "view references element {} from model {}",
                        element.id, element.model_id
                    )));
                }
            }
        }

        let now = Utc::now();
        let view = views::ActiveModel {
            id: Set(self.ids.generate()),
            model_id: Set(request.model_id),
            name: Set(request.name),
            description: Set(request.description),
            view_type: Set(request.kind.into()),
            configuration: Set(request.configuration),
            versioned_from: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::seed_data::seed_metamodel;
    use crate::database::test_utils::setup_test_db;

    async fn service() -> GraphService {
        let db = setup_test_db().await;
        seed_metamodel(&db).await.unwrap();
        GraphService::new(db)
    }

    #[tokio::test]
    async fn test_relationship_inherits_direction_from_type() {
        let service = service().await;
        let model = service.create_model(ModelCreateRequest::named("M")).await.unwrap();
        let a = service
            .create_element(ElementCreateRequest::new(&model.id, "node", "A"))
            .await
            .unwrap();
        let b = service
            .create_element(ElementCreateRequest::new(&model.id, "node", "B"))
            .await
            .unwrap();

        let rel = service
            .create_relationship(RelationshipCreateRequest::new(
                &model.id,
                "association",
                &a.id,
                &b.id,
            ))
            .await
            .unwrap();
        assert!(!rel.is_directional);
    }

    #[tokio::test]
    async fn test_cross_model_relationship_is_rejected() {
        let service = service().await;
        let m1 = service.create_model(ModelCreateRequest::named("M1")).await.unwrap();
        let m2 = service.create_model(ModelCreateRequest::named("M2")).await.unwrap();
        let a = service
            .create_element(ElementCreateRequest::new(&m1.id, "node", "A"))
            .await
            .unwrap();
        let b = service
            .create_element(ElementCreateRequest::new(&m2.id, "node", "B"))
            .await
            .unwrap();

        let err = service
            .create_relationship(RelationshipCreateRequest::new(&m1.id, "serving", &a.id, &b.id))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidReference(_)));
        assert!(service.load_graph(&m1.id).await.unwrap().relationships.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_element_type_is_rejected() {
        let service = service().await;
        let model = service.create_model(ModelCreateRequest::named("M")).await.unwrap();
        let err = service
            .create_element(ElementCreateRequest::new(&model.id, "spaceship", "A"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_view_with_foreign_element_is_rejected() {
        let service = service().await;
        let m1 = service.create_model(ModelCreateRequest::named("M1")).await.unwrap();
        let m2 = service.create_model(ModelCreateRequest::named("M2")).await.unwrap();
        let foreign = service
            .create_element(ElementCreateRequest::new(&m2.id, "node", "X"))
            .await
            .unwrap();

        let err = service
            .create_view(ViewCreateRequest {
                model_id: m1.id.clone(),
                name: "V".to_string(),
                description: None,
                kind: ViewKind::Diagram,
                configuration: json!({ "elements": [foreign.id] }),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_view_with_non_string_entry_is_rejected() {
        let service = service().await;
        let model = service.create_model(ModelCreateRequest::named("M")).await.unwrap();
        let a = service
            .create_element(ElementCreateRequest::new(&model.id, "node", "A"))
            .await
            .unwrap();

        let err = service
            .create_view(ViewCreateRequest {
                model_id: model.id.clone(),
                name: "V".to_string(),
                description: None,
                kind: ViewKind::List,
                configuration: json!({ "elements": [a.id, 42] }),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidReference(_)));
        assert!(service.load_graph(&model.id).await.unwrap().views.is_empty());
    }
}
