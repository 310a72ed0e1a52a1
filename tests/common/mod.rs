#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use eagraph::database::entities::{elements, models, relationships, views};
use eagraph::database::entities::views::ViewKind;
use eagraph::database::{establish_connection, setup_database};
use eagraph::database::seed_data::seed_metamodel;
use eagraph::services::graph_service::{
    ElementCreateRequest, ModelCreateRequest, RelationshipCreateRequest, ViewCreateRequest,
};
use eagraph::services::IdGenerator;
use eagraph::{AppContext, EngineConfig};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

/// File-backed store with schema and default metamodel
pub async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let config = EngineConfig {
        database_url: format!("sqlite://{}?mode=rwc", temp_file.path().display()),
        ..EngineConfig::default()
    };

    let db = establish_connection(&config).await?;
    setup_database(&db).await?;
    seed_metamodel(&db).await?;

    Ok((db, temp_file))
}

pub async fn setup_context() -> Result<(AppContext, NamedTempFile)> {
    let (db, temp_file) = setup_test_db().await?;
    Ok((AppContext::new(db), temp_file))
}

/// M1 = {A, B}, A serves B, V1 shows both
pub struct SampleModel {
    pub model_id: String,
    pub a: String,
    pub b: String,
    pub relationship_id: String,
    pub view_id: String,
}

pub async fn sample_model(ctx: &AppContext) -> Result<SampleModel> {
    let graph = ctx.graph_service();
    let model = graph.create_model(ModelCreateRequest::named("M1")).await?;
    let a = graph
        .create_element(ElementCreateRequest::new(&model.id, "application-component", "A"))
        .await?;
    let b = graph
        .create_element(ElementCreateRequest::new(&model.id, "application-service", "B"))
        .await?;
    let relationship = graph
        .create_relationship(RelationshipCreateRequest::new(&model.id, "serving", &a.id, &b.id))
        .await?;
    let view = graph
        .create_view(ViewCreateRequest {
            model_id: model.id.clone(),
            name: "V1".to_string(),
            description: Some("Application landscape".to_string()),
            kind: ViewKind::Diagram,
            configuration: json!({"elements": [a.id, b.id], "zoom": 1.5}),
        })
        .await?;

    Ok(SampleModel {
        model_id: model.id,
        a: a.id,
        b: b.id,
        relationship_id: relationship.id,
        view_id: view.id,
    })
}

/// Writes a relationship row directly, skipping endpoint validation
pub async fn insert_raw_relationship(
    db: &DatabaseConnection,
    id: &str,
    model_id: &str,
    source: &str,
    target: &str,
) -> Result<relationships::Model> {
    let now = Utc::now();
    Ok(relationships::ActiveModel {
        id: Set(id.to_string()),
        model_id: Set(model_id.to_string()),
        relationship_type_id: Set("flow".to_string()),
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
    .await?)
}

/// Writes a view row directly, skipping reference validation
pub async fn insert_raw_view(
    db: &DatabaseConnection,
    id: &str,
    model_id: &str,
    configuration: Value,
) -> Result<views::Model> {
    let now = Utc::now();
    Ok(views::ActiveModel {
        id: Set(id.to_string()),
        model_id: Set(model_id.to_string()),
        name: Set("Raw".to_string()),
        description: Set(None),
        view_type: Set(ViewKind::List.into()),
        configuration: Set(configuration),
        versioned_from: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

/// Always hands out the same id
pub struct FixedGenerator(pub &'static str);

impl IdGenerator for FixedGenerator {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

pub fn fixed_generator(id: &'static str) -> Arc<dyn IdGenerator> {
    Arc::new(FixedGenerator(id))
}

/// No relationship or view entry of `model_id` points outside the model
pub async fn assert_graph_consistent(ctx: &AppContext, model_id: &str) -> Result<()> {
    let graph = ctx.graph_service().load_graph(model_id).await?;
    let dangling: Vec<&str> = graph
        .dangling_relationships()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert!(dangling.is_empty(), "dangling relationships in {}: {:?}", model_id, dangling);
    let stale = graph.stale_view_references();
    assert!(stale.is_empty(), "stale view references in {}: {:?}", model_id, stale);
    Ok(())
}

/// Every element, relationship and view belongs to a model that exists
pub async fn assert_no_orphan_rows(db: &DatabaseConnection) -> Result<()> {
    let model_ids: std::collections::HashSet<String> = models::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();

    for element in elements::Entity::find().all(db).await? {
        assert!(model_ids.contains(&element.model_id), "orphan element {}", element.id);
    }
    for relationship in relationships::Entity::find().all(db).await? {
        assert!(
            model_ids.contains(&relationship.model_id),
            "orphan relationship {}",
            relationship.id
        );
    }
    for view in views::Entity::find().all(db).await? {
        assert!(model_ids.contains(&view.model_id), "orphan view {}", view.id);
    }
    Ok(())
}

/// A model with `size` elements chained by relationships and one view over all
/// of them, written in a single transaction
pub async fn bulk_model(db: &DatabaseConnection, size: usize) -> Result<String> {
    let now = Utc::now();
    let model_id = format!("bulk-{}", size);
    let txn = db.begin().await?;

    models::ActiveModel {
        id: Set(model_id.clone()),
        name: Set("Bulk".to_string()),
        description: Set(None),
        version: Set("1.0".to_string()),
        lifecycle_state: Set("current".to_string()),
        status: Set("draft".to_string()),
        properties: Set(json!({})),
        versioned_from: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let element_ids: Vec<String> = (0..size).map(|i| format!("{}-e{}", model_id, i)).collect();
    for chunk in element_ids.chunks(100) {
        elements::Entity::insert_many(chunk.iter().map(|id| elements::ActiveModel {
            id: Set(id.clone()),
            model_id: Set(model_id.clone()),
            type_id: Set("node".to_string()),
            name: Set(id.clone()),
            description: Set(None),
            status: Set("draft".to_string()),
            position_x: Set(None),
            position_y: Set(None),
            properties: Set(json!({})),
            external_id: Set(None),
            external_source: Set(None),
            versioned_from: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }))
        .exec(&txn)
        .await?;
    }

    let pairs: Vec<(&String, &String)> = element_ids.iter().zip(element_ids.iter().skip(1)).collect();
    for (index, chunk) in pairs.chunks(100).enumerate() {
        relationships::Entity::insert_many(chunk.iter().enumerate().map(|(offset, (source, target))| {
            relationships::ActiveModel {
                id: Set(format!("{}-r{}", model_id, index * 100 + offset)),
                model_id: Set(model_id.clone()),
                relationship_type_id: Set("flow".to_string()),
                source_element_id: Set((*source).clone()),
                target_element_id: Set((*target).clone()),
                is_directional: Set(true),
                name: Set(None),
                description: Set(None),
                status: Set("draft".to_string()),
                properties: Set(json!({})),
                versioned_from: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
        }))
        .exec(&txn)
        .await?;
    }

    views::ActiveModel {
        id: Set(format!("{}-v", model_id)),
        model_id: Set(model_id.clone()),
        name: Set("Everything".to_string()),
        description: Set(None),
        view_type: Set(ViewKind::Matrix.into()),
        configuration: Set(json!({ "elements": element_ids })),
        versioned_from: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(model_id)
}
