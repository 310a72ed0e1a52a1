use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::database::entities::{
    elements,
    models::{self, LifecycleState, ModelStatus},
    relationships, views,
};
use crate::database::begin_write;
use crate::database::store;
use crate::errors::{GraphError, GraphResult, IntegrityWarning};
use crate::services::identity_remapper::{IdentityMap, IdentityRemapper};
use crate::services::lineage_service::{lineage_members, ModelSummary};
use crate::services::metamodel_service::MetamodelSnapshot;

/// How the target model's metadata is derived from its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneKind {
    /// Independent copy under a new name
    Clone { name: String },
    /// Next version in the source's lineage
    Version { label: String },
    /// New model stamped out of a template model
    Template { name: String },
}

impl CloneKind {
    fn lineage_label(&self, source: &models::Model) -> String {
        match self {
            CloneKind::Clone { .. } => format!("clone of {}", source.name),
            CloneKind::Version { label } => format!("version {} of {}", label, source.name),
            CloneKind::Template { .. } => format!("instance of template {}", source.name),
        }
    }
}

/// Result of a successful clone. Warnings are pre-existing source problems.
#[derive(Debug, Clone, Serialize)]
pub struct CloneOutcome {
    pub model: ModelSummary,
    pub warnings: Vec<IntegrityWarning>,
    pub element_count: usize,
    pub relationship_count: usize,
    pub view_count: usize,
}

impl CloneOutcome {
    pub fn model_id(&self) -> &str {
        &self.model.id
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Human-readable one-liner that keeps warnings distinct from failure
    pub fn summary(&self) -> String {
        let mut text = format!(
            "created model {} with {} elements, {} relationships, {} views",
            self.model.id, self.element_count, self.relationship_count, self.view_count
        );
        if self.has_warnings() {
            let dangling = self
                .warnings
                .iter()
                .filter(|w| matches!(w, IntegrityWarning::DanglingEndpoint { .. }))
                .count();
            let dropped = self
                .warnings
                .iter()
                .filter(|w| matches!(w, IntegrityWarning::DroppedViewReference { .. }))
                .count();
            text.push_str(&format!(
                " ({} warnings: {} skipped relationship endpoints, {} dropped view references)",
                self.warnings.len(),
                dangling,
                dropped
            ));
        }
        text
    }
}

/// Copies a model graph with fresh identities in a single transaction
#[derive(Clone)]
pub struct GraphCloneService {
    db: DatabaseConnection,
    remapper: IdentityRemapper,
}

impl GraphCloneService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_remapper(db, IdentityRemapper::default())
    }

    pub fn with_remapper(db: DatabaseConnection, remapper: IdentityRemapper) -> Self {
        Self { db, remapper }
    }

    pub async fn clone_model(&self, source_model_id: &str, new_name: &str) -> GraphResult<CloneOutcome> {
        self.run(
            source_model_id,
            CloneKind::Clone {
                name: new_name.to_string(),
            },
        )
        .await
    }

    pub async fn create_version(
        &self,
        source_model_id: &str,
        version_label: &str,
    ) -> GraphResult<CloneOutcome> {
        self.run(
            source_model_id,
            CloneKind::Version {
                label: version_label.to_string(),
            },
        )
        .await
    }

    pub async fn instantiate_template(
        &self,
        template_model_id: &str,
        new_name: &str,
    ) -> GraphResult<CloneOutcome> {
        self.run(
            template_model_id,
            CloneKind::Template {
                name: new_name.to_string(),
            },
        )
        .await
    }

    /// Runs the copy in one transaction; any error rolls everything back
    #[instrument(skip(self), fields(source = %source_model_id))]
    pub async fn run(&self, source_model_id: &str, kind: CloneKind) -> GraphResult<CloneOutcome> {
        let txn = begin_write(&self.db).await?;

        match self.copy_graph(&txn, source_model_id, &kind).await {
            Ok(outcome) => {
                txn.commit().await?;
                for warning in &outcome.warnings {
                    warn!("Clone of {}: {}", source_model_id, warning);
                }
                info!(
                    "Cloned model {} into {}: {}",
                    source_model_id,
                    outcome.model.id,
                    outcome.summary()
                );
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!("Rollback after failed clone also failed: {}", rollback_err);
                }
                error!("Clone of model {} failed: {}", source_model_id, err);
                Err(err)
            }
        }
    }

    /// The graph-copy algorithm shared by clone, version and template.
    /// Runs on whatever connection it is given and never commits.
    pub async fn copy_graph<C>(
        &self,
        conn: &C,
        source_model_id: &str,
        kind: &CloneKind,
    ) -> GraphResult<CloneOutcome>
    where
        C: ConnectionTrait,
    {
        let mut warnings = Vec::new();

        let source = store::find_model(conn, source_model_id).await?;
        let metamodel = MetamodelSnapshot::load(conn).await?;

        if let CloneKind::Version { label } = kind {
            for member in lineage_members(conn, source.clone()).await? {
                if &member.version == label {
                    warnings.push(IntegrityWarning::DuplicateVersionLabel {
                        label: label.clone(),
                        existing_model_id: member.id,
                    });
                }
            }
        }

        let target = self.insert_target_model(conn, &source, kind).await?;

        let source_elements = store::elements_by_model(conn, &source.id).await?;
        let source_ids: Vec<String> = source_elements.iter().map(|e| e.id.clone()).collect();
        let identity_map = self.remapper.build(&source_ids, &HashSet::new())?;
        debug!("Identity map built for {} elements", identity_map.len());

        for element in &source_elements {
            if !metamodel.has_element_type(&element.type_id) {
                warnings.push(IntegrityWarning::UnknownElementType {
                    element_id: element.id.clone(),
                    type_id: element.type_id.clone(),
                });
            }
            copy_element(conn, element, &target.id, &identity_map).await?;
        }

        let source_relationships = store::relationships_by_model(conn, &source.id).await?;
        let reserved: HashSet<String> = source_relationships.iter().map(|r| r.id.clone()).collect();
        let mut relationship_count = 0;
        for relationship in &source_relationships {
            let source_end = identity_map.get(&relationship.source_element_id);
            let target_end = identity_map.get(&relationship.target_element_id);
            let (Some(source_end), Some(target_end)) = (source_end, target_end) else {
                for (endpoint, mapped) in [
                    (&relationship.source_element_id, source_end),
                    (&relationship.target_element_id, target_end),
                ] {
                    if mapped.is_none() {
                        warnings.push(IntegrityWarning::DanglingEndpoint {
                            relationship_id: relationship.id.clone(),
                            missing_element_id: endpoint.clone(),
                        });
                    }
                }
                continue;
            };

            let is_directional = match metamodel.relationship_direction(&relationship.relationship_type_id) {
                Some(directional) => directional,
                None => {
                    warnings.push(IntegrityWarning::UnknownRelationshipType {
                        relationship_id: relationship.id.clone(),
                        relationship_type_id: relationship.relationship_type_id.clone(),
                    });
                    relationship.is_directional
                }
            };

            let now = Utc::now();
            relationships::ActiveModel {
                id: Set(self.remapper.allocate(&reserved)?),
                model_id: Set(target.id.clone()),
                relationship_type_id: Set(relationship.relationship_type_id.clone()),
                source_element_id: Set(source_end.to_string()),
                target_element_id: Set(target_end.to_string()),
                is_directional: Set(is_directional),
                name: Set(relationship.name.clone()),
                description: Set(relationship.description.clone()),
                status: Set(relationship.status.clone()),
                properties: Set(relationship.properties.clone()),
                versioned_from: Set(Some(relationship.id.clone())),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await?;
            relationship_count += 1;
        }

        let source_views = store::views_by_model(conn, &source.id).await?;
        let reserved: HashSet<String> = source_views.iter().map(|v| v.id.clone()).collect();
        for view in &source_views {
            let configuration = match views::element_entries(&view.configuration) {
                Some(entries) => {
                    let mut element_ids = Vec::with_capacity(entries.len());
                    let mut malformed = Vec::new();
                    for entry in entries {
                        match entry.as_str() {
                            Some(id) => element_ids.push(id.to_string()),
                            None => malformed.push(entry.to_string()),
                        }
                    }

                    let (mapped, unmapped) = identity_map.rewrite(&element_ids);
                    for element_id in unmapped.into_iter().chain(malformed) {
                        warnings.push(IntegrityWarning::DroppedViewReference {
                            view_id: view.id.clone(),
                            element_id,
                        });
                    }
                    views::with_elements(&view.configuration, mapped)
                }
                None => view.configuration.clone(),
            };

            let now = Utc::now();
            views::ActiveModel {
                id: Set(self.remapper.allocate(&reserved)?),
                model_id: Set(target.id.clone()),
                name: Set(view.name.clone()),
                description: Set(view.description.clone()),
                view_type: Set(view.view_type.clone()),
                configuration: Set(configuration),
                versioned_from: Set(Some(view.id.clone())),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await?;
        }

        debug!(
            "Copied {} elements, {} relationships, {} views into {}",
            source_elements.len(),
            relationship_count,
            source_views.len(),
            target.id
        );

        Ok(CloneOutcome {
            model: ModelSummary::from(&target),
            warnings,
            element_count: source_elements.len(),
            relationship_count,
            view_count: source_views.len(),
        })
    }

    async fn insert_target_model<C>(
        &self,
        conn: &C,
        source: &models::Model,
        kind: &CloneKind,
    ) -> GraphResult<models::Model>
    where
        C: ConnectionTrait,
    {
        let mut properties = match &source.properties {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        properties.insert("lineage_label".to_string(), json!(kind.lineage_label(source)));

        let (name, version, description, lifecycle_state) = match kind {
            CloneKind::Clone { name } => (
                name.clone(),
                source.version.clone(),
                source.description.clone(),
                source.lifecycle_state.clone(),
            ),
            CloneKind::Version { label } => {
                let description = format!("Version {} of {}", label, source.name);
                properties.insert("version_description".to_string(), json!(description));
                (
                    source.name.clone(),
                    label.clone(),
                    Some(description),
                    source.lifecycle_state.clone(),
                )
            }
            CloneKind::Template { name } => {
                properties.insert("instantiated_from_template".to_string(), json!(source.id));
                (
                    name.clone(),
                    "1.0".to_string(),
                    source.description.clone(),
                    LifecycleState::Current.into(),
                )
            }
        };

        let reserved = HashSet::from([source.id.clone()]);
        let now = Utc::now();
        let model = models::ActiveModel {
            id: Set(self.remapper.allocate(&reserved)?),
            name: Set(name),
            description: Set(description),
            version: Set(version),
            lifecycle_state: Set(lifecycle_state),
            // a copy is never born approved
            status: Set(ModelStatus::Draft.into()),
            properties: Set(Value::Object(properties)),
            versioned_from: Set(Some(source.id.clone())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?;

        Ok(model)
    }
}

async fn copy_element<C>(
    conn: &C,
    element: &elements::Model,
    target_model_id: &str,
    identity_map: &IdentityMap,
) -> GraphResult<elements::Model>
where
    C: ConnectionTrait,
{
    let new_id = identity_map.get(&element.id).ok_or_else(|| {
        GraphError::InvalidReference(format!("element {} missing from identity map", element.id))
    })?;

    let now = Utc::now();
    let copy = elements::ActiveModel {
        id: Set(new_id.to_string()),
        model_id: Set(target_model_id.to_string()),
        type_id: Set(element.type_id.clone()),
        name: Set(element.name.clone()),
        description: Set(element.description.clone()),
        status: Set(element.status.clone()),
        position_x: Set(element.position_x),
        position_y: Set(element.position_y),
        properties: Set(element.properties.clone()),
        external_id: Set(element.external_id.clone()),
        external_source: Set(element.external_source.clone()),
        versioned_from: Set(Some(element.id.clone())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    Ok(copy)
}
