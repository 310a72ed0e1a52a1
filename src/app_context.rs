use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::EngineConfig;
use crate::database::{establish_connection, setup_database};
use crate::errors::{GraphError, GraphResult};
use crate::services::{
    CascadeDeleteService, CloneOutcome, DeleteReport, GraphCloneService, GraphService,
    IdGenerator, IdentityRemapper, LineageService, MetamodelService, ModelSummary, UuidGenerator,
};

/// Shared context exposing the engine operations to the CLI and embedders.
///
/// Every mutating call runs under the configured deadline. A call that runs
/// past it is dropped mid-flight, which drops its open transaction and rolls
/// the store back.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    timeout: Duration,
    graph_service: Arc<GraphService>,
    clone_service: Arc<GraphCloneService>,
    delete_service: Arc<CascadeDeleteService>,
    lineage_service: Arc<LineageService>,
    metamodel_service: Arc<MetamodelService>,
}

impl AppContext {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_generator(db, Arc::new(UuidGenerator), 8)
    }

    pub fn with_generator(
        db: DatabaseConnection,
        generator: Arc<dyn IdGenerator>,
        max_allocation_attempts: usize,
    ) -> Self {
        let remapper = IdentityRemapper::new(generator.clone(), max_allocation_attempts);

        Self {
            graph_service: Arc::new(GraphService::with_generator(db.clone(), generator)),
            clone_service: Arc::new(GraphCloneService::with_remapper(db.clone(), remapper)),
            delete_service: Arc::new(CascadeDeleteService::new(db.clone())),
            lineage_service: Arc::new(LineageService::new(db.clone())),
            metamodel_service: Arc::new(MetamodelService::new(db.clone())),
            timeout: EngineConfig::default().operation_timeout(),
            db,
        }
    }

    /// Connect, migrate and wire services from a loaded config
    pub async fn from_config(config: &EngineConfig) -> Result<Self> {
        let db = establish_connection(config).await?;
        setup_database(&db).await?;
        Ok(Self::with_generator(
            db,
            Arc::new(UuidGenerator),
            config.max_allocation_attempts,
        )
        .with_timeout(config.operation_timeout()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn graph_service(&self) -> Arc<GraphService> {
        self.graph_service.clone()
    }

    pub fn metamodel_service(&self) -> Arc<MetamodelService> {
        self.metamodel_service.clone()
    }

    pub fn lineage_service(&self) -> Arc<LineageService> {
        self.lineage_service.clone()
    }

    pub async fn clone_model(&self, source_model_id: &str, new_name: &str) -> GraphResult<CloneOutcome> {
        self.bounded(self.clone_service.clone_model(source_model_id, new_name))
            .await
    }

    pub async fn create_version(
        &self,
        source_model_id: &str,
        version_label: &str,
    ) -> GraphResult<CloneOutcome> {
        self.bounded(self.clone_service.create_version(source_model_id, version_label))
            .await
    }

    pub async fn instantiate_template(
        &self,
        template_model_id: &str,
        new_name: &str,
    ) -> GraphResult<CloneOutcome> {
        self.bounded(
            self.clone_service
                .instantiate_template(template_model_id, new_name),
        )
        .await
    }

    pub async fn delete_element(&self, element_id: &str, cascade: bool) -> GraphResult<DeleteReport> {
        self.bounded(self.delete_service.delete_element(element_id, cascade))
            .await
    }

    pub async fn delete_model(&self, model_id: &str, cascade: bool) -> GraphResult<DeleteReport> {
        self.bounded(self.delete_service.delete_model(model_id, cascade))
            .await
    }

    pub async fn delete_relationship(&self, relationship_id: &str) -> GraphResult<DeleteReport> {
        self.bounded(self.delete_service.delete_relationship(relationship_id))
            .await
    }

    pub async fn delete_view(&self, view_id: &str) -> GraphResult<DeleteReport> {
        self.bounded(self.delete_service.delete_view(view_id)).await
    }

    pub async fn history(&self, model_id: &str) -> GraphResult<Vec<ModelSummary>> {
        self.bounded(self.lineage_service.history(model_id)).await
    }

    pub async fn descendants(&self, model_id: &str) -> GraphResult<Vec<ModelSummary>> {
        self.bounded(self.lineage_service.descendants(model_id))
            .await
    }

    async fn bounded<T, F>(&self, operation: F) -> GraphResult<T>
    where
        F: Future<Output = GraphResult<T>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Operation exceeded {:?}, transaction rolled back", self.timeout);
                Err(GraphError::Timeout(self.timeout))
            }
        }
    }
}
