use std::collections::{HashMap, HashSet};

use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder};

use crate::database::entities::{domains, element_types, relationship_types};
use crate::database::store;
use crate::errors::GraphResult;

/// Point-in-time view of the type definitions, read inside the caller's transaction
#[derive(Debug, Clone, Default)]
pub struct MetamodelSnapshot {
    element_types: HashSet<String>,
    relationship_types: HashMap<String, bool>,
}

impl MetamodelSnapshot {
    pub async fn load<C>(conn: &C) -> GraphResult<Self>
    where
        C: ConnectionTrait,
    {
        Ok(Self {
            element_types: store::element_type_ids(conn).await?,
            relationship_types: store::relationship_type_directions(conn).await?,
        })
    }

    pub fn has_element_type(&self, type_id: &str) -> bool {
        self.element_types.contains(type_id)
    }

    /// Directional flag defined by the relationship type, if the type still exists
    pub fn relationship_direction(&self, type_id: &str) -> Option<bool> {
        self.relationship_types.get(type_id).copied()
    }
}

/// Read-only access to domains, element types and relationship types
#[derive(Clone)]
pub struct MetamodelService {
    db: DatabaseConnection,
}

impl MetamodelService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn snapshot(&self) -> GraphResult<MetamodelSnapshot> {
        MetamodelSnapshot::load(&self.db).await
    }

    pub async fn list_domains(&self) -> GraphResult<Vec<domains::Model>> {
        Ok(domains::Entity::find()
            .order_by_asc(domains::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn list_element_types(&self) -> GraphResult<Vec<element_types::Model>> {
        Ok(element_types::Entity::find()
            .order_by_asc(element_types::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn list_relationship_types(&self) -> GraphResult<Vec<relationship_types::Model>> {
        Ok(relationship_types::Entity::find()
            .order_by_asc(relationship_types::Column::Name)
            .all(&self.db)
            .await?)
    }
}
