use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ea_relationships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub model_id: String,
    pub relationship_type_id: String,
    pub source_element_id: String,
    pub target_element_id: String,
    pub is_directional: bool,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub properties: Json,
    pub versioned_from: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::models::Entity",
        from = "Column::ModelId",
        to = "super::models::Column::Id"
    )]
    Models,
    #[sea_orm(
        belongs_to = "super::relationship_types::Entity",
        from = "Column::RelationshipTypeId",
        to = "super::relationship_types::Column::Id"
    )]
    RelationshipTypes,
}

impl Related<super::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Models.def()
    }
}

impl Related<super::relationship_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RelationshipTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn touches(&self, element_id: &str) -> bool {
        self.source_element_id == element_id || self.target_element_id == element_id
    }
}
