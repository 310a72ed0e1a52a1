use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ea_elements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub model_id: String,
    pub type_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub properties: Json,
    pub external_id: Option<String>,
    pub external_source: Option<String>,
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
        belongs_to = "super::element_types::Entity",
        from = "Column::TypeId",
        to = "super::element_types::Column::Id"
    )]
    ElementTypes,
}

impl Related<super::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Models.def()
    }
}

impl Related<super::element_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ElementTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.position_x, self.position_y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }
}
