use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ea_domains")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::element_types::Entity")]
    ElementTypes,
}

impl Related<super::element_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ElementTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
