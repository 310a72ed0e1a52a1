use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ea_models")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub lifecycle_state: String,
    pub status: String,
    pub properties: Json,
    pub versioned_from: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::elements::Entity")]
    Elements,
    #[sea_orm(has_many = "super::relationships::Entity")]
    Relationships,
    #[sea_orm(has_many = "super::views::Entity")]
    Views,
}

impl Related<super::elements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Elements.def()
    }
}

impl Related<super::relationships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Relationships.def()
    }
}

impl Related<super::views::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Views.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Current,
    Target,
    Transitional,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Current => "current",
            LifecycleState::Target => "target",
            LifecycleState::Transitional => "transitional",
        }
    }
}

impl From<LifecycleState> for String {
    fn from(state: LifecycleState) -> Self {
        state.as_str().to_string()
    }
}

impl From<String> for LifecycleState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "target" => LifecycleState::Target,
            "transitional" => LifecycleState::Transitional,
            _ => LifecycleState::Current,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Draft,
    Review,
    Approved,
    Archived,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Draft => "draft",
            ModelStatus::Review => "review",
            ModelStatus::Approved => "approved",
            ModelStatus::Archived => "archived",
        }
    }
}

impl From<ModelStatus> for String {
    fn from(status: ModelStatus) -> Self {
        status.as_str().to_string()
    }
}

impl From<String> for ModelStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "review" => ModelStatus::Review,
            "approved" => ModelStatus::Approved,
            "archived" => ModelStatus::Archived,
            _ => ModelStatus::Draft,
        }
    }
}

impl Model {
    pub fn get_lifecycle_state(&self) -> LifecycleState {
        LifecycleState::from(self.lifecycle_state.clone())
    }

    pub fn get_status(&self) -> ModelStatus {
        ModelStatus::from(self.status.clone())
    }

    /// True when this model was produced by a clone, version or template instantiation
    pub fn is_derived(&self) -> bool {
        self.versioned_from.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_string() {
        assert_eq!(ModelStatus::from("approved".to_string()), ModelStatus::Approved);
        assert_eq!(String::from(ModelStatus::Archived), "archived");
        assert_eq!(ModelStatus::from("bogus".to_string()), ModelStatus::Draft);
    }

    #[test]
    fn test_lifecycle_defaults_to_current() {
        assert_eq!(
            LifecycleState::from("transitional".to_string()),
            LifecycleState::Transitional
        );
        assert_eq!(LifecycleState::from(String::new()), LifecycleState::Current);
    }
}
