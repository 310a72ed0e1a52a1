use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key under which a view configuration lists the element ids it references
pub const ELEMENTS_KEY: &str = "elements";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ea_views")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub model_id: String,
    pub name: String,
    pub description: Option<String>,
    pub view_type: String,
    pub configuration: Json,
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
}

impl Related<super::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Models.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Diagram,
    Matrix,
    Heatmap,
    Roadmap,
    List,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Diagram => "diagram",
            ViewKind::Matrix => "matrix",
            ViewKind::Heatmap => "heatmap",
            ViewKind::Roadmap => "roadmap",
            ViewKind::List => "list",
        }
    }
}

impl From<ViewKind> for String {
    fn from(kind: ViewKind) -> Self {
        kind.as_str().to_string()
    }
}

impl From<String> for ViewKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "matrix" => ViewKind::Matrix,
            "heatmap" => ViewKind::Heatmap,
            "roadmap" => ViewKind::Roadmap,
            "list" => ViewKind::List,
            _ => ViewKind::Diagram,
        }
    }
}

impl Model {
    pub fn get_view_kind(&self) -> ViewKind {
        ViewKind::from(self.view_type.clone())
    }

    /// Element ids embedded in the configuration, in stored order.
    ///
    /// Returns `None` when the configuration carries no element list at all,
    /// which is distinct from an empty list.
    pub fn referenced_elements(&self) -> Option<Vec<String>> {
        referenced_elements(&self.configuration)
    }

    pub fn references(&self, element_id: &str) -> bool {
        self.referenced_elements()
            .map(|ids| ids.iter().any(|id| id == element_id))
            .unwrap_or(false)
    }
}

/// Raw entries of the element list, including ones that are not strings
pub fn element_entries(configuration: &Json) -> Option<&Vec<Json>> {
    configuration
        .get(ELEMENTS_KEY)
        .and_then(|value| value.as_array())
}

/// Read the element ids out of a view configuration blob.
/// Non-string entries cannot name an element and are skipped here; see
/// [`element_entries`] for the raw list.
pub fn referenced_elements(configuration: &Json) -> Option<Vec<String>> {
    element_entries(configuration).map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()
    })
}

/// Copy of `configuration` without `element_id` in its element list.
/// Every other entry, string or not, stays where it was.
pub fn without_element(configuration: &Json, element_id: &str) -> Json {
    let mut configuration = configuration.clone();
    if let Some(items) = configuration
        .get_mut(ELEMENTS_KEY)
        .and_then(|value| value.as_array_mut())
    {
        items.retain(|item| item.as_str() != Some(element_id));
    }
    configuration
}

/// Copy of `configuration` with its element list replaced. Every other key is kept.
pub fn with_elements(configuration: &Json, elements: Vec<String>) -> Json {
    let mut configuration = configuration.clone();
    if let Some(object) = configuration.as_object_mut() {
        object.insert(
            ELEMENTS_KEY.to_string(),
            Json::Array(elements.into_iter().map(Json::String).collect()),
        );
    }
    configuration
}
