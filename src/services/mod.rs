pub mod cascade_delete_service;
pub mod graph_clone_service;
pub mod graph_service;
pub mod identity_remapper;
pub mod lineage_service;
pub mod metamodel_service;

pub use cascade_delete_service::{CascadeDeleteService, DeleteReport};
pub use graph_clone_service::{CloneKind, CloneOutcome, GraphCloneService};
pub use graph_service::{GraphService, ModelGraph};
pub use identity_remapper::{IdGenerator, IdentityMap, IdentityRemapper, UuidGenerator};
pub use lineage_service::{LineageService, ModelSummary};
pub use metamodel_service::{MetamodelService, MetamodelSnapshot};
