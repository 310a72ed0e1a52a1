pub mod app_context;
pub mod config;
pub mod database;
pub mod errors;
pub mod services;

pub use app_context::AppContext;
pub use config::EngineConfig;
pub use errors::{GraphError, GraphResult, IntegrityWarning};
