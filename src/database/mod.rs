pub mod connection;
pub mod entities;
pub mod migrations;
pub mod seed_data;
pub mod store;
pub mod test_utils;

pub use connection::*;
