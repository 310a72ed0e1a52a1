pub mod domains;
pub mod element_types;
pub mod elements;
pub mod models;
pub mod relationship_types;
pub mod relationships;
pub mod views;
