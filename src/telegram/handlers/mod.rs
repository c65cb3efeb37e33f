//! Dispatcher schema and update handlers

pub mod commands;
pub mod schema;
pub mod types;

pub use schema::schema;
