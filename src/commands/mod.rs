//! CLI command implementations

pub mod admin;
pub mod contacts;
pub mod posts;
pub mod settings;
