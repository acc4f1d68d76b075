//! shipnote: turn commit history into a categorized changelog (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod credentials;
pub mod env;
pub mod models;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod render;
pub mod sources;
