//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod comparison;
pub mod export;
pub mod repos;
pub mod session;
pub mod summary;

pub use comparison::{
    add_to_comparison, clear_comparison, list_comparison, remove_from_comparison,
};
pub use export::{export_comparison_csv, export_comparison_json, export_csv, export_json};
pub use repos::{analyze, deep_link, index, search, trending};
pub use session::{delete_credential, delete_session, get_session, put_credential};
pub use summary::stream_summary;
