//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and session state.

pub mod aggregator;
pub mod export;
pub mod locale;
pub mod session;
pub mod sse_decoder;
pub mod summary_service;

pub use aggregator::{Aggregator, FetchOutcome, GithubSettings};
pub use export::{format_comparison, to_csv, to_json, ExportDocument};
pub use locale::preferred_locale;
pub use session::{Session, SessionLimits, SessionStore, SessionView};
pub use summary_service::{SummaryService, SummarySettings};
