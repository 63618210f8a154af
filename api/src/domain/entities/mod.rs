//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! Remote API record shapes live with their port in `domain::ports`.

pub mod comparison;
pub mod fetch_slot;
pub mod history;
pub mod repository_key;
pub mod stream_state;

pub use comparison::{ComparableRepository, ComparisonSet};
pub use fetch_slot::{FetchSlot, SlotError, SlotKind};
pub use history::History;
pub use repository_key::RepositoryKey;
pub use stream_state::StreamState;
