//! Request layers

pub mod session;

pub use session::{session_middleware, SESSION_HEADER};
