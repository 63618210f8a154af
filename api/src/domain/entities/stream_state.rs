//! README summary stream state

use serde::{Deserialize, Serialize};

/// Progress of the summary stream for the current subject
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "lowercase")]
pub enum StreamState {
    #[default]
    Idle,
    Streaming(String),
    Done(String),
    Failed(String),
}

impl StreamState {
    /// Append a delta; starts streaming from idle. Terminal states are left alone.
    pub fn push(&mut self, delta: &str) {
        match self {
            StreamState::Idle => *self = StreamState::Streaming(delta.to_string()),
            StreamState::Streaming(text) => text.push_str(delta),
            StreamState::Done(_) | StreamState::Failed(_) => {}
        }
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        match self {
            StreamState::Streaming(text) | StreamState::Done(text) => text,
            StreamState::Idle | StreamState::Failed(_) => "",
        }
    }

    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Done(_) | StreamState::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_accumulates() {
        let mut state = StreamState::Idle;
        state.push("Hel");
        state.push("lo");
        assert_eq!(state, StreamState::Streaming("Hello".to_string()));
    }

    #[test]
    fn terminal_state_ignores_push() {
        let mut state = StreamState::Done("x".to_string());
        state.push("y");
        assert_eq!(state.text(), "x");
        assert!(state.is_terminal());
    }
}
