//! # Prompt
//!
//! Single-row confirmation overlay. While a confirmation is pending the
//! prompt sees every keystroke before anything else, and the very next key
//! decides it:
//!
//! ```text
//! Idle ──confirm(msg, cb)──▶ Confirm ──affirmative key──▶ cb() ──▶ Idle
//!                               └─────any other key──────────────▶ Idle
//! ```
//!
//! Rendering lives in `tui::components::prompt_bar`.

use log::{debug, warn};
use thiserror::Error;

use super::key::{KeyEvent, KeySequence};
use super::keymap::KeyOutcome;

/// Runs at most once, when the user answers yes.
pub type Callback = Box<dyn FnOnce()>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("a confirmation is already pending: {0}")]
    AlreadyPending(String),
}

enum PromptState {
    Idle,
    Confirm { message: String, callback: Callback },
}

pub struct Prompt {
    state: PromptState,
    affirmative: KeyEvent,
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new(KeyEvent::char('y'))
    }
}

impl Prompt {
    pub fn new(affirmative: KeyEvent) -> Self {
        Self {
            state: PromptState::Idle,
            affirmative,
        }
    }

    pub fn affirmative(&self) -> KeyEvent {
        self.affirmative
    }

    /// Asks the user to confirm `message`. Only valid while idle.
    pub fn confirm(&mut self, message: impl Into<String>, callback: Callback) -> Result<(), PromptError> {
        if let PromptState::Confirm { message, .. } = &self.state {
            return Err(PromptError::AlreadyPending(message.clone()));
        }
        let message = message.into();
        debug!("Prompt confirm: {message}");
        self.state = PromptState::Confirm { message, callback };
        Ok(())
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self.state, PromptState::Confirm { .. })
    }

    /// The pending confirmation text, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.state {
            PromptState::Confirm { message, .. } => Some(message),
            PromptState::Idle => None,
        }
    }

    /// Consumes the whole pending buffer as the answer to the pending
    /// confirmation. Unmatched when idle.
    pub fn handle_keys(&mut self, keys: &KeySequence) -> KeyOutcome {
        let state = std::mem::replace(&mut self.state, PromptState::Idle);
        let PromptState::Confirm { message, callback } = state else {
            return KeyOutcome::Unmatched;
        };

        if keys.keys() == [self.affirmative] {
            debug!("Prompt accepted: {message}");
            callback();
        } else {
            debug!("Prompt declined ({keys}): {message}");
        }
        KeyOutcome::Matched
    }

    /// Drops a pending confirmation without running it.
    pub fn dismiss(&mut self) {
        if let PromptState::Confirm { message, .. } = std::mem::replace(&mut self.state, PromptState::Idle) {
            warn!("Dismissed pending confirmation: {message}");
        }
    }
}
