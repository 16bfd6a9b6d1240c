//! # Keymaps
//!
//! Chord → value tables with prefix-aware lookup. The global handler
//! registry, mode tables and widget-local bindings are all `Keymap`s; they
//! differ only in what they map to.
//!
//! ## Resolution
//!
//! ```text
//! buffer is a strict prefix of some binding   → Partial  (claim the chord)
//! otherwise buffer equals a binding           → Full
//! otherwise                                   → Unmatched
//! ```
//!
//! Partial wins over Full: with `g` and `g g` bound, pressing `g` waits for
//! the second key and `g` alone is never reachable.

use std::collections::HashMap;
use std::rc::Rc;

use super::key::KeySequence;

/// Zero-argument callable bound to a chord.
pub type Handler = Rc<dyn Fn()>;

/// Handler registry: the keymap the dispatch chain invokes directly.
pub type HandlerRegistry = Keymap<Handler>;

/// What a dispatch layer did with the pending chord buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A full chord matched and its action ran. The buffer is cleared.
    Matched,
    /// The buffer is a prefix of a chord this layer knows. The buffer is kept.
    Pending,
    /// Nothing here; the next layer gets a look.
    Unmatched,
}

impl KeyOutcome {
    pub fn is_handled(self) -> bool {
        !matches!(self, KeyOutcome::Unmatched)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<T> {
    Full(T),
    Partial,
    Unmatched,
}

pub struct Keymap<T> {
    bindings: HashMap<KeySequence, T>,
}

impl<T> Default for Keymap<T> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }
}

impl<T> Keymap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `keys`, replacing (and returning) any previous binding.
    pub fn insert(&mut self, keys: KeySequence, value: T) -> Option<T> {
        self.bindings.insert(keys, value)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn resolve(&self, keys: &KeySequence) -> Resolution<&T> {
        if keys.is_empty() {
            return Resolution::Unmatched;
        }
        if self.bindings.keys().any(|bound| keys.is_strict_prefix_of(bound)) {
            return Resolution::Partial;
        }
        match self.bindings.get(keys) {
            Some(value) => Resolution::Full(value),
            None => Resolution::Unmatched,
        }
    }
}

impl Keymap<Handler> {
    /// Resolves `keys` and runs the bound handler on a full match.
    pub fn dispatch(&self, keys: &KeySequence) -> KeyOutcome {
        match self.resolve(keys) {
            Resolution::Full(handler) => {
                handler();
                KeyOutcome::Matched
            }
            Resolution::Partial => KeyOutcome::Pending,
            Resolution::Unmatched => KeyOutcome::Unmatched,
        }
    }
}
