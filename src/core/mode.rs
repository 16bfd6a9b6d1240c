//! Named keymaps. A pager opts into modes by name; while it is active the
//! bindings of each listed mode are consulted after the pager's own.

use std::collections::HashMap;

use log::{info, warn};

use super::key::KeySequence;
use super::keymap::{HandlerRegistry, KeyOutcome};

#[derive(Default)]
pub struct Mode {
    bindings: HandlerRegistry,
}

impl Mode {
    pub fn new(bindings: HandlerRegistry) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &HandlerRegistry {
        &self.bindings
    }
}

#[derive(Default)]
pub struct ModeTable {
    modes: HashMap<String, Mode>,
}

impl ModeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, mode: Mode) {
        let name = name.into();
        info!("Registered mode `{name}` ({} bindings)", mode.bindings.len());
        if self.modes.insert(name.clone(), mode).is_some() {
            warn!("Mode `{name}` was registered again, replacing the previous keymap");
        }
    }

    /// Tries each named mode in order; the first that handles the chord wins.
    /// Unknown names are skipped.
    pub fn dispatch<'a>(&self, names: impl IntoIterator<Item = &'a str>, keys: &KeySequence) -> KeyOutcome {
        for name in names {
            let Some(mode) = self.modes.get(name) else {
                continue;
            };
            let outcome = mode.bindings.dispatch(keys);
            if outcome.is_handled() {
                return outcome;
            }
        }
        KeyOutcome::Unmatched
    }
}
