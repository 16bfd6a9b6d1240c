//! # Scripting Bridge
//!
//! User configuration is written in [rhai]. Scripts call a fixed set of host
//! functions; every call is forwarded to a [`HostApi`] implementation, so the
//! VM itself holds no UI state.
//!
//! ```text
//!   init.rhai ──eval──▶ ScriptVm ──HostApi──▶ CommandHost ──▶ Effects
//!                          ▲                                    │
//!                          └──────── call(ScriptFn) ◀───────────┘
//! ```
//!
//! - [`vm`]: the engine, host function registration and callback invocation
//! - [`loader`]: config directory enumeration and load order
//!
//! [rhai]: https://rhai.rs

pub mod loader;
pub mod vm;

use std::fmt;
use std::path::PathBuf;

use rhai::FnPtr;
use thiserror::Error;

use crate::core::key::KeySequence;

pub use loader::{RESERVED_SCRIPT, SCRIPT_EXTENSION, load_scripts, script_files};
pub use vm::ScriptVm;

/// A script function stored for later invocation.
#[derive(Clone)]
pub struct ScriptFn(FnPtr);

impl ScriptFn {
    pub fn new(ptr: FnPtr) -> Self {
        Self(ptr)
    }

    pub fn name(&self) -> &str {
        self.0.fn_name()
    }

    pub(crate) fn ptr(&self) -> &FnPtr {
        &self.0
    }
}

impl fmt::Debug for ScriptFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptFn({})", self.name())
    }
}

/// Host side of the script API.
pub trait HostApi {
    fn bind_key(&mut self, keys: KeySequence, callback: ScriptFn);
    fn confirm(&mut self, message: String, callback: ScriptFn);
    fn exec(&mut self, command: String);
    fn confirm_exec(&mut self, command: String, then: Option<ScriptFn>);
    fn register_mode(&mut self, name: String, bindings: Vec<(KeySequence, ScriptFn)>);
    fn quit(&mut self);
    fn push_pager(&mut self, title: String, text: String, modes: Vec<String>);
    fn pop_pager(&mut self);
}

#[derive(Debug, Error)]
pub enum ScriptError {
    /// Compile or runtime failure. The engine's error type is not `Send`, so
    /// only its rendered message is kept.
    #[error("{}: {message}", path.display())]
    Eval { path: PathBuf, message: String },
    #[error("script function `{name}` failed: {message}")]
    Call { name: String, message: String },
}
