//! # Core
//!
//! Terminal-independent building blocks of the dispatcher. Nothing in here
//! knows about ratatui or crossterm.
//!
//! ```text
//!   key ──▶ keymap ──▶ mode
//!              │
//!              ▼
//!           prompt        context ──▶ exec
//!                                        ▲
//!   quit                     config ─────┘
//! ```
//!
//! ## Modules
//!
//! - [`key`]: keystrokes, chords and chord-string parsing
//! - [`keymap`]: prefix-aware chord tables and the handler registry
//! - [`mode`]: named keymaps
//! - [`prompt`]: the confirmation state machine
//! - [`quit`]: the one-shot quit signal
//! - [`context`]: UI focus data and subprocess environment derivation
//! - [`exec`]: shell command description and process spawning
//! - [`config`]: `config.toml` loading and resolution

pub mod config;
pub mod context;
pub mod exec;
pub mod key;
pub mod keymap;
pub mod mode;
pub mod prompt;
pub mod quit;
