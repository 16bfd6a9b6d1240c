//! rat library exports: the dispatch core, the scripting bridge and the
//! terminal adapter. The binary in `main.rs` is a thin CLI around
//! [`tui::run`].

pub mod core;
pub mod script;
pub mod tui;

#[cfg(test)]
pub mod test_support;
