//! # TUI Components
//!
//! Concrete surfaces drawn by the app:
//!
//! - `TextPager`: scrollable text view, the stock [`Pager`](crate::tui::component::Pager)
//! - `prompt_bar`: the reserved bottom row showing a pending confirmation
//!
//! Each file owns its state, key handling, rendering and tests.

pub mod prompt_bar;
mod text_pager;

pub use prompt_bar::render_prompt;
pub use text_pager::{PagerAction, TextPager};
