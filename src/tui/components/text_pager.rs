//! # Text Pager
//!
//! Scrollable, read-only view over a block of text. Used for the root pager
//! and for pagers pushed from scripts.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::core::context::Context;
use crate::core::key::KeySequence;
use crate::core::keymap::{KeyOutcome, Keymap, Resolution};
use crate::tui::component::{Pager, Widget};
use crate::tui::effect::Effects;

/// Actions bound in every text pager's local keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerAction {
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    Top,
    Bottom,
    Close,
}

const DEFAULT_BINDINGS: &[(&str, PagerAction)] = &[
    ("j", PagerAction::ScrollDown),
    ("down", PagerAction::ScrollDown),
    ("k", PagerAction::ScrollUp),
    ("up", PagerAction::ScrollUp),
    ("pgdn", PagerAction::PageDown),
    ("space", PagerAction::PageDown),
    ("pgup", PagerAction::PageUp),
    ("g g", PagerAction::Top),
    ("G", PagerAction::Bottom),
    ("q", PagerAction::Close),
];

fn default_keymap() -> Keymap<PagerAction> {
    let mut keymap = Keymap::new();
    for (chord, action) in DEFAULT_BINDINGS {
        if let Ok(keys) = chord.parse::<KeySequence>() {
            keymap.insert(keys, *action);
        }
    }
    keymap
}

pub struct TextPager {
    title: String,
    lines: Vec<String>,
    offset: usize,
    area: Rect,
    keymap: Keymap<PagerAction>,
    modes: Vec<String>,
    effects: Effects,
}

impl TextPager {
    pub fn new(title: impl Into<String>, text: &str, effects: Effects) -> Self {
        Self {
            title: title.into(),
            lines: text.lines().map(str::to_string).collect(),
            offset: 0,
            area: Rect::default(),
            keymap: default_keymap(),
            modes: Vec::new(),
            effects,
        }
    }

    pub fn with_modes(mut self, modes: Vec<String>) -> Self {
        self.modes = modes;
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Rows available for text inside the border.
    fn page_height(&self) -> usize {
        usize::from(self.area.height.saturating_sub(2)).max(1)
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    fn apply(&mut self, action: PagerAction) {
        let page = self.page_height();
        self.offset = match action {
            PagerAction::ScrollDown => self.offset + 1,
            PagerAction::ScrollUp => self.offset.saturating_sub(1),
            PagerAction::PageDown => self.offset + page,
            PagerAction::PageUp => self.offset.saturating_sub(page),
            PagerAction::Top => 0,
            PagerAction::Bottom => self.max_offset(),
            PagerAction::Close => {
                self.effects.pop_pager();
                self.offset
            }
        }
        .min(self.max_offset());
    }
}

impl Widget for TextPager {
    fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    fn render(&mut self, frame: &mut Frame) {
        let visible: Vec<Line> = self
            .lines
            .iter()
            .skip(self.offset)
            .take(self.page_height())
            .map(|line| Line::raw(line.as_str()))
            .collect();

        let position = format!(" {}/{} ", (self.offset + 1).min(self.lines.len()), self.lines.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.title))
            .title_bottom(Line::from(position).right_aligned());

        frame.render_widget(Clear, self.area);
        frame.render_widget(Paragraph::new(visible).block(block), self.area);
    }

    fn handle_keys(&mut self, keys: &KeySequence) -> KeyOutcome {
        match self.keymap.resolve(keys) {
            Resolution::Full(action) => {
                let action = *action;
                self.apply(action);
                KeyOutcome::Matched
            }
            Resolution::Partial => KeyOutcome::Pending,
            Resolution::Unmatched => KeyOutcome::Unmatched,
        }
    }
}

impl Pager for TextPager {
    fn title(&self) -> &str {
        &self.title
    }

    fn modes(&self) -> &[String] {
        &self.modes
    }

    fn context(&self) -> Context {
        let mut ctx = Context::new()
            .with("title", self.title.clone())
            .with("line", (self.offset + 1).to_string());
        if let Some(text) = self.lines.get(self.offset) {
            ctx.insert("text", text.clone());
        }
        ctx
    }
}
