//! # Widget Stack
//!
//! Ordered composition of full-screen surfaces. The top of the stack is the
//! active widget.
//!
//! ```text
//!   render:  bottom ──▶ top      (later widgets draw over earlier ones)
//!   keys:    top ──▶ bottom      (first widget that handles the chord wins)
//!   destroy: top ──▶ bottom      (stack-pop order)
//! ```
//!
//! There is no tiling: every widget gets the same region.

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::key::KeySequence;
use crate::core::keymap::KeyOutcome;
use crate::tui::component::Widget;

pub struct WidgetStack<W: ?Sized = dyn Widget> {
    items: Vec<Box<W>>,
    area: Rect,
}

impl<W: ?Sized> Default for WidgetStack<W> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            area: Rect::default(),
        }
    }
}

impl<W: Widget + ?Sized> WidgetStack<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `widget` on top, assigning it the stack's current region.
    pub fn push(&mut self, mut widget: Box<W>) {
        widget.set_area(self.area);
        self.items.push(widget);
    }

    /// Removes the top widget without destroying it. No-op when empty.
    pub fn pop(&mut self) -> Option<Box<W>> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active(&self) -> Option<&W> {
        self.items.last().map(|w| &**w)
    }

    pub fn active_mut(&mut self) -> Option<&mut W> {
        self.items.last_mut().map(|w| &mut **w)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &W> {
        self.items.iter().map(|w| &**w)
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Assigns `area` to the stack and to every widget on it.
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
        for widget in &mut self.items {
            widget.set_area(area);
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        for widget in &mut self.items {
            widget.render(frame);
        }
    }

    pub fn handle_keys(&mut self, keys: &KeySequence) -> KeyOutcome {
        for widget in self.items.iter_mut().rev() {
            let outcome = widget.handle_keys(keys);
            if outcome.is_handled() {
                return outcome;
            }
        }
        KeyOutcome::Unmatched
    }

    /// Pops and destroys every widget, top first.
    pub fn destroy_all(&mut self) {
        while let Some(mut widget) = self.items.pop() {
            widget.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Probe, ProbeLog};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn keys(chord: &str) -> KeySequence {
        chord.parse().unwrap()
    }

    #[test]
    fn test_push_assigns_current_area() {
        let log = ProbeLog::default();
        let mut stack: WidgetStack = WidgetStack::new();
        let area = Rect::new(0, 0, 40, 9);
        stack.set_area(area);

        let probe = Probe::new("a", &log);
        let seen = probe.area_handle();
        stack.push(Box::new(probe));
        assert_eq!(seen.get(), area);
    }

    #[test]
    fn test_pop_empty_is_noop() {
        let mut stack: WidgetStack = WidgetStack::new();
        assert!(stack.pop().is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_handle_walks_top_down_and_stops() {
        let log = ProbeLog::default();
        let mut stack: WidgetStack = WidgetStack::new();
        stack.push(Box::new(Probe::new("bottom", &log).bind("x").bind("y")));
        stack.push(Box::new(Probe::new("top", &log).bind("x")));

        assert_eq!(stack.handle_keys(&keys("x")), KeyOutcome::Matched);
        assert_eq!(stack.handle_keys(&keys("y")), KeyOutcome::Matched);
        assert_eq!(stack.handle_keys(&keys("z")), KeyOutcome::Unmatched);
        assert_eq!(log.entries(), vec!["top:x", "bottom:y"]);
    }

    #[test]
    fn test_pending_stops_fallthrough() {
        let log = ProbeLog::default();
        let mut stack: WidgetStack = WidgetStack::new();
        stack.push(Box::new(Probe::new("bottom", &log).bind("g")));
        stack.push(Box::new(Probe::new("top", &log).bind("g g")));

        assert_eq!(stack.handle_keys(&keys("g")), KeyOutcome::Pending);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_render_bottom_to_top() {
        let log = ProbeLog::default();
        let mut stack: WidgetStack = WidgetStack::new();
        stack.set_area(Rect::new(0, 0, 10, 2));
        stack.push(Box::new(Probe::new("a", &log)));
        stack.push(Box::new(Probe::new("b", &log)));

        let mut terminal = Terminal::new(TestBackend::new(10, 2)).unwrap();
        terminal.draw(|f| stack.render(f)).unwrap();
        assert_eq!(log.entries(), vec!["render:a", "render:b"]);
    }

    #[test]
    fn test_destroy_all_top_to_bottom() {
        let log = ProbeLog::default();
        let mut stack: WidgetStack = WidgetStack::new();
        stack.push(Box::new(Probe::new("a", &log)));
        stack.push(Box::new(Probe::new("b", &log)));
        stack.push(Box::new(Probe::new("c", &log)));

        stack.destroy_all();
        assert!(stack.is_empty());
        assert_eq!(log.entries(), vec!["destroy:c", "destroy:b", "destroy:a"]);
    }

    #[test]
    fn test_set_area_twice_is_idempotent() {
        let log = ProbeLog::default();
        let mut stack: WidgetStack = WidgetStack::new();
        let probe = Probe::new("a", &log);
        let seen = probe.area_handle();
        stack.push(Box::new(probe));

        stack.set_area(Rect::new(0, 0, 80, 23));
        let first = seen.get();
        stack.set_area(Rect::new(0, 0, 80, 23));
        assert_eq!(seen.get(), first);
    }
}
