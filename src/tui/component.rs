use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::context::Context;
use crate::core::key::KeySequence;
use crate::core::keymap::KeyOutcome;

/// A rectangular UI surface on the widget stack.
///
/// The stack owns layout: it assigns every widget its region through
/// [`Widget::set_area`] before rendering, and again on every resize.
///
/// # Mutability
///
/// The `render` method takes `&mut self` to allow widgets to update
/// presentation state (scroll offsets, cached line counts) during the
/// render pass, mirroring ratatui's `StatefulWidget` pattern.
pub trait Widget {
    /// Assign the screen region this widget draws into.
    fn set_area(&mut self, area: Rect);

    /// Draw into the region last assigned by [`Widget::set_area`].
    fn render(&mut self, frame: &mut Frame);

    /// Check the pending chord against this widget's bindings.
    fn handle_keys(&mut self, keys: &KeySequence) -> KeyOutcome;

    /// Release per-widget resources. Called exactly once, when the widget
    /// leaves the stack for good.
    fn destroy(&mut self) {}
}

/// A full-screen widget on the pager stack.
pub trait Pager: Widget {
    fn title(&self) -> &str;

    /// Names of the modes whose bindings apply while this pager is active.
    fn modes(&self) -> &[String] {
        &[]
    }

    /// Focus data exported to commands run from this pager.
    fn context(&self) -> Context {
        Context::new()
    }
}
