use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::core::prompt::Prompt;

/// Draws the bottom prompt row: `message [y/N]` while confirming, a blank
/// row otherwise.
pub fn render_prompt(frame: &mut Frame, area: Rect, prompt: &Prompt) {
    frame.render_widget(Clear, area);
    let Some(message) = prompt.message() else {
        return;
    };

    let answer = format!(" [{}/N]", prompt.affirmative());
    let line = Line::from(vec![
        Span::styled(message.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(answer, Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
