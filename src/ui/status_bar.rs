use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::config::Theme;

pub fn render(app: &App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let (left, right) = if app.help_visible {
        (String::new(), "esc close ".to_string())
    } else {
        let left = app
            .view
            .as_ref()
            .map(|v| format!(" {} ", v.title()))
            .unwrap_or_default();
        let stats = app.ctx.stats.state();
        let right = format!(
            "{} │ {}  ? help ",
            stats.format_cpu(),
            stats.format_memory()
        );
        (left, right)
    };

    let left_len = left.chars().count();
    let right_len = right.chars().count();
    let padding = (area.width as usize).saturating_sub(left_len + right_len);

    let line = Line::from(vec![
        Span::styled(
            left,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(theme.dim)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
