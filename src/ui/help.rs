use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::config::Theme;

pub fn render(theme: &Theme, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 60, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" keybindings ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let heading = Style::default()
        .fg(theme.accent)
        .add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(Color::Yellow);
    let desc_style = Style::default().fg(Color::White);
    let dim = Style::default().fg(theme.dim);

    let lines = vec![
        Line::raw(""),
        Line::styled("  Sidebars", heading),
        Line::raw(""),
        line_entry("    ] / [       ", "Next / previous sidebar", key_style, desc_style),
        line_entry("    r           ", "Reload sidebars.json from disk", key_style, desc_style),
        Line::raw(""),
        Line::styled("  Widgets", heading),
        Line::raw(""),
        line_entry("    Tab         ", "Focus next widget", key_style, desc_style),
        line_entry("    Shift+Tab   ", "Focus previous widget", key_style, desc_style),
        line_entry("    Enter       ", "Activate focused widget", key_style, desc_style),
        line_entry("    ↑/↓ or k/j  ", "Move selection (quick nav)", key_style, desc_style),
        Line::raw(""),
        Line::styled("  General", heading),
        Line::raw(""),
        line_entry("    q           ", "Quit (saves sidebars)", key_style, desc_style),
        line_entry("    ?           ", "This help", key_style, desc_style),
        Line::raw(""),
        Line::styled("  Press Esc to close", dim),
    ];

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn line_entry<'a>(
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) -> Line<'a> {
    Line::from(vec![
        ratatui::text::Span::styled(key, key_style),
        ratatui::text::Span::styled(desc, desc_style),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}
