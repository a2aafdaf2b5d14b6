use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::{Widget, WidgetCtx};
use crate::config::Theme;
use crate::settings::WidgetConfig;

/// Plain text, word-wrapped to the panel width.
pub struct Text {
    body: String,
}

impl Text {
    pub fn new(config: &WidgetConfig) -> Self {
        Self {
            body: config.code.clone(),
        }
    }
}

/// Word-wraps one logical line to the given width. Words longer than the
/// width go on a line of their own and overflow.
pub(crate) fn wrap_line(line: &str, width: u16) -> Vec<String> {
    let width = width.max(1) as usize;
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.width() + 1 + word.width() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            out.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

fn wrapped_height(body: &str, width: u16) -> u16 {
    body.lines()
        .map(|line| wrap_line(line, width).len() as u16)
        .sum::<u16>()
        .max(1)
}

impl Widget for Text {
    fn on_load(&mut self, _ctx: &WidgetCtx) {}

    fn on_unload(&mut self) {}

    fn update(&mut self, _ctx: &WidgetCtx) {}

    fn height(&self, width: u16) -> u16 {
        wrapped_height(&self.body, width)
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(self.body.as_str())
            .style(Style::default().fg(theme.fg))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_line_short() {
        assert_eq!(wrap_line("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_line_breaks_at_words() {
        assert_eq!(
            wrap_line("the quick brown fox", 9),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_wrap_line_long_word_overflows() {
        assert_eq!(
            wrap_line("a verylongunbreakableword b", 8),
            vec!["a", "verylongunbreakableword", "b"]
        );
    }

    #[test]
    fn test_wrapped_height_counts_all_lines() {
        assert_eq!(wrapped_height("one\ntwo", 20), 2);
        assert_eq!(wrapped_height("", 20), 1);
        assert_eq!(wrapped_height("the quick brown fox", 9), 2);
    }
}
