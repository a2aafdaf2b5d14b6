use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{Widget, WidgetCtx};
use crate::config::Theme;
use crate::settings::WidgetConfig;

/// Fallback renderer for unrecognized widget types: the code snippet is
/// shown verbatim inside a fence, with the type string as language tag. A
/// config written for a newer or different build stays visible instead of
/// disappearing.
pub struct CodeBlock {
    lang: String,
    code: String,
}

impl CodeBlock {
    pub fn new(config: &WidgetConfig, lang: String) -> Self {
        Self {
            lang,
            code: config.code.clone(),
        }
    }
}

impl Widget for CodeBlock {
    fn on_load(&mut self, _ctx: &WidgetCtx) {}

    fn on_unload(&mut self) {}

    fn update(&mut self, _ctx: &WidgetCtx) {}

    fn height(&self, _width: u16) -> u16 {
        self.code.lines().count() as u16 + 2
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let fence = Style::default().fg(theme.dim);
        let mut lines = vec![Line::from(Span::styled(
            format!("```{}", self.lang),
            fence,
        ))];
        for line in self.code.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(theme.fg),
            )));
        }
        lines.push(Line::from(Span::styled("```", fence)));
        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn row(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_unknown_type_renders_as_fenced_snippet() {
        let config = WidgetConfig::new("w", "foobar", "hello world");
        let block = CodeBlock::new(&config, "foobar".to_string());

        let mut terminal = Terminal::new(TestBackend::new(20, 4)).unwrap();
        terminal
            .draw(|frame| {
                block.render(&Theme::default(), frame, Rect::new(0, 0, 20, 3));
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        assert_eq!(row(buffer, 0), "```foobar");
        assert_eq!(row(buffer, 1), "hello world");
        assert_eq!(row(buffer, 2), "```");
    }

    #[test]
    fn test_height_is_code_plus_fences() {
        let config = WidgetConfig::new("w", "battery_status", "line one\nline two");
        let block = CodeBlock::new(&config, "battery_status".to_string());
        assert_eq!(block.height(30), 4);

        let empty = WidgetConfig::new("w", "x", "");
        let block = CodeBlock::new(&empty, "x".to_string());
        assert_eq!(block.height(30), 2);
    }
}
