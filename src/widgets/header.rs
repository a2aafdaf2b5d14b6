use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use super::{Widget, WidgetCtx};
use crate::config::Theme;
use crate::settings::WidgetConfig;

/// Static heading line. The level comes from the type string suffix
/// (`header_1` is the most prominent).
pub struct Header {
    text: String,
    level: u8,
}

impl Header {
    pub fn new(config: &WidgetConfig, level: u8) -> Self {
        Self {
            text: config.code.clone(),
            level,
        }
    }
}

impl Widget for Header {
    fn on_load(&mut self, _ctx: &WidgetCtx) {}

    fn on_unload(&mut self) {}

    fn update(&mut self, _ctx: &WidgetCtx) {}

    fn height(&self, _width: u16) -> u16 {
        1
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let style = match self.level {
            1 => Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            2 => Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            _ => Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
        };
        frame.render_widget(Paragraph::new(self.text.as_str()).style(style), area);
    }
}
