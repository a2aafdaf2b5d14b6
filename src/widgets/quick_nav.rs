use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::warn;

use super::parse::pipe_rows;
use super::{nav_target, NavTarget, Widget, WidgetCtx};
use crate::config::Theme;

/// A shortcut list. One entry per line, `description | icon | target`;
/// targets with a URL scheme open in the system handler, anything else is
/// treated as a note path under the notes root.
pub struct QuickNav {
    items: Vec<NavItem>,
    selected: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NavItem {
    pub description: String,
    pub icon: String,
    pub target: String,
}

pub(crate) fn parse_items(code: &str) -> Vec<NavItem> {
    pipe_rows(code)
        .into_iter()
        .map(|row| {
            let mut cells = row.into_iter();
            NavItem {
                description: cells.next().unwrap_or_default(),
                icon: cells.next().unwrap_or_default(),
                target: cells.next().unwrap_or_default(),
            }
        })
        .collect()
}

impl QuickNav {
    pub fn new(config: &crate::settings::WidgetConfig) -> Self {
        Self {
            items: parse_items(&config.code),
            selected: 0,
        }
    }

    fn open_selected(&self, ctx: &WidgetCtx) {
        let Some(item) = self.items.get(self.selected) else {
            return;
        };
        if item.target.is_empty() {
            return;
        }
        let result = match nav_target(&item.target) {
            NavTarget::External(url) => open::that(url),
            NavTarget::Note(path) => match ctx.notes.resolve(&path) {
                Ok(resolved) => open::that(resolved),
                Err(err) => {
                    warn!(target = %item.target, %err, "bad quick-nav note path");
                    return;
                }
            },
        };
        if let Err(err) = result {
            warn!(target = %item.target, %err, "failed to open quick-nav target");
        }
    }
}

impl Widget for QuickNav {
    fn on_load(&mut self, _ctx: &WidgetCtx) {}

    fn on_unload(&mut self) {}

    fn update(&mut self, _ctx: &WidgetCtx) {}

    fn height(&self, _width: u16) -> u16 {
        (self.items.len() as u16).max(1)
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        if self.items.is_empty() {
            let empty = Paragraph::new("no entries").style(Style::default().fg(theme.dim));
            frame.render_widget(empty, area);
            return;
        }
        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if i == self.selected {
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.fg)
                };
                let icon = if item.icon.is_empty() { "·" } else { &item.icon };
                Line::from(Span::styled(
                    format!("{icon} {}", item.description),
                    style,
                ))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn handle_key(&mut self, ctx: &WidgetCtx, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.items.len() {
                    self.selected += 1;
                }
                true
            }
            KeyCode::Enter => {
                self.open_selected(ctx);
                true
            }
            _ => false,
        }
    }

    fn interactive(&self) -> bool {
        !self.items.is_empty()
    }
}
