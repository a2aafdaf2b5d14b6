use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::parse::duration_seconds;
use super::{meter, Widget, WidgetCtx};
use crate::config::Theme;
use crate::store::Subscription;

const DEFAULT_SECONDS: u64 = 300;

/// A start/stop countdown. The code snippet is a colon duration (`"5:00"`);
/// anything unparseable falls back to five minutes. Enter or space toggles;
/// while running the timer counts down one second per clock tick and resets
/// when it reaches zero.
pub struct CountdownTimer {
    total: u64,
    remaining: Rc<Cell<u64>>,
    dirty: Rc<Cell<bool>>,
    running: Option<Subscription>,
}

pub(crate) fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

impl CountdownTimer {
    pub fn new(config: &crate::settings::WidgetConfig) -> Self {
        let total = duration_seconds(&config.code).unwrap_or(DEFAULT_SECONDS);
        Self {
            total,
            remaining: Rc::new(Cell::new(total)),
            dirty: Rc::new(Cell::new(true)),
            running: None,
        }
    }

    fn start(&mut self, ctx: &WidgetCtx) {
        if self.remaining.get() == 0 {
            self.remaining.set(self.total);
        }
        let remaining = Rc::clone(&self.remaining);
        let dirty = Rc::clone(&self.dirty);
        self.running = Some(ctx.clock.subscribe("second", move || {
            remaining.set(remaining.get().saturating_sub(1));
            dirty.set(true);
        }));
    }

    fn stop(&mut self) {
        self.running = None;
        self.remaining.set(self.total);
        self.dirty.set(true);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl Widget for CountdownTimer {
    fn on_load(&mut self, _ctx: &WidgetCtx) {}

    fn on_unload(&mut self) {
        self.running = None;
    }

    fn update(&mut self, _ctx: &WidgetCtx) {
        if self.running.is_some() && self.remaining.get() == 0 {
            self.stop();
        }
    }

    fn height(&self, _width: u16) -> u16 {
        2
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let icon = if self.is_running() { "⏸" } else { "▶" };
        let style = if self.is_running() {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg)
        };
        let elapsed = if self.total > 0 {
            1.0 - self.remaining.get() as f64 / self.total as f64
        } else {
            0.0
        };
        let lines = vec![
            Line::from(Span::styled(
                format!("{icon} {}", format_time(self.remaining.get())),
                style,
            )),
            Line::from(Span::styled(
                meter(elapsed, area.width.saturating_sub(2).max(4)),
                Style::default().fg(theme.accent),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn handle_key(&mut self, ctx: &WidgetCtx, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.is_running() {
                    self.stop();
                } else {
                    self.start(ctx);
                }
                true
            }
            _ => false,
        }
    }

    fn interactive(&self) -> bool {
        true
    }
}
