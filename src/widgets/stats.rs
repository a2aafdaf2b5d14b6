use std::cell::Cell;
use std::rc::Rc;

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{meter, Widget, WidgetCtx};
use crate::config::Theme;
use crate::store::Subscription;
use crate::system_stats::StatsState;

/// Host metrics from the background collector: CPU, memory, load, disk.
pub struct SystemStats {
    subs: Vec<Subscription>,
    dirty: Rc<Cell<bool>>,
    sample: StatsState,
}

impl SystemStats {
    pub fn new() -> Self {
        Self {
            subs: Vec::new(),
            dirty: Rc::new(Cell::new(true)),
            sample: StatsState::default(),
        }
    }
}

impl Widget for SystemStats {
    fn on_load(&mut self, ctx: &WidgetCtx) {
        let dirty = Rc::clone(&self.dirty);
        self.subs
            .push(ctx.stats.subscribe("", move || dirty.set(true)));
    }

    fn on_unload(&mut self) {
        self.subs.clear();
    }

    fn update(&mut self, ctx: &WidgetCtx) {
        if self.dirty.replace(false) {
            self.sample = ctx.stats.state();
        }
    }

    fn height(&self, _width: u16) -> u16 {
        4
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let meter_width = area.width.saturating_sub(12).max(4);
        let rows = [
            (self.sample.format_cpu(), self.sample.cpu_percent as f64),
            (self.sample.format_memory(), self.sample.memory_percent as f64),
            (self.sample.format_load(), (self.sample.load_avg_1 * 25.0).min(100.0)),
            (self.sample.format_disk(), self.sample.disk_usage_percent as f64),
        ];
        let lines: Vec<Line> = rows
            .into_iter()
            .map(|(label, percent)| {
                Line::from(vec![
                    Span::styled(format!("{label:<10}"), Style::default().fg(theme.fg)),
                    Span::styled(
                        meter(percent / 100.0, meter_width),
                        Style::default().fg(theme.accent),
                    ),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn test_update_pulls_latest_sample() {
        let store = Store::new(StatsState::default());
        let dir = tempfile::tempdir().unwrap();
        let ctx = WidgetCtx {
            clock: crate::clock::Clock::new().store(),
            stats: store.clone(),
            notes: crate::notes::NotesStore::new(dir.path()),
        };

        let mut widget = SystemStats::new();
        widget.on_load(&ctx);
        widget.update(&ctx);

        store.update(StatsState {
            cpu_percent: 55.0,
            ..Default::default()
        });
        widget.update(&ctx);
        assert_eq!(widget.sample.cpu_percent, 55.0);
    }
}
