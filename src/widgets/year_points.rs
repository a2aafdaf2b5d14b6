use std::cell::Cell;
use std::rc::Rc;

use chrono::Datelike;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{Widget, WidgetCtx};
use crate::config::Theme;
use crate::store::Subscription;

/// The year as a dot grid, one dot per day, elapsed days filled in.
pub struct YearPoints {
    subs: Vec<Subscription>,
    dirty: Rc<Cell<bool>>,
    year: i32,
    day_of_year: u32,
    total_days: u32,
}

impl YearPoints {
    pub fn new() -> Self {
        Self {
            subs: Vec::new(),
            dirty: Rc::new(Cell::new(true)),
            year: 0,
            day_of_year: 0,
            total_days: 365,
        }
    }
}

pub(crate) fn year_progress_label(year: i32, day_of_year: u32, total_days: u32) -> String {
    let percent = day_of_year as f64 / total_days as f64 * 100.0;
    format!("{year}  {percent:.1}%")
}

impl Widget for YearPoints {
    fn on_load(&mut self, ctx: &WidgetCtx) {
        let dirty = Rc::clone(&self.dirty);
        self.subs
            .push(ctx.clock.subscribe("day", move || dirty.set(true)));
    }

    fn on_unload(&mut self) {
        self.subs.clear();
    }

    fn update(&mut self, ctx: &WidgetCtx) {
        if !self.dirty.replace(false) {
            return;
        }
        if let Some(now) = ctx.clock.state().now {
            self.year = now.year();
            self.day_of_year = now.ordinal();
            self.total_days = if now.date_naive().leap_year() { 366 } else { 365 };
        }
    }

    fn height(&self, width: u16) -> u16 {
        let per_row = width.max(1) as u32;
        1 + self.total_days.div_ceil(per_row) as u16
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(Span::styled(
            year_progress_label(self.year, self.day_of_year, self.total_days),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))];

        let per_row = area.width.max(1) as u32;
        let mut day = 1u32;
        while day <= self.total_days {
            let mut spans = Vec::new();
            for d in day..(day + per_row).min(self.total_days + 1) {
                let (ch, style) = if d < self.day_of_year {
                    ("●", Style::default().fg(theme.accent))
                } else if d == self.day_of_year {
                    ("●", Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))
                } else {
                    ("·", Style::default().fg(theme.dim))
                };
                spans.push(Span::styled(ch, style));
            }
            lines.push(Line::from(spans));
            day += per_row;
        }
        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_progress_label() {
        assert_eq!(year_progress_label(2026, 73, 365), "2026  20.0%");
        assert_eq!(year_progress_label(2024, 366, 366), "2024  100.0%");
    }

    #[test]
    fn test_height_depends_on_width() {
        let mut points = YearPoints::new();
        points.total_days = 365;
        // 365 dots at 30 per row is 13 rows, plus the header.
        assert_eq!(points.height(30), 14);
        assert_eq!(points.height(365), 2);
    }

    #[test]
    fn test_update_tracks_leap_years() {
        let clock = crate::clock::Clock::new();
        let dir = tempfile::tempdir().unwrap();
        let ctx = WidgetCtx {
            clock: clock.store(),
            stats: crate::store::Store::new(crate::system_stats::StatsState::default()),
            notes: crate::notes::NotesStore::new(dir.path()),
        };
        let mut points = YearPoints::new();
        points.on_load(&ctx);
        clock.activate(Local.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
        points.update(&ctx);
        assert_eq!(points.total_days, 366);
        assert_eq!(points.day_of_year, 60);
    }
}
