use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Datelike, Local, Timelike};
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

/// How far along the current day, week, month, and year are, one meter per
/// row. Weeks start on Monday.
pub struct TimeProgress {
    subs: Vec<Subscription>,
    dirty: Rc<Cell<bool>>,
    fractions: [(&'static str, f64); 4],
}

impl TimeProgress {
    pub fn new() -> Self {
        Self {
            subs: Vec::new(),
            dirty: Rc::new(Cell::new(true)),
            fractions: [("Year", 0.0), ("Month", 0.0), ("Week", 0.0), ("Day", 0.0)],
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

pub(crate) fn day_fraction(now: DateTime<Local>) -> f64 {
    now.num_seconds_from_midnight() as f64 / 86_400.0
}

pub(crate) fn week_fraction(now: DateTime<Local>) -> f64 {
    (now.weekday().num_days_from_monday() as f64 + day_fraction(now)) / 7.0
}

pub(crate) fn month_fraction(now: DateTime<Local>) -> f64 {
    (now.day0() as f64 + day_fraction(now)) / days_in_month(now.year(), now.month()) as f64
}

pub(crate) fn year_fraction(now: DateTime<Local>) -> f64 {
    let total = if is_leap_year(now.year()) { 366 } else { 365 };
    (now.ordinal0() as f64 + day_fraction(now)) / total as f64
}

impl Widget for TimeProgress {
    fn on_load(&mut self, ctx: &WidgetCtx) {
        let dirty = Rc::clone(&self.dirty);
        self.subs
            .push(ctx.clock.subscribe("minute", move || dirty.set(true)));
    }

    fn on_unload(&mut self) {
        self.subs.clear();
    }

    fn update(&mut self, ctx: &WidgetCtx) {
        if !self.dirty.replace(false) {
            return;
        }
        if let Some(now) = ctx.clock.state().now {
            self.fractions = [
                ("Year", year_fraction(now)),
                ("Month", month_fraction(now)),
                ("Week", week_fraction(now)),
                ("Day", day_fraction(now)),
            ];
        }
    }

    fn height(&self, _width: u16) -> u16 {
        4
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let meter_width = area.width.saturating_sub(14).max(4);
        let lines: Vec<Line> = self
            .fractions
            .iter()
            .map(|(label, fraction)| {
                Line::from(vec![
                    Span::styled(format!("{label:<6}"), Style::default().fg(theme.fg)),
                    Span::styled(
                        meter(*fraction, meter_width),
                        Style::default().fg(theme.accent),
                    ),
                    Span::styled(
                        format!(" {:5.1}%", fraction * 100.0),
                        Style::default().fg(theme.dim),
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
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_day_fraction() {
        assert_eq!(day_fraction(at(2026, 8, 27, 0, 0)), 0.0);
        assert!((day_fraction(at(2026, 8, 27, 12, 0)) - 0.5).abs() < 1e-9);
        assert!((day_fraction(at(2026, 8, 27, 18, 0)) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_week_fraction_starts_monday() {
        // 2026-08-24 is a Monday.
        assert_eq!(week_fraction(at(2026, 8, 24, 0, 0)), 0.0);
        // Thursday noon is 3.5 days in.
        assert!((week_fraction(at(2026, 8, 27, 12, 0)) - 3.5 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_month_fraction() {
        assert_eq!(month_fraction(at(2026, 2, 1, 0, 0)), 0.0);
        // Feb 15 noon in a 28-day month is 14.5/28.
        assert!((month_fraction(at(2026, 2, 15, 12, 0)) - 14.5 / 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_year_fraction() {
        assert_eq!(year_fraction(at(2026, 1, 1, 0, 0)), 0.0);
        assert!(year_fraction(at(2026, 12, 31, 23, 59)) > 0.999);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 1), 31);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2026, 4), 30);
    }
}
