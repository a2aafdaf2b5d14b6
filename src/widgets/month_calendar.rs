use std::cell::Cell;
use std::rc::Rc;

use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::time_progress::days_in_month;
use super::{Widget, WidgetCtx};
use crate::config::Theme;
use crate::store::Subscription;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// The current month as a grid, weeks starting Monday, today highlighted.
pub struct MonthCalendar {
    subs: Vec<Subscription>,
    dirty: Rc<Cell<bool>>,
    today: Option<NaiveDate>,
    weeks: Vec<[Option<u32>; 7]>,
}

impl MonthCalendar {
    pub fn new() -> Self {
        Self {
            subs: Vec::new(),
            dirty: Rc::new(Cell::new(true)),
            today: None,
            weeks: Vec::new(),
        }
    }
}

/// Lays the month out as Monday-start weeks, `None` for cells outside the
/// month.
pub(crate) fn month_grid(year: i32, month: u32) -> Vec<[Option<u32>; 7]> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let lead = first.weekday().num_days_from_monday() as usize;
    let days = days_in_month(year, month);

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = lead;
    for day in 1..=days {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

impl Widget for MonthCalendar {
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
            let today = now.date_naive();
            self.weeks = month_grid(today.year(), today.month());
            self.today = Some(today);
        }
    }

    fn height(&self, _width: u16) -> u16 {
        2 + self.weeks.len().max(4) as u16
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let Some(today) = self.today else {
            frame.render_widget(Paragraph::new(""), area);
            return;
        };

        let mut lines = Vec::with_capacity(self.weeks.len() + 2);
        lines.push(Line::from(Span::styled(
            format!(
                "{} {}",
                MONTH_NAMES[today.month0() as usize],
                today.year()
            ),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            "Mo Tu We Th Fr Sa Su",
            Style::default().fg(theme.dim),
        )));

        for week in &self.weeks {
            let mut spans = Vec::with_capacity(14);
            for (i, cell) in week.iter().enumerate() {
                let text = match cell {
                    Some(day) => format!("{day:>2}"),
                    None => "  ".to_string(),
                };
                let style = match cell {
                    Some(day) if *day == today.day() => Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                    Some(_) => Style::default().fg(theme.fg),
                    None => Style::default(),
                };
                spans.push(Span::styled(text, style));
                if i < 6 {
                    spans.push(Span::raw(" "));
                }
            }
            lines.push(Line::from(spans));
        }
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_grid_june_2026() {
        // June 2026 starts on a Monday and has 30 days.
        let weeks = month_grid(2026, 6);
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0][0], Some(1));
        assert_eq!(weeks[0][6], Some(7));
        assert_eq!(weeks[4][1], Some(30));
        assert_eq!(weeks[4][2], None);
    }

    #[test]
    fn test_month_grid_leading_gap() {
        // August 2026 starts on a Saturday.
        let weeks = month_grid(2026, 8);
        assert_eq!(weeks[0][..5], [None; 5]);
        assert_eq!(weeks[0][5], Some(1));
        assert_eq!(weeks[0][6], Some(2));
        // 31 days with a 5-day lead needs 6 rows.
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[5][0], Some(31));
    }

    #[test]
    fn test_month_grid_february_exact_fit() {
        // February 2021 starts on Monday and has exactly 28 days: 4 rows.
        let weeks = month_grid(2021, 2);
        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[3][6], Some(28));
    }

    #[test]
    fn test_month_grid_invalid_month() {
        assert!(month_grid(2026, 13).is_empty());
    }
}
