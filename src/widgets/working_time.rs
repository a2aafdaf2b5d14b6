use std::cell::Cell;
use std::rc::Rc;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::parse::{key_values, time_of_day};
use super::{meter, Widget, WidgetCtx};
use crate::config::Theme;
use crate::store::Subscription;

const DEFAULT_START: (u32, u32) = (9, 0);
const DEFAULT_END: (u32, u32) = (18, 0);

/// Progress through a daily working window. The code snippet supplies
/// `start:` and `end:` as `HH:MM`; an end at or before the start, or one
/// prefixed with `+`, rolls over past midnight.
pub struct WorkingTimeProgress {
    window: WorkWindow,
    subs: Vec<Subscription>,
    dirty: Rc<Cell<bool>>,
    status: WorkStatus,
}

/// Start and end in minutes from midnight; `end` exceeds 1440 when the
/// window crosses midnight, so `end > start` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WorkWindow {
    pub start: u32,
    pub end: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum WorkStatus {
    Working { fraction: f64, remaining_min: u32 },
    Resting { until_start_min: u32 },
}

pub(crate) fn parse_window(code: &str) -> WorkWindow {
    let pairs = key_values(code);
    let raw_end = pairs.get("end").map(String::as_str).unwrap_or("18:00");
    let overnight_marker = raw_end.starts_with('+');

    let (sh, sm) = pairs
        .get("start")
        .and_then(|s| time_of_day(s).ok())
        .unwrap_or(DEFAULT_START);
    let (eh, em) = time_of_day(raw_end.trim_start_matches('+')).unwrap_or(DEFAULT_END);

    let start = sh * 60 + sm;
    let mut end = eh * 60 + em;
    if end <= start || overnight_marker {
        end += 1440;
    }
    WorkWindow { start, end }
}

/// `now_min` is minutes from today's midnight, in `0..1440`.
pub(crate) fn work_status(now_min: u32, window: &WorkWindow) -> WorkStatus {
    let total = (window.end - window.start) as f64;

    // Inside today's window.
    if now_min >= window.start && now_min <= window.end {
        let elapsed = now_min - window.start;
        return WorkStatus::Working {
            fraction: elapsed as f64 / total,
            remaining_min: window.end - now_min,
        };
    }

    // Early morning inside a window that started yesterday.
    if window.end > 1440 && now_min + 1440 <= window.end {
        let shifted = now_min + 1440;
        return WorkStatus::Working {
            fraction: (shifted - window.start) as f64 / total,
            remaining_min: window.end - shifted,
        };
    }

    let until_start = if now_min < window.start {
        window.start - now_min
    } else {
        window.start + 1440 - now_min
    };
    WorkStatus::Resting {
        until_start_min: until_start,
    }
}

pub(crate) fn format_minutes(minutes: u32) -> String {
    if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{} h {} min", minutes / 60, minutes % 60)
    }
}

impl WorkingTimeProgress {
    pub fn new(config: &crate::settings::WidgetConfig) -> Self {
        Self {
            window: parse_window(&config.code),
            subs: Vec::new(),
            dirty: Rc::new(Cell::new(true)),
            status: WorkStatus::Resting { until_start_min: 0 },
        }
    }
}

impl Widget for WorkingTimeProgress {
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
            use chrono::Timelike;
            let now_min = now.hour() * 60 + now.minute();
            self.status = work_status(now_min, &self.window);
        }
    }

    fn height(&self, _width: u16) -> u16 {
        3
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let meter_width = area.width.saturating_sub(2).max(4);
        let lines = match self.status {
            WorkStatus::Working {
                fraction,
                remaining_min,
            } => vec![
                Line::from(Span::styled(
                    "Working",
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    meter(fraction, meter_width),
                    Style::default().fg(theme.accent),
                )),
                Line::from(Span::styled(
                    format!("{} left", format_minutes(remaining_min)),
                    Style::default().fg(theme.dim),
                )),
            ],
            WorkStatus::Resting { until_start_min } => vec![
                Line::from(Span::styled(
                    "Off duty",
                    Style::default().fg(theme.dim).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    meter(0.0, meter_width),
                    Style::default().fg(theme.dim),
                )),
                Line::from(Span::styled(
                    format!("starts in {}", format_minutes(until_start_min)),
                    Style::default().fg(theme.dim),
                )),
            ],
        };
        frame.render_widget(Paragraph::new(lines), area);
    }
}
