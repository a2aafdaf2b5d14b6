use std::cell::Cell;
use std::rc::Rc;

use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::parse::key_values;
use super::{Widget, WidgetCtx};
use crate::config::Theme;
use crate::store::Subscription;

const DEFAULT_NAME: &str = "Untitled event";

/// Days until (or since) a target date. The code snippet supplies `name:`
/// and `date:` (`YYYY-MM-DD`); a missing date counts down to today, an
/// unparseable one is reported inline.
pub struct CountdownDay {
    name: String,
    date: Result<Option<NaiveDate>, String>,
    subs: Vec<Subscription>,
    dirty: Rc<Cell<bool>>,
    display: CountdownDisplay,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum CountdownDisplay {
    #[default]
    Pending,
    Days {
        message: String,
        count: String,
    },
    BadDate(String),
}

pub(crate) fn countdown_display(name: &str, days: i64) -> CountdownDisplay {
    if days > 0 {
        CountdownDisplay::Days {
            message: format!("{name} in"),
            count: format!("{days} {}", if days == 1 { "day" } else { "days" }),
        }
    } else if days == 0 {
        CountdownDisplay::Days {
            message: format!("{name} is"),
            count: "today".to_string(),
        }
    } else {
        let days = -days;
        CountdownDisplay::Days {
            message: format!("{name} was"),
            count: format!("{days} {} ago", if days == 1 { "day" } else { "days" }),
        }
    }
}

impl CountdownDay {
    pub fn new(config: &crate::settings::WidgetConfig) -> Self {
        let pairs = key_values(&config.code);
        let name = pairs
            .get("name")
            .cloned()
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let date = match pairs.get("date") {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| raw.clone()),
        };
        Self {
            name,
            date,
            subs: Vec::new(),
            dirty: Rc::new(Cell::new(true)),
            display: CountdownDisplay::Pending,
        }
    }
}

impl Widget for CountdownDay {
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
        let Some(now) = ctx.clock.state().now else {
            return;
        };
        let today = now.date_naive();
        self.display = match &self.date {
            Err(raw) => CountdownDisplay::BadDate(raw.clone()),
            Ok(target) => {
                let target = target.unwrap_or(today);
                let days = (target - today).num_days();
                countdown_display(&self.name, days)
            }
        };
    }

    fn height(&self, _width: u16) -> u16 {
        2
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let lines = match &self.display {
            CountdownDisplay::Pending => vec![Line::from("")],
            CountdownDisplay::BadDate(raw) => vec![Line::from(Span::styled(
                format!("invalid date: {raw}"),
                Style::default().fg(theme.border_scroll),
            ))],
            CountdownDisplay::Days { message, count } => vec![
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(theme.fg),
                )),
                Line::from(Span::styled(
                    count.clone(),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                )),
            ],
        };
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::WidgetConfig;

    #[test]
    fn test_display_future_today_past() {
        assert_eq!(
            countdown_display("Launch", 10),
            CountdownDisplay::Days {
                message: "Launch in".to_string(),
                count: "10 days".to_string(),
            }
        );
        assert_eq!(
            countdown_display("Launch", 1),
            CountdownDisplay::Days {
                message: "Launch in".to_string(),
                count: "1 day".to_string(),
            }
        );
        assert_eq!(
            countdown_display("Launch", 0),
            CountdownDisplay::Days {
                message: "Launch is".to_string(),
                count: "today".to_string(),
            }
        );
        assert_eq!(
            countdown_display("Launch", -3),
            CountdownDisplay::Days {
                message: "Launch was".to_string(),
                count: "3 days ago".to_string(),
            }
        );
    }

    #[test]
    fn test_new_parses_code() {
        let config = WidgetConfig::new("w", "countdown_day", "name: Launch\ndate: 2026-12-01");
        let widget = CountdownDay::new(&config);
        assert_eq!(widget.name, "Launch");
        assert_eq!(
            widget.date,
            Ok(NaiveDate::from_ymd_opt(2026, 12, 1))
        );
    }

    #[test]
    fn test_new_defaults_and_bad_date() {
        let widget = CountdownDay::new(&WidgetConfig::new("w", "countdown_day", ""));
        assert_eq!(widget.name, DEFAULT_NAME);
        assert_eq!(widget.date, Ok(None));

        let widget =
            CountdownDay::new(&WidgetConfig::new("w", "countdown_day", "date: someday"));
        assert_eq!(widget.date, Err("someday".to_string()));
    }
}
