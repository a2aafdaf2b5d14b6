use std::cell::Cell;
use std::rc::Rc;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{Widget, WidgetCtx};
use crate::clock::ClockState;
use crate::config::Theme;
use crate::store::Subscription;

/// Wall clock in `HH:MM` with a separator that blinks on even seconds.
pub struct DigitalClock {
    subs: Vec<Subscription>,
    dirty: Rc<Cell<bool>>,
    hours: String,
    minutes: String,
    blink: bool,
}

impl DigitalClock {
    pub fn new() -> Self {
        Self {
            subs: Vec::new(),
            dirty: Rc::new(Cell::new(true)),
            hours: "--".to_string(),
            minutes: "--".to_string(),
            blink: false,
        }
    }
}

pub(crate) fn clock_face(state: &ClockState) -> Option<(String, String, bool)> {
    let now = state.now?;
    use chrono::Timelike;
    Some((
        format!("{:02}", now.hour()),
        format!("{:02}", now.minute()),
        now.second() % 2 == 0,
    ))
}

impl Widget for DigitalClock {
    fn on_load(&mut self, ctx: &WidgetCtx) {
        let dirty = Rc::clone(&self.dirty);
        self.subs
            .push(ctx.clock.subscribe("second", move || dirty.set(true)));
    }

    fn on_unload(&mut self) {
        self.subs.clear();
    }

    fn update(&mut self, ctx: &WidgetCtx) {
        if !self.dirty.replace(false) {
            return;
        }
        if let Some((hours, minutes, blink)) = clock_face(&ctx.clock.state()) {
            self.hours = hours;
            self.minutes = minutes;
            self.blink = blink;
        }
    }

    fn height(&self, _width: u16) -> u16 {
        1
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let digit = Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD);
        let separator = if self.blink {
            Style::default().fg(theme.dim)
        } else {
            digit
        };
        let line = Line::from(vec![
            Span::styled(self.hours.clone(), digit),
            Span::styled(":", separator),
            Span::styled(self.minutes.clone(), digit),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_clock_face() {
        let state = ClockState {
            now: Some(Local.with_ymd_and_hms(2026, 8, 27, 9, 5, 4).unwrap()),
            ..Default::default()
        };
        assert_eq!(
            clock_face(&state),
            Some(("09".to_string(), "05".to_string(), true))
        );
    }

    #[test]
    fn test_clock_face_before_first_tick() {
        assert_eq!(clock_face(&ClockState::default()), None);
    }
}
