pub mod parse;

mod code_block;
mod countdown_day;
mod countdown_timer;
mod digital_clock;
mod event_record;
mod header;
mod month_calendar;
mod quick_nav;
mod random_notes;
mod stats;
mod text;
mod time_progress;
mod working_time;
mod year_points;

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::clock::ClockState;
use crate::config::Theme;
use crate::notes::NotesStore;
use crate::settings::WidgetConfig;
use crate::store::Store;
use crate::system_stats::StatsState;

// ---------------------------------------------------------------------------
// Widget trait — the lifecycle every renderer implements
// ---------------------------------------------------------------------------

/// Shared services handed to every widget. Cloning is cheap; the stores are
/// handles onto shared state.
#[derive(Clone)]
pub struct WidgetCtx {
    pub clock: Store<ClockState>,
    pub stats: Store<StatsState>,
    pub notes: NotesStore,
}

/// One mounted widget inside a sidebar panel.
///
/// `on_load` subscribes to the stores it needs and must not fail: a widget
/// with bad code renders its problem inline instead of erroring out, so one
/// broken snippet never takes down the panel. `on_unload` drops every
/// subscription; the panel calls it exactly once per mounted widget.
pub trait Widget {
    fn on_load(&mut self, ctx: &WidgetCtx);

    fn on_unload(&mut self);

    /// Recomputes cached content if the widget's inputs changed since the
    /// last frame. Called once per draw, before [`render`](Widget::render).
    fn update(&mut self, ctx: &WidgetCtx);

    /// Rows this widget occupies at the given panel width.
    fn height(&self, width: u16) -> u16;

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect);

    /// Handles a key while this widget is focused. Returns `true` if the key
    /// was consumed.
    fn handle_key(&mut self, ctx: &WidgetCtx, key: KeyEvent) -> bool {
        let _ = (ctx, key);
        false
    }

    /// Whether the widget reacts to keys at all; focus cycling skips the
    /// ones that do not.
    fn interactive(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Kind registry
// ---------------------------------------------------------------------------

/// The fixed renderer registry. Unrecognized type strings are preserved in
/// [`Unknown`](WidgetKind::Unknown) and render through the code-block
/// fallback with the string as language tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetKind {
    Header(u8),
    DigitalClock,
    TimeProgress,
    WorkingTimeProgress,
    CountdownDay,
    CountdownTimer,
    QuickNav,
    RandomNotes,
    YearPoints,
    MonthCalendar,
    Text,
    EventRecord,
    SystemStats,
    Unknown(String),
}

impl WidgetKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "header_1" => Self::Header(1),
            "header_2" => Self::Header(2),
            "header_3" => Self::Header(3),
            "digital_clock" => Self::DigitalClock,
            "time_progress" => Self::TimeProgress,
            "working_time_progress" => Self::WorkingTimeProgress,
            "countdown_day" => Self::CountdownDay,
            "countdown_timer" => Self::CountdownTimer,
            "quick_nav" => Self::QuickNav,
            "random_notes" => Self::RandomNotes,
            "year_points" => Self::YearPoints,
            "month_calendar" => Self::MonthCalendar,
            "text" => Self::Text,
            "daily_event_record" => Self::EventRecord,
            "system_stats" => Self::SystemStats,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Builds the renderer for a widget entry. Infallible: anything the registry
/// does not know becomes a code block.
pub fn create_widget(config: &WidgetConfig) -> Box<dyn Widget> {
    match WidgetKind::parse(&config.kind) {
        WidgetKind::Header(level) => Box::new(header::Header::new(config, level)),
        WidgetKind::DigitalClock => Box::new(digital_clock::DigitalClock::new()),
        WidgetKind::TimeProgress => Box::new(time_progress::TimeProgress::new()),
        WidgetKind::WorkingTimeProgress => {
            Box::new(working_time::WorkingTimeProgress::new(config))
        }
        WidgetKind::CountdownDay => Box::new(countdown_day::CountdownDay::new(config)),
        WidgetKind::CountdownTimer => Box::new(countdown_timer::CountdownTimer::new(config)),
        WidgetKind::QuickNav => Box::new(quick_nav::QuickNav::new(config)),
        WidgetKind::RandomNotes => Box::new(random_notes::RandomNotes::new(config)),
        WidgetKind::YearPoints => Box::new(year_points::YearPoints::new()),
        WidgetKind::MonthCalendar => Box::new(month_calendar::MonthCalendar::new()),
        WidgetKind::Text => Box::new(text::Text::new(config)),
        WidgetKind::EventRecord => Box::new(event_record::EventRecord::new(config)),
        WidgetKind::SystemStats => Box::new(stats::SystemStats::new()),
        WidgetKind::Unknown(kind) => Box::new(code_block::CodeBlock::new(config, kind)),
    }
}

// ---------------------------------------------------------------------------
// Navigation targets
// ---------------------------------------------------------------------------

/// Where a quick-nav entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavTarget {
    /// A URL with a scheme; opened with the system handler.
    External(String),
    /// A note path relative to the notes root.
    Note(String),
}

/// Anything shaped `scheme://...` is external; everything else is a note
/// path.
pub fn nav_target(link: &str) -> NavTarget {
    let is_external = link
        .split_once("://")
        .map(|(scheme, _)| {
            !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or(false);
    if is_external {
        NavTarget::External(link.to_string())
    } else {
        NavTarget::Note(link.to_string())
    }
}

// ---------------------------------------------------------------------------
// Shared rendering helpers
// ---------------------------------------------------------------------------

/// A fixed-width progress meter, filled left to right.
pub(crate) fn meter(fraction: f64, width: u16) -> String {
    let width = width as usize;
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push('█');
    }
    for _ in filled..width {
        bar.push('░');
    }
    bar
}
