use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::warn;

use super::parse::{key_values, list_items, time_of_day, ParseError};
use super::{Widget, WidgetCtx};
use crate::config::Theme;
use crate::store::Subscription;

const VISIBLE_DAYS: usize = 7;

/// Logs times-of-day against dates in a note, one day per line:
///
/// ```text
/// - 08-27 / 07:30 | 12:15 | 19:02
/// ```
///
/// The code snippet supplies `title:` and `note:` (a path under the notes
/// root). Enter (or `a`) stamps the current time onto today's line, `d`
/// removes today's latest entry, and `e` restamps it with the current time.
/// Saving rewrites the whole note from the parsed records, so any non-record
/// line in the file is dropped on the first save.
pub struct EventRecord {
    title: String,
    note: Option<String>,
    records: Vec<DayRecord>,
    error: Option<String>,
    subs: Vec<Subscription>,
    dirty: Rc<Cell<bool>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DayRecord {
    pub date: String,
    pub times: Vec<String>,
}

pub(crate) fn parse_records(content: &str) -> Vec<DayRecord> {
    let mut records = Vec::new();
    for item in list_items(content) {
        let Some((date, times)) = item.split_once('/') else {
            continue;
        };
        let date = date.trim();
        if date.len() != 5 || !date.chars().enumerate().all(|(i, c)| {
            if i == 2 { c == '-' } else { c.is_ascii_digit() }
        }) {
            continue;
        }
        let times: Vec<String> = times
            .split('|')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        records.push(DayRecord {
            date: date.to_string(),
            times,
        });
    }
    records
}

pub(crate) fn render_records(records: &[DayRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str("- ");
        out.push_str(&record.date);
        out.push_str(" / ");
        out.push_str(&record.times.join(" | "));
        out.push('\n');
    }
    out
}

pub(crate) fn append_time(records: &mut Vec<DayRecord>, date: &str, time: &str) {
    match records.iter_mut().find(|r| r.date == date) {
        Some(record) => record.times.push(time.to_string()),
        None => records.push(DayRecord {
            date: date.to_string(),
            times: vec![time.to_string()],
        }),
    }
}

/// Removes the latest time on `date`. A day left with no times disappears
/// entirely rather than rendering an empty line. Returns whether anything
/// was removed.
pub(crate) fn delete_last_time(records: &mut Vec<DayRecord>, date: &str) -> bool {
    let Some(pos) = records.iter().position(|r| r.date == date) else {
        return false;
    };
    let removed = records[pos].times.pop().is_some();
    if records[pos].times.is_empty() {
        records.remove(pos);
    }
    removed
}

/// Replaces the latest time on `date` with `new_time`, which must be a valid
/// `HH:MM`. Returns whether a time was replaced.
pub(crate) fn edit_last_time(
    records: &mut Vec<DayRecord>,
    date: &str,
    new_time: &str,
) -> Result<bool, ParseError> {
    time_of_day(new_time)?;
    let Some(last) = records
        .iter_mut()
        .find(|r| r.date == date)
        .and_then(|r| r.times.last_mut())
    else {
        return Ok(false);
    };
    *last = new_time.trim().to_string();
    Ok(true)
}

impl EventRecord {
    pub fn new(config: &crate::settings::WidgetConfig) -> Self {
        let pairs = key_values(&config.code);
        let title = pairs
            .get("title")
            .cloned()
            .unwrap_or_else(|| config.title.clone());
        Self {
            title,
            note: pairs.get("note").cloned(),
            records: Vec::new(),
            error: None,
            subs: Vec::new(),
            dirty: Rc::new(Cell::new(false)),
        }
    }

    fn stamp(&mut self, ctx: &WidgetCtx, now: DateTime<Local>) {
        let date = now.format("%m-%d").to_string();
        let time = now.format("%H:%M").to_string();
        append_time(&mut self.records, &date, &time);
        self.save(ctx);
    }

    fn delete_latest(&mut self, ctx: &WidgetCtx, now: DateTime<Local>) {
        let date = now.format("%m-%d").to_string();
        if delete_last_time(&mut self.records, &date) {
            self.save(ctx);
        }
    }

    fn restamp_latest(&mut self, ctx: &WidgetCtx, now: DateTime<Local>) {
        let date = now.format("%m-%d").to_string();
        let time = now.format("%H:%M").to_string();
        match edit_last_time(&mut self.records, &date, &time) {
            Ok(true) => self.save(ctx),
            Ok(false) => {}
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    fn save(&mut self, ctx: &WidgetCtx) {
        let Some(note) = self.note.clone() else {
            return;
        };
        if let Err(err) = ctx.notes.write(&note, &render_records(&self.records)) {
            warn!(%note, %err, "failed to write event record note");
            self.error = Some(format!("write failed: {err}"));
        }
    }
}

impl Widget for EventRecord {
    fn on_load(&mut self, ctx: &WidgetCtx) {
        let Some(note) = self.note.clone() else {
            self.error = Some("no note configured (add `note: path.md`)".to_string());
            return;
        };
        match ctx.notes.read_or_create(&note) {
            Ok(content) => self.records = parse_records(&content),
            Err(err) => {
                warn!(%note, %err, "failed to load event record note");
                self.error = Some(format!("load failed: {err}"));
            }
        }
        let dirty = Rc::clone(&self.dirty);
        self.subs
            .push(ctx.clock.subscribe("day", move || dirty.set(true)));
    }

    fn on_unload(&mut self) {
        self.subs.clear();
    }

    fn update(&mut self, _ctx: &WidgetCtx) {
        // Date rollover just moves "today"; the cached records stay valid.
        self.dirty.set(false);
    }

    fn height(&self, _width: u16) -> u16 {
        if self.error.is_some() {
            return 2;
        }
        1 + self.records.len().clamp(1, VISIBLE_DAYS) as u16
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(Span::styled(
            self.title.clone(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))];

        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(theme.border_scroll),
            )));
        } else if self.records.is_empty() {
            lines.push(Line::from(Span::styled(
                "no records yet (enter to stamp)",
                Style::default().fg(theme.dim),
            )));
        } else {
            let start = self.records.len().saturating_sub(VISIBLE_DAYS);
            for record in &self.records[start..] {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{}  ", record.date),
                        Style::default().fg(theme.dim),
                    ),
                    Span::styled(
                        record.times.join(" "),
                        Style::default().fg(theme.fg),
                    ),
                ]));
            }
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn handle_key(&mut self, ctx: &WidgetCtx, key: KeyEvent) -> bool {
        if self.note.is_none() {
            return false;
        }
        let Some(now) = ctx.clock.state().now else {
            return false;
        };
        match key.code {
            KeyCode::Enter | KeyCode::Char('a') => {
                self.stamp(ctx, now);
                true
            }
            KeyCode::Char('d') => {
                self.delete_latest(ctx, now);
                true
            }
            KeyCode::Char('e') => {
                self.restamp_latest(ctx, now);
                true
            }
            _ => false,
        }
    }

    fn interactive(&self) -> bool {
        self.note.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::notes::NotesStore;
    use crate::settings::WidgetConfig;
    use crate::store::Store;
    use crate::system_stats::StatsState;
    use chrono::TimeZone;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_parse_records() {
        let content = "\
# Morning runs

- 08-26 / 07:30 | 07:55
* 08-27 / 07:20
- not a record
- 8-27 / 07:00
random prose
";
        let records = parse_records(content);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "08-26");
        assert_eq!(records[0].times, vec!["07:30", "07:55"]);
        assert_eq!(records[1].date, "08-27");
        assert_eq!(records[1].times, vec!["07:20"]);
    }

    #[test]
    fn test_render_records_round_trips() {
        let records = vec![
            DayRecord {
                date: "08-26".to_string(),
                times: vec!["07:30".to_string(), "07:55".to_string()],
            },
            DayRecord {
                date: "08-27".to_string(),
                times: vec!["07:20".to_string()],
            },
        ];
        let rendered = render_records(&records);
        assert_eq!(rendered, "- 08-26 / 07:30 | 07:55\n- 08-27 / 07:20\n");
        assert_eq!(parse_records(&rendered), records);
    }

    #[test]
    fn test_append_time() {
        let mut records = vec![DayRecord {
            date: "08-27".to_string(),
            times: vec!["07:20".to_string()],
        }];
        append_time(&mut records, "08-27", "12:15");
        assert_eq!(records[0].times, vec!["07:20", "12:15"]);

        append_time(&mut records, "08-28", "07:31");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].date, "08-28");
    }

    #[test]
    fn test_delete_last_time_drops_empty_day() {
        let mut records = vec![
            DayRecord {
                date: "08-26".to_string(),
                times: vec!["07:30".to_string()],
            },
            DayRecord {
                date: "08-27".to_string(),
                times: vec!["07:20".to_string(), "12:15".to_string()],
            },
        ];
        assert!(delete_last_time(&mut records, "08-27"));
        assert_eq!(records[1].times, vec!["07:20"]);

        // Deleting the only remaining time removes the day line itself.
        assert!(delete_last_time(&mut records, "08-27"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "08-26");

        assert!(!delete_last_time(&mut records, "08-27"));
    }

    #[test]
    fn test_edit_last_time_replaces_latest() {
        let mut records = vec![DayRecord {
            date: "08-27".to_string(),
            times: vec!["07:20".to_string(), "12:15".to_string()],
        }];
        assert_eq!(edit_last_time(&mut records, "08-27", "12:30"), Ok(true));
        assert_eq!(records[0].times, vec!["07:20", "12:30"]);

        // No entry for that date: validated but nothing to replace.
        assert_eq!(edit_last_time(&mut records, "08-28", "08:00"), Ok(false));
    }

    #[test]
    fn test_edit_last_time_rejects_invalid_time() {
        let mut records = vec![DayRecord {
            date: "08-27".to_string(),
            times: vec!["07:20".to_string()],
        }];
        assert!(matches!(
            edit_last_time(&mut records, "08-27", "24:00"),
            Err(ParseError::InvalidTime(_))
        ));
        assert!(matches!(
            edit_last_time(&mut records, "08-27", "0900"),
            Err(ParseError::InvalidTime(_))
        ));
        // A failed edit leaves the record untouched.
        assert_eq!(records[0].times, vec!["07:20"]);
    }

    #[test]
    fn test_stamp_rewrites_note() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Clock::new();
        let ctx = WidgetCtx {
            clock: clock.store(),
            stats: Store::new(StatsState::default()),
            notes: NotesStore::new(dir.path()),
        };
        ctx.notes
            .write("runs.md", "intro text\n- 08-26 / 07:30\n")
            .unwrap();

        let config = WidgetConfig::new("Runs", "daily_event_record", "note: runs.md");
        let mut widget = EventRecord::new(&config);
        widget.on_load(&ctx);
        clock.activate(Local.with_ymd_and_hms(2026, 8, 27, 7, 20, 0).unwrap());

        widget.handle_key(&ctx, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        // The rewrite keeps records only; the intro line is gone.
        let content = ctx.notes.read("runs.md").unwrap();
        assert_eq!(content, "- 08-26 / 07:30\n- 08-27 / 07:20\n");
    }

    #[test]
    fn test_delete_and_edit_keys_rewrite_note() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Clock::new();
        let ctx = WidgetCtx {
            clock: clock.store(),
            stats: Store::new(StatsState::default()),
            notes: NotesStore::new(dir.path()),
        };
        ctx.notes
            .write("runs.md", "- 08-27 / 07:20 | 12:15\n")
            .unwrap();

        let config = WidgetConfig::new("Runs", "daily_event_record", "note: runs.md");
        let mut widget = EventRecord::new(&config);
        widget.on_load(&ctx);
        clock.activate(Local.with_ymd_and_hms(2026, 8, 27, 12, 30, 0).unwrap());

        // `e` restamps the latest entry with the current time.
        widget.handle_key(&ctx, KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE));
        assert_eq!(
            ctx.notes.read("runs.md").unwrap(),
            "- 08-27 / 07:20 | 12:30\n"
        );

        // `d` removes it, twice over empties the day out of the note.
        widget.handle_key(&ctx, KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE));
        assert_eq!(ctx.notes.read("runs.md").unwrap(), "- 08-27 / 07:20\n");
        widget.handle_key(&ctx, KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE));
        assert_eq!(ctx.notes.read("runs.md").unwrap(), "");
    }

    #[test]
    fn test_missing_note_is_inline_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = WidgetCtx {
            clock: Clock::new().store(),
            stats: Store::new(StatsState::default()),
            notes: NotesStore::new(dir.path()),
        };
        let config = WidgetConfig::new("Runs", "daily_event_record", "");
        let mut widget = EventRecord::new(&config);
        widget.on_load(&ctx);
        assert!(widget.error.is_some());
        assert!(!widget.interactive());
    }
}
