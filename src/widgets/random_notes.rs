use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::warn;

use super::{Widget, WidgetCtx};
use crate::config::Theme;
use crate::store::Subscription;

const NOTE_COUNT: usize = 5;

/// A rotating handful of notes picked at random from the notes root, for
/// resurfacing things written long ago. Each line of the code snippet is a
/// path prefix to exclude (archives, templates). The pick refreshes on date
/// rollover; `n` reshuffles on demand and Enter opens the selected note.
pub struct RandomNotes {
    excludes: Vec<String>,
    items: Vec<String>,
    selected: usize,
    rng: StdRng,
    subs: Vec<Subscription>,
    stale: Rc<Cell<bool>>,
}

impl RandomNotes {
    pub fn new(config: &crate::settings::WidgetConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub(crate) fn with_rng(config: &crate::settings::WidgetConfig, rng: StdRng) -> Self {
        let excludes = config
            .code
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            excludes,
            items: Vec::new(),
            selected: 0,
            rng,
            subs: Vec::new(),
            stale: Rc::new(Cell::new(false)),
        }
    }

    fn pick(&mut self, ctx: &WidgetCtx) {
        let candidates: Vec<String> = ctx
            .notes
            .list_notes()
            .into_iter()
            .filter(|path| !self.excludes.iter().any(|prefix| path.starts_with(prefix.as_str())))
            .collect();
        self.items = candidates
            .choose_multiple(&mut self.rng, NOTE_COUNT)
            .cloned()
            .collect();
        self.selected = 0;
    }

    fn open_selected(&self, ctx: &WidgetCtx) {
        let Some(item) = self.items.get(self.selected) else {
            return;
        };
        match ctx.notes.resolve(item) {
            Ok(path) => {
                if let Err(err) = open::that(path) {
                    warn!(note = %item, %err, "failed to open note");
                }
            }
            Err(err) => warn!(note = %item, %err, "bad note path"),
        }
    }
}

impl Widget for RandomNotes {
    fn on_load(&mut self, ctx: &WidgetCtx) {
        self.pick(ctx);
        let stale = Rc::clone(&self.stale);
        self.subs
            .push(ctx.clock.subscribe("day", move || stale.set(true)));
    }

    fn on_unload(&mut self) {
        self.subs.clear();
    }

    fn update(&mut self, ctx: &WidgetCtx) {
        if self.stale.replace(false) {
            self.pick(ctx);
        }
    }

    fn height(&self, _width: u16) -> u16 {
        (self.items.len() as u16).max(1)
    }

    fn render(&self, theme: &Theme, frame: &mut Frame, area: Rect) {
        if self.items.is_empty() {
            let empty = Paragraph::new("no notes found").style(Style::default().fg(theme.dim));
            frame.render_widget(empty, area);
            return;
        }
        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if i == self.selected {
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.fg)
                };
                let name = item.rsplit('/').next().unwrap_or(item);
                let name = name.strip_suffix(".md").unwrap_or(name);
                Line::from(Span::styled(format!("· {name}"), style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn handle_key(&mut self, ctx: &WidgetCtx, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.items.len() {
                    self.selected += 1;
                }
                true
            }
            KeyCode::Enter => {
                self.open_selected(ctx);
                true
            }
            KeyCode::Char('n') => {
                self.pick(ctx);
                true
            }
            _ => false,
        }
    }

    fn interactive(&self) -> bool {
        !self.items.is_empty()
    }
}
