use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::{normalize_key, Action, Config};
use crate::event::{self, AppEvent};
use crate::notes::NotesStore;
use crate::settings::persist::{self, PersistedConfig};
use crate::settings::{
    diff_sidebars, GlobalConfig, GlobalPatch, SidebarsConfig, DEFAULT_SIDEBAR_ID,
};
use crate::sidebar::{Refresh, SidebarView};
use crate::store::Store;
use crate::system_stats::{self, StatsState};
use crate::tui::Tui;
use crate::ui;
use crate::widgets::WidgetCtx;

pub struct App {
    pub config: Config,
    pub should_quit: bool,
    pub help_visible: bool,
    pub clock: Clock,
    pub global: Store<GlobalConfig>,
    pub sidebars: Store<SidebarsConfig>,
    pub ctx: WidgetCtx,
    pub view: Option<SidebarView>,
}

impl App {
    pub fn new(config: Config, persisted: PersistedConfig) -> Self {
        let clock = Clock::new();
        let global = Store::new(persisted.global);
        let sidebars = Store::new(persisted.sidebars);
        let notes = NotesStore::new(config.behavior.resolved_notes_dir());
        let ctx = WidgetCtx {
            clock: clock.store(),
            stats: Store::new(StatsState::default()),
            notes,
        };
        Self {
            config,
            should_quit: false,
            help_visible: false,
            clock,
            global,
            sidebars,
            ctx,
            view: None,
        }
    }

    pub async fn run(config: Config) -> Result<()> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        event::start_event_loop(event_tx.clone());
        system_stats::start_stats_collector(event_tx, config.behavior.stats_interval_secs);

        // First run seeds the blob so the user has a file to edit.
        let persisted = persist::load().unwrap_or_else(|| {
            let fresh = PersistedConfig::default();
            if let Err(e) = persist::save(&fresh) {
                warn!("could not write initial sidebars file: {e:#}");
            }
            fresh
        });

        let mut app = Self::new(config, persisted);
        app.clock.activate(Local::now());
        app.mount_view(DEFAULT_SIDEBAR_ID);

        let mut tui = Tui::new()?;
        tui.enter()?;

        while !app.should_quit {
            tui.draw(|frame| ui::render(&mut app, frame))?;

            let Some(event) = event_rx.recv().await else {
                break;
            };
            app.handle_event(event);
        }

        tui.exit();
        app.clock.deactivate();
        app.save();
        Ok(())
    }

    // --- events ----------------------------------------------------------

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => {
                self.clock.tick(Local::now());
                self.refresh_view();
            }
            AppEvent::SystemStats(stats) => {
                self.ctx.stats.update(stats);
            }
            AppEvent::Key(key) => self.handle_key(normalize_key(key)),
            AppEvent::Resize(_, _) => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.help_visible {
            // Any of the usual dismissal keys closes the overlay.
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
            ) {
                self.help_visible = false;
            }
            return;
        }

        match self.config.keys.lookup(&key).cloned() {
            Some(Action::Quit) => self.should_quit = true,
            Some(Action::Help) => self.help_visible = true,
            Some(Action::ReloadSidebars) => self.reload_sidebars(),
            Some(Action::NextSidebar) => self.switch_view(1),
            Some(Action::PrevSidebar) => self.switch_view(-1),
            Some(Action::FocusNext) => {
                if let Some(view) = &mut self.view {
                    view.focus_next();
                }
            }
            Some(Action::FocusPrev) => {
                if let Some(view) = &mut self.view {
                    view.focus_prev();
                }
            }
            None => {
                if let Some(view) = &mut self.view {
                    view.handle_key(key);
                }
            }
        }
    }

    // --- sidebar views ---------------------------------------------------

    pub fn mount_view(&mut self, view_type: &str) {
        if let Some(mut old) = self.view.take() {
            old.unmount();
        }
        match SidebarView::mount(
            view_type,
            self.sidebars.clone(),
            self.global.clone(),
            self.ctx.clone(),
        ) {
            Ok(view) => self.view = Some(view),
            Err(e) => {
                warn!("cannot mount sidebar {view_type:?}: {e:#}");
                // The default sidebar is re-seeded on load, so this only
                // fails if it was mutated away in memory.
                if view_type != DEFAULT_SIDEBAR_ID {
                    self.mount_view(DEFAULT_SIDEBAR_ID);
                }
            }
        }
    }

    /// Applies a pending definition change to the open panel. A deleted
    /// definition falls back to the default sidebar.
    fn refresh_view(&mut self) {
        let Some(view) = &mut self.view else {
            return;
        };
        if view.refresh_if_dirty() == Refresh::Deleted {
            self.view = None;
            self.mount_view(DEFAULT_SIDEBAR_ID);
        }
    }

    fn switch_view(&mut self, step: isize) {
        let types: Vec<String> = self.sidebars.state().keys().cloned().collect();
        if types.is_empty() {
            return;
        }
        let current = self
            .view
            .as_ref()
            .and_then(|v| types.iter().position(|t| t == v.view_type()))
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(types.len() as isize) as usize;
        let target = types[next].clone();
        self.mount_view(&target);
    }

    /// Re-reads the blob from disk and patches the stores with the
    /// difference, so open panels only rebuild when their entry changed.
    fn reload_sidebars(&mut self) {
        let Some(loaded) = persist::load() else {
            warn!("reload requested but the sidebars file is missing or invalid");
            return;
        };

        let patch = diff_sidebars(&self.sidebars.state(), &loaded.sidebars);
        if !patch.is_empty() {
            self.sidebars.update(patch);
        }
        if loaded.global != self.global.state() {
            self.global.update(GlobalPatch {
                sidebar_style: Some(loaded.global.sidebar_style),
            });
        }
        info!("sidebars reloaded from disk");
        self.refresh_view();
    }

    fn save(&self) {
        let config = PersistedConfig {
            global: self.global.state(),
            sidebars: self.sidebars.state(),
            ..PersistedConfig::default()
        };
        if let Err(e) = persist::save(&config) {
            warn!("could not save sidebars file: {e:#}");
        }
    }
}
