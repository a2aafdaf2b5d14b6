use std::cell::Cell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders},
    Frame,
};
use tracing::debug;

use crate::config::Theme;
use crate::settings::{GlobalConfig, SidebarConfig, SidebarsConfig, WidgetConfig};
use crate::store::{Store, Subscription};
use crate::widgets::{create_widget, Widget, WidgetCtx};

/// The id a sidebar's view is registered under. Stable across sessions so
/// saved layouts can refer to it.
pub fn registration_id(view_type: &str) -> String {
    format!("dashbar-view-{view_type}")
}

/// What [`SidebarView::refresh_if_dirty`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refresh {
    Unchanged,
    /// The definition changed; every widget was torn down and rebuilt.
    Rebuilt,
    /// The definition was deleted; the view tore itself down and the caller
    /// must drop it.
    Deleted,
}

struct Mounted {
    config: WidgetConfig,
    widget: Box<dyn Widget>,
}

/// One live sidebar panel: the mounted widgets for a single sidebar
/// definition, kept in sync with the sidebars store.
///
/// Any change to this view's entry rebuilds the whole widget list rather
/// than diffing it; widget identity is positional and cheap to recreate.
/// Each mounted widget sees exactly one `on_load` and one `on_unload`.
pub struct SidebarView {
    view_type: String,
    title: String,
    ctx: WidgetCtx,
    sidebars: Store<SidebarsConfig>,
    global: Store<GlobalConfig>,
    widgets: Vec<Mounted>,
    focused: Option<usize>,
    dirty: Rc<Cell<bool>>,
    _subs: Vec<Subscription>,
}

impl SidebarView {
    /// Mounts the sidebar registered under `view_type`. Fails if no such
    /// definition exists.
    pub fn mount(
        view_type: &str,
        sidebars: Store<SidebarsConfig>,
        global: Store<GlobalConfig>,
        ctx: WidgetCtx,
    ) -> Result<Self> {
        let config = sidebars
            .state()
            .get(view_type)
            .cloned()
            .ok_or_else(|| anyhow!("no sidebar registered for view type {view_type:?}"))?;

        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        let entry_sub = sidebars.subscribe(view_type, move || flag.set(true));
        // Global config changes take the same rebuild path as entry changes.
        let flag = Rc::clone(&dirty);
        let global_sub = global.subscribe("", move || flag.set(true));
        let subs = vec![entry_sub, global_sub];

        let mut view = Self {
            view_type: view_type.to_string(),
            title: config.title.clone(),
            ctx,
            sidebars,
            global,
            widgets: Vec::new(),
            focused: None,
            dirty,
            _subs: subs,
        };
        view.build(&config);
        debug!(view_type, id = %registration_id(view_type), "sidebar mounted");
        Ok(view)
    }

    pub fn view_type(&self) -> &str {
        &self.view_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn build(&mut self, config: &SidebarConfig) {
        self.title = config.title.clone();
        for widget_config in &config.widgets {
            let mut widget = create_widget(widget_config);
            widget.on_load(&self.ctx);
            self.widgets.push(Mounted {
                config: widget_config.clone(),
                widget,
            });
        }
        self.focused = self
            .widgets
            .iter()
            .position(|m| m.widget.interactive());
    }

    fn unload_all(&mut self) {
        for mounted in &mut self.widgets {
            mounted.widget.on_unload();
        }
        self.widgets.clear();
        self.focused = None;
    }

    /// Applies a pending definition change. Unchanged definitions are left
    /// alone so widget state (running timers, selections) survives ordinary
    /// frames.
    pub fn refresh_if_dirty(&mut self) -> Refresh {
        if !self.dirty.replace(false) {
            return Refresh::Unchanged;
        }
        match self.sidebars.state().get(&self.view_type).cloned() {
            Some(config) => {
                self.unload_all();
                self.build(&config);
                debug!(view_type = %self.view_type, "sidebar rebuilt");
                Refresh::Rebuilt
            }
            None => {
                self.unload_all();
                debug!(view_type = %self.view_type, "sidebar definition deleted, unmounting");
                Refresh::Deleted
            }
        }
    }

    /// Tears down every widget. Called when the panel closes for any reason
    /// other than definition deletion.
    pub fn unmount(&mut self) {
        self.unload_all();
    }

    // --- focus -----------------------------------------------------------

    pub fn focus_next(&mut self) {
        self.shift_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.shift_focus(-1);
    }

    fn shift_focus(&mut self, step: isize) {
        let count = self.widgets.len() as isize;
        if count == 0 {
            return;
        }
        let mut index = self.focused.map(|i| i as isize).unwrap_or(-step);
        for _ in 0..count {
            index = (index + step).rem_euclid(count);
            if self.widgets[index as usize].widget.interactive() {
                self.focused = Some(index as usize);
                return;
            }
        }
    }

    /// Routes a key to the focused widget. Returns `true` if consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(index) = self.focused else {
            return false;
        };
        let ctx = self.ctx.clone();
        self.widgets[index].widget.handle_key(&ctx, key)
    }

    // --- drawing ---------------------------------------------------------

    /// Total rows the panel wants at `width`, including card chrome.
    pub fn content_height(&self, width: u16) -> u16 {
        let card = self.card_style();
        self.widgets
            .iter()
            .map(|m| {
                let inner = if card { width.saturating_sub(2) } else { width };
                let chrome = if card { 2 } else { 0 };
                m.widget.height(inner) + chrome + 1
            })
            .sum()
    }

    fn card_style(&self) -> bool {
        // Per-widget styles override, but the panel layout follows the
        // global default.
        self.global.state().sidebar_style == "card"
    }

    pub fn render(&mut self, theme: &Theme, frame: &mut Frame, area: Rect) {
        let global = self.global.state();
        let ctx = self.ctx.clone();
        let mut y = area.y;

        for (index, mounted) in self.widgets.iter_mut().enumerate() {
            if y >= area.y + area.height {
                break;
            }
            mounted.widget.update(&ctx);

            let card = mounted.config.effective_style(&global) == "card";
            let inner_width = if card {
                area.width.saturating_sub(2)
            } else {
                area.width
            };
            let widget_height = mounted.widget.height(inner_width);
            let outer_height = widget_height + if card { 2 } else { 0 };
            let remaining = area.y + area.height - y;
            let outer = Rect {
                x: area.x,
                y,
                width: area.width,
                height: outer_height.min(remaining),
            };

            let inner = if card {
                let border_style = if self.focused == Some(index) {
                    Style::default().fg(theme.border_active)
                } else {
                    Style::default().fg(theme.border_inactive)
                };
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(mounted.config.title.as_str());
                let inner = block.inner(outer);
                frame.render_widget(block, outer);
                inner
            } else {
                outer
            };

            if inner.height > 0 {
                mounted.widget.render(theme, frame, inner);
            }
            y += outer_height + 1;
        }
    }
}
