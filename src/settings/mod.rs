pub mod persist;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::State;

/// The reserved sidebar id. It always exists and cannot be deleted; panel
/// teardown via config deletion only applies to user-created sidebars.
pub const DEFAULT_SIDEBAR_ID: &str = "default";

pub const CONFIG_VERSION: u32 = 2;

// ---------------------------------------------------------------------------
// Config data model (wire shape: camelCase JSON blob)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub sidebar_style: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            sidebar_style: "card".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub title: String,
    /// Selects the renderer. Values outside the fixed registry fall back to
    /// the code-block renderer, where this doubles as the language tag.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_widget_style")]
    pub style: String,
    /// Opaque renderer-specific payload; grammar and defaults belong to the
    /// selected renderer.
    #[serde(default)]
    pub code: String,
}

fn default_widget_style() -> String {
    "default".to_string()
}

impl WidgetConfig {
    pub fn new(title: &str, kind: &str, code: &str) -> Self {
        Self {
            title: title.to_string(),
            kind: kind.to_string(),
            style: default_widget_style(),
            code: code.to_string(),
        }
    }

    /// A widget styled `"default"` (or not at all) inherits the global
    /// sidebar style; anything else overrides it.
    pub fn effective_style(&self, global: &GlobalConfig) -> String {
        if self.style.is_empty() || self.style == "default" {
            global.sidebar_style.clone()
        } else {
            self.style.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarConfig {
    pub title: String,
    pub view_type: String,
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
}

/// All configured sidebars, keyed by `view_type`.
pub type SidebarsConfig = BTreeMap<String, SidebarConfig>;

// ---------------------------------------------------------------------------
// Store patches
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct GlobalPatch {
    pub sidebar_style: Option<String>,
}

impl State for GlobalConfig {
    type Patch = GlobalPatch;

    fn apply(&mut self, patch: GlobalPatch) -> Vec<String> {
        let mut touched = Vec::new();
        if let Some(style) = patch.sidebar_style {
            self.sidebar_style = style;
            touched.push("sidebar_style".to_string());
        }
        touched
    }
}

/// Patch for the sidebars map: `Some` upserts an entry, `None` deletes it.
/// Deletion is how removing a sidebar definition tears down its live panel.
pub type SidebarsPatch = BTreeMap<String, Option<SidebarConfig>>;

impl State for SidebarsConfig {
    type Patch = SidebarsPatch;

    fn apply(&mut self, patch: SidebarsPatch) -> Vec<String> {
        let mut touched = Vec::new();
        for (view_type, entry) in patch {
            match entry {
                Some(config) => {
                    self.insert(view_type.clone(), config);
                }
                None => {
                    self.remove(&view_type);
                }
            }
            touched.push(view_type);
        }
        touched
    }
}

/// Computes the patch that turns `current` into `next`: upserts for changed
/// or new entries, deletions for entries that disappeared. Used when the
/// blob is reloaded from disk so open panels only hear about real changes.
pub fn diff_sidebars(current: &SidebarsConfig, next: &SidebarsConfig) -> SidebarsPatch {
    let mut patch = SidebarsPatch::new();
    for (view_type, config) in next {
        if current.get(view_type) != Some(config) {
            patch.insert(view_type.clone(), Some(config.clone()));
        }
    }
    for view_type in current.keys() {
        if !next.contains_key(view_type) {
            patch.insert(view_type.clone(), None);
        }
    }
    patch
}

// ---------------------------------------------------------------------------
// Seeded defaults
// ---------------------------------------------------------------------------

/// The sidebar every fresh install starts with.
pub fn default_sidebar() -> SidebarConfig {
    SidebarConfig {
        title: "Default".to_string(),
        view_type: DEFAULT_SIDEBAR_ID.to_string(),
        widgets: vec![
            WidgetConfig::new("Welcome", "header_1", "Hello World!"),
            WidgetConfig::new("Clock", "digital_clock", ""),
            WidgetConfig::new("Calendar", "month_calendar", ""),
            WidgetConfig::new("Time Progress", "time_progress", ""),
            WidgetConfig::new(
                "About",
                "text",
                "Edit sidebars.json to add widgets to this sidebar.",
            ),
        ],
    }
}

pub fn default_sidebars() -> SidebarsConfig {
    let mut sidebars = SidebarsConfig::new();
    sidebars.insert(DEFAULT_SIDEBAR_ID.to_string(), default_sidebar());
    sidebars
}
