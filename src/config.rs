use std::collections::HashMap;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::style::Color;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Action enum — all bindable actions
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Help,
    ReloadSidebars,
    NextSidebar,
    PrevSidebar,
    FocusNext,
    FocusPrev,
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Theme {
    pub accent: Color,
    pub border_active: Color,
    pub border_inactive: Color,
    pub border_scroll: Color,
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,
            border_scroll: Color::Yellow,
            bg: Color::Reset,
            fg: Color::Reset,
            dim: Color::DarkGray,
        }
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Behavior {
    /// Root directory for note-backed widgets. Defaults to ~/notes.
    pub notes_dir: Option<PathBuf>,
    /// Seconds between host metric samples for the system_stats widget.
    pub stats_interval_secs: u64,
    pub debug_logging: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            notes_dir: None,
            stats_interval_secs: 3,
            debug_logging: false,
        }
    }
}

impl Behavior {
    pub fn resolved_notes_dir(&self) -> PathBuf {
        self.notes_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("notes")
        })
    }
}

// ---------------------------------------------------------------------------
// KeyMap
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct KeyMap {
    map: HashMap<KeyEvent, Action>,
}

impl KeyMap {
    pub fn from_defaults() -> Self {
        let mut map = HashMap::new();

        let defaults: Vec<(&str, Action)> = vec![
            ("q", Action::Quit),
            ("?", Action::Help),
            ("r", Action::ReloadSidebars),
            ("]", Action::NextSidebar),
            ("[", Action::PrevSidebar),
            ("tab", Action::FocusNext),
            ("shift+tab", Action::FocusPrev),
        ];

        for (key_str, action) in defaults {
            if let Some(key) = parse_key(key_str) {
                map.insert(key, action);
            }
        }

        Self { map }
    }

    pub fn lookup(&self, key: &KeyEvent) -> Option<&Action> {
        self.map.get(key)
    }

    /// Apply user overrides: for each (name, key_str), parse both, remove the old
    /// binding for that action, and insert the new one.
    pub fn merge(&mut self, raw: &HashMap<String, String>) {
        let name_to_action = action_name_map();

        for (name, key_str) in raw {
            let action = match name_to_action.get(name.as_str()) {
                Some(a) => a.clone(),
                None => continue,
            };
            let new_key = match parse_key(key_str) {
                Some(k) => k,
                None => continue,
            };

            self.map.retain(|_, v| *v != action);
            self.map.insert(new_key, action);
        }
    }
}

fn action_name_map() -> HashMap<&'static str, Action> {
    let mut m = HashMap::new();
    m.insert("quit", Action::Quit);
    m.insert("help", Action::Help);
    m.insert("reload_sidebars", Action::ReloadSidebars);
    m.insert("next_sidebar", Action::NextSidebar);
    m.insert("prev_sidebar", Action::PrevSidebar);
    m.insert("focus_next", Action::FocusNext);
    m.insert("focus_prev", Action::FocusPrev);
    m
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Config {
    pub theme: Theme,
    pub behavior: Behavior,
    pub keys: KeyMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            behavior: Behavior::default(),
            keys: KeyMap::from_defaults(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = dirs::config_dir()
            .map(|d| d.join("dashbar").join("config.toml"))
            .unwrap_or_default();

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };

        let raw: RawConfig = match toml::from_str(&content) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("dashbar: invalid config at {}: {}", path.display(), e);
                return Self::default();
            }
        };

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut config = Self::default();

        if let Some(t) = raw.theme {
            if let Some(c) = t.accent.as_deref().and_then(parse_color) {
                config.theme.accent = c;
            }
            if let Some(c) = t.border_active.as_deref().and_then(parse_color) {
                config.theme.border_active = c;
            }
            if let Some(c) = t.border_inactive.as_deref().and_then(parse_color) {
                config.theme.border_inactive = c;
            }
            if let Some(c) = t.border_scroll.as_deref().and_then(parse_color) {
                config.theme.border_scroll = c;
            }
            if let Some(c) = t.bg.as_deref().and_then(parse_color) {
                config.theme.bg = c;
            }
            if let Some(c) = t.fg.as_deref().and_then(parse_color) {
                config.theme.fg = c;
            }
            if let Some(c) = t.dim.as_deref().and_then(parse_color) {
                config.theme.dim = c;
            }
        }

        if let Some(b) = raw.behavior {
            if b.notes_dir.is_some() {
                config.behavior.notes_dir = b.notes_dir.map(PathBuf::from);
            }
            if let Some(v) = b.stats_interval_secs {
                config.behavior.stats_interval_secs = v;
            }
            if let Some(v) = b.debug_logging {
                config.behavior.debug_logging = v;
            }
        }

        if let Some(keys) = raw.keys {
            config.keys.merge(&keys);
        }

        config
    }
}

// ---------------------------------------------------------------------------
// Raw TOML structs (all-optional for merge)
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct RawConfig {
    theme: Option<RawTheme>,
    behavior: Option<RawBehavior>,
    keys: Option<HashMap<String, String>>,
}

#[derive(Deserialize, Default)]
struct RawTheme {
    accent: Option<String>,
    border_active: Option<String>,
    border_inactive: Option<String>,
    border_scroll: Option<String>,
    bg: Option<String>,
    fg: Option<String>,
    dim: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawBehavior {
    notes_dir: Option<String>,
    stats_interval_secs: Option<u64>,
    debug_logging: Option<bool>,
}

// ---------------------------------------------------------------------------
// parse_key: "ctrl+shift+d" → crossterm KeyEvent
// ---------------------------------------------------------------------------

pub fn parse_key(s: &str) -> Option<KeyEvent> {
    let s = s.trim().to_lowercase();
    let parts: Vec<&str> = s.split('+').collect();

    let mut mods = KeyModifiers::NONE;
    let mut key_part = "";

    for part in &parts {
        match *part {
            "ctrl" | "control" => mods |= KeyModifiers::CONTROL,
            "alt" | "option" => mods |= KeyModifiers::ALT,
            "shift" => mods |= KeyModifiers::SHIFT,
            _ => key_part = part,
        }
    }

    let code = match key_part {
        "tab" if mods.contains(KeyModifiers::SHIFT) => {
            mods -= KeyModifiers::SHIFT;
            KeyCode::BackTab
        }
        "tab" => KeyCode::Tab,
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "space" => KeyCode::Char(' '),
        s if s.starts_with('f') && s.len() >= 2 => {
            if let Ok(n) = s[1..].parse::<u8>() {
                if (1..=12).contains(&n) {
                    KeyCode::F(n)
                } else {
                    return None;
                }
            } else {
                return None;
            }
        }
        s if s.len() == 1 => {
            let ch = s.chars().next().unwrap();
            if mods.contains(KeyModifiers::SHIFT) && ch.is_ascii_alphabetic() {
                mods -= KeyModifiers::SHIFT;
                KeyCode::Char(ch.to_ascii_uppercase())
            } else {
                KeyCode::Char(ch)
            }
        }
        _ => return None,
    };

    Some(KeyEvent {
        code,
        modifiers: mods,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    })
}

// ---------------------------------------------------------------------------
// normalize_key: strip kind/state for consistent HashMap matching
// ---------------------------------------------------------------------------

pub fn normalize_key(key: KeyEvent) -> KeyEvent {
    KeyEvent {
        code: key.code,
        modifiers: key.modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

// ---------------------------------------------------------------------------
// parse_color: "cyan", "dark_gray", "#ff0000", "#f00", "reset"
// ---------------------------------------------------------------------------

pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().to_lowercase();

    if s.starts_with('#') {
        let hex = &s[1..];
        return match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::Rgb(r, g, b))
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Color::Rgb(r, g, b))
            }
            _ => None,
        };
    }

    match s.as_str() {
        "reset" => Some(Color::Reset),
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "white" => Some(Color::White),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "light_red" | "lightred" => Some(Color::LightRed),
        "light_green" | "lightgreen" => Some(Color::LightGreen),
        "light_yellow" | "lightyellow" => Some(Color::LightYellow),
        "light_blue" | "lightblue" => Some(Color::LightBlue),
        "light_magenta" | "lightmagenta" => Some(Color::LightMagenta),
        "light_cyan" | "lightcyan" => Some(Color::LightCyan),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    // --- parse_key ---

    #[test]
    fn test_parse_key_plain_char() {
        assert_eq!(
            parse_key("q"),
            Some(make_key(KeyCode::Char('q'), KeyModifiers::NONE))
        );
    }

    #[test]
    fn test_parse_key_ctrl_shift_d() {
        // ctrl+shift+d → uppercase D, no SHIFT modifier
        assert_eq!(
            parse_key("ctrl+shift+d"),
            Some(make_key(KeyCode::Char('D'), KeyModifiers::CONTROL))
        );
    }

    #[test]
    fn test_parse_key_shift_tab_backtab() {
        assert_eq!(
            parse_key("shift+tab"),
            Some(make_key(KeyCode::BackTab, KeyModifiers::NONE))
        );
    }

    #[test]
    fn test_parse_key_case_insensitive() {
        assert_eq!(
            parse_key("Ctrl+Q"),
            Some(make_key(KeyCode::Char('q'), KeyModifiers::CONTROL))
        );
    }

    #[test]
    fn test_parse_key_invalid() {
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("ctrl+"), None);
    }

    // --- parse_color ---

    #[test]
    fn test_parse_color_named() {
        assert_eq!(parse_color("cyan"), Some(Color::Cyan));
        assert_eq!(parse_color("dark_gray"), Some(Color::DarkGray));
    }

    #[test]
    fn test_parse_color_hex() {
        assert_eq!(parse_color("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_color("#f00"), Some(Color::Rgb(255, 0, 0)));
    }

    #[test]
    fn test_parse_color_invalid() {
        assert_eq!(parse_color("nope"), None);
        assert_eq!(parse_color("#gggggg"), None);
    }

    // --- KeyMap ---

    #[test]
    fn test_keymap_defaults() {
        let km = KeyMap::from_defaults();
        let key = make_key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(km.lookup(&key), Some(&Action::Quit));
        let key = make_key(KeyCode::Char(']'), KeyModifiers::NONE);
        assert_eq!(km.lookup(&key), Some(&Action::NextSidebar));
    }

    #[test]
    fn test_keymap_merge_override() {
        let mut km = KeyMap::from_defaults();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "ctrl+x".to_string());
        km.merge(&overrides);

        let old_key = make_key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(km.lookup(&old_key), None);

        let new_key = make_key(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(km.lookup(&new_key), Some(&Action::Quit));
    }

    // --- Config::from_raw ---

    #[test]
    fn test_config_from_empty_raw() {
        let config = Config::from_raw(RawConfig::default());
        assert_eq!(config.theme.accent, Color::Cyan);
        assert_eq!(config.behavior.stats_interval_secs, 3);
    }

    #[test]
    fn test_config_from_partial_toml() {
        let toml_str = r#"
[theme]
accent = "green"

[behavior]
notes_dir = "/tmp/notes"
"#;
        let raw: RawConfig = toml::from_str(toml_str).unwrap();
        let config = Config::from_raw(raw);
        assert_eq!(config.theme.accent, Color::Green);
        assert_eq!(
            config.behavior.notes_dir,
            Some(PathBuf::from("/tmp/notes"))
        );
        // Unchanged defaults
        assert_eq!(config.theme.border_active, Color::Cyan);
        assert!(!config.behavior.debug_logging);
    }
}
