use serde_json::{json, Value};

use crate::settings::{CONFIG_VERSION, DEFAULT_SIDEBAR_ID};

/// Title given to the default sidebar when legacy widgets are lifted into it.
pub const DEFAULT_SIDEBAR_TITLE: &str = "Default";

/// Upgrades a persisted blob from any earlier shape to the current
/// `{configVersion, global, sidebars}` form.
///
/// Detection is structural rather than version-based, since the earliest
/// releases never wrote a version number. Two independent legacy shapes fold:
///
/// * a flat top-level `widgets` array (pre-multi-sidebar) is lifted into
///   `sidebars.default`;
/// * a flat top-level `sidebarStyle` string is lifted into `global`.
///
/// Both may be present on the same input. The function is idempotent: a
/// current-shape blob passes through unchanged, so callers can run it
/// unconditionally on every load.
pub fn migrate(mut blob: Value) -> Value {
    let Value::Object(map) = &mut blob else {
        return blob;
    };

    if let Some(widgets) = map.remove("widgets") {
        map.insert("configVersion".to_string(), json!(CONFIG_VERSION));
        map.insert(
            "sidebars".to_string(),
            json!({
                DEFAULT_SIDEBAR_ID: {
                    "title": DEFAULT_SIDEBAR_TITLE,
                    "viewType": DEFAULT_SIDEBAR_ID,
                    "widgets": widgets,
                }
            }),
        );
    }

    if let Some(style) = map.remove("sidebarStyle") {
        map.insert("configVersion".to_string(), json!(CONFIG_VERSION));
        map.insert("global".to_string(), json!({ "sidebarStyle": style }));
    }

    blob
}
