//! Binder configuration and per-canvas declarative attributes.

use serde::{Deserialize, Serialize};

/// Intersection ratio at or above which a canvas counts as visible.
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

/// Attribute holding the module location.
pub const MODULE_ATTR: &str = "data-module";
/// Attribute overriding the backing-store width.
pub const WIDTH_ATTR: &str = "data-width";
/// Attribute overriding the backing-store height.
pub const HEIGHT_ATTR: &str = "data-height";
/// Attribute holding the poster image URL.
pub const POSTER_ATTR: &str = "data-poster";

/// Configuration shared by every binding created in one `bind_all` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Minimum intersection ratio for a canvas to count as visible.
    pub visibility_threshold: f64,
    /// Ratios at which the host's intersection observer should report.
    pub observer_thresholds: Vec<f64>,
    /// Prefix for synthesized canvas ids.
    pub id_prefix: String,
    /// Class present on the canvas while its module loads.
    pub activating_class: String,
    /// Class present on the canvas while its poster is shown.
    pub poster_class: String,
    /// Class of the inline failure paragraph.
    pub warning_class: String,
    /// Text placed before the failure message.
    pub failure_prefix: String,
    /// Keyboard keys that start a demo.
    pub start_keys: Vec<String>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: VISIBILITY_THRESHOLD,
            observer_thresholds: vec![0.0, 0.1, 0.25, 0.5, 0.75, 1.0],
            id_prefix: "demo-canvas-".to_string(),
            activating_class: "demo-activating".to_string(),
            poster_class: "with-poster".to_string(),
            warning_class: "warn".to_string(),
            failure_prefix: "Demo failed to load".to_string(),
            start_keys: vec!["Enter".to_string(), " ".to_string()],
        }
    }
}

impl BinderConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether `key` should start a demo.
    #[must_use]
    pub fn is_start_key(&self, key: &str) -> bool {
        self.start_keys.iter().any(|k| k == key)
    }

    /// Text of the inline failure paragraph.
    #[must_use]
    pub fn failure_text(&self, message: &str) -> String {
        format!("{}: {message}", self.failure_prefix)
    }
}

/// Declarative attributes read from one canvas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DemoAttributes {
    /// Module location. Bindings are only created when this is non-empty.
    pub module: String,
    /// Backing-store width, if declared.
    pub width: Option<u32>,
    /// Backing-store height, if declared.
    pub height: Option<u32>,
    /// Poster image URL.
    pub poster: Option<String>,
}

impl DemoAttributes {
    /// Read attributes through `lookup`.
    ///
    /// Returns `None` when no module location is declared. `data-width` and
    /// `data-height` take precedence over plain `width` and `height`.
    #[must_use]
    pub fn read<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let module = lookup(MODULE_ATTR).filter(|m| !m.is_empty())?;
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let width = non_empty(WIDTH_ATTR)
            .or_else(|| non_empty("width"))
            .and_then(|v| parse_leading_int(&v));
        let height = non_empty(HEIGHT_ATTR)
            .or_else(|| non_empty("height"))
            .and_then(|v| parse_leading_int(&v));

        Some(Self {
            module,
            width,
            height,
            poster: non_empty(POSTER_ATTR),
        })
    }
}

/// Parse the leading decimal digits of `value`, ignoring leading whitespace
/// and anything after the digits (`"640px"` is 640).
#[must_use]
pub fn parse_leading_int(value: &str) -> Option<u32> {
    let trimmed = value.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}
