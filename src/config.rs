use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_EVENT_DEBOUNCE_MS: u64 = 10;
pub const DEFAULT_LOAD_MORE_ACTION: &str = "infinityLoad";
pub const DEFAULT_LOADING_TEXT: &str = "Loading Infinite Model...";
pub const DEFAULT_LOADED_TEXT: &str = "Infinite Model Entirely Loaded.";
pub const DEFAULT_REVERSE_SCROLL_RESET: f64 = 100.0;

/// Where a loader should look for its scrollable.
///
/// Configuration files can put anything under `scrollable`, so a non-string
/// value is kept as [`ScrollableOption::Invalid`] and rejected when the loader
/// is set up rather than when the file is parsed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScrollableOption {
    #[default]
    Viewport,
    Selector(String),
    Invalid(toml::Value),
}

impl ScrollableOption {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }

    pub fn is_viewport(&self) -> bool {
        matches!(self, Self::Viewport)
    }
}

impl<'de> Deserialize<'de> for ScrollableOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<toml::Value>::deserialize(deserializer)? {
            None => Self::Viewport,
            Some(toml::Value::String(selector)) => Self::Selector(selector),
            Some(other) => Self::Invalid(other),
        })
    }
}

impl Serialize for ScrollableOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Viewport => serializer.serialize_none(),
            Self::Selector(selector) => serializer.serialize_str(selector),
            Self::Invalid(value) => value.serialize(serializer),
        }
    }
}

/// Options accepted by an [`InfinityLoader`](crate::InfinityLoader).
///
/// Every field is optional in TOML; missing keys fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    #[serde(skip_serializing_if = "ScrollableOption::is_viewport")]
    pub scrollable: ScrollableOption,
    /// Margin before the loader's own offset at which loading starts.
    pub trigger_offset: f64,
    /// Grow upward: load older items when scrolled near the top.
    pub reverse: bool,
    pub destroy_on_infinity: bool,
    /// Never dispatch; useful while laying out a page.
    pub development_mode: bool,
    /// Debounce for scroll and resize events, in milliseconds.
    pub event_debounce: u64,
    pub load_more_action: String,
    pub loading_text: String,
    pub loaded_text: String,
    /// Scroll position restored after items are prepended in reverse mode.
    pub reverse_scroll_reset: f64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            scrollable: ScrollableOption::Viewport,
            trigger_offset: 0.0,
            reverse: false,
            destroy_on_infinity: false,
            development_mode: false,
            event_debounce: DEFAULT_EVENT_DEBOUNCE_MS,
            load_more_action: DEFAULT_LOAD_MORE_ACTION.to_string(),
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
            loaded_text: DEFAULT_LOADED_TEXT.to_string(),
            reverse_scroll_reset: DEFAULT_REVERSE_SCROLL_RESET,
        }
    }
}

impl LoaderConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.event_debounce)
    }
}
