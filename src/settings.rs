use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use infinity_loader::LoaderConfig;
use serde::{Deserialize, Serialize};

use crate::source::{DEFAULT_LATENCY_MS, DEFAULT_PAGE_SIZE, DEFAULT_PAGES, PageSource};
use crate::theme::ThemeVariant;

const APP_SENTINEL: &str = "infinity-loader";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "_app")]
    pub app: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeVariant>,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub feed: FeedSettings,
}

/// Shape of the simulated backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub page_size: usize,
    pub pages: usize,
    pub latency_ms: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pages: DEFAULT_PAGES,
            latency_ms: DEFAULT_LATENCY_MS,
        }
    }
}

impl FeedSettings {
    pub fn source(&self) -> PageSource {
        PageSource {
            page_size: self.page_size,
            pages: self.pages,
            latency: Duration::from_millis(self.latency_ms),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: APP_SENTINEL.to_string(),
            theme: None,
            loader: LoaderConfig::default(),
            feed: FeedSettings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize settings")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.app != APP_SENTINEL {
            bail!(
                "Settings file appears to belong to another application (expected _app = '{}', found '{}')",
                APP_SENTINEL,
                self.app
            );
        }
        if self.feed.page_size == 0 {
            bail!("feed.page_size must be at least 1");
        }
        Ok(())
    }
}

pub fn config_dir(custom: Option<&PathBuf>) -> Option<PathBuf> {
    custom
        .cloned()
        .or_else(|| dirs::home_dir().map(|p| p.join(".config").join("infinity")))
}

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("settings.toml")
}

pub fn log_dir(config_dir: &Path) -> PathBuf {
    config_dir.join("logs")
}
