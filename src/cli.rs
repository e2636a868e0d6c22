use clap::{Args, Parser, Subcommand};
use infinity_loader::ScrollableOption;
use std::path::PathBuf;

use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "infinity")]
#[command(about = "An endless feed driven by an infinite-scroll loader", long_about = None)]
pub struct Cli {
    /// Selector of the scroll container (default: the terminal viewport)
    #[arg(long, value_name = "SELECTOR")]
    pub scrollable: Option<String>,

    /// Start loading this many rows before the loader comes into view
    #[arg(long, value_name = "ROWS")]
    pub trigger_offset: Option<f64>,

    /// Grow upward, loading older entries at the top
    #[arg(long)]
    pub reverse: bool,

    /// Remove the loader once the feed is exhausted
    #[arg(long)]
    pub destroy_on_infinity: bool,

    /// Never trigger loads
    #[arg(long)]
    pub development_mode: bool,

    /// Scroll/resize debounce in milliseconds
    #[arg(long, value_name = "MS")]
    pub debounce: Option<u64>,

    /// Number of pages the simulated backend serves
    #[arg(long)]
    pub pages: Option<usize>,

    /// Simulated fetch latency in milliseconds
    #[arg(long, value_name = "MS")]
    pub latency: Option<u64>,

    /// Force dark mode
    #[arg(long, conflicts_with = "light")]
    pub dark: bool,

    /// Force light mode
    #[arg(long, conflicts_with = "dark")]
    pub light: bool,

    /// Custom config directory (default: ~/.config/infinity)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose logging (prints log path, sets DEBUG level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Layer command-line overrides on top of the settings file.
    pub fn apply(&self, settings: &mut Settings) {
        let loader = &mut settings.loader;
        if let Some(selector) = &self.scrollable {
            loader.scrollable = ScrollableOption::selector(selector.clone());
        }
        if let Some(offset) = self.trigger_offset {
            loader.trigger_offset = offset;
        }
        if let Some(ms) = self.debounce {
            loader.event_debounce = ms;
        }
        loader.reverse |= self.reverse;
        loader.destroy_on_infinity |= self.destroy_on_infinity;
        loader.development_mode |= self.development_mode;

        if let Some(pages) = self.pages {
            settings.feed.pages = pages;
        }
        if let Some(ms) = self.latency {
            settings.feed.latency_ms = ms;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect the configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: OutputFormat,
    },
    /// Show where the settings file lives
    Path,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Toml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {s}. Use 'toml' or 'json'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "infinity",
            "--scrollable",
            "#feed",
            "--trigger-offset",
            "5",
            "--reverse",
            "--debounce",
            "40",
            "--pages",
            "2",
        ]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.loader.scrollable, ScrollableOption::selector("#feed"));
        assert_eq!(settings.loader.trigger_offset, 5.0);
        assert!(settings.loader.reverse);
        assert_eq!(settings.loader.event_debounce, 40);
        assert_eq!(settings.feed.pages, 2);
        assert!(!settings.loader.development_mode);
    }

    #[test]
    fn absent_flags_keep_file_values() {
        let cli = Cli::parse_from(["infinity"]);
        let mut settings = Settings::default();
        settings.loader.reverse = true;
        settings.feed.latency_ms = 5;
        cli.apply(&mut settings);

        assert!(settings.loader.reverse);
        assert_eq!(settings.feed.latency_ms, 5);
        assert!(settings.loader.scrollable.is_viewport());
    }

    #[test]
    fn config_show_parses_format() {
        let cli = Cli::parse_from(["infinity", "config", "show", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config(ConfigArgs {
                command: ConfigCommands::Show {
                    format: OutputFormat::Json
                }
            }))
        ));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
