mod app;
mod cli;
mod event;
mod keys;
mod logging;
mod settings;
mod source;
mod theme;
mod tui;
mod views;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use infinity_loader::system_clock;
use tracing::info;

use app::{App, Message};
use cli::{Cli, Commands, ConfigArgs, ConfigCommands, OutputFormat};
use event::{Event, EventHandler};
use settings::Settings;
use theme::{ThemeVariant, default_for_variant};

/// Frame interval; short enough to honour the loader's debounce.
const TICK_RATE_MS: u64 = 16;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config(config_args)) = &cli.command {
        return handle_config_command(&cli, config_args);
    }
    run_tui(cli).await
}

fn load_settings(cli: &Cli, config_dir: Option<&PathBuf>) -> Settings {
    let mut settings = config_dir
        .map(|dir| {
            let path = settings::settings_path(dir);
            Settings::load(&path).unwrap_or_else(|e| {
                eprintln!("Warning: {:#}", e);
                Settings::default()
            })
        })
        .unwrap_or_default();
    cli.apply(&mut settings);
    settings
}

fn handle_config_command(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    let config_dir = settings::config_dir(cli.config_dir.as_ref());
    match &args.command {
        ConfigCommands::Show { format } => {
            let settings = load_settings(cli, config_dir.as_ref());
            match format {
                OutputFormat::Toml => {
                    let toml = toml::to_string_pretty(&settings)
                        .context("Failed to serialize settings")?;
                    println!("{}", toml);
                }
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&settings)
                        .context("Failed to serialize settings to JSON")?;
                    println!("{}", json);
                }
            }
        }
        ConfigCommands::Path => {
            if let Some(config_dir) = config_dir {
                println!("{}", settings::settings_path(&config_dir).display());
            } else {
                eprintln!("Could not determine config directory");
            }
        }
    }
    Ok(())
}

async fn run_tui(cli: Cli) -> Result<()> {
    let config_dir = settings::config_dir(cli.config_dir.as_ref());
    let settings = load_settings(&cli, config_dir.as_ref());

    let _log_guard = match &config_dir {
        Some(dir) => {
            let (guard, path) = logging::init(&settings::log_dir(dir), cli.verbose)?;
            if cli.verbose {
                eprintln!("Logging to {}", path.display());
            }
            Some(guard)
        }
        None => None,
    };

    // Priority: CLI flag > settings file > dark
    let variant = if cli.dark {
        ThemeVariant::Dark
    } else if cli.light {
        ThemeVariant::Light
    } else {
        settings.theme.unwrap_or_default()
    };
    info!(?variant, loader = ?settings.loader, "starting");

    let mut terminal = tui::init()?;
    let mut app = App::new(
        settings.loader.clone(),
        settings.feed.source(),
        default_for_variant(variant),
        system_clock(),
    );
    let mut events = EventHandler::new(TICK_RATE_MS);
    let started = Instant::now();

    loop {
        terminal.draw(|frame| views::render(&app, frame))?;

        let current_height = terminal.size()?.height;
        app.update(Message::UpdateViewportHeight(current_height));

        // setup and post-render checks see the frame just drawn
        app.after_render();

        // Poll async results (non-blocking)
        while let Ok(result) = app.result_rx.try_recv() {
            app.handle_async_result(result);
        }

        app.tick();

        if app.should_quit {
            break;
        }

        match events.next().await? {
            Event::Key(key) => {
                if let Some(msg) = keys::handle_key(key) {
                    app.update(msg);
                }
            }
            Event::Tick | Event::Resize => {}
        }
    }

    tui::restore()?;
    info!(elapsed = ?started.elapsed(), "exiting");
    Ok(())
}
