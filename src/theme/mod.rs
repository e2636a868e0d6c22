use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone)]
pub struct ResolvedTheme {
    pub variant: ThemeVariant,
    pub foreground: Color,
    pub foreground_dim: Color,
    pub border: Color,
    pub primary: Color,
    pub error: Color,
    pub entry_id: Color,
    pub loader: Color,
    pub loader_done: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub spinner: Color,
}

impl ResolvedTheme {
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.foreground_dim)
    }

    pub fn active_tab_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn spinner_style(&self) -> Style {
        Style::default().fg(self.spinner)
    }

    pub fn loader_style(&self, complete: bool) -> Style {
        let fg = if complete { self.loader_done } else { self.loader };
        Style::default().fg(fg).add_modifier(Modifier::ITALIC)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .bg(self.status_bar_bg)
            .fg(self.status_bar_fg)
    }
}

pub fn default_for_variant(variant: ThemeVariant) -> ResolvedTheme {
    match variant {
        ThemeVariant::Dark => ResolvedTheme {
            variant,
            foreground: Color::Rgb(0xd8, 0xde, 0xe9),
            foreground_dim: Color::Rgb(0x6c, 0x76, 0x86),
            border: Color::Rgb(0x3b, 0x42, 0x52),
            primary: Color::Rgb(0x88, 0xc0, 0xd0),
            error: Color::Rgb(0xbf, 0x61, 0x6a),
            entry_id: Color::Rgb(0xeb, 0xcb, 0x8b),
            loader: Color::Rgb(0xb4, 0x8e, 0xad),
            loader_done: Color::Rgb(0xa3, 0xbe, 0x8c),
            status_bar_bg: Color::Rgb(0x3b, 0x42, 0x52),
            status_bar_fg: Color::Rgb(0xec, 0xef, 0xf4),
            spinner: Color::Rgb(0x88, 0xc0, 0xd0),
        },
        ThemeVariant::Light => ResolvedTheme {
            variant,
            foreground: Color::Rgb(0x2e, 0x34, 0x40),
            foreground_dim: Color::Rgb(0x7b, 0x88, 0xa1),
            border: Color::Rgb(0xd8, 0xde, 0xe9),
            primary: Color::Rgb(0x5e, 0x81, 0xac),
            error: Color::Rgb(0xbf, 0x61, 0x6a),
            entry_id: Color::Rgb(0xd0, 0x87, 0x70),
            loader: Color::Rgb(0xb4, 0x8e, 0xad),
            loader_done: Color::Rgb(0x4c, 0x8a, 0x3c),
            status_bar_bg: Color::Rgb(0xe5, 0xe9, 0xf0),
            status_bar_fg: Color::Rgb(0x2e, 0x34, 0x40),
            spinner: Color::Rgb(0x5e, 0x81, 0xac),
        },
    }
}
