use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Message;

/// A declarative keybinding map that can be composed and extended.
#[derive(Clone)]
pub struct Keymap {
    bindings: Vec<(KeyCode, KeyModifiers, Message)>,
}

impl Keymap {
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Add a key binding with no modifiers.
    pub fn bind(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::NONE, message));
        self
    }

    /// Add a key binding with Ctrl modifier.
    pub fn bind_ctrl(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::CONTROL, message));
        self
    }

    /// Look up a message for a key event.
    /// Later bindings take precedence over earlier ones.
    pub fn get(&self, event: &KeyEvent) -> Option<Message> {
        self.bindings
            .iter()
            .rev()
            .find(|(code, mods, _)| *code == event.code && event.modifiers.contains(*mods))
            .map(|(_, _, msg)| msg.clone())
    }

    /// Extend this keymap with another. The other keymap's bindings take precedence.
    pub fn extend(mut self, other: Self) -> Self {
        self.bindings.extend(other.bindings);
        self
    }

    /// Find the first key bound to a specific message.
    pub fn find_key(&self, message: &Message) -> Option<(KeyCode, KeyModifiers)> {
        self.bindings
            .iter()
            .find(|(_, _, msg)| msg == message)
            .map(|(code, mods, _)| (*code, *mods))
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a key binding for display in help text.
pub fn format_key(code: KeyCode, mods: KeyModifiers) -> String {
    let key_str = match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    };
    if mods.contains(KeyModifiers::CONTROL) {
        format!("C-{key_str}")
    } else {
        key_str
    }
}

/// Keys that work regardless of what the feed is doing.
pub fn global_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('q'), Message::Quit)
        .bind_ctrl(KeyCode::Char('c'), Message::Quit)
        .bind(KeyCode::F(12), Message::ToggleDebug)
        .bind(KeyCode::Char('`'), Message::ToggleDebug)
}

/// Scrolling and reload keys for the feed pane.
pub fn feed_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('j'), Message::ScrollDown)
        .bind(KeyCode::Down, Message::ScrollDown)
        .bind(KeyCode::Char('k'), Message::ScrollUp)
        .bind(KeyCode::Up, Message::ScrollUp)
        .bind_ctrl(KeyCode::Char('d'), Message::PageDown)
        .bind(KeyCode::PageDown, Message::PageDown)
        .bind_ctrl(KeyCode::Char('u'), Message::PageUp)
        .bind(KeyCode::PageUp, Message::PageUp)
        .bind(KeyCode::Char('g'), Message::ScrollTop)
        .bind(KeyCode::Home, Message::ScrollTop)
        .bind(KeyCode::Char('G'), Message::ScrollBottom)
        .bind(KeyCode::End, Message::ScrollBottom)
        .bind(KeyCode::Char('r'), Message::Refresh)
}

pub fn keymap() -> Keymap {
    feed_keymap().extend(global_keymap())
}

pub fn handle_key(key: KeyEvent) -> Option<Message> {
    keymap().get(&key)
}

/// Short key legend for the status bar, e.g. `j/k scroll`.
pub fn hints() -> Vec<(String, &'static str)> {
    let keymap = keymap();
    let key = |msg: &Message| {
        keymap
            .find_key(msg)
            .map(|(code, mods)| format_key(code, mods))
            .unwrap_or_default()
    };
    vec![
        (
            format!("{}/{}", key(&Message::ScrollDown), key(&Message::ScrollUp)),
            "scroll",
        ),
        (
            format!("{}/{}", key(&Message::PageDown), key(&Message::PageUp)),
            "page",
        ),
        (
            format!("{}/{}", key(&Message::ScrollTop), key(&Message::ScrollBottom)),
            "ends",
        ),
        (key(&Message::Refresh), "reload"),
        (key(&Message::ToggleDebug), "debug"),
        (key(&Message::Quit), "quit"),
    ]
}
