//! Keyboard adapter. Sits outside the kernel and only translates keys into [`Command`]s.

use serde::{Deserialize, Serialize};

use crate::kernel::event::Command;

/// What the Space key does on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStyle {
    #[default]
    PlayPause,
    /// Autoplaying pages start muted and bind Space to the mute toggle instead.
    MuteToggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    Char(char),
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.code` value.
    pub fn from_code(code: &str) -> Self {
        match code {
            "Space" => Key::Space,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => match code.strip_prefix("Key").map(|rest| rest.chars().collect::<Vec<_>>()) {
                Some(chars) if chars.len() == 1 => Key::Char(chars[0].to_ascii_lowercase()),
                _ => Key::Other,
            },
        }
    }

    /// Maps a line typed on the console. An empty line counts as Space.
    pub fn from_console(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "space" | "p" => Key::Space,
            "left" | "<" | "," => Key::ArrowLeft,
            "right" | ">" | "." => Key::ArrowRight,
            _ => {
                let mut chars = trimmed.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                    _ => Key::Other,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyBindings {
    pub style: ControlStyle,
}

impl KeyBindings {
    pub fn new(style: ControlStyle) -> Self {
        Self { style }
    }

    pub fn command_for(&self, key: Key) -> Option<Command> {
        match key {
            Key::Space => Some(match self.style {
                ControlStyle::PlayPause => Command::TogglePlayPause,
                ControlStyle::MuteToggle => Command::ToggleMute,
            }),
            Key::ArrowLeft => Some(Command::Previous),
            Key::ArrowRight => Some(Command::Next),
            Key::Char('r') => Some(Command::Restart),
            Key::Char('m') => Some(Command::ToggleMute),
            _ => None,
        }
    }
}
