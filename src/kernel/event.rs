use serde::{Deserialize, Serialize};

use super::audio::AudioSettings;
use super::playback::PlaybackMode;
use super::segment::AudioRef;
use crate::config::Card;

/// The control surface. Every command is a user gesture as far as audio unlocking is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    TogglePlayPause,
    Next,
    Previous,
    Restart,
    SetMuted(bool),
    ToggleMute,
}

/// Observable outputs, consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderEvent {
    SegmentActivated { index: usize },
    /// Fraction of the current segment already shown, in `0.0..=1.0`.
    Progress { index: usize, fraction: f32 },
    SubQuestion { index: usize, question: usize },
    ModeChanged { from: PlaybackMode, to: PlaybackMode },
    MuteChanged(bool),
    Card(Card),
    Ended,
}

/// Instructions for the audio backend. `Play` always starts from the beginning; `Resume` continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AudioCommand {
    Play { clip: AudioRef, settings: AudioSettings },
    Pause(AudioRef),
    Resume(AudioRef),
    /// Pause and rewind.
    Stop(AudioRef),
    /// Process-wide; applies to every clip the backend owns.
    SetMuted(bool),
    SetVolume(f32),
}

impl AudioCommand {
    /// The clip this command starts, if any. Drivers use it to report refusals.
    pub fn started_clip(&self) -> Option<&AudioRef> {
        match self {
            AudioCommand::Play { clip, .. } | AudioCommand::Resume(clip) => Some(clip),
            _ => None,
        }
    }

    /// True when the command continues a clip from its current position.
    pub fn is_resume(&self) -> bool {
        matches!(self, AudioCommand::Resume(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Render(RenderEvent),
    Audio(AudioCommand),
    Log(String),
}
