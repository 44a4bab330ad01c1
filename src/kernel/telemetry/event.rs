use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kernel::playback::PlaybackMode;
use crate::kernel::time::Millis;

// Allowed: indices, timestamps, durations, counts, enums
// Forbidden: segment text, clip identifiers

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    ModeTransition {
        from: PlaybackMode,
        to: PlaybackMode,
        at: Millis,
    },

    SegmentShown {
        index: usize,
        cause: ActivationCause,
        at: Millis,
    },

    /// The timer ran out on a segment.
    SegmentCompleted {
        index: usize,
        shown_ms: u64,
    },

    Navigation {
        direction: NavDirection,
        from: usize,
        to: usize,
    },

    NavigationIgnored {
        direction: NavDirection,
        at_index: usize,
    },

    /// Ended was reached with looping on; playback re-entered index 0.
    Wrapped {
        at: Millis,
    },

    Paused {
        index: usize,
        elapsed_ms: u64,
    },

    Resumed {
        index: usize,
        remaining_ms: u64,
    },

    Audio(AudioEventKind),

    MuteChanged {
        muted: bool,
    },

    TornDown {
        at: Millis,
    },

    SessionSummary {
        session: Uuid,
        duration_ms: u64,
        segments_completed: u64,
        pauses: u64,
        audio_rejections: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationCause {
    Start,
    AutoAdvance,
    Manual,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEventKind {
    Rejected { index: usize },
    Unlocked { index: usize },
    StaleRejection,
}
