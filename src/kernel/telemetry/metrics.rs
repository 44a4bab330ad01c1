use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::event::{AudioEventKind, NavDirection, TelemetryEvent};
use crate::kernel::playback::PlaybackMode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub playback_stats: PlaybackStats,
    pub segment_stats: SegmentStats,
    pub navigation_stats: NavigationStats,
    pub audio_stats: AudioStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStats {
    pub starts: u64,
    pub pauses: u64,
    pub resumes: u64,
    pub endings: u64,
    pub wraps: u64,
    pub elapsed_at_pause_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub shown: u64,
    pub completed: u64,
    pub total_shown_ms: u64,
    pub avg_shown_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationStats {
    pub forward: u64,
    pub backward: u64,
    pub ignored: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioStats {
    pub rejections: u64,
    pub unlocks: u64,
    pub stale_rejections: u64,
    pub mute_changes: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::ModeTransition { from, to, .. } => match (from, to) {
                (PlaybackMode::Paused, PlaybackMode::Playing) => {}
                (_, PlaybackMode::Playing) => snap.playback_stats.starts += 1,
                (_, PlaybackMode::Ended) => snap.playback_stats.endings += 1,
                _ => {}
            },
            TelemetryEvent::SegmentShown { .. } => snap.segment_stats.shown += 1,
            TelemetryEvent::SegmentCompleted { shown_ms, .. } => {
                snap.segment_stats.completed += 1;
                snap.segment_stats.total_shown_ms += shown_ms;
            }
            TelemetryEvent::Navigation { direction, .. } => match direction {
                NavDirection::Forward => snap.navigation_stats.forward += 1,
                NavDirection::Backward => snap.navigation_stats.backward += 1,
            },
            TelemetryEvent::NavigationIgnored { .. } => snap.navigation_stats.ignored += 1,
            TelemetryEvent::Wrapped { .. } => snap.playback_stats.wraps += 1,
            TelemetryEvent::Paused { elapsed_ms, .. } => {
                snap.playback_stats.pauses += 1;
                snap.playback_stats.elapsed_at_pause_ms += elapsed_ms;
            }
            TelemetryEvent::Resumed { .. } => snap.playback_stats.resumes += 1,
            TelemetryEvent::Audio(kind) => match kind {
                AudioEventKind::Rejected { .. } => snap.audio_stats.rejections += 1,
                AudioEventKind::Unlocked { .. } => snap.audio_stats.unlocks += 1,
                AudioEventKind::StaleRejection => snap.audio_stats.stale_rejections += 1,
            },
            TelemetryEvent::MuteChanged { .. } => snap.audio_stats.mute_changes += 1,
            _ => {}
        }
    }

    if snap.segment_stats.completed > 0 {
        snap.segment_stats.avg_shown_ms =
            snap.segment_stats.total_shown_ms as f64 / snap.segment_stats.completed as f64;
    }

    snap
}
