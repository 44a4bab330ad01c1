use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use super::audio::{AudioBackend, AudioError};
use crate::kernel::audio::AudioSettings;
use crate::kernel::segment::AudioRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockClip {
    pub state: ClipState,
    pub muted: bool,
    pub volume: f32,
    /// Number of starts from position zero.
    pub starts: u32,
}

#[derive(Debug, Default)]
struct MockState {
    clips: HashMap<AudioRef, MockClip>,
    muted: bool,
    volume: Option<f32>,
    reject_next: usize,
    rejected: u32,
}

/// In-memory audio backend. Logs what a real backend would do and keeps enough
/// bookkeeping to check the one-active-clip invariant. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockAudioBackend {
    inner: Arc<Mutex<MockState>>,
}

impl MockAudioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses the next `count` start attempts, like a browser blocking autoplay.
    pub fn reject_next(&self, count: usize) {
        self.lock().reject_next = count;
    }

    pub fn clip(&self, clip: &str) -> Option<MockClip> {
        self.lock().clips.get(&AudioRef::new(clip)).cloned()
    }

    /// Clips started and not stopped (playing or paused mid-clip).
    pub fn active_count(&self) -> usize {
        self.lock()
            .clips
            .values()
            .filter(|c| c.state != ClipState::Stopped)
            .count()
    }

    pub fn playing(&self) -> Vec<AudioRef> {
        let mut playing: Vec<AudioRef> = self
            .lock()
            .clips
            .iter()
            .filter(|(_, c)| c.state == ClipState::Playing)
            .map(|(id, _)| id.clone())
            .collect();
        playing.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        playing
    }

    pub fn is_muted(&self) -> bool {
        self.lock().muted
    }

    pub fn volume(&self) -> Option<f32> {
        self.lock().volume
    }

    pub fn rejected(&self) -> u32 {
        self.lock().rejected
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn try_start(state: &mut MockState, clip: &AudioRef) -> Result<(), AudioError> {
        if state.reject_next > 0 {
            state.reject_next -= 1;
            state.rejected += 1;
            return Err(AudioError::Rejected {
                clip: clip.clone(),
                reason: "play() requires a user gesture".to_string(),
            });
        }
        Ok(())
    }
}

impl AudioBackend for MockAudioBackend {
    fn play(&mut self, clip: &AudioRef, settings: AudioSettings) -> Result<(), AudioError> {
        let mut state = self.lock();
        Self::try_start(&mut state, clip)?;
        let entry = state.clips.entry(clip.clone()).or_insert(MockClip {
            state: ClipState::Stopped,
            muted: settings.muted,
            volume: settings.volume,
            starts: 0,
        });
        entry.state = ClipState::Playing;
        entry.muted = settings.muted;
        entry.volume = settings.volume;
        entry.starts += 1;
        debug!(%clip, muted = settings.muted, "[AUDIO] play");
        Ok(())
    }

    fn pause(&mut self, clip: &AudioRef) {
        if let Some(entry) = self.lock().clips.get_mut(clip) {
            if entry.state == ClipState::Playing {
                entry.state = ClipState::Paused;
            }
        }
        debug!(%clip, "[AUDIO] pause");
    }

    fn resume(&mut self, clip: &AudioRef) -> Result<(), AudioError> {
        let mut state = self.lock();
        Self::try_start(&mut state, clip)?;
        match state.clips.get_mut(clip) {
            Some(entry) => {
                entry.state = ClipState::Playing;
                debug!(%clip, "[AUDIO] resume");
                Ok(())
            }
            None => Err(AudioError::Unknown(clip.clone())),
        }
    }

    fn stop(&mut self, clip: &AudioRef) {
        if let Some(entry) = self.lock().clips.get_mut(clip) {
            entry.state = ClipState::Stopped;
        }
        debug!(%clip, "[AUDIO] stop");
    }

    fn set_muted(&mut self, muted: bool) {
        let mut state = self.lock();
        state.muted = muted;
        for entry in state.clips.values_mut() {
            entry.muted = muted;
        }
        debug!(muted, "[AUDIO] mute");
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.lock();
        state.volume = Some(volume);
        for entry in state.clips.values_mut() {
            entry.volume = volume;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let backend = MockAudioBackend::new();
        let mut driver_side = backend.clone();
        driver_side.play(&AudioRef::new("a"), AudioSettings::default()).unwrap();
        assert_eq!(backend.active_count(), 1);

        driver_side.stop(&AudioRef::new("a"));
        assert_eq!(backend.active_count(), 0);
    }

    #[test]
    fn rejection_budget() {
        let mut backend = MockAudioBackend::new();
        backend.reject_next(1);
        let clip = AudioRef::new("a");
        assert!(matches!(backend.play(&clip, AudioSettings::default()), Err(AudioError::Rejected { .. })));
        assert!(backend.play(&clip, AudioSettings::default()).is_ok());
        assert_eq!(backend.rejected(), 1);
    }

    #[test]
    fn mute_keeps_clip_state() {
        let mut backend = MockAudioBackend::new();
        let clip = AudioRef::new("a");
        backend.play(&clip, AudioSettings::default()).unwrap();
        backend.set_muted(true);

        let state = backend.clip("a").unwrap();
        assert!(state.muted);
        assert_eq!(state.state, ClipState::Playing);
        assert_eq!(state.starts, 1);
    }
}
