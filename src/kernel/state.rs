use serde::{Deserialize, Serialize};

use super::playback::PlaybackMode;
use super::segment::{Script, Segment};
use super::time::Millis;

/// Strict state delta. This is the ONLY way presentation state mutates.
#[derive(Debug, Clone, PartialEq)]
pub enum StateDelta {
    /// Show `index` from its beginning. The segment clock runs from `at` when `playing`.
    Activate { index: usize, at: Millis, playing: bool },
    /// Stop the segment clock, folding the running stretch into `elapsed`.
    Suspend { at: Millis },
    /// Restart the segment clock without touching `elapsed`.
    Resume { at: Millis },
    Mode(PlaybackMode),
    SubQuestion(Option<usize>),
    /// Back to index 0, Idle, clock cleared.
    Reset,
}

#[derive(Debug, Clone)]
pub struct PresentationState {
    script: Script,
    current_index: usize,
    mode: PlaybackMode,
    looping: bool,
    // Time already spent on the current segment, excluding the running stretch.
    elapsed_ms: u64,
    playing_since: Option<Millis>,
    sub_question: Option<usize>,
    /// Monotonic version, bumped by every reduction.
    pub version: u64,
}

/// Serializable view of the state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationSnapshot {
    pub current_index: usize,
    pub segment_count: usize,
    pub mode: PlaybackMode,
    pub looping: bool,
    pub elapsed_ms: u64,
    pub remaining_ms: u64,
    pub fraction: f32,
    pub version: u64,
}

impl PresentationState {
    pub fn new(script: Script, looping: bool) -> Self {
        Self {
            script,
            current_index: 0,
            mode: PlaybackMode::Idle,
            looping,
            elapsed_ms: 0,
            playing_since: None,
            sub_question: None,
            version: 0,
        }
    }

    /// Pure reduction: State + Delta -> Mutated State
    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;

        match delta {
            StateDelta::Activate { index, at, playing } => {
                // Out-of-range indices would break the invariant; the controller never sends them.
                self.current_index = index.min(self.script.last_index());
                self.elapsed_ms = 0;
                self.playing_since = playing.then_some(at);
                self.sub_question = None;
            }
            StateDelta::Suspend { at } => {
                if let Some(since) = self.playing_since.take() {
                    self.elapsed_ms = self.elapsed_ms.saturating_add(at.since(since));
                }
            }
            StateDelta::Resume { at } => {
                if self.playing_since.is_none() {
                    self.playing_since = Some(at);
                }
            }
            StateDelta::Mode(mode) => {
                self.mode = mode;
            }
            StateDelta::SubQuestion(slot) => {
                self.sub_question = slot;
            }
            StateDelta::Reset => {
                self.current_index = 0;
                self.mode = PlaybackMode::Idle;
                self.elapsed_ms = 0;
                self.playing_since = None;
                self.sub_question = None;
            }
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_segment(&self) -> &Segment {
        &self.script[self.current_index]
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn sub_question(&self) -> Option<usize> {
        self.sub_question
    }

    /// Time the current segment has been shown while playing, as of `now`.
    pub fn elapsed_at(&self, now: Millis) -> u64 {
        let running = self.playing_since.map(|since| now.since(since)).unwrap_or(0);
        self.elapsed_ms.saturating_add(running)
    }

    pub fn remaining_at(&self, now: Millis) -> u64 {
        self.current_segment().duration_ms().saturating_sub(self.elapsed_at(now))
    }

    pub fn progress_at(&self, now: Millis) -> f32 {
        let duration = self.current_segment().duration_ms();
        (self.elapsed_at(now) as f64 / duration as f64).clamp(0.0, 1.0) as f32
    }

    pub fn snapshot(&self, now: Millis) -> PresentationSnapshot {
        PresentationSnapshot {
            current_index: self.current_index,
            segment_count: self.script.len(),
            mode: self.mode,
            looping: self.looping,
            elapsed_ms: self.elapsed_at(now),
            remaining_ms: self.remaining_at(now),
            fraction: self.progress_at(now),
            version: self.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PresentationState {
        let script = Script::new(vec![Segment::question("a", "b", 1000), Segment::question("c", "d", 4000)]).unwrap();
        PresentationState::new(script, false)
    }

    #[test]
    fn elapsed_accumulates_across_suspend() {
        let mut s = state();
        s.reduce(StateDelta::Activate { index: 1, at: Millis(0), playing: true });
        assert_eq!(s.elapsed_at(Millis(1500)), 1500);

        s.reduce(StateDelta::Suspend { at: Millis(1500) });
        assert_eq!(s.elapsed_at(Millis(9000)), 1500, "clock frozen while suspended");

        s.reduce(StateDelta::Resume { at: Millis(9000) });
        assert_eq!(s.elapsed_at(Millis(9500)), 2000);
        assert_eq!(s.remaining_at(Millis(9500)), 2000);
        assert_eq!(s.progress_at(Millis(9500)), 0.5);
    }

    #[test]
    fn activation_clears_the_clock() {
        let mut s = state();
        s.reduce(StateDelta::Activate { index: 0, at: Millis(0), playing: true });
        s.reduce(StateDelta::Activate { index: 1, at: Millis(700), playing: false });
        assert_eq!(s.elapsed_at(Millis(5000)), 0);
        assert_eq!(s.remaining_at(Millis(5000)), 4000);
    }

    #[test]
    fn version_counts_reductions() {
        let mut s = state();
        s.reduce(StateDelta::Mode(PlaybackMode::Playing));
        s.reduce(StateDelta::Reset);
        assert_eq!(s.version, 2);
        assert_eq!(s.mode(), PlaybackMode::Idle);
    }

    #[test]
    fn progress_is_clamped() {
        let mut s = state();
        s.reduce(StateDelta::Activate { index: 0, at: Millis(0), playing: true });
        assert_eq!(s.progress_at(Millis(5000)), 1.0);
    }
}
