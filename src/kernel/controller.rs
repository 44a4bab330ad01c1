use uuid::Uuid;

use super::audio::AudioSynchronizer;
use super::event::{AudioCommand, Command, RenderEvent, SideEffect};
use super::playback::{PlaybackGraph, PlaybackMode, PlaybackRequest};
use super::scheduler::{Scheduler, TimerId};
use super::segment::Script;
use super::state::{PresentationSnapshot, PresentationState, StateDelta};
use super::telemetry::event::{ActivationCause, AudioEventKind, NavDirection, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::time::Millis;
use crate::config::{PresentationConfig, StartMode};

/// One timed presentation, owned by one page view.
///
/// Every operation takes the current logical time and returns the side effects the
/// driver must execute, in order. Operations are total: a request that is not valid
/// in the current mode changes nothing and returns no render or audio effects.
///
/// Invariants held across every call:
/// - at most one pending timer (the scheduler has a single slot, and every
///   activation cancels before it arms);
/// - at most one bound audio clip (activation releases the old clip first).
#[derive(Debug)]
pub struct Controller {
    id: Uuid,
    config: PresentationConfig,
    state: PresentationState,
    scheduler: Scheduler,
    audio: AudioSynchronizer,
    pub telemetry: TelemetryRecorder,
    mounted_at: Option<Millis>,
}

impl Controller {
    pub fn new(script: Script, config: PresentationConfig) -> Self {
        let looping = config.looping;
        let audio = AudioSynchronizer::new(config.audio_settings());
        Self {
            id: Uuid::new_v4(),
            state: PresentationState::new(script, looping),
            config,
            scheduler: Scheduler::new(),
            audio,
            telemetry: TelemetryRecorder::new(),
            mounted_at: None,
        }
    }

    /// Page-load step: autoplay presentations start, manual ones show their intro card.
    pub fn mount(&mut self, now: Millis) -> Vec<SideEffect> {
        self.mounted_at = Some(now);
        match self.config.start_mode {
            StartMode::Autoplay => self.start(now),
            StartMode::Manual => match &self.config.intro {
                Some(card) => vec![SideEffect::Render(RenderEvent::Card(card.clone()))],
                None => Vec::new(),
            },
        }
    }

    /// Dispatches a control-surface command. Any command counts as a user gesture,
    /// so a clip the platform refused earlier gets one more attempt afterwards.
    pub fn apply(&mut self, command: Command, now: Millis) -> Vec<SideEffect> {
        let mut effects = match command {
            Command::Start => self.start(now),
            Command::TogglePlayPause => self.toggle_play_pause(now),
            Command::Next => self.next(now),
            Command::Previous => self.previous(now),
            Command::Restart => self.restart(now),
            Command::SetMuted(muted) => self.set_muted(muted),
            Command::ToggleMute => self.toggle_mute(),
        };
        if self.state.mode() == PlaybackMode::Playing {
            if let Some(retry) = self.audio.unlock() {
                self.telemetry.record(TelemetryEvent::Audio(AudioEventKind::Unlocked {
                    index: self.state.current_index(),
                }));
                effects.push(SideEffect::Audio(retry));
            }
        }
        effects
    }

    pub fn start(&mut self, now: Millis) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        let Some(to) = PlaybackGraph::transition(self.state.mode(), PlaybackRequest::Start) else {
            effects.push(SideEffect::Log(format!("start ignored while {:?}", self.state.mode())));
            return effects;
        };
        self.set_mode(to, now, &mut effects);
        self.activate(0, now, ActivationCause::Start, &mut effects);
        effects
    }

    pub fn toggle_play_pause(&mut self, now: Millis) -> Vec<SideEffect> {
        match self.state.mode() {
            PlaybackMode::Idle => self.start(now),
            PlaybackMode::Playing => self.pause(now),
            PlaybackMode::Paused => self.resume(now),
            PlaybackMode::Ended => self.restart(now),
        }
    }

    pub fn next(&mut self, now: Millis) -> Vec<SideEffect> {
        self.navigate(NavDirection::Forward, now)
    }

    pub fn previous(&mut self, now: Millis) -> Vec<SideEffect> {
        self.navigate(NavDirection::Backward, now)
    }

    pub fn restart(&mut self, now: Millis) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        let from = self.state.mode();
        let Some(to) = PlaybackGraph::transition(from, PlaybackRequest::Restart) else {
            effects.push(SideEffect::Log(format!("restart ignored while {:?}", from)));
            return effects;
        };
        self.scheduler.cancel();
        effects.extend(self.audio.release().into_iter().map(SideEffect::Audio));
        self.state.reduce(StateDelta::Reset);
        if from != to {
            self.record_transition(from, to, now, &mut effects);
        }
        effects.extend(self.start(now));
        effects
    }

    pub fn set_muted(&mut self, muted: bool) -> Vec<SideEffect> {
        match self.audio.set_muted(muted) {
            Some(command) => {
                self.telemetry.record(TelemetryEvent::MuteChanged { muted });
                vec![
                    SideEffect::Audio(command),
                    SideEffect::Render(RenderEvent::MuteChanged(muted)),
                ]
            }
            None => Vec::new(),
        }
    }

    pub fn toggle_mute(&mut self) -> Vec<SideEffect> {
        self.set_muted(!self.audio.is_muted())
    }

    pub fn set_volume(&mut self, volume: f32) -> Vec<SideEffect> {
        self.audio
            .set_volume(volume)
            .map(SideEffect::Audio)
            .into_iter()
            .collect()
    }

    /// Scheduler callback. A fire for a timer that was cancelled or replaced is ignored.
    pub fn on_timer(&mut self, id: TimerId, now: Millis) -> Vec<SideEffect> {
        if !self.scheduler.is_current(id) {
            return vec![SideEffect::Log(format!("stale timer {:?} ignored", id))];
        }
        self.tick(now)
    }

    /// Fires every advance due at `now`, each at its own due instant so late polling
    /// does not shift the schedule, then reports progress for the segment on screen.
    pub fn tick(&mut self, now: Millis) -> Vec<SideEffect> {
        let mut effects = Vec::new();

        while let Some(timer) = self.scheduler.take_due(now) {
            if PlaybackGraph::transition(self.state.mode(), PlaybackRequest::AutoAdvance).is_none() {
                continue;
            }
            self.auto_advance(timer.due, &mut effects);
        }

        if self.state.mode() == PlaybackMode::Playing {
            self.update_sub_question(now, &mut effects);
            effects.push(SideEffect::Render(RenderEvent::Progress {
                index: self.state.current_index(),
                fraction: self.state.progress_at(now),
            }));
        }

        effects
    }

    /// Reported by the driver when the platform refuses a `Play` or `Resume`.
    /// Never fatal: the segment timer keeps running.
    pub fn audio_rejected(&mut self, command: &AudioCommand) -> Vec<SideEffect> {
        let Some(clip) = command.started_clip() else {
            return Vec::new();
        };
        if self.audio.reject(clip, command.is_resume()) {
            self.telemetry.record(TelemetryEvent::Audio(AudioEventKind::Rejected {
                index: self.state.current_index(),
            }));
            vec![SideEffect::Log(format!(
                "audio for segment {} refused; retrying on next gesture",
                self.state.current_index()
            ))]
        } else {
            self.telemetry.record(TelemetryEvent::Audio(AudioEventKind::StaleRejection));
            Vec::new()
        }
    }

    /// Releases the timer and the audio clip. The controller is back in Idle afterwards.
    pub fn teardown(&mut self, now: Millis) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        self.scheduler.cancel();
        effects.extend(self.audio.release().into_iter().map(SideEffect::Audio));
        let from = self.state.mode();
        self.state.reduce(StateDelta::Reset);
        if from != PlaybackMode::Idle {
            self.record_transition(from, PlaybackMode::Idle, now, &mut effects);
        }
        self.telemetry.record(TelemetryEvent::TornDown { at: now });
        let duration = now.since(self.mounted_at.unwrap_or(Millis::ZERO));
        let summary = self.telemetry.aggregate_session(self.id, duration);
        self.telemetry.record(summary);
        effects
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    pub fn script(&self) -> &Script {
        self.state.script()
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    pub fn mode(&self) -> PlaybackMode {
        self.state.mode()
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index()
    }

    pub fn is_muted(&self) -> bool {
        self.audio.is_muted()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn audio(&self) -> &AudioSynchronizer {
        &self.audio
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.scheduler.deadline()
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.scheduler.pending().map(|t| t.id)
    }

    pub fn snapshot(&self, now: Millis) -> PresentationSnapshot {
        self.state.snapshot(now)
    }

    fn pause(&mut self, now: Millis) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        let Some(to) = PlaybackGraph::transition(self.state.mode(), PlaybackRequest::TogglePlayPause) else {
            effects.push(SideEffect::Log(format!("pause ignored while {:?}", self.state.mode())));
            return effects;
        };
        self.scheduler.cancel();
        self.state.reduce(StateDelta::Suspend { at: now });
        effects.extend(self.audio.pause().into_iter().map(SideEffect::Audio));
        self.telemetry.record(TelemetryEvent::Paused {
            index: self.state.current_index(),
            elapsed_ms: self.state.elapsed_at(now),
        });
        self.set_mode(to, now, &mut effects);
        effects
    }

    // Resume keeps the time already spent on the segment: only the remainder is re-armed.
    fn resume(&mut self, now: Millis) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        let Some(to) = PlaybackGraph::transition(self.state.mode(), PlaybackRequest::TogglePlayPause) else {
            effects.push(SideEffect::Log(format!("resume ignored while {:?}", self.state.mode())));
            return effects;
        };
        self.set_mode(to, now, &mut effects);
        self.state.reduce(StateDelta::Resume { at: now });
        effects.extend(self.audio.resume().into_iter().map(SideEffect::Audio));
        let remaining = self.state.remaining_at(now);
        self.scheduler.arm(now, remaining);
        self.telemetry.record(TelemetryEvent::Resumed {
            index: self.state.current_index(),
            remaining_ms: remaining,
        });
        effects
    }

    // Manual steps always restart the timer at the new segment's full duration.
    fn navigate(&mut self, direction: NavDirection, now: Millis) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        let Some(to_mode) = PlaybackGraph::transition(self.state.mode(), PlaybackRequest::Navigate) else {
            effects.push(SideEffect::Log(format!("navigation ignored while {:?}", self.state.mode())));
            return effects;
        };

        let from = self.state.current_index();
        let Some(to) = self.step_target(from, direction) else {
            self.telemetry.record(TelemetryEvent::NavigationIgnored { direction, at_index: from });
            return effects;
        };

        self.set_mode(to_mode, now, &mut effects);
        self.telemetry.record(TelemetryEvent::Navigation { direction, from, to });
        self.activate(to, now, ActivationCause::Manual, &mut effects);
        effects
    }

    fn step_target(&self, from: usize, direction: NavDirection) -> Option<usize> {
        let last = self.state.script().last_index();
        let wrap = self.config.wraps_manual_navigation();
        match direction {
            NavDirection::Forward if from < last => Some(from + 1),
            NavDirection::Forward if wrap && last > 0 => Some(0),
            NavDirection::Backward if from > 0 => Some(from - 1),
            NavDirection::Backward if wrap && last > 0 => Some(last),
            _ => None,
        }
    }

    fn auto_advance(&mut self, at: Millis, effects: &mut Vec<SideEffect>) {
        let index = self.state.current_index();
        self.telemetry.record(TelemetryEvent::SegmentCompleted {
            index,
            shown_ms: self.state.elapsed_at(at),
        });

        if index < self.state.script().last_index() {
            self.activate(index + 1, at, ActivationCause::AutoAdvance, effects);
        } else if self.state.looping() {
            // Ended is only passed through: playback re-enters index 0 within this step.
            self.telemetry.record(TelemetryEvent::Wrapped { at });
            self.activate(0, at, ActivationCause::Wrap, effects);
        } else {
            self.finish(at, effects);
        }
    }

    fn finish(&mut self, at: Millis, effects: &mut Vec<SideEffect>) {
        let index = self.state.current_index();
        self.scheduler.cancel();
        self.state.reduce(StateDelta::Suspend { at });
        effects.extend(self.audio.release().into_iter().map(SideEffect::Audio));
        effects.push(SideEffect::Render(RenderEvent::Progress { index, fraction: 1.0 }));
        if let Some(to) = PlaybackGraph::transition(self.state.mode(), PlaybackRequest::Finish) {
            self.set_mode(to, at, effects);
        }
        effects.push(SideEffect::Render(RenderEvent::Ended));
        if let Some(card) = &self.config.outro {
            effects.push(SideEffect::Render(RenderEvent::Card(card.clone())));
        }
    }

    /// Shows `index` from its beginning. Cancel-before-arm and release-before-bind
    /// both happen here, inside one call, so neither invariant can be observed broken.
    fn activate(&mut self, index: usize, at: Millis, cause: ActivationCause, effects: &mut Vec<SideEffect>) {
        self.scheduler.cancel();
        let playing = self.state.mode() == PlaybackMode::Playing;
        self.state.reduce(StateDelta::Activate { index, at, playing });

        let segment = &self.state.script()[index];
        let duration = segment.duration_ms();
        let clip = segment.audio().cloned();

        effects.push(SideEffect::Render(RenderEvent::SegmentActivated { index }));
        effects.push(SideEffect::Render(RenderEvent::Progress { index, fraction: 0.0 }));
        self.update_sub_question(at, effects);

        effects.extend(self.audio.activate(clip.as_ref(), playing).into_iter().map(SideEffect::Audio));

        if playing {
            self.scheduler.arm(at, duration);
        }
        self.telemetry.record(TelemetryEvent::SegmentShown { index, cause, at });
    }

    fn update_sub_question(&mut self, now: Millis, effects: &mut Vec<SideEffect>) {
        let index = self.state.current_index();
        let elapsed = self.state.elapsed_at(now);
        let slot = self.state.current_segment().sub_question_at(elapsed).map(|(slot, _)| slot);
        if slot != self.state.sub_question() {
            self.state.reduce(StateDelta::SubQuestion(slot));
            if let Some(question) = slot {
                effects.push(SideEffect::Render(RenderEvent::SubQuestion { index, question }));
            }
        }
    }

    fn set_mode(&mut self, to: PlaybackMode, now: Millis, effects: &mut Vec<SideEffect>) {
        let from = self.state.mode();
        if from == to {
            return;
        }
        self.state.reduce(StateDelta::Mode(to));
        self.record_transition(from, to, now, effects);
    }

    fn record_transition(&mut self, from: PlaybackMode, to: PlaybackMode, at: Millis, effects: &mut Vec<SideEffect>) {
        self.telemetry.record(TelemetryEvent::ModeTransition { from, to, at });
        effects.push(SideEffect::Render(RenderEvent::ModeChanged { from, to }));
    }
}
