use cuecard::config::{Card, PresentationConfig, StartMode};
use cuecard::kernel::audio::{AudioSettings, BindingState};
use cuecard::kernel::controller::Controller;
use cuecard::kernel::event::{AudioCommand, Command, RenderEvent, SideEffect};
use cuecard::kernel::playback::PlaybackMode;
use cuecard::kernel::segment::{AudioRef, Script, ScriptError, Segment};
use cuecard::kernel::telemetry::event::TelemetryEvent;
use cuecard::kernel::time::Millis;
use cuecard::outputs::audio::AudioBackend;
use cuecard::outputs::mock_audio::ClipState;
use cuecard::outputs::renderer::{self, Rendered};
use cuecard::outputs::{MockAudioBackend, RecordingRenderer};

/// Controller plus in-memory sinks, executing effects the way the reactor does.
struct Page {
    controller: Controller,
    renderer: RecordingRenderer,
    audio: MockAudioBackend,
}

impl Page {
    fn new(durations: &[u64], config: PresentationConfig) -> Self {
        let segments = durations
            .iter()
            .enumerate()
            .map(|(i, d)| Segment::question(format!("Q{}", i), format!("S{}", i), *d).with_audio(format!("audio{}", i)))
            .collect();
        Self::with_segments(segments, config)
    }

    fn with_segments(segments: Vec<Segment>, config: PresentationConfig) -> Self {
        let script = Script::new(segments).unwrap();
        Self {
            controller: Controller::new(script, config),
            renderer: RecordingRenderer::new(),
            audio: MockAudioBackend::new(),
        }
    }

    fn run(&mut self, effects: Vec<SideEffect>) -> Vec<SideEffect> {
        for effect in &effects {
            match effect {
                SideEffect::Render(event) => {
                    renderer::dispatch(&mut self.renderer, self.controller.script(), event);
                }
                SideEffect::Audio(command) => {
                    if self.audio.execute(command).is_err() {
                        self.controller.audio_rejected(command);
                    }
                }
                SideEffect::Log(_) => {}
            }
        }
        effects
    }

    fn mount(&mut self, at: u64) -> Vec<SideEffect> {
        let effects = self.controller.mount(Millis(at));
        self.run(effects)
    }

    fn apply(&mut self, command: Command, at: u64) -> Vec<SideEffect> {
        let effects = self.controller.apply(command, Millis(at));
        self.run(effects)
    }

    fn tick(&mut self, at: u64) -> Vec<SideEffect> {
        let effects = self.controller.tick(Millis(at));
        self.run(effects)
    }

    fn index(&self) -> usize {
        self.controller.current_index()
    }

    fn mode(&self) -> PlaybackMode {
        self.controller.mode()
    }
}

fn manual() -> PresentationConfig {
    PresentationConfig::default()
}

fn autoplay_loop() -> PresentationConfig {
    PresentationConfig {
        start_mode: StartMode::Autoplay,
        looping: true,
        ..PresentationConfig::default()
    }
}

fn renders(effects: &[SideEffect]) -> usize {
    effects.iter().filter(|e| matches!(e, SideEffect::Render(_))).count()
}

#[test]
fn three_segments_advance_on_schedule_and_end() {
    let mut page = Page::new(&[3000, 3000, 11000], manual());
    page.mount(0);
    page.apply(Command::Start, 0);
    assert_eq!(page.mode(), PlaybackMode::Playing);

    page.tick(2999);
    assert_eq!(page.index(), 0);
    page.tick(3000);
    assert_eq!(page.index(), 1);
    page.tick(6000);
    assert_eq!(page.index(), 2);
    page.tick(16_999);
    assert_eq!(page.mode(), PlaybackMode::Playing);
    page.tick(17_000);
    assert_eq!(page.mode(), PlaybackMode::Ended);

    assert_eq!(page.renderer.segments(), vec![0, 1, 2]);
    assert!(page.renderer.rendered().contains(&Rendered::Ended));
    assert!(page.controller.pending_timer().is_none());
    assert_eq!(page.audio.active_count(), 0);
}

#[test]
fn late_tick_fires_every_due_advance() {
    let mut page = Page::new(&[3000, 3000, 11000], manual());
    page.apply(Command::Start, 0);

    page.tick(20_000);
    assert_eq!(page.mode(), PlaybackMode::Ended);
    assert_eq!(page.renderer.segments(), vec![0, 1, 2]);

    let completed: Vec<u64> = page
        .controller
        .telemetry
        .events()
        .iter()
        .filter_map(|e| match e {
            TelemetryEvent::SegmentCompleted { shown_ms, .. } => Some(*shown_ms),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![3000, 3000, 11000]);
}

#[test]
fn looping_wraps_to_first_segment_without_showing_ended() {
    let mut page = Page::new(&[1000, 2000], autoplay_loop());
    page.mount(0);
    assert_eq!(page.mode(), PlaybackMode::Playing);

    page.tick(1000);
    assert_eq!(page.index(), 1);
    page.tick(3000);
    assert_eq!(page.index(), 0);
    assert_eq!(page.mode(), PlaybackMode::Playing);
    assert_eq!(page.controller.deadline(), Some(Millis(4000)));

    assert!(!page.renderer.rendered().contains(&Rendered::Mode(PlaybackMode::Ended)));
    assert_eq!(page.controller.telemetry.snapshot().playback_stats.wraps, 1);
    assert_eq!(page.audio.playing().len(), 1);
    assert_eq!(page.audio.clip("audio0").map(|c| c.starts), Some(2));
}

#[test]
fn resume_keeps_time_already_shown() {
    let mut page = Page::new(&[4000, 1000], manual());
    page.apply(Command::Start, 0);
    page.tick(1000);

    page.apply(Command::TogglePlayPause, 1500);
    assert_eq!(page.mode(), PlaybackMode::Paused);
    assert!(page.controller.pending_timer().is_none());
    assert_eq!(page.audio.clip("audio0").map(|c| c.state), Some(ClipState::Paused));

    page.tick(10_000);
    assert_eq!(page.index(), 0);

    page.apply(Command::TogglePlayPause, 11_000);
    assert_eq!(page.mode(), PlaybackMode::Playing);
    assert_eq!(page.controller.deadline(), Some(Millis(13_500)));
    assert_eq!(page.audio.clip("audio0").map(|c| c.starts), Some(1));

    page.tick(13_499);
    assert_eq!(page.index(), 0);
    page.tick(13_500);
    assert_eq!(page.index(), 1);
}

#[test]
fn manual_next_restarts_at_full_duration() {
    let mut page = Page::new(&[4000, 5000], manual());
    page.apply(Command::Start, 0);

    page.apply(Command::Next, 1000);
    assert_eq!(page.index(), 1);
    assert_eq!(page.controller.deadline(), Some(Millis(6000)));
    assert_eq!(page.audio.playing().len(), 1);
    assert_eq!(page.audio.clip("audio0").map(|c| c.state), Some(ClipState::Stopped));

    page.tick(5999);
    assert_eq!(page.mode(), PlaybackMode::Playing);
    page.tick(6000);
    assert_eq!(page.mode(), PlaybackMode::Ended);
}

#[test]
fn previous_after_pause_uses_full_duration_on_resume() {
    let mut page = Page::new(&[4000, 5000], manual());
    page.apply(Command::Start, 0);
    page.tick(4000);
    page.apply(Command::TogglePlayPause, 4500);

    page.apply(Command::Previous, 5000);
    assert_eq!(page.index(), 0);
    assert_eq!(page.mode(), PlaybackMode::Paused);
    assert!(page.controller.pending_timer().is_none());
    assert_eq!(
        page.controller.audio().active().map(|b| b.state),
        Some(BindingState::Staged)
    );

    page.apply(Command::TogglePlayPause, 6000);
    assert_eq!(page.controller.deadline(), Some(Millis(10_000)));
    assert_eq!(page.audio.playing(), vec![cuecard::kernel::segment::AudioRef::new("audio0")]);
}

#[test]
fn mute_toggle_does_not_restart_the_clip() {
    let mut page = Page::new(&[4000], manual());
    page.apply(Command::Start, 0);
    page.tick(1200);

    let effects = page.apply(Command::ToggleMute, 1500);
    assert!(effects.contains(&SideEffect::Render(RenderEvent::MuteChanged(true))));
    assert!(page.controller.is_muted());

    let clip = page.audio.clip("audio0").unwrap();
    assert!(clip.muted);
    assert_eq!(clip.state, ClipState::Playing);
    assert_eq!(clip.starts, 1);
    assert_eq!(page.controller.deadline(), Some(Millis(4000)));

    // Setting the same value again changes nothing.
    assert!(page.apply(Command::SetMuted(true), 1600).is_empty());
}

#[test]
fn navigation_past_either_end_is_a_no_op() {
    let mut page = Page::new(&[4000, 5000], manual());
    page.apply(Command::Start, 0);
    let version = page.controller.state().version;

    let effects = page.apply(Command::Previous, 100);
    assert_eq!(renders(&effects), 0);
    assert_eq!(page.index(), 0);
    assert_eq!(page.controller.deadline(), Some(Millis(4000)));
    assert_eq!(page.controller.state().version, version);

    page.apply(Command::Next, 200);
    let effects = page.apply(Command::Next, 300);
    assert_eq!(renders(&effects), 0);
    assert_eq!(page.index(), 1);
    assert_eq!(page.controller.deadline(), Some(Millis(5200)));

    assert_eq!(page.controller.telemetry.snapshot().navigation_stats.ignored, 2);
}

#[test]
fn navigation_while_idle_is_ignored() {
    let mut page = Page::new(&[4000, 5000], manual());
    page.mount(0);
    let effects = page.apply(Command::Next, 10);
    assert_eq!(renders(&effects), 0);
    assert_eq!(page.mode(), PlaybackMode::Idle);
    assert!(page.renderer.segments().is_empty());
}

#[test]
fn autoplay_loop_wraps_manual_navigation() {
    let mut page = Page::new(&[1000, 2000, 3000], autoplay_loop());
    page.mount(0);

    page.apply(Command::Previous, 100);
    assert_eq!(page.index(), 2);
    page.apply(Command::Next, 200);
    assert_eq!(page.index(), 0);
}

#[test]
fn single_segment_loop_never_wraps_manually() {
    let mut page = Page::new(&[1000], autoplay_loop());
    page.mount(0);
    let effects = page.apply(Command::Next, 100);
    assert_eq!(renders(&effects), 0);
    assert_eq!(page.controller.deadline(), Some(Millis(1000)));
}

#[test]
fn empty_script_is_rejected() {
    assert!(matches!(Script::new(Vec::new()), Err(ScriptError::Empty)));
    assert!(matches!(
        Script::new(vec![Segment::question("a", "b", 0)]),
        Err(ScriptError::ZeroDuration { index: 0 })
    ));
}

#[test]
fn refused_autoplay_is_retried_on_next_gesture() {
    let config = PresentationConfig {
        start_mode: StartMode::Autoplay,
        start_muted: true,
        ..PresentationConfig::default()
    };
    let mut page = Page::new(&[4000, 4000], config);
    page.audio.reject_next(1);
    page.mount(0);

    assert_eq!(page.mode(), PlaybackMode::Playing);
    assert!(page.audio.playing().is_empty());
    assert_eq!(
        page.controller.audio().active().map(|b| b.state),
        Some(BindingState::Blocked { started: false })
    );
    // The segment timer does not wait for audio.
    assert_eq!(page.controller.deadline(), Some(Millis(4000)));

    page.apply(Command::ToggleMute, 500);
    assert_eq!(page.audio.playing().len(), 1);
    let clip = page.audio.clip("audio0").unwrap();
    assert!(!clip.muted);

    let stats = page.controller.telemetry.snapshot().audio_stats;
    assert_eq!(stats.rejections, 1);
    assert_eq!(stats.unlocks, 1);
}

#[test]
fn refused_resume_continues_the_clip_on_next_gesture() {
    let mut page = Page::new(&[10_000], manual());
    page.apply(Command::Start, 0);
    page.tick(4000);
    page.apply(Command::TogglePlayPause, 4000);

    page.audio.reject_next(1);
    page.apply(Command::TogglePlayPause, 5000);
    assert_eq!(page.mode(), PlaybackMode::Playing);
    assert_eq!(
        page.controller.audio().active().map(|b| b.state),
        Some(BindingState::Blocked { started: true })
    );
    assert_eq!(page.audio.clip("audio0").map(|c| c.state), Some(ClipState::Paused));

    let effects = page.apply(Command::ToggleMute, 6000);
    assert!(effects.contains(&SideEffect::Audio(AudioCommand::Resume(AudioRef::new("audio0")))));
    assert!(!effects
        .iter()
        .any(|e| matches!(e, SideEffect::Audio(AudioCommand::Play { .. }))));

    let clip = page.audio.clip("audio0").unwrap();
    assert_eq!(clip.state, ClipState::Playing);
    assert_eq!(clip.starts, 1);
}

#[test]
fn start_is_ignored_once_started() {
    let mut page = Page::new(&[1000, 1000], manual());
    page.apply(Command::Start, 0);

    let check = |page: &mut Page, at: u64| {
        let deadline = page.controller.deadline();
        let index = page.index();
        let mode = page.mode();
        let version = page.controller.state().version;
        let recorded = page.controller.telemetry.events().len();

        let effects = page.apply(Command::Start, at);
        assert!(effects.iter().all(|e| matches!(e, SideEffect::Log(_))), "{:?}", effects);
        assert_eq!(page.controller.deadline(), deadline);
        assert_eq!(page.index(), index);
        assert_eq!(page.mode(), mode);
        assert_eq!(page.controller.state().version, version);
        assert_eq!(page.controller.telemetry.events().len(), recorded);
    };

    check(&mut page, 400);
    assert_eq!(page.audio.clip("audio0").map(|c| c.starts), Some(1));

    page.apply(Command::TogglePlayPause, 500);
    assert_eq!(page.mode(), PlaybackMode::Paused);
    check(&mut page, 600);

    page.apply(Command::TogglePlayPause, 700);
    page.tick(2200);
    assert_eq!(page.mode(), PlaybackMode::Ended);
    check(&mut page, 2300);
    assert_eq!(page.controller.telemetry.snapshot().playback_stats.starts, 1);
}

#[test]
fn stale_rejection_after_navigation_is_ignored() {
    let mut page = Page::new(&[4000, 4000], manual());
    page.apply(Command::Start, 0);
    page.apply(Command::Next, 100);

    let old = AudioCommand::Play {
        clip: AudioRef::new("audio0"),
        settings: AudioSettings::default(),
    };
    let effects = page.controller.audio_rejected(&old);
    assert!(effects.is_empty());
    assert_eq!(
        page.controller.audio().active().map(|b| b.state),
        Some(BindingState::Playing)
    );
    assert_eq!(page.controller.telemetry.snapshot().audio_stats.stale_rejections, 1);
}

#[test]
fn intro_and_outro_cards() {
    let config = PresentationConfig {
        intro: Some(Card::new("Welcome", "Press play")),
        outro: Some(Card::new("Done", "Restart to watch again")),
        ..PresentationConfig::default()
    };
    let mut page = Page::new(&[1000], config);
    page.mount(0);
    assert_eq!(page.renderer.rendered(), vec![Rendered::Card("Welcome".to_string())]);

    page.apply(Command::TogglePlayPause, 10);
    page.tick(1010);
    let rendered = page.renderer.rendered();
    assert_eq!(rendered.last(), Some(&Rendered::Card("Done".to_string())));
    assert!(rendered.contains(&Rendered::Progress(1.0)));
}

#[test]
fn toggle_after_end_restarts_from_the_top() {
    let mut page = Page::new(&[1000, 1000], manual());
    page.apply(Command::Start, 0);
    page.tick(2000);
    assert_eq!(page.mode(), PlaybackMode::Ended);

    page.apply(Command::TogglePlayPause, 3000);
    assert_eq!(page.mode(), PlaybackMode::Playing);
    assert_eq!(page.index(), 0);
    assert_eq!(page.controller.deadline(), Some(Millis(4000)));
}

#[test]
fn navigation_after_end_shows_segment_paused() {
    let mut page = Page::new(&[1000, 1000], manual());
    page.apply(Command::Start, 0);
    page.tick(2000);

    page.apply(Command::Previous, 2500);
    assert_eq!(page.mode(), PlaybackMode::Paused);
    assert_eq!(page.index(), 0);
    assert!(page.controller.pending_timer().is_none());
}

#[test]
fn restart_mid_play_rewinds() {
    let mut page = Page::new(&[1000, 1000, 1000], manual());
    page.apply(Command::Start, 0);
    page.tick(1500);
    assert_eq!(page.index(), 1);

    page.apply(Command::Restart, 1600);
    assert_eq!(page.index(), 0);
    assert_eq!(page.mode(), PlaybackMode::Playing);
    assert_eq!(page.controller.deadline(), Some(Millis(2600)));
    assert_eq!(page.audio.active_count(), 1);
}

#[test]
fn stale_timer_fire_is_ignored() {
    let mut page = Page::new(&[1000, 1000, 1000], manual());
    page.apply(Command::Start, 0);
    let old = page.controller.pending_timer().unwrap();
    page.apply(Command::Next, 500);

    let effects = page.controller.on_timer(old, Millis(1000));
    assert_eq!(renders(&effects), 0);
    assert_eq!(page.index(), 1);
}

#[test]
fn cycling_questions_follow_elapsed_time() {
    let segments = vec![
        Segment::question_cycle(vec!["a".into(), "b".into(), "c".into()], 1000, "sub", 6000),
        Segment::subtitle("after", 1000),
    ];
    let mut page = Page::with_segments(segments, manual());
    page.apply(Command::Start, 0);
    page.tick(999);
    page.tick(1000);
    page.tick(2500);
    page.tick(3000);

    let questions: Vec<usize> = page
        .renderer
        .rendered()
        .into_iter()
        .filter_map(|r| match r {
            Rendered::SubQuestion(0, q) => Some(q),
            _ => None,
        })
        .collect();
    assert_eq!(questions, vec![0, 1, 2, 0]);
}

#[test]
fn teardown_releases_everything() {
    let mut page = Page::new(&[1000, 1000], manual());
    page.mount(0);
    page.apply(Command::Start, 100);

    let effects = page.controller.teardown(Millis(600));
    let effects = page.run(effects);

    assert!(effects.contains(&SideEffect::Render(RenderEvent::ModeChanged {
        from: PlaybackMode::Playing,
        to: PlaybackMode::Idle,
    })));
    assert!(page.controller.telemetry.events().iter().any(|e| matches!(
        e,
        TelemetryEvent::ModeTransition {
            from: PlaybackMode::Playing,
            to: PlaybackMode::Idle,
            ..
        }
    )));
    assert_eq!(page.mode(), PlaybackMode::Idle);
    assert!(page.controller.pending_timer().is_none());
    assert!(page.controller.audio().active().is_none());
    assert_eq!(page.audio.active_count(), 0);
    assert!(matches!(
        page.controller.telemetry.events().back(),
        Some(TelemetryEvent::SessionSummary { duration_ms: 600, .. })
    ));
}

#[test]
fn volume_is_clamped_and_applied_to_the_backend() {
    let mut page = Page::new(&[1000], manual());
    page.apply(Command::Start, 0);

    let effects = page.controller.set_volume(1.8);
    page.run(effects);
    assert_eq!(page.controller.audio().settings().volume, 1.0);
    assert!(page.controller.set_volume(1.0).is_empty());

    let effects = page.controller.set_volume(0.25);
    page.run(effects);
    assert_eq!(page.audio.volume(), Some(0.25));
    assert_eq!(page.audio.clip("audio0").map(|c| c.volume), Some(0.25));
}
