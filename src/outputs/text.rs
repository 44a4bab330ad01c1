use std::io::Write;

use super::realizer::{card_lines, progress_bar, segment_lines};
use super::renderer::Renderer;
use crate::config::Card;
use crate::kernel::playback::PlaybackMode;
use crate::kernel::segment::{Segment, SegmentKind};

const BAR_WIDTH: usize = 30;
const PROGRESS_STEPS: f32 = 10.0;

/// Terminal renderer. Progress is printed in tenths so the 20ms tick does not flood the output.
pub struct ConsoleRenderer<W: Write> {
    out: W,
    total: usize,
    last_bucket: Option<u32>,
}

impl ConsoleRenderer<std::io::Stdout> {
    pub fn stdout(total: usize) -> Self {
        Self::new(std::io::stdout(), total)
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, total: usize) -> Self {
        Self {
            out,
            total,
            last_bucket: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        // Console output is best-effort; a closed pipe must not stop the presentation.
        let _ = writeln!(self.out, "{}", text);
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn on_segment_activated(&mut self, segment: &Segment, index: usize) {
        self.last_bucket = None;
        self.line("");
        for line in segment_lines(segment, index, self.total) {
            self.line(&line);
        }
    }

    fn on_progress(&mut self, fraction: f32) {
        let bucket = (fraction.clamp(0.0, 1.0) * PROGRESS_STEPS).floor() as u32;
        if self.last_bucket == Some(bucket) {
            return;
        }
        self.last_bucket = Some(bucket);
        self.line(&format!("      {}", progress_bar(fraction, BAR_WIDTH)));
    }

    fn on_sub_question(&mut self, segment: &Segment, question: usize) {
        if let SegmentKind::MultiQuestionCycle { questions, .. } = segment.kind() {
            if let Some(text) = questions.get(question) {
                self.line(&format!("   -> {}", text));
            }
        }
    }

    fn on_mode_changed(&mut self, _from: PlaybackMode, to: PlaybackMode) {
        let label = match to {
            PlaybackMode::Idle => "idle",
            PlaybackMode::Playing => "playing",
            PlaybackMode::Paused => "paused",
            PlaybackMode::Ended => "ended",
        };
        self.line(&format!("   [{}]", label));
    }

    fn on_mute_changed(&mut self, muted: bool) {
        self.line(if muted { "   [muted]" } else { "   [sound on]" });
    }

    fn on_card(&mut self, card: &Card) {
        self.line("");
        for line in card_lines(card) {
            self.line(&line);
        }
    }
}
