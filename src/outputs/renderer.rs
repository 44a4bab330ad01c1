use std::sync::{Arc, Mutex};

use crate::config::Card;
use crate::kernel::event::RenderEvent;
use crate::kernel::playback::PlaybackMode;
use crate::kernel::segment::{Script, Segment};

/// Paints presentation state. The kernel never styles anything itself.
pub trait Renderer {
    fn on_segment_activated(&mut self, segment: &Segment, index: usize);
    fn on_progress(&mut self, fraction: f32);

    fn on_sub_question(&mut self, _segment: &Segment, _question: usize) {}
    fn on_mode_changed(&mut self, _from: PlaybackMode, _to: PlaybackMode) {}
    fn on_mute_changed(&mut self, _muted: bool) {}
    fn on_card(&mut self, _card: &Card) {}
    fn on_ended(&mut self) {}
}

/// Routes one render event to the matching renderer callback.
pub fn dispatch<R: Renderer + ?Sized>(renderer: &mut R, script: &Script, event: &RenderEvent) {
    match event {
        RenderEvent::SegmentActivated { index } => {
            if let Some(segment) = script.get(*index) {
                renderer.on_segment_activated(segment, *index);
            }
        }
        RenderEvent::Progress { fraction, .. } => renderer.on_progress(*fraction),
        RenderEvent::SubQuestion { index, question } => {
            if let Some(segment) = script.get(*index) {
                renderer.on_sub_question(segment, *question);
            }
        }
        RenderEvent::ModeChanged { from, to } => renderer.on_mode_changed(*from, *to),
        RenderEvent::MuteChanged(muted) => renderer.on_mute_changed(*muted),
        RenderEvent::Card(card) => renderer.on_card(card),
        RenderEvent::Ended => renderer.on_ended(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Segment(usize),
    Progress(f32),
    SubQuestion(usize, usize),
    Mode(PlaybackMode),
    Muted(bool),
    Card(String),
    Ended,
}

/// Keeps everything it is asked to paint. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: Arc<Mutex<Vec<Rendered>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> Vec<Rendered> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Segment indices in activation order.
    pub fn segments(&self) -> Vec<usize> {
        self.rendered()
            .into_iter()
            .filter_map(|r| match r {
                Rendered::Segment(index) => Some(index),
                _ => None,
            })
            .collect()
    }

    fn push(&self, item: Rendered) {
        if let Ok(mut log) = self.log.lock() {
            log.push(item);
        }
    }
}

impl Renderer for RecordingRenderer {
    fn on_segment_activated(&mut self, _segment: &Segment, index: usize) {
        self.push(Rendered::Segment(index));
    }

    fn on_progress(&mut self, fraction: f32) {
        self.push(Rendered::Progress(fraction));
    }

    fn on_sub_question(&mut self, segment: &Segment, question: usize) {
        self.push(Rendered::SubQuestion(segment.index(), question));
    }

    fn on_mode_changed(&mut self, _from: PlaybackMode, to: PlaybackMode) {
        self.push(Rendered::Mode(to));
    }

    fn on_mute_changed(&mut self, muted: bool) {
        self.push(Rendered::Muted(muted));
    }

    fn on_card(&mut self, card: &Card) {
        self.push(Rendered::Card(card.title.clone()));
    }

    fn on_ended(&mut self) {
        self.push(Rendered::Ended);
    }
}
