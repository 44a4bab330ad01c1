use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Opaque handle to an audio clip. The kernel never interprets it; the audio backend does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioRef(String);

impl AudioRef {
    pub fn new(id: impl Into<String>) -> Self {
        AudioRef(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a segment is laid out by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentKind {
    /// Question and subtitle shown together.
    QuestionAndSubtitle,
    /// Subtitle only; the previous question stays on screen, dimmed.
    SubtitleOnly,
    /// A rotating set of questions under one subtitle. The visible question
    /// is derived from elapsed segment time, never from a second timer.
    MultiQuestionCycle { questions: Vec<String>, cycle_ms: u64 },
}

/// One unit of timed content. Immutable once it is part of a [`Script`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    index: usize,
    kind: SegmentKind,
    primary: String,
    secondary: String,
    duration_ms: u64,
    audio: Option<AudioRef>,
}

impl Segment {
    pub fn question(primary: impl Into<String>, secondary: impl Into<String>, duration_ms: u64) -> Self {
        Self::with_kind(SegmentKind::QuestionAndSubtitle, primary.into(), secondary.into(), duration_ms)
    }

    pub fn subtitle(secondary: impl Into<String>, duration_ms: u64) -> Self {
        Self::with_kind(SegmentKind::SubtitleOnly, String::new(), secondary.into(), duration_ms)
    }

    pub fn question_cycle(
        questions: Vec<String>,
        cycle_ms: u64,
        secondary: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        let primary = questions.first().cloned().unwrap_or_default();
        Self::with_kind(
            SegmentKind::MultiQuestionCycle { questions, cycle_ms },
            primary,
            secondary.into(),
            duration_ms,
        )
    }

    pub fn with_kind(kind: SegmentKind, primary: String, secondary: String, duration_ms: u64) -> Self {
        Self {
            index: 0,
            kind,
            primary,
            secondary,
            duration_ms,
            audio: None,
        }
    }

    pub fn with_audio(mut self, clip: impl Into<String>) -> Self {
        self.audio = Some(AudioRef::new(clip));
        self
    }

    /// Position in the owning script. Assigned by [`Script::new`].
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    pub fn primary_text(&self) -> &str {
        &self.primary
    }

    pub fn secondary_text(&self) -> &str {
        &self.secondary
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn audio(&self) -> Option<&AudioRef> {
        self.audio.as_ref()
    }

    /// Sub-question visible after `elapsed_ms` of play, for cycling segments.
    pub fn sub_question_at(&self, elapsed_ms: u64) -> Option<(usize, &str)> {
        match &self.kind {
            SegmentKind::MultiQuestionCycle { questions, cycle_ms } if !questions.is_empty() && *cycle_ms > 0 => {
                let slot = ((elapsed_ms / cycle_ms) as usize) % questions.len();
                Some((slot, questions[slot].as_str()))
            }
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ScriptError> {
        if self.duration_ms == 0 {
            return Err(ScriptError::ZeroDuration { index: self.index });
        }
        if let SegmentKind::MultiQuestionCycle { questions, cycle_ms } = &self.kind {
            if questions.is_empty() {
                return Err(ScriptError::EmptyCycle { index: self.index });
            }
            if *cycle_ms == 0 {
                return Err(ScriptError::ZeroCycleInterval { index: self.index });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("a presentation needs at least one segment")]
    Empty,
    #[error("segment {index} has a zero duration")]
    ZeroDuration { index: usize },
    #[error("segment {index} cycles through an empty question list")]
    EmptyCycle { index: usize },
    #[error("segment {index} has a zero cycle interval")]
    ZeroCycleInterval { index: usize },
}

/// Ordered, non-empty, validated sequence of segments.
/// Cloning is cheap; all clones share the same segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    segments: Arc<[Segment]>,
}

impl Script {
    pub fn new(mut segments: Vec<Segment>) -> Result<Self, ScriptError> {
        if segments.is_empty() {
            return Err(ScriptError::Empty);
        }
        for (index, segment) in segments.iter_mut().enumerate() {
            segment.index = index;
            segment.validate()?;
        }
        Ok(Self {
            segments: segments.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    // Always false: construction rejects empty scripts.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.segments.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.segments.iter().map(|s| s.duration_ms).sum()
    }
}

impl std::ops::Index<usize> for Script {
    type Output = Segment;

    fn index(&self, index: usize) -> &Segment {
        &self.segments[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_script_is_rejected() {
        assert_eq!(Script::new(vec![]), Err(ScriptError::Empty));
    }

    #[test]
    fn indices_follow_order() {
        let script = Script::new(vec![
            Segment::question("a", "b", 1000),
            Segment::subtitle("c", 2000).with_audio("clip"),
        ])
        .unwrap();
        assert_eq!(script[0].index(), 0);
        assert_eq!(script[1].index(), 1);
        assert_eq!(script[1].audio().map(AudioRef::as_str), Some("clip"));
        assert_eq!(script.total_duration_ms(), 3000);
    }

    #[test]
    fn zero_duration_reports_position() {
        let err = Script::new(vec![Segment::question("a", "b", 1000), Segment::subtitle("c", 0)]).unwrap_err();
        assert_eq!(err, ScriptError::ZeroDuration { index: 1 });
    }

    #[test]
    fn question_cycle_validation() {
        let err = Script::new(vec![Segment::question_cycle(vec![], 500, "s", 1000)]).unwrap_err();
        assert_eq!(err, ScriptError::EmptyCycle { index: 0 });

        let err = Script::new(vec![Segment::question_cycle(vec!["q".into()], 0, "s", 1000)]).unwrap_err();
        assert_eq!(err, ScriptError::ZeroCycleInterval { index: 0 });
    }

    #[test]
    fn sub_question_rotates_with_elapsed_time() {
        let seg = Segment::question_cycle(vec!["one".into(), "two".into(), "three".into()], 1000, "s", 6000);
        assert_eq!(seg.primary_text(), "one");
        assert_eq!(seg.sub_question_at(0), Some((0, "one")));
        assert_eq!(seg.sub_question_at(999), Some((0, "one")));
        assert_eq!(seg.sub_question_at(1000), Some((1, "two")));
        assert_eq!(seg.sub_question_at(3500), Some((0, "one")));
        assert_eq!(Segment::question("a", "b", 10).sub_question_at(5), None);
    }
}
