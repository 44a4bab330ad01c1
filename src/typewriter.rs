//! Word-pair typewriter for rotating headings.
//!
//! Types a phrase a few words per step, holds on the full phrase, erases the same
//! way, then rotates to the next heading/phrase pair. Like the presentation
//! controller it is driven by logical time and keeps one pending timer.

use thiserror::Error;

use crate::kernel::scheduler::Scheduler;
use crate::kernel::time::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypewriterTiming {
    pub words_per_step: usize,
    pub step_ms: u64,
    pub hold_ms: u64,
}

impl Default for TypewriterTiming {
    fn default() -> Self {
        Self {
            words_per_step: 2,
            step_ms: 150,
            hold_ms: 4000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterFrame {
    pub heading: String,
    pub text: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypewriterError {
    #[error("typewriter needs at least one heading/phrase pair")]
    Empty,
    #[error("phrase {index} has no words")]
    EmptyPhrase { index: usize },
    #[error("words per step must be at least 1")]
    ZeroStep,
}

#[derive(Debug)]
struct Line {
    heading: String,
    words: Vec<String>,
}

#[derive(Debug)]
pub struct Typewriter {
    lines: Vec<Line>,
    timing: TypewriterTiming,
    phrase: usize,
    word: usize,
    deleting: bool,
    scheduler: Scheduler,
}

impl Typewriter {
    pub fn new<H, P>(pairs: impl IntoIterator<Item = (H, P)>, timing: TypewriterTiming) -> Result<Self, TypewriterError>
    where
        H: Into<String>,
        P: AsRef<str>,
    {
        if timing.words_per_step == 0 {
            return Err(TypewriterError::ZeroStep);
        }
        let mut lines = Vec::new();
        for (index, (heading, phrase)) in pairs.into_iter().enumerate() {
            let words: Vec<String> = phrase.as_ref().split_whitespace().map(str::to_string).collect();
            if words.is_empty() {
                return Err(TypewriterError::EmptyPhrase { index });
            }
            lines.push(Line {
                heading: heading.into(),
                words,
            });
        }
        if lines.is_empty() {
            return Err(TypewriterError::Empty);
        }
        Ok(Self {
            lines,
            timing,
            phrase: 0,
            word: 0,
            deleting: false,
            scheduler: Scheduler::new(),
        })
    }

    /// Shows the first frame and arms the next step.
    pub fn start(&mut self, now: Millis) -> TypewriterFrame {
        self.phrase = 0;
        self.word = 0;
        self.deleting = false;
        self.step(now)
    }

    /// Every frame due at `now`, in order. Each step is scheduled from the due
    /// instant of the previous one, not from `now`.
    pub fn tick(&mut self, now: Millis) -> Vec<TypewriterFrame> {
        let mut frames = Vec::new();
        while let Some(timer) = self.scheduler.take_due(now) {
            frames.push(self.step(timer.due));
        }
        frames
    }

    pub fn stop(&mut self) {
        self.scheduler.cancel();
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.scheduler.deadline()
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase
    }

    fn step(&mut self, at: Millis) -> TypewriterFrame {
        let per_step = self.timing.words_per_step;
        let line = &self.lines[self.phrase];
        let end = (self.word + per_step).min(line.words.len());
        let text = line.words[..end].join(" ");
        let mut delay = self.timing.step_ms;

        if !self.deleting {
            if end == line.words.len() {
                delay = self.timing.hold_ms;
                self.deleting = true;
            } else {
                self.word += per_step;
            }
        } else if end <= per_step {
            // Heading switches together with the last erase step.
            self.phrase = (self.phrase + 1) % self.lines.len();
            self.word = 0;
            self.deleting = false;
        } else {
            self.word = self.word.saturating_sub(per_step);
        }

        self.scheduler.arm(at, delay);
        TypewriterFrame {
            heading: self.lines[self.phrase].heading.clone(),
            text,
        }
    }
}
