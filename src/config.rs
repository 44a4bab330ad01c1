use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::input::ControlStyle;
use crate::kernel::audio::AudioSettings;
use crate::kernel::segment::{Script, ScriptError, Segment, SegmentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMode {
    /// Starts on mount. Usually paired with `start_muted` so platforms allow it.
    Autoplay,
    /// Waits in Idle for the first play command.
    #[default]
    Manual,
}

/// Static text shown while Idle (intro) or after Ended (outro).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub body: String,
}

impl Card {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub start_mode: StartMode,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub start_muted: bool,
    pub volume: f32,
    pub control_style: ControlStyle,
    pub intro: Option<Card>,
    pub outro: Option<Card>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            start_mode: StartMode::Manual,
            looping: false,
            start_muted: false,
            volume: 1.0,
            control_style: ControlStyle::PlayPause,
            intro: None,
            outro: None,
        }
    }
}

impl PresentationConfig {
    /// Manual navigation wraps around the ends only in autoplay continuous mode.
    pub fn wraps_manual_navigation(&self) -> bool {
        self.looping && self.start_mode == StartMode::Autoplay
    }

    pub fn audio_settings(&self) -> AudioSettings {
        AudioSettings {
            muted: self.start_muted,
            volume: self.volume,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Volume(self.volume));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read script {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid script: {0}")]
    Script(#[from] ScriptError),
    #[error("volume {0} is outside 0.0..=1.0")]
    Volume(f32),
}

/// On-disk form of one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSpec {
    #[serde(flatten)]
    pub kind: SegmentKind,
    #[serde(default)]
    pub primary: String,
    #[serde(default)]
    pub secondary: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub audio: Option<String>,
}

impl SegmentSpec {
    fn into_segment(self) -> Segment {
        let primary = match &self.kind {
            SegmentKind::MultiQuestionCycle { questions, .. } if self.primary.is_empty() => {
                questions.first().cloned().unwrap_or_default()
            }
            _ => self.primary,
        };
        let segment = Segment::with_kind(self.kind, primary, self.secondary, self.duration_ms);
        match self.audio {
            Some(clip) => segment.with_audio(clip),
            None => segment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScriptFile {
    #[serde(default)]
    config: PresentationConfig,
    segments: Vec<SegmentSpec>,
}

/// A validated script together with the page configuration that drives it.
#[derive(Debug, Clone)]
pub struct PresentationDocument {
    pub config: PresentationConfig,
    pub script: Script,
}

impl PresentationDocument {
    pub fn new(config: PresentationConfig, segments: Vec<Segment>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            script: Script::new(segments)?,
        })
    }

    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let file: ScriptFile = serde_json::from_str(json)?;
        let segments = file.segments.into_iter().map(SegmentSpec::into_segment).collect();
        Self::new(file.config, segments)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }
}
