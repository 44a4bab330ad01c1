use serde::{Deserialize, Serialize};

use super::event::AudioCommand;
use super::segment::AudioRef;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    pub muted: bool,
    pub volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            muted: false,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingState {
    /// Started and not stopped.
    Playing,
    /// Started, then paused mid-clip.
    Paused,
    /// Bound to the segment but never started (presentation was paused).
    Staged,
    /// The platform refused to start it; waiting for a user gesture.
    /// `started` is set when the refused command was a resume of a clip already part-way through.
    Blocked { started: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBinding {
    pub clip: AudioRef,
    pub state: BindingState,
}

/// Tracks the one clip bound to the active segment.
/// Every operation returns the backend commands that realize it; nothing here performs I/O.
#[derive(Debug, Default)]
pub struct AudioSynchronizer {
    active: Option<AudioBinding>,
    settings: AudioSettings,
}

impl AudioSynchronizer {
    pub fn new(settings: AudioSettings) -> Self {
        Self { active: None, settings }
    }

    /// Stops whatever is bound, then binds `clip`. The clip starts only when `autostart` is set.
    pub fn activate(&mut self, clip: Option<&AudioRef>, autostart: bool) -> Vec<AudioCommand> {
        let mut commands = self.release();
        if let Some(clip) = clip {
            let state = if autostart {
                commands.push(AudioCommand::Play {
                    clip: clip.clone(),
                    settings: self.settings,
                });
                BindingState::Playing
            } else {
                BindingState::Staged
            };
            self.active = Some(AudioBinding { clip: clip.clone(), state });
        }
        commands
    }

    pub fn release(&mut self) -> Vec<AudioCommand> {
        match self.active.take() {
            Some(binding) => vec![AudioCommand::Stop(binding.clip)],
            None => Vec::new(),
        }
    }

    pub fn pause(&mut self) -> Vec<AudioCommand> {
        let Some(binding) = self.active.as_mut() else {
            return Vec::new();
        };
        match binding.state {
            BindingState::Playing => {
                binding.state = BindingState::Paused;
                vec![AudioCommand::Pause(binding.clip.clone())]
            }
            // Nothing is sounding, so there is nothing to pause; resume will try again.
            BindingState::Blocked { started: true } => {
                binding.state = BindingState::Paused;
                Vec::new()
            }
            BindingState::Blocked { started: false } => {
                binding.state = BindingState::Staged;
                Vec::new()
            }
            BindingState::Paused | BindingState::Staged => Vec::new(),
        }
    }

    pub fn resume(&mut self) -> Vec<AudioCommand> {
        let settings = self.settings;
        let Some(binding) = self.active.as_mut() else {
            return Vec::new();
        };
        match binding.state {
            BindingState::Paused | BindingState::Blocked { started: true } => {
                binding.state = BindingState::Playing;
                vec![AudioCommand::Resume(binding.clip.clone())]
            }
            BindingState::Staged | BindingState::Blocked { started: false } => {
                binding.state = BindingState::Playing;
                vec![AudioCommand::Play {
                    clip: binding.clip.clone(),
                    settings,
                }]
            }
            BindingState::Playing => Vec::new(),
        }
    }

    /// Returns None when the mute state is unchanged.
    pub fn set_muted(&mut self, muted: bool) -> Option<AudioCommand> {
        if self.settings.muted == muted {
            return None;
        }
        self.settings.muted = muted;
        Some(AudioCommand::SetMuted(muted))
    }

    pub fn set_volume(&mut self, volume: f32) -> Option<AudioCommand> {
        let volume = volume.clamp(0.0, 1.0);
        if self.settings.volume == volume {
            return None;
        }
        self.settings.volume = volume;
        Some(AudioCommand::SetVolume(volume))
    }

    /// Marks `clip` as refused by the platform. `started` tells a refused resume apart
    /// from a refused first start. Returns false if it is no longer the bound clip.
    pub fn reject(&mut self, clip: &AudioRef, started: bool) -> bool {
        match self.active.as_mut() {
            Some(binding) if &binding.clip == clip => {
                binding.state = BindingState::Blocked { started };
                true
            }
            _ => false,
        }
    }

    /// Retries a refused clip. Called on user gestures while playing. A clip refused on
    /// resume continues where it stopped; one refused on its first start plays from zero.
    pub fn unlock(&mut self) -> Option<AudioCommand> {
        let settings = self.settings;
        let binding = self.active.as_mut()?;
        let BindingState::Blocked { started } = binding.state else {
            return None;
        };
        binding.state = BindingState::Playing;
        let clip = binding.clip.clone();
        Some(if started {
            AudioCommand::Resume(clip)
        } else {
            AudioCommand::Play { clip, settings }
        })
    }

    pub fn active(&self) -> Option<&AudioBinding> {
        self.active.as_ref()
    }

    pub fn settings(&self) -> AudioSettings {
        self.settings
    }

    pub fn is_muted(&self) -> bool {
        self.settings.muted
    }
}
