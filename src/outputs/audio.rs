use thiserror::Error;

use crate::kernel::audio::AudioSettings;
use crate::kernel::event::AudioCommand;
use crate::kernel::segment::AudioRef;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// The platform refused to start playback, e.g. autoplay without a prior gesture.
    #[error("playback of {clip} rejected: {reason}")]
    Rejected { clip: AudioRef, reason: String },
    #[error("no audio resource named {0}")]
    Unknown(AudioRef),
}

/// Platform audio. Only `play` and `resume` can fail; stopping is always best-effort.
pub trait AudioBackend {
    /// Starts `clip` from position zero.
    fn play(&mut self, clip: &AudioRef, settings: AudioSettings) -> Result<(), AudioError>;
    fn pause(&mut self, clip: &AudioRef);
    fn resume(&mut self, clip: &AudioRef) -> Result<(), AudioError>;
    /// Pauses and rewinds.
    fn stop(&mut self, clip: &AudioRef);
    /// Applies to every clip, including the one playing.
    fn set_muted(&mut self, muted: bool);
    fn set_volume(&mut self, volume: f32);

    fn execute(&mut self, command: &AudioCommand) -> Result<(), AudioError> {
        match command {
            AudioCommand::Play { clip, settings } => self.play(clip, *settings),
            AudioCommand::Pause(clip) => {
                self.pause(clip);
                Ok(())
            }
            AudioCommand::Resume(clip) => self.resume(clip),
            AudioCommand::Stop(clip) => {
                self.stop(clip);
                Ok(())
            }
            AudioCommand::SetMuted(muted) => {
                self.set_muted(*muted);
                Ok(())
            }
            AudioCommand::SetVolume(volume) => {
                self.set_volume(*volume);
                Ok(())
            }
        }
    }
}
