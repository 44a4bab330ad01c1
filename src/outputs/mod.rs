//! Effect sinks: where the kernel's render and audio effects end up.

pub mod audio;
pub mod mock_audio;
pub mod realizer;
pub mod renderer;
pub mod text;

pub use audio::{AudioBackend, AudioError};
pub use mock_audio::MockAudioBackend;
pub use renderer::{RecordingRenderer, Renderer};
pub use text::ConsoleRenderer;
