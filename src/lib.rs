pub mod config;
pub mod input;
pub mod kernel;
pub mod outputs;
pub mod presets;
pub mod typewriter;

// Re-export specific items if needed for convenient access
pub use config::{PresentationConfig, PresentationDocument, StartMode};
pub use kernel::controller::Controller;
pub use kernel::reactor::{Reactor, ReactorHandle};
pub use kernel::segment::{Script, Segment};
