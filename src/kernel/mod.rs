//! Presentation kernel. Everything below `reactor` is synchronous and takes time as an argument.

pub mod audio;
pub mod controller;
pub mod event;
pub mod playback;
pub mod reactor;
pub mod scheduler;
pub mod segment;
pub mod state;
pub mod telemetry;
pub mod time;
