//! Presentation telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! The controller writes it but never reads it back when deciding what to do.
//!
//! # PRIVACY INVARIANT
//! Events carry indices, timestamps and counts only. No segment text, no clip identifiers.

pub mod event;
pub mod metrics;
pub mod recorder;
