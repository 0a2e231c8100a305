//! Forecast monitoring engine
//!
//! Owns the per-subscription monitor state and runs one polling cycle
//! at a time: fetch, normalize, detect, deduplicate, dispatch. The
//! daemon's scheduler drives it on a fixed cadence.

pub mod engine;
pub mod state;

pub use engine::*;
pub use state::*;
