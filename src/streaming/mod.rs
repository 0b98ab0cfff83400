//! Audio Output & Streaming
//!
//! Thread-safe access to a player for an audio callback and a display loop.

pub mod shared;

pub use shared::{PlaybackStats, SharedPlayer};
