//! Amiga ProTracker MOD Player
//!
//! Decodes ProTracker-family module files and replays them as a pull-based
//! interleaved stereo PCM stream, emulating the Paula sound chip's sample
//! stepping and the VBlank-driven tick/row sequencer of the classic replay
//! routines.
//!
//! # Features
//! - Format detection for `M.K.`, `M!K!`, `FLT4`, `4CHN`, `6CHN`, `8CHN`,
//!   `CD81`, `12CH` and untagged 15-sample modules
//! - The full ProTracker effect set, including extended `Ex` commands
//! - PAL and NTSC timing, switchable during playback
//! - Amiga (hard-panned), stereo (33% bleed) and mono mixing
//! - Lock-protected shared player for audio and display threads
//! - Offline WAV rendering
//!
//! # Crate feature flags
//! - `export-wav` (default): WAV rendering (`export`)
//! - `cli` (default): the `modplay` command line tool
//!
//! # Quick start
//! ```no_run
//! use modplay::replayer::PlaybackController;
//! use modplay::load_song;
//! let data = std::fs::read("song.mod").unwrap();
//! let (mut player, summary) = load_song(&data).unwrap();
//! println!("{} ({} channels)", summary.name, summary.num_channels);
//! player.play().unwrap();
//! let mut buffer = vec![0.0f32; 2 * 1024];
//! let status = player.pull(&mut buffer);
//! assert!(status.frames <= 1024);
//! ```

#![warn(missing_docs)]

pub mod config; // Player Configuration
#[cfg(feature = "export-wav")]
pub mod export; // Offline Rendering
pub mod mod_loader; // MOD File I/O
pub mod mod_parser; // MOD Format Parsing
pub mod paula; // Output Mixing
pub mod replayer; // Playback Engine
pub mod song; // Decoded Song Model
pub mod streaming; // Shared Player
pub mod tables; // Period & Waveform Tables

pub use mod_parser::DecodeError;

/// Error types for module decoding and playback
#[derive(thiserror::Error, Debug)]
pub enum ModError {
    /// Module bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Playback requested before a song was loaded
    #[error("No song loaded")]
    NoSongLoaded,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for ModError {
    /// Converts a String into `ModError::Other`.
    ///
    /// Prefer a specific variant where one fits.
    fn from(msg: String) -> Self {
        ModError::Other(msg)
    }
}

impl From<&str> for ModError {
    /// Converts a string slice into `ModError::Other`.
    fn from(msg: &str) -> Self {
        ModError::Other(msg.to_string())
    }
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, ModError>;

// Public API exports
pub use config::PlayerConfig;
#[cfg(feature = "export-wav")]
pub use export::{export_to_wav, ExportConfig, ExportSummary};
pub use mod_loader::{load_file, ModFileLoader};
pub use mod_parser::{parse_module, FormatParser, ModParser};
pub use paula::{MixingMode, StereoFrame};
pub use replayer::{
    load_song, LoadSummary, ModPlayer, PlaybackController, PlaybackState, PlayerSnapshot,
    Standard, StreamStatus,
};
pub use song::{Note, Pattern, Sample, Song};
pub use streaming::{PlaybackStats, SharedPlayer};
