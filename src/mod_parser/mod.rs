//! MOD File Format Support
//!
//! Decoding of ProTracker-family modules:
//! - Format tag detection (`M.K.`, `6CHN`, `8CHN`, ... and the untagged 15-sample layout)
//! - Note cell decoding and note naming
//! - Full module decoding into a [`Song`](crate::song::Song)

pub mod format;
pub mod module;
pub mod note;

pub use format::{detect_format, legacy_format, parse_format, TAG_LEN, TAG_OFFSET};
pub use module::parse_module;
pub use note::{decode_note, note_name, NOTE_SIZE};

use crate::song::Song;
use thiserror::Error;

/// Errors raised while decoding a module buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ends before a required region.
    #[error("Truncated {what}: need {needed} bytes at offset {offset}, buffer holds {len}")]
    Truncated {
        /// Region being read
        what: &'static str,
        /// Offset where the region starts
        offset: usize,
        /// Bytes required
        needed: usize,
        /// Buffer length
        len: usize,
    },

    /// Recognized but unsupported format tag.
    #[error("Unsupported format tag: {0}")]
    UnsupportedFormat(String),

    /// Header fields contradict the buffer contents.
    #[error("Inconsistent module: {0}")]
    Inconsistent(String),
}

/// Trait for parsing module file formats into a playable song
pub trait FormatParser {
    /// Parse file data into a song
    fn parse(&self, data: &[u8]) -> crate::Result<Song>;

    /// Get parser name
    fn name(&self) -> &str;
}

/// Parser for ProTracker-compatible modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModParser;

impl ModParser {
    /// Create a new MOD parser
    pub fn new() -> Self {
        ModParser
    }
}

impl FormatParser for ModParser {
    fn parse(&self, data: &[u8]) -> crate::Result<Song> {
        Ok(parse_module(data)?)
    }

    fn name(&self) -> &str {
        "ProTracker MOD"
    }
}
