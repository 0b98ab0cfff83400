//! Decoded module data
//!
//! A [`Song`] is produced once by the loader and never mutated afterwards;
//! reloading replaces it wholesale.

use serde::Serialize;
use std::fmt;

/// Rows in every pattern.
pub const ROWS_PER_PATTERN: usize = 64;

/// Length of the position order table.
pub const POSITION_TABLE_LEN: usize = 128;

/// Format descriptor derived from the 4-byte tag at offset 1080.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDescription {
    /// Recognized tag, `None` for the legacy 15-sample layout
    pub tag: Option<String>,
    /// Number of playback channels
    pub num_channels: u8,
    /// Number of sample headers
    pub num_samples: u8,
}

impl FormatDescription {
    /// Tag for display, `-` for untagged modules.
    pub fn tag_label(&self) -> &str {
        self.tag.as_deref().unwrap_or("-")
    }
}

/// Display name of a note, e.g. `C#3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName {
    /// Two-character letter (`C-`, `C#`, ...)
    pub letter: &'static str,
    /// Octave number
    pub octave: u8,
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.octave)
    }
}

/// One cell of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Note {
    /// Sample number, 0 = none, otherwise 1-based
    pub sample_number: u8,
    /// Amiga period, 0 = no pitch change
    pub period: u16,
    /// Effect code (0..=15)
    pub effect: u8,
    /// Effect argument
    pub effect_argument: u8,
    /// Decoded note name, display only
    pub name: Option<NoteName>,
}

impl Note {
    /// Note name as text, empty when the cell carries no recognizable pitch.
    pub fn name_label(&self) -> String {
        self.name.map(|n| n.to_string()).unwrap_or_default()
    }
}

/// One note per channel.
pub type Row = Vec<Note>;

/// 64 rows of notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Rows, always `ROWS_PER_PATTERN` long
    pub rows: Vec<Row>,
}

impl Pattern {
    /// Row by index, `None` past row 63.
    pub fn row(&self, line: usize) -> Option<&Row> {
        self.rows.get(line)
    }
}

/// Sample header and PCM payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sample {
    /// Sample name (trailing NULs stripped)
    pub name: String,
    /// Fine-tune nibble (0..=15, 8..=15 meaning -8..=-1)
    pub fine_tune: u8,
    /// Default volume
    pub volume: u8,
    /// Signed 8-bit PCM
    pub data: Vec<i8>,
    /// Length in bytes
    pub length: u32,
    /// Loop start in bytes
    pub loop_offset: u32,
    /// Loop length in bytes
    pub loop_length: u32,
}

impl Sample {
    /// End of the loop region (`loop_offset + loop_length`).
    pub fn loop_end(&self) -> u32 {
        self.loop_offset + self.loop_length
    }

    /// PCM byte at `index`, silence outside the payload.
    #[inline]
    pub fn pcm_at(&self, index: usize) -> i8 {
        self.data.get(index).copied().unwrap_or(0)
    }
}

/// A fully decoded module.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    /// Song title
    pub name: String,
    /// Format descriptor
    pub format: FormatDescription,
    /// Sample headers with PCM
    pub samples: Vec<Sample>,
    /// Decoded patterns
    pub patterns: Vec<Pattern>,
    /// Position order table (always 128 entries)
    pub positions: Vec<u8>,
    /// Number of positions actually used
    pub num_positions: u8,
    /// Restart position used when playback runs past the last position
    pub restart_position: u8,
    /// Every note period is on the standard period table
    pub has_standard_notes: bool,
}

impl Song {
    /// Number of playback channels.
    pub fn num_channels(&self) -> usize {
        self.format.num_channels as usize
    }

    /// Sample by 1-based number.
    pub fn sample(&self, number: u8) -> Option<&Sample> {
        number
            .checked_sub(1)
            .and_then(|idx| self.samples.get(idx as usize))
    }

    /// Pattern played at a song position.
    pub fn pattern_at(&self, position: usize) -> Option<&Pattern> {
        let pattern_idx = *self.positions.get(position)?;
        self.patterns.get(pattern_idx as usize)
    }

    /// Row at a song position and line.
    pub fn row_at(&self, position: usize, line: usize) -> Option<&Row> {
        self.pattern_at(position)?.row(line)
    }

    /// Sample names in header order.
    pub fn sample_names(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether the restart position points inside the used positions.
    pub fn restart_is_valid(&self) -> bool {
        self.restart_position < self.num_positions
    }
}
