//! MOD Playback Engine
//!
//! Handles playback of decoded modules: per-channel state, effect
//! processing, row/tick sequencing and the pull-based player façade.

pub mod channel;
pub mod effects;
pub mod mod_player;
pub mod sequencer;
pub mod vblank;

pub use channel::{ChannelSnapshot, ChannelState, MuteFlags, MAX_VOLUME};
pub use effects::{
    fine_tune_period, tick_channel, trigger_effect, trigger_note, EffectCode, ExtendedEffect,
    UnsupportedEffect,
};
pub use mod_player::{
    load_song, LoadSummary, ModPlayer, PlayerSnapshot, SampleSummary, StreamStatus,
};
pub use sequencer::{AdvanceResult, PlayerState, Transport};
pub use vblank::VblankClock;

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Initial ticks per row.
pub const DEFAULT_SPEED: u32 = 6;

/// Amiga video standard, which sets both the Paula clock and the VBlank rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Standard {
    /// 50 Hz, 3 546 895 Hz clock
    #[default]
    Pal,
    /// 60 Hz, 3 579 545 Hz clock
    Ntsc,
}

impl Standard {
    /// Paula clock ticks per second.
    pub fn clock_hz(self) -> f32 {
        match self {
            Standard::Pal => 3_546_895.0,
            Standard::Ntsc => 3_579_545.0,
        }
    }

    /// Vertical blank frequency.
    pub fn vblank_hz(self) -> f32 {
        match self {
            Standard::Pal => 50.0,
            Standard::Ntsc => 60.0,
        }
    }

    /// The other standard.
    pub fn toggled(self) -> Self {
        match self {
            Standard::Pal => Standard::Ntsc,
            Standard::Ntsc => Standard::Pal,
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Standard::Pal => write!(f, "PAL"),
            Standard::Ntsc => write!(f, "NTSC"),
        }
    }
}

/// Timing configuration for Amiga playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    /// Audio sample rate in Hz
    pub sample_rate: u32,
    /// Video standard driving the clocks
    pub standard: Standard,
}

impl TimingConfig {
    /// Default PAL Amiga timing (50Hz VBlank, 44.1kHz audio)
    pub fn pal_amiga() -> Self {
        TimingConfig {
            sample_rate: 44100,
            standard: Standard::Pal,
        }
    }

    /// Samples per VBlank tick
    pub fn samples_per_tick(&self) -> u32 {
        self.samples_per_tick_at(self.standard.vblank_hz())
    }

    /// Samples per tick for an explicit tick rate (set-speed tempo values)
    pub fn samples_per_tick_at(&self, ticks_per_second: f32) -> u32 {
        ((self.sample_rate as f32 / ticks_per_second) as u32).max(1)
    }

    /// Paula clock ticks per output sample
    pub fn clock_ticks_per_sample(&self) -> f32 {
        self.standard.clock_hz() / self.sample_rate as f32
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::pal_amiga()
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Currently playing
    Playing,
    /// Paused
    Paused,
}

/// Simple playback controller trait
pub trait PlaybackController {
    /// Start playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Stop playback and rewind
    fn stop(&mut self) -> Result<()>;

    /// Get current playback state
    fn state(&self) -> PlaybackState;
}


#[cfg(test)]
pub(crate) mod fixtures {
    use crate::song::{
        FormatDescription, Note, Pattern, Sample, Song, POSITION_TABLE_LEN, ROWS_PER_PATTERN,
    };

    pub(crate) fn note(sample_number: u8, period: u16, effect: u8, effect_argument: u8) -> Note {
        Note {
            sample_number,
            period,
            effect,
            effect_argument,
            name: crate::mod_parser::note_name(period),
        }
    }

    /// Empty pattern with the given `(row, channel, note)` cells filled in.
    pub(crate) fn pattern_with(channels: usize, cells: &[(usize, usize, Note)]) -> Pattern {
        let mut rows = vec![vec![Note::default(); channels]; ROWS_PER_PATTERN];
        for &(row, channel, cell) in cells {
            rows[row][channel] = cell;
        }
        Pattern { rows }
    }

    /// Two samples: 1 is a 1000-byte one-shot ramp, 2 a 100-byte sample
    /// looping over its second half.
    pub(crate) fn samples() -> Vec<Sample> {
        vec![
            Sample {
                name: "ramp".into(),
                fine_tune: 0,
                volume: 64,
                data: (0..1000).map(|i| (i % 256) as u8 as i8).collect(),
                length: 1000,
                loop_offset: 0,
                loop_length: 0,
            },
            Sample {
                name: "loop".into(),
                fine_tune: 0,
                volume: 32,
                data: vec![64; 100],
                length: 100,
                loop_offset: 50,
                loop_length: 50,
            },
        ]
    }

    pub(crate) fn song_with_patterns(
        channels: usize,
        patterns: Vec<Pattern>,
        positions: &[u8],
        restart_position: u8,
    ) -> Song {
        let mut table = vec![0u8; POSITION_TABLE_LEN];
        table[..positions.len()].copy_from_slice(positions);
        Song {
            name: "fixture".into(),
            format: FormatDescription {
                tag: Some("M.K.".into()),
                num_channels: channels as u8,
                num_samples: 31,
            },
            samples: samples(),
            patterns,
            positions: table,
            num_positions: positions.len() as u8,
            restart_position,
            has_standard_notes: true,
        }
    }

    /// Single-pattern song that ends after one pass.
    pub(crate) fn song_with_rows(channels: usize, cells: &[(usize, usize, Note)]) -> Song {
        song_with_patterns(channels, vec![pattern_with(channels, cells)], &[0], 127)
    }
}
