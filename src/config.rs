//! Player configuration
//!
//! Settings can be built in code or read from JSON:
//!
//! ```json
//! { "sample_rate": 48000, "mixing_mode": "amiga", "standard": "ntsc" }
//! ```
//!
//! Missing fields fall back to 44.1kHz, stereo mixing and PAL timing.

use crate::paula::MixingMode;
use crate::replayer::{Standard, TimingConfig};
use crate::{ModError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Accepted output sample rates.
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8_000..=192_000;

/// Default output sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Player configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Speaker layout
    pub mixing_mode: MixingMode,
    /// Amiga video standard
    pub standard: Standard,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            mixing_mode: MixingMode::default(),
            standard: Standard::default(),
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)
            .map_err(|e| ModError::ConfigError(format!("Invalid player config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate) {
            return Err(ModError::ConfigError(format!(
                "Sample rate {} outside {}..={}",
                self.sample_rate,
                SAMPLE_RATE_RANGE.start(),
                SAMPLE_RATE_RANGE.end()
            )));
        }
        Ok(())
    }

    /// Timing derived from the sample rate and standard.
    pub fn timing(&self) -> TimingConfig {
        TimingConfig {
            sample_rate: self.sample_rate,
            standard: self.standard,
        }
    }
}
