//! Paula Audio Output
//!
//! Software rendition of the Amiga's four-voice DMA sound hardware:
//! fractional-step resampling of 8-bit PCM, loop handling and fixed
//! left/right channel routing.

pub mod mixer;

pub use mixer::{Mixer, StereoFrame};

use serde::{Deserialize, Serialize};
use std::fmt;

/// How channels are spread over the two speakers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixingMode {
    /// Hard panning, as on the hardware
    Amiga,
    /// Each channel bleeds 33% into the opposite side
    #[default]
    Stereo,
    /// Every channel on both sides
    Mono,
}

impl MixingMode {
    /// Share of a channel sent to its non-primary side.
    pub fn bleed(self) -> f32 {
        match self {
            MixingMode::Amiga => 0.0,
            MixingMode::Stereo => 0.33,
            MixingMode::Mono => 1.0,
        }
    }

    /// Next mode in the Amiga → Stereo → Mono cycle.
    pub fn next(self) -> Self {
        match self {
            MixingMode::Amiga => MixingMode::Stereo,
            MixingMode::Stereo => MixingMode::Mono,
            MixingMode::Mono => MixingMode::Amiga,
        }
    }
}

impl fmt::Display for MixingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MixingMode::Amiga => "Amiga",
            MixingMode::Stereo => "Stereo",
            MixingMode::Mono => "Mono",
        };
        f.write_str(name)
    }
}
