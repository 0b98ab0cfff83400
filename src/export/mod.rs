//! Offline rendering to audio files

pub mod wav;

pub use wav::{export_to_wav, write_wav_file};

/// Export limits
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExportConfig {
    /// Stop after this many seconds
    pub max_seconds: Option<f32>,
    /// Stop the first time the song wraps around
    pub stop_on_loop: bool,
}

impl ExportConfig {
    /// Frame limit at a given sample rate
    pub fn max_frames(&self, sample_rate: u32) -> Option<usize> {
        self.max_seconds
            .map(|secs| (secs.max(0.0) * sample_rate as f32) as usize)
    }
}

/// Result of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Stereo frames written
    pub frames: usize,
    /// Output sample rate
    pub sample_rate: u32,
    /// Song played to its end
    pub ended: bool,
    /// Rendering stopped at the first loop
    pub looped: bool,
}

impl ExportSummary {
    /// Rendered duration in seconds
    pub fn seconds(&self) -> f32 {
        self.frames as f32 / self.sample_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_frames() {
        assert_eq!(ExportConfig::default().max_frames(44_100), None);
        let config = ExportConfig {
            max_seconds: Some(2.0),
            stop_on_loop: false,
        };
        assert_eq!(config.max_frames(44_100), Some(88_200));
    }
}
