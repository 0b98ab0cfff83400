//! WAV file export functionality

use super::{ExportConfig, ExportSummary};
use crate::replayer::{ModPlayer, PlaybackController};
use crate::{ModError, Result};
use std::path::Path;

/// Frames rendered per chunk
const FRAMES_PER_CHUNK: usize = 4096;

/// Render a loaded song to a 16-bit stereo WAV file.
///
/// Playback starts from the player's current position and runs until the
/// song ends, the duration limit is reached, or (with `stop_on_loop`) the
/// song wraps for the first time.
///
/// # Examples
///
/// ```no_run
/// use modplay::export::{export_to_wav, ExportConfig};
/// use modplay::load_song;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = std::fs::read("song.mod")?;
/// let (mut player, _) = load_song(&data)?;
///
/// export_to_wav(&mut player, "output.wav", ExportConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub fn export_to_wav<P: AsRef<Path>>(
    player: &mut ModPlayer,
    output_path: P,
    config: ExportConfig,
) -> Result<ExportSummary> {
    player.play()?;

    let sample_rate = player.sample_rate();
    let max_frames = config.max_frames(sample_rate);
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    log::info!("Writing WAV file to {}", output_path.as_ref().display());
    let mut writer = hound::WavWriter::create(output_path.as_ref(), spec)
        .map_err(|e| ModError::AudioFileError(format!("Failed to create WAV file: {}", e)))?;

    let mut buffer = vec![0.0f32; FRAMES_PER_CHUNK * 2];
    let mut frames_written = 0usize;
    let mut looped = false;

    loop {
        let wanted = max_frames
            .map(|max| max.saturating_sub(frames_written).min(FRAMES_PER_CHUNK))
            .unwrap_or(FRAMES_PER_CHUNK);
        if wanted == 0 {
            break;
        }

        let status = player.pull(&mut buffer[..wanted * 2]);
        for &sample in &buffer[..status.frames * 2] {
            writer
                .write_sample(to_i16(sample))
                .map_err(|e| ModError::AudioFileError(format!("Failed to write sample: {}", e)))?;
        }
        frames_written += status.frames;

        if !status.more {
            break;
        }
        if config.stop_on_loop && player.has_looped() {
            looped = true;
            break;
        }
    }

    writer
        .finalize()
        .map_err(|e| ModError::AudioFileError(format!("Failed to finalize WAV file: {}", e)))?;

    let summary = ExportSummary {
        frames: frames_written,
        sample_rate,
        ended: player.is_finished(),
        looped,
    };
    log::info!(
        "Export complete: {} frames ({:.1}s)",
        summary.frames,
        summary.seconds()
    );
    Ok(summary)
}

/// Write interleaved stereo samples to a 16-bit WAV file
pub fn write_wav_file<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)
        .map_err(|e| ModError::AudioFileError(format!("Failed to create WAV file: {}", e)))?;

    for &sample in samples {
        writer
            .write_sample(to_i16(sample))
            .map_err(|e| ModError::AudioFileError(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| ModError::AudioFileError(format!("Failed to finalize WAV file: {}", e)))?;

    Ok(())
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
