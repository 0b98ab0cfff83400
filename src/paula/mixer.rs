//! Paula Output Mixer
//!
//! Renders one stereo frame from all channels:
//! - Fractional position stepping (`clock ticks per sample / period`)
//! - Loop wrap once the audible length is reached
//! - Channel routing by index within groups of four (0,3 left; 1,2 right)
//! - Mixing-mode bleed into the opposite side

use super::MixingMode;
use crate::replayer::{ChannelState, MuteFlags};
use crate::song::Song;
use serde::Serialize;

/// One stereo output frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StereoFrame {
    /// Left sample in [-1, 1]
    pub left: f32,
    /// Right sample in [-1, 1]
    pub right: f32,
}

impl StereoFrame {
    /// Peak magnitude, for level meters.
    pub fn magnitude(&self) -> f32 {
        self.left.abs().max(self.right.abs())
    }
}

/// Audio Mixer - Combines all channels into a stereo frame
#[derive(Debug, Clone, Default)]
pub struct Mixer {
    mode: MixingMode,
    last_frame: StereoFrame,
}

impl Mixer {
    /// Create a new mixer
    pub fn new(mode: MixingMode) -> Self {
        Mixer {
            mode,
            last_frame: StereoFrame::default(),
        }
    }

    /// Current mixing mode
    pub fn mode(&self) -> MixingMode {
        self.mode
    }

    /// Change the mixing mode; applies from the next frame
    pub fn set_mode(&mut self, mode: MixingMode) {
        self.mode = mode;
    }

    /// Last frame produced, for metering
    pub fn last_frame(&self) -> StereoFrame {
        self.last_frame
    }

    /// Forget the last frame
    pub fn reset(&mut self) {
        self.last_frame = StereoFrame::default();
    }

    /// Mix one frame and advance every audible channel.
    pub fn mix_frame(
        &mut self,
        channels: &mut [ChannelState],
        mutes: &MuteFlags,
        song: &Song,
        clock_ticks_per_sample: f32,
    ) -> StereoFrame {
        let bleed = self.mode.bleed();
        let mut left = 0.0f32;
        let mut right = 0.0f32;

        for (idx, channel) in channels.iter_mut().enumerate() {
            let Some(value) = render_channel(channel, song, clock_ticks_per_sample) else {
                continue;
            };

            if mutes.is_muted(idx) {
                continue;
            }

            match idx % 4 {
                0 | 3 => {
                    left += value;
                    right += value * bleed;
                }
                _ => {
                    right += value;
                    left += value * bleed;
                }
            }
        }

        let frame = StereoFrame {
            left: left.clamp(-1.0, 1.0),
            right: right.clamp(-1.0, 1.0),
        };
        self.last_frame = frame;
        frame
    }
}

/// Read one value from a channel and step its position.
///
/// Returns `None` for silent channels.
fn render_channel(channel: &mut ChannelState, song: &Song, clock_ticks_per_sample: f32) -> Option<f32> {
    if !channel.is_audible() {
        return None;
    }
    let sample = song.sample(channel.sample_number)?;

    if channel.position >= channel.length as f32 {
        let mut overflow = channel.position - channel.length as f32;
        if sample.loop_length > 0 {
            overflow %= sample.loop_length as f32;
        }
        channel.position = sample.loop_offset as f32 + overflow;
        channel.length = if sample.loop_length == 0 {
            0
        } else {
            sample.loop_end()
        };
        if channel.length <= 2 {
            return None;
        }
    }

    let value =
        sample.pcm_at(channel.position as usize) as f32 / 128.0 * channel.volume() as f32 / 64.0;

    if channel.period != 0 {
        channel.position += clock_ticks_per_sample / channel.period as f32;
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replayer::fixtures::song_with_rows;
    use approx::assert_relative_eq;

    const STEP: f32 = 3_546_895.0 / 44_100.0;

    fn playing(sample_number: u8, song: &Song) -> ChannelState {
        let sample = song.sample(sample_number).unwrap();
        ChannelState {
            sample_number,
            period: 428,
            volume: 64,
            length: sample.length,
            ..ChannelState::default()
        }
    }

    #[test]
    fn test_silent_channels_mix_to_zero() {
        let song = song_with_rows(4, &[]);
        let mut mixer = Mixer::new(MixingMode::Stereo);
        let mut channels = vec![ChannelState::default(); 4];
        let frame = mixer.mix_frame(&mut channels, &MuteFlags::new(4), &song, STEP);
        assert_eq!(frame, StereoFrame::default());
    }

    #[test]
    fn test_position_advances_by_clock_over_period() {
        let song = song_with_rows(4, &[]);
        let mut mixer = Mixer::new(MixingMode::Amiga);
        let mut channels = vec![playing(1, &song)];
        mixer.mix_frame(&mut channels, &MuteFlags::new(1), &song, STEP);
        assert_relative_eq!(channels[0].position, STEP / 428.0, epsilon = 1e-5);
    }

    #[test]
    fn test_routing_and_bleed() {
        let song = song_with_rows(4, &[]);
        // sample 2 is constant 64
        let channel = playing(2, &song);
        let expected = 64.0 / 128.0;

        for (mode, bleed) in [
            (MixingMode::Amiga, 0.0),
            (MixingMode::Stereo, 0.33),
            (MixingMode::Mono, 1.0),
        ] {
            let mut mixer = Mixer::new(mode);
            let mut channels = vec![ChannelState::default(); 4];
            channels[0] = channel;
            let frame = mixer.mix_frame(&mut channels, &MuteFlags::new(4), &song, STEP);
            assert_relative_eq!(frame.left, expected, epsilon = 1e-6);
            assert_relative_eq!(frame.right, expected * bleed, epsilon = 1e-6);

            let mut channels = vec![ChannelState::default(); 4];
            channels[2] = channel;
            let frame = mixer.mix_frame(&mut channels, &MuteFlags::new(4), &song, STEP);
            assert_relative_eq!(frame.right, expected, epsilon = 1e-6);
            assert_relative_eq!(frame.left, expected * bleed, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_channel_three_routes_left() {
        let song = song_with_rows(8, &[]);
        let mut mixer = Mixer::new(MixingMode::Amiga);
        let mut channels = vec![ChannelState::default(); 8];
        channels[7] = playing(2, &song);
        let frame = mixer.mix_frame(&mut channels, &MuteFlags::new(8), &song, STEP);
        assert!(frame.left > 0.0);
        assert_eq!(frame.right, 0.0);
    }

    #[test]
    fn test_muted_channel_still_advances() {
        let song = song_with_rows(4, &[]);
        let mut mixer = Mixer::new(MixingMode::Stereo);
        let mutes = MuteFlags::new(4);
        mutes.set_muted(0, true);
        let mut channels = vec![ChannelState::default(); 4];
        channels[0] = playing(2, &song);
        let frame = mixer.mix_frame(&mut channels, &mutes, &song, STEP);
        assert_eq!(frame, StereoFrame::default());
        assert!(channels[0].position > 0.0);
    }

    #[test]
    fn test_loop_wrap() {
        let song = song_with_rows(4, &[]);
        let mut mixer = Mixer::new(MixingMode::Stereo);
        let mut channels = vec![playing(2, &song)];
        channels[0].position = 100.5;
        mixer.mix_frame(&mut channels, &MuteFlags::new(1), &song, STEP);
        assert_eq!(channels[0].length, 100);
        // wrapped to 50.5, then stepped forward
        assert_relative_eq!(channels[0].position, 50.5 + STEP / 428.0, epsilon = 1e-4);

        for _ in 0..10_000 {
            mixer.mix_frame(&mut channels, &MuteFlags::new(1), &song, STEP);
            assert!(channels[0].position < 100.0 + STEP / 113.0);
            assert!(channels[0].position >= 50.0);
        }
    }

    #[test]
    fn test_one_shot_sample_goes_silent() {
        let song = song_with_rows(4, &[]);
        let mut mixer = Mixer::new(MixingMode::Stereo);
        let mut channels = vec![playing(1, &song)];
        channels[0].position = 1000.0;
        let frame = mixer.mix_frame(&mut channels, &MuteFlags::new(1), &song, STEP);
        assert_eq!(frame, StereoFrame::default());
        assert!(!channels[0].is_audible());
    }

    #[test]
    fn test_output_is_clamped_and_remembered() {
        let song = song_with_rows(4, &[]);
        let mut mixer = Mixer::new(MixingMode::Mono);
        let mut channels = vec![playing(2, &song); 4];
        let frame = mixer.mix_frame(&mut channels, &MuteFlags::new(4), &song, STEP);
        assert_eq!(frame.left, 1.0);
        assert_eq!(frame.right, 1.0);
        assert_eq!(mixer.last_frame(), frame);
        assert_eq!(mixer.last_frame().magnitude(), 1.0);
    }
}
