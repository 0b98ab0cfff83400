//! Per-channel playback state
//!
//! [`ChannelState`] is owned by the sequencer and lent to the effect
//! processor and the mixer for the duration of a single tick or frame.
//! Mute flags live beside it in [`MuteFlags`] so a display thread can flip
//! them without touching the rest of the state.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Maximum channel volume.
pub const MAX_VOLUME: i16 = 64;

/// Mutable state of one playback channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelState {
    /// Active sample (1-based), 0 = none
    pub sample_number: u8,
    /// Current (effect-adjusted) period
    pub period: u16,
    /// Period of the last triggered note, before fine-tune
    pub base_period: u16,
    /// Portamento target, 0 = free slide
    pub target_period: u16,
    /// Raw volume; may exceed 64 between a set-volume and the next tick
    pub volume: i16,
    /// Per-tick volume change
    pub volume_delta: i16,
    /// Per-tick period change (slides and portamento speed)
    pub period_delta: i16,
    /// Fractional PCM read position in bytes
    pub position: f32,
    /// Audible length; the loop end once the sample has wrapped
    pub length: u32,
    /// Fine-tune nibble of the active sample
    pub fine_tune: u8,
    /// Remembered portamento speed
    pub porta_speed: i16,
    /// Remembered portamento target
    pub porta_target: u16,
    /// Vibrato phase
    pub vibrato_pos: u8,
    /// Vibrato phase step
    pub vibrato_speed: u8,
    /// Vibrato depth
    pub vibrato_depth: u8,
    /// Tremolo phase
    pub tremolo_pos: u8,
    /// Tremolo phase step
    pub tremolo_speed: u8,
    /// Tremolo depth
    pub tremolo_depth: u8,
    /// Arpeggio phase (0..=2)
    pub arpeggio_counter: u8,
    /// Arpeggio semitone offsets
    pub arpeggio_offsets: [u8; 2],
    /// Retrigger interval in ticks, 0 = off
    pub retrigger_delay: u8,
    /// Ticks since the last retrigger
    pub retrigger_counter: u8,
    /// Ticks until the note is cut, 0 = off
    pub cut_countdown: u8,
}

impl ChannelState {
    /// Volume clamped to `0..=64`.
    pub fn volume(&self) -> u8 {
        self.volume.clamp(0, MAX_VOLUME) as u8
    }

    /// Whether the channel produces sound in the mixer.
    pub fn is_audible(&self) -> bool {
        self.sample_number > 0 && self.length > 2
    }

    /// Arpeggio is armed when either offset is set.
    pub fn arpeggio_active(&self) -> bool {
        self.arpeggio_offsets != [0, 0]
    }

    /// Clear every per-row effect carried over from the previous note.
    pub fn clear_row_effects(&mut self) {
        self.volume_delta = 0;
        self.period_delta = 0;
        self.target_period = 0;
        self.retrigger_delay = 0;
        self.retrigger_counter = 0;
        self.vibrato_speed = 0;
        self.vibrato_depth = 0;
        self.tremolo_speed = 0;
        self.tremolo_depth = 0;
        self.arpeggio_counter = 0;
        self.arpeggio_offsets = [0, 0];
    }
}

/// Per-channel mute switches shared between the mixer and a display thread.
///
/// Writes use `Release` and the mixer reads with `Acquire`, so a toggle is
/// visible no later than the next mixed frame.
#[derive(Debug, Clone)]
pub struct MuteFlags(Arc<[AtomicBool]>);

impl MuteFlags {
    /// All channels unmuted.
    pub fn new(channels: usize) -> Self {
        MuteFlags((0..channels).map(|_| AtomicBool::new(false)).collect())
    }

    /// Number of channels covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no channels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mute state of a channel; out-of-range channels read as unmuted.
    pub fn is_muted(&self, channel: usize) -> bool {
        self.0
            .get(channel)
            .map(|flag| flag.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Set the mute state of a channel. Returns false if out of range.
    pub fn set_muted(&self, channel: usize, muted: bool) -> bool {
        match self.0.get(channel) {
            Some(flag) => {
                flag.store(muted, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Flip a channel's mute state, returning the new state.
    pub fn toggle(&self, channel: usize) -> Option<bool> {
        self.0
            .get(channel)
            .map(|flag| !flag.fetch_xor(true, Ordering::AcqRel))
    }

    /// Snapshot of all flags.
    pub fn to_vec(&self) -> Vec<bool> {
        (0..self.len()).map(|ch| self.is_muted(ch)).collect()
    }
}

/// Read-only view of a channel for displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelSnapshot {
    /// Active sample (1-based), 0 = none
    pub sample_number: u8,
    /// Current period
    pub period: u16,
    /// Clamped volume
    pub volume: u8,
    /// Mute flag
    pub muted: bool,
}
