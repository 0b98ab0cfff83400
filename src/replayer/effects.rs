//! Effect processing
//!
//! Effects run in two places: once when a row triggers a note
//! ([`trigger_note`] / [`trigger_effect`]), seeding per-channel carry state,
//! and once per tick for every active channel ([`tick_channel`]).

use super::channel::{ChannelState, MAX_VOLUME};
use super::sequencer::Transport;
use crate::song::{Note, Song, ROWS_PER_PATTERN};
use crate::tables::{
    clamp_period, period_index, waveform, FINE_TUNE_PERIODS, FINE_TUNE_SCALE, PERIOD_TABLE,
};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use thiserror::Error;

/// Top-level effect codes (low nibble of byte 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum EffectCode {
    /// 0xy: cycle base, +x, +y semitones
    Arpeggio = 0,
    /// 1xx
    SlideUp = 1,
    /// 2xx
    SlideDown = 2,
    /// 3xx: glide toward the note
    TonePortamento = 3,
    /// 4xy
    Vibrato = 4,
    /// 5xy: continue portamento, slide volume
    TonePortamentoVolumeSlide = 5,
    /// 6xy: continue vibrato, slide volume
    VibratoVolumeSlide = 6,
    /// 7xy
    Tremolo = 7,
    /// 8xx (inert)
    SetPanning = 8,
    /// 9xx: start at xx * 256 bytes
    SampleOffset = 9,
    /// Axy
    VolumeSlide = 10,
    /// Bxx
    PositionJump = 11,
    /// Cxx
    SetVolume = 12,
    /// Dxy: break to row x*10+y of the next position
    PatternBreak = 13,
    /// Exy
    Extended = 14,
    /// Fxx: speed (<= 31) or tempo
    SetSpeed = 15,
}

/// Extended effects (high nibble of an `Exy` argument).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum ExtendedEffect {
    /// E0x (inert)
    Filter = 0,
    /// E1x
    FinePortaUp = 1,
    /// E2x
    FinePortaDown = 2,
    /// E3x (inert)
    Glissando = 3,
    /// E4x (inert)
    VibratoWaveform = 4,
    /// E5x (inert)
    SetFineTune = 5,
    /// E6x
    PatternLoop = 6,
    /// E7x (inert)
    TremoloWaveform = 7,
    /// E8x (inert)
    CoarsePan = 8,
    /// E9x
    Retrigger = 9,
    /// EAx
    FineVolumeUp = 10,
    /// EBx
    FineVolumeDown = 11,
    /// ECx
    CutNote = 12,
    /// EDx (inert)
    DelaySample = 13,
    /// EEx
    DelayRow = 14,
    /// EFx (inert)
    InvertLoop = 15,
}

/// An effect code with no handler. Reported and otherwise ignored.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedEffect {
    /// Unknown top-level code
    #[error("Unhandled effect {0:X}")]
    Effect(u8),
    /// Unknown extended code
    #[error("Unhandled extended effect E{0:X}")]
    Extended(u8),
}

/// Decode a note's effect code.
pub fn decode_effect(code: u8) -> Result<EffectCode, UnsupportedEffect> {
    EffectCode::from_u8(code).ok_or(UnsupportedEffect::Effect(code))
}

/// Decode the high nibble of an `Exy` argument.
pub fn decode_extended(argument: u8) -> Result<ExtendedEffect, UnsupportedEffect> {
    let code = argument >> 4;
    ExtendedEffect::from_u8(code).ok_or(UnsupportedEffect::Extended(code))
}

/// Apply a sample's fine-tune to a note period.
///
/// Songs made only of standard notes use the per-fine-tune period tables;
/// anything else falls back to a linear scale. The result is always within
/// the playable range.
pub fn fine_tune_period(period: u16, fine_tune: u8, standard_notes: bool) -> u16 {
    let ft = (fine_tune & 0x0F) as usize;
    if standard_notes {
        if let Some(idx) = period_index(period) {
            return clamp_period(FINE_TUNE_PERIODS[ft][idx] as i32);
        }
    }
    clamp_period((period as f32 * FINE_TUNE_SCALE[ft]) as i32)
}

/// Volume-slide nibble convention: up if the high nibble is set, else down.
fn volume_slide_delta(argument: u8) -> i16 {
    if argument & 0xF0 != 0 {
        (argument >> 4) as i16
    } else {
        -((argument & 0x0F) as i16)
    }
}

/// Shared capture for tone portamento (3xx and 5xy).
fn capture_portamento(note: &Note, channel: &mut ChannelState, prev: &ChannelState, speed: i16) {
    channel.target_period = if note.period != 0 {
        channel.period
    } else if channel.porta_target != 0 {
        channel.porta_target
    } else {
        prev.period
    };
    if prev.period != 0 {
        channel.period = prev.period;
    }
    channel.period_delta = speed;
    channel.porta_speed = speed;
    channel.porta_target = channel.target_period;

    if prev.sample_number == channel.sample_number {
        channel.position = prev.position;
        channel.length = prev.length;
    }
}

/// Trigger a row's note on a channel and run its trigger-time effect.
pub fn trigger_note(note: &Note, channel: &mut ChannelState, song: &Song, transport: &mut Transport) {
    let prev = *channel;

    if note.sample_number > 0 {
        match song.sample(note.sample_number) {
            Some(sample) => {
                channel.volume = sample.volume as i16;
                channel.length = sample.length;
                channel.sample_number = note.sample_number;
                channel.fine_tune = sample.fine_tune;
            }
            None => log::debug!("Ignoring reference to missing sample {}", note.sample_number),
        }
    }

    channel.clear_row_effects();

    if note.period != 0 {
        channel.period = fine_tune_period(note.period, channel.fine_tune, song.has_standard_notes);
        channel.base_period = note.period;
        channel.position = 0.0;
        if let Some(sample) = song.sample(channel.sample_number) {
            channel.length = sample.length;
        }
    }

    trigger_effect(note, channel, &prev, song, transport);
}

/// Seed effect state for a freshly triggered note.
///
/// `prev` is the channel as it was before the trigger reset.
pub fn trigger_effect(
    note: &Note,
    channel: &mut ChannelState,
    prev: &ChannelState,
    song: &Song,
    transport: &mut Transport,
) {
    let arg = note.effect_argument;
    let effect = match decode_effect(note.effect) {
        Ok(effect) => effect,
        Err(err) => {
            log::warn!("{}", err);
            return;
        }
    };

    match effect {
        EffectCode::Arpeggio => {
            if arg != 0 {
                channel.arpeggio_offsets = [arg >> 4, arg & 0x0F];
                channel.arpeggio_counter = 0;
            }
        }
        EffectCode::SlideUp => channel.period_delta = -(arg as i16),
        EffectCode::SlideDown => channel.period_delta = arg as i16,
        EffectCode::TonePortamento => {
            let speed = if arg != 0 {
                arg as i16
            } else {
                channel.porta_speed
            };
            capture_portamento(note, channel, prev, speed);
        }
        EffectCode::Vibrato => {
            let speed = arg >> 4;
            let depth = arg & 0x0F;
            channel.vibrato_speed = if speed != 0 { speed } else { prev.vibrato_speed };
            channel.vibrato_depth = if depth != 0 { depth } else { prev.vibrato_depth };
        }
        EffectCode::TonePortamentoVolumeSlide => {
            channel.volume_delta = volume_slide_delta(arg);
            capture_portamento(note, channel, prev, channel.porta_speed);
        }
        EffectCode::VibratoVolumeSlide => {
            channel.volume_delta = volume_slide_delta(arg);
            channel.vibrato_pos = prev.vibrato_pos;
            channel.vibrato_speed = prev.vibrato_speed;
            channel.vibrato_depth = prev.vibrato_depth;
        }
        EffectCode::Tremolo => {
            let speed = arg >> 4;
            let depth = arg & 0x0F;
            if speed == 0 && depth == 0 {
                channel.tremolo_speed = prev.tremolo_speed;
                channel.tremolo_depth = prev.tremolo_depth;
            } else {
                channel.tremolo_speed = speed;
                channel.tremolo_depth = depth;
            }
        }
        EffectCode::SetPanning => {}
        EffectCode::SampleOffset => {
            if note.period != 0 && channel.sample_number > 0 {
                let length = song
                    .sample(channel.sample_number)
                    .map(|s| s.length)
                    .unwrap_or(0);
                let mut offset = (arg as u32) << 8;
                if length > 0 && offset > length {
                    offset %= length;
                }
                channel.position = offset as f32;
            }
        }
        EffectCode::VolumeSlide => channel.volume_delta = volume_slide_delta(arg),
        EffectCode::PositionJump => {
            if arg as usize <= transport.position {
                transport.has_looped = true;
            }
            transport.pending_jump = Some(arg);
        }
        EffectCode::SetVolume => channel.volume = arg as i16,
        EffectCode::PatternBreak => {
            let row = (arg >> 4) * 10 + (arg & 0x0F);
            let row = if row as usize >= ROWS_PER_PATTERN { 0 } else { row };
            transport.pending_break = Some(row);
        }
        EffectCode::Extended => extended_effect(arg, channel, transport),
        EffectCode::SetSpeed => {
            if arg <= 31 {
                transport.speed = arg as u32;
            } else {
                transport.set_tempo(arg as f32 * 0.4);
            }
        }
    }
}

fn extended_effect(arg: u8, channel: &mut ChannelState, transport: &mut Transport) {
    let value = arg & 0x0F;
    let effect = match decode_extended(arg) {
        Ok(effect) => effect,
        Err(err) => {
            log::warn!("{}", err);
            return;
        }
    };

    match effect {
        ExtendedEffect::FinePortaUp => {
            channel.period = clamp_period(channel.period as i32 - value as i32)
        }
        ExtendedEffect::FinePortaDown => {
            channel.period = clamp_period(channel.period as i32 + value as i32)
        }
        ExtendedEffect::PatternLoop => {
            if value == 0 {
                transport.pattern_loop_row = Some(transport.row as u8);
            } else {
                if transport.pattern_loop_count == 0 {
                    transport.pattern_loop_count = value;
                } else {
                    transport.pattern_loop_count -= 1;
                }

                if transport.pattern_loop_count > 0 && transport.pattern_loop_row.is_some() {
                    transport.loop_jump_pending = true;
                } else {
                    transport.pattern_loop_row = None;
                }
            }
        }
        ExtendedEffect::Retrigger => {
            channel.retrigger_delay = value;
            channel.retrigger_counter = 0;
        }
        ExtendedEffect::FineVolumeUp => {
            channel.volume = (channel.volume + value as i16).min(MAX_VOLUME)
        }
        ExtendedEffect::FineVolumeDown => channel.volume = (channel.volume - value as i16).max(0),
        ExtendedEffect::CutNote => channel.cut_countdown = value,
        ExtendedEffect::DelayRow => transport.row_delay = value,
        ExtendedEffect::Filter
        | ExtendedEffect::Glissando
        | ExtendedEffect::VibratoWaveform
        | ExtendedEffect::SetFineTune
        | ExtendedEffect::TremoloWaveform
        | ExtendedEffect::CoarsePan
        | ExtendedEffect::DelaySample
        | ExtendedEffect::InvertLoop => {}
    }
}

/// Per-tick effect pass for one channel.
///
/// Order: note cut, retrigger, volume slide, tremolo, volume clamp,
/// arpeggio, then vibrato or slide/portamento.
pub fn tick_channel(channel: &mut ChannelState, song: &Song) {
    if channel.sample_number == 0 {
        return;
    }

    if channel.cut_countdown > 0 {
        channel.cut_countdown -= 1;
        if channel.cut_countdown == 0 {
            channel.length = 0;
        }
    }

    if channel.retrigger_delay > 0 {
        channel.retrigger_counter += 1;
        if channel.retrigger_counter >= channel.retrigger_delay {
            channel.position = 0.0;
            channel.retrigger_counter = 0;
        }
    }

    channel.volume = channel.volume.saturating_add(channel.volume_delta);
    if channel.tremolo_depth > 0 {
        let base = song
            .sample(channel.sample_number)
            .map(|s| s.volume as i32)
            .unwrap_or(0);
        let swing = waveform(channel.tremolo_pos) as i32 * channel.tremolo_depth as i32 / 64;
        channel.volume = (base + swing).clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        channel.tremolo_pos = channel.tremolo_pos.wrapping_add(channel.tremolo_speed);
    }
    channel.volume = channel.volume.clamp(0, MAX_VOLUME);

    let standard_notes = song.has_standard_notes;

    if channel.arpeggio_active() && channel.base_period != 0 {
        if let Some(idx) = period_index(channel.base_period) {
            let period = match channel.arpeggio_counter {
                0 => channel.base_period,
                phase => {
                    let offset = channel.arpeggio_offsets[(phase - 1) as usize] as usize;
                    PERIOD_TABLE[idx.saturating_sub(offset)]
                }
            };
            channel.period = fine_tune_period(period, channel.fine_tune, standard_notes);
        }
        channel.arpeggio_counter = (channel.arpeggio_counter + 1) % 3;
    }

    if channel.vibrato_depth > 0 {
        if channel.base_period != 0 {
            let center = fine_tune_period(channel.base_period, channel.fine_tune, standard_notes);
            let swing = waveform(channel.vibrato_pos) as i32 * channel.vibrato_depth as i32 / 32;
            channel.period = clamp_period(center as i32 + swing);
        }
        channel.vibrato_pos = channel.vibrato_pos.wrapping_add(channel.vibrato_speed);
    } else if channel.period_delta != 0 && channel.period != 0 {
        let period = channel.period as i32;
        let delta = channel.period_delta as i32;
        let target = channel.target_period;

        channel.period = if target == 0 {
            clamp_period(period + delta)
        } else if target > channel.period {
            clamp_period(period + delta).min(target)
        } else {
            clamp_period(period - delta).max(target)
        };
    }
}
