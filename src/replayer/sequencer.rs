//! Row and tick sequencing
//!
//! Two nested clocks drive playback: the [`VblankClock`] turns output frames
//! into ticks, and every `speed` ticks the sequencer advances one row and
//! triggers that row's notes.

use super::channel::ChannelState;
use super::effects::{tick_channel, trigger_note};
use super::vblank::VblankClock;
use super::{Standard, TimingConfig, DEFAULT_SPEED};
use crate::song::{Song, ROWS_PER_PATTERN};

/// Result of clocking the sequencer by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceResult {
    /// No tick boundary on this frame.
    NoTick,
    /// A tick ran without a row change.
    Ticked,
    /// Advanced to the next row.
    RowAdvanced,
    /// Ran past the last position and wrapped to the restart position.
    Looped,
    /// Ran past the last position with no valid restart; playback is over.
    Completed,
}

/// Song-level transport state shared by all channels.
#[derive(Debug, Clone)]
pub struct Transport {
    /// Active timing (sample rate and standard)
    pub timing: TimingConfig,
    /// Frame-to-tick clock
    pub clock: VblankClock,
    /// Position of the next row to trigger
    pub position: usize,
    /// Next row to trigger within the pattern
    pub row: usize,
    /// Position of the row currently playing
    pub playing_position: usize,
    /// Row currently playing
    pub playing_row: usize,
    /// Ticks per row
    pub speed: u32,
    /// Ticks elapsed in the current row
    pub current_vblank: u32,
    /// Row to start the next pattern at (pattern break)
    pub pending_break: Option<u8>,
    /// Position to jump to (position jump)
    pub pending_jump: Option<u8>,
    /// Remembered pattern-loop start row
    pub pattern_loop_row: Option<u8>,
    /// Remaining pattern-loop repetitions
    pub pattern_loop_count: u8,
    /// Jump back to `pattern_loop_row` instead of the next row
    pub loop_jump_pending: bool,
    /// Extra ticks to hold the current row
    pub row_delay: u8,
    /// Playback wrapped or jumped backwards at least once
    pub has_looped: bool,
    /// Terminal state
    pub ended: bool,
    /// Tick rate set by a tempo command, overriding the VBlank rate
    pub tempo_hz: Option<f32>,
    /// Standard change waiting for the next tick boundary
    pub pending_standard: Option<Standard>,
}

impl Transport {
    /// Fresh transport at position 0, row 0; the first tick triggers row 0.
    pub fn new(timing: TimingConfig) -> Self {
        Transport {
            timing,
            clock: VblankClock::new(timing),
            position: 0,
            row: 0,
            playing_position: 0,
            playing_row: 0,
            speed: DEFAULT_SPEED,
            current_vblank: DEFAULT_SPEED,
            pending_break: None,
            pending_jump: None,
            pattern_loop_row: None,
            pattern_loop_count: 0,
            loop_jump_pending: false,
            row_delay: 0,
            has_looped: false,
            ended: false,
            tempo_hz: None,
            pending_standard: None,
        }
    }

    /// Switch to an explicit tick rate.
    pub fn set_tempo(&mut self, ticks_per_second: f32) {
        self.tempo_hz = Some(ticks_per_second);
        self.clock
            .set_samples_per_tick(self.timing.samples_per_tick_at(ticks_per_second));
    }

    /// Queue a standard change for the next tick boundary.
    pub fn request_standard(&mut self, standard: Standard) {
        self.pending_standard = Some(standard);
    }

    /// Active standard, including a queued change.
    pub fn standard(&self) -> Standard {
        self.pending_standard.unwrap_or(self.timing.standard)
    }

    /// Paula clock ticks per output frame.
    pub fn clock_ticks_per_sample(&self) -> f32 {
        self.timing.clock_ticks_per_sample()
    }

    fn apply_pending_standard(&mut self) {
        if let Some(standard) = self.pending_standard.take() {
            self.timing.standard = standard;
            if self.tempo_hz.is_none() {
                self.clock.set_samples_per_tick(self.timing.samples_per_tick());
            }
            log::debug!("Playback standard switched to {}", standard);
        }
    }
}

/// Complete sequencer state: transport plus one [`ChannelState`] per channel.
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Song-level transport
    pub transport: Transport,
    /// Per-channel state
    pub channels: Vec<ChannelState>,
}

impl PlayerState {
    /// Initial state for a song.
    pub fn new(song: &Song, timing: TimingConfig) -> Self {
        PlayerState {
            transport: Transport::new(timing),
            channels: vec![ChannelState::default(); song.num_channels()],
        }
    }

    /// Clock the sequencer by one output frame.
    pub fn clock_frame(&mut self, song: &Song) -> AdvanceResult {
        if self.transport.ended {
            return AdvanceResult::Completed;
        }
        if !self.transport.clock.clock() {
            return AdvanceResult::NoTick;
        }
        self.tick(song)
    }

    /// Run one tick: per-tick effects, then a row advance when due.
    pub fn tick(&mut self, song: &Song) -> AdvanceResult {
        self.transport.apply_pending_standard();

        for channel in self.channels.iter_mut() {
            tick_channel(channel, song);
        }

        let mut result = AdvanceResult::Ticked;
        let transport = &mut self.transport;
        if transport.current_vblank >= transport.speed {
            if transport.row_delay > 0 {
                transport.row_delay -= 1;
            } else {
                transport.current_vblank = 0;
                result = self.advance_row(song);
            }
        }
        self.transport.current_vblank += 1;
        result
    }

    /// Move to the next row and trigger its notes.
    ///
    /// Pending targets resolve as pattern break, then position jump, then
    /// the natural increment performed after the previous row.
    pub fn advance_row(&mut self, song: &Song) -> AdvanceResult {
        let PlayerState {
            transport,
            channels,
        } = self;

        if let Some(row) = transport.pending_break.take() {
            transport.position += 1;
            transport.row = row as usize;
            transport.pending_jump = None;
        } else if let Some(position) = transport.pending_jump.take() {
            transport.position = position as usize;
            transport.row = 0;
        }

        let mut result = AdvanceResult::RowAdvanced;
        if transport.position >= song.num_positions as usize {
            if song.restart_is_valid() {
                transport.position = song.restart_position as usize;
                transport.has_looped = true;
                result = AdvanceResult::Looped;
            } else {
                log::debug!("Song ended at position {}", transport.position);
                transport.ended = true;
                return AdvanceResult::Completed;
            }
        }

        let Some(row) = song.row_at(transport.position, transport.row) else {
            log::warn!(
                "No row {} at position {}, stopping",
                transport.row,
                transport.position
            );
            transport.ended = true;
            return AdvanceResult::Completed;
        };

        transport.playing_position = transport.position;
        transport.playing_row = transport.row;
        for (note, channel) in row.iter().zip(channels.iter_mut()) {
            trigger_note(note, channel, song, transport);
        }

        if transport.loop_jump_pending {
            transport.loop_jump_pending = false;
            if let Some(loop_row) = transport.pattern_loop_row {
                transport.row = loop_row as usize;
            }
        } else if transport.pending_break.is_none() && transport.pending_jump.is_none() {
            transport.row += 1;
            if transport.row >= ROWS_PER_PATTERN {
                transport.row = 0;
                transport.position += 1;
            }
        }

        result
    }

    /// Position and row that will trigger next.
    pub fn cursor(&self) -> (usize, usize) {
        (self.transport.position, self.transport.row)
    }

    /// Position and row currently playing.
    pub fn playing(&self) -> (usize, usize) {
        (self.transport.playing_position, self.transport.playing_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replayer::fixtures::{note, pattern_with, song_with_patterns};

    fn state_for(song: &Song) -> PlayerState {
        PlayerState::new(song, TimingConfig::default())
    }

    /// Rows triggered until the song completes or `limit` is reached.
    fn play_rows(song: &Song, limit: usize) -> Vec<(usize, usize)> {
        let mut state = state_for(song);
        let mut rows = Vec::new();
        for _ in 0..limit {
            if state.advance_row(song) == AdvanceResult::Completed {
                break;
            }
            rows.push(state.playing());
        }
        rows
    }

    #[test]
    fn test_first_frame_triggers_row_zero() {
        let song = song_with_patterns(
            4,
            vec![pattern_with(4, &[(0, 0, note(1, 428, 0, 0))])],
            &[0],
            127,
        );
        let mut state = state_for(&song);
        assert_eq!(state.clock_frame(&song), AdvanceResult::RowAdvanced);
        assert_eq!(state.channels[0].period, 428);
        assert_eq!(state.playing(), (0, 0));
        assert_eq!(state.cursor(), (0, 1));
        assert_eq!(state.clock_frame(&song), AdvanceResult::NoTick);
    }

    #[test]
    fn test_rows_advance_every_speed_ticks() {
        let song = song_with_patterns(4, vec![pattern_with(4, &[])], &[0], 127);
        let mut state = state_for(&song);
        let advances = (0..60)
            .filter(|_| state.tick(&song) == AdvanceResult::RowAdvanced)
            .count();
        assert_eq!(advances, 10);
    }

    #[test]
    fn test_single_pattern_plays_64_rows_then_ends() {
        let song = song_with_patterns(4, vec![pattern_with(4, &[])], &[0], 127);
        let rows = play_rows(&song, 1000);
        assert_eq!(rows.len(), 64);
        assert_eq!(rows[63], (0, 63));

        let mut state = state_for(&song);
        for _ in 0..64 {
            state.advance_row(&song);
        }
        assert_eq!(state.advance_row(&song), AdvanceResult::Completed);
        assert!(state.transport.ended);
        assert_eq!(state.clock_frame(&song), AdvanceResult::Completed);
    }

    #[test]
    fn test_valid_restart_loops() {
        let song = song_with_patterns(4, vec![pattern_with(4, &[])], &[0], 0);
        let mut state = state_for(&song);
        for _ in 0..64 {
            assert_eq!(state.advance_row(&song), AdvanceResult::RowAdvanced);
        }
        assert!(!state.transport.has_looped);
        assert_eq!(state.advance_row(&song), AdvanceResult::Looped);
        assert!(state.transport.has_looped);
        assert_eq!(state.playing(), (0, 0));
    }

    #[test]
    fn test_break_wins_over_jump() {
        let patterns = vec![
            pattern_with(
                4,
                &[(0, 0, note(0, 0, 0xD, 0x23)), (0, 1, note(0, 0, 0xB, 2))],
            ),
            pattern_with(4, &[]),
            pattern_with(4, &[]),
        ];
        let song = song_with_patterns(4, patterns, &[0, 1, 2], 127);
        let rows = play_rows(&song, 2);
        assert_eq!(rows, vec![(0, 0), (1, 23)]);
    }

    #[test]
    fn test_jump_resets_row() {
        let patterns = vec![
            pattern_with(4, &[(1, 2, note(0, 0, 0xB, 2))]),
            pattern_with(4, &[]),
            pattern_with(4, &[]),
        ];
        let song = song_with_patterns(4, patterns, &[0, 1, 2], 127);
        let rows = play_rows(&song, 3);
        assert_eq!(rows, vec![(0, 0), (0, 1), (2, 0)]);
    }

    #[test]
    fn test_break_on_last_row_advances_once() {
        let patterns = vec![
            pattern_with(4, &[(63, 0, note(0, 0, 0xD, 0x00))]),
            pattern_with(4, &[]),
            pattern_with(4, &[]),
        ];
        let song = song_with_patterns(4, patterns, &[0, 1, 2], 127);
        let rows = play_rows(&song, 65);
        assert_eq!(rows[63], (0, 63));
        assert_eq!(rows[64], (1, 0));
    }

    #[test]
    fn test_jump_past_end_stops() {
        let patterns = vec![pattern_with(4, &[(0, 0, note(0, 0, 0xB, 9))])];
        let song = song_with_patterns(4, patterns, &[0], 127);
        assert_eq!(play_rows(&song, 10), vec![(0, 0)]);
    }

    #[test]
    fn test_pattern_loop_repeats_section() {
        let patterns = vec![pattern_with(
            4,
            &[(1, 0, note(0, 0, 0xE, 0x60)), (3, 0, note(0, 0, 0xE, 0x62))],
        )];
        let song = song_with_patterns(4, patterns, &[0], 127);
        let rows: Vec<usize> = play_rows(&song, 11).into_iter().map(|(_, r)| r).collect();
        assert_eq!(rows, vec![0, 1, 2, 3, 1, 2, 3, 1, 2, 3, 4]);
    }

    #[test]
    fn test_row_delay_holds_row() {
        let patterns = vec![pattern_with(4, &[(0, 0, note(0, 0, 0xE, 0xE2))])];
        let song = song_with_patterns(4, patterns, &[0], 127);
        let mut state = state_for(&song);
        let ticks: Vec<usize> = (1..=20)
            .filter(|_| state.tick(&song) == AdvanceResult::RowAdvanced)
            .collect();
        // row 0 at tick 1, row 1 two ticks late at tick 9, then every 6
        assert_eq!(ticks, vec![1, 9, 15]);
    }

    #[test]
    fn test_standard_change_waits_for_tick() {
        let song = song_with_patterns(4, vec![pattern_with(4, &[])], &[0], 127);
        let mut state = state_for(&song);
        state.clock_frame(&song);
        state.transport.request_standard(Standard::Ntsc);
        assert_eq!(state.transport.standard(), Standard::Ntsc);
        assert_eq!(state.transport.clock.samples_per_tick(), 882);
        assert_eq!(state.transport.timing.standard, Standard::Pal);

        while state.clock_frame(&song) == AdvanceResult::NoTick {}
        assert_eq!(state.transport.timing.standard, Standard::Ntsc);
        assert_eq!(state.transport.clock.samples_per_tick(), 735);
    }

    #[test]
    fn test_tempo_override_survives_standard_change() {
        let song = song_with_patterns(4, vec![pattern_with(4, &[])], &[0], 127);
        let mut state = state_for(&song);
        state.transport.set_tempo(40.0);
        state.transport.request_standard(Standard::Ntsc);
        state.tick(&song);
        assert_eq!(state.transport.clock.samples_per_tick(), 1102);
    }
}
