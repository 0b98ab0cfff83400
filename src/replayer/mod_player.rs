//! MOD File Player
//!
//! Pull-based façade over the sequencer and mixer: load a module, start
//! playback, then repeatedly [`pull`](ModPlayer::pull) interleaved stereo
//! frames until the stream reports it has no more.

use super::channel::{ChannelSnapshot, MuteFlags};
use super::sequencer::{AdvanceResult, PlayerState};
use super::{PlaybackController, PlaybackState, Standard};
use crate::config::PlayerConfig;
use crate::mod_parser::parse_module;
use crate::paula::{Mixer, MixingMode, StereoFrame};
use crate::song::{Row, Song};
use crate::{ModError, Result};
use serde::Serialize;

/// Outcome of a [`ModPlayer::pull`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStatus {
    /// Stereo frames written
    pub frames: usize,
    /// False once the song has ended
    pub more: bool,
}

/// Per-sample line of a [`LoadSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSummary {
    /// 1-based sample number
    pub number: u8,
    /// Sample name
    pub name: String,
    /// Length in bytes
    pub length: u32,
    /// Default volume
    pub volume: u8,
    /// Fine-tune nibble
    pub fine_tune: u8,
    /// Loop start in bytes
    pub loop_offset: u32,
    /// Loop length in bytes
    pub loop_length: u32,
}

/// Summary information returned after loading a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Song title
    pub name: String,
    /// Format tag, `-` for untagged modules
    pub format_tag: String,
    /// Playback channels
    pub num_channels: usize,
    /// Positions in the order table that are played
    pub num_positions: u8,
    /// Restart position
    pub restart_position: u8,
    /// Decoded patterns
    pub num_patterns: usize,
    /// Every note sits on the standard period table
    pub has_standard_notes: bool,
    /// Sample headers
    pub samples: Vec<SampleSummary>,
}

impl LoadSummary {
    fn from_song(song: &Song) -> Self {
        LoadSummary {
            name: song.name.clone(),
            format_tag: song.format.tag_label().to_string(),
            num_channels: song.num_channels(),
            num_positions: song.num_positions,
            restart_position: song.restart_position,
            num_patterns: song.patterns.len(),
            has_standard_notes: song.has_standard_notes,
            samples: song
                .samples
                .iter()
                .enumerate()
                .map(|(idx, s)| SampleSummary {
                    number: idx as u8 + 1,
                    name: s.name.clone(),
                    length: s.length,
                    volume: s.volume,
                    fine_tune: s.fine_tune,
                    loop_offset: s.loop_offset,
                    loop_length: s.loop_length,
                })
                .collect(),
        }
    }
}

/// Read-only view of the player for displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    /// Playback state
    pub state: PlaybackState,
    /// Song title
    pub song_name: String,
    /// Format tag, `-` for untagged modules
    pub format_tag: String,
    /// Sample names in header order
    pub sample_names: Vec<String>,
    /// Positions played
    pub num_positions: u8,
    /// Decoded patterns
    pub num_patterns: usize,
    /// Position currently playing
    pub position: usize,
    /// Pattern at that position
    pub pattern: u8,
    /// Row currently playing
    pub row: usize,
    /// Ticks per row
    pub speed: u32,
    /// Per-channel view
    pub channels: Vec<ChannelSnapshot>,
    /// Video standard (including a change not yet applied)
    pub standard: Standard,
    /// Speaker layout
    pub mixing_mode: MixingMode,
    /// Last mixed frame
    pub last_frame: StereoFrame,
    /// Playback wrapped at least once
    pub has_looped: bool,
    /// Song has ended
    pub ended: bool,
}

/// A loaded song and everything that changes while it plays.
#[derive(Debug, Clone)]
struct Session {
    song: Song,
    player: PlayerState,
    mutes: MuteFlags,
}

/// MOD player
///
/// Owns one song session at a time. Loading replaces the song, sequencer
/// state and mute flags together; a failed load leaves the current session
/// untouched.
#[derive(Debug, Clone)]
pub struct ModPlayer {
    config: PlayerConfig,
    state: PlaybackState,
    session: Option<Session>,
    mixer: Mixer,
}

impl ModPlayer {
    /// Create a player with the default configuration
    pub fn new() -> Self {
        let config = PlayerConfig::default();
        ModPlayer {
            config,
            state: PlaybackState::Stopped,
            session: None,
            mixer: Mixer::new(config.mixing_mode),
        }
    }

    /// Create a player with an explicit configuration
    pub fn with_config(config: PlayerConfig) -> Result<Self> {
        config.validate()?;
        Ok(ModPlayer {
            config,
            state: PlaybackState::Stopped,
            session: None,
            mixer: Mixer::new(config.mixing_mode),
        })
    }

    /// Decode and load a module. On failure the current song keeps playing.
    pub fn load(&mut self, data: &[u8]) -> Result<LoadSummary> {
        let song = parse_module(data)?;
        Ok(self.load_song(song))
    }

    /// Load an already decoded song.
    pub fn load_song(&mut self, song: Song) -> LoadSummary {
        let summary = LoadSummary::from_song(&song);
        let player = PlayerState::new(&song, self.config.timing());
        let mutes = MuteFlags::new(song.num_channels());

        log::debug!(
            "Loaded '{}' ({} channels, {} positions)",
            summary.name,
            summary.num_channels,
            summary.num_positions
        );

        self.session = Some(Session {
            song,
            player,
            mutes,
        });
        self.mixer.reset();
        self.state = PlaybackState::Stopped;
        summary
    }

    /// Whether a song is loaded
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// The loaded song
    pub fn song(&self) -> Option<&Song> {
        self.session.as_ref().map(|s| &s.song)
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Active configuration
    pub fn config(&self) -> PlayerConfig {
        self.config
    }

    /// Play if paused or stopped, pause if playing
    pub fn toggle_play(&mut self) -> Result<PlaybackState> {
        if self.state == PlaybackState::Playing {
            self.pause()?;
        } else {
            self.play()?;
        }
        Ok(self.state)
    }

    /// Fill `out` with interleaved stereo frames.
    ///
    /// While paused, stopped or unloaded the buffer is zeroed and no frames
    /// are reported. Once the song ends, only the frames produced before the
    /// end are reported and `more` turns false.
    pub fn pull(&mut self, out: &mut [f32]) -> StreamStatus {
        let Some(session) = self.session.as_mut() else {
            out.fill(0.0);
            return StreamStatus {
                frames: 0,
                more: true,
            };
        };

        if self.state != PlaybackState::Playing || session.player.transport.ended {
            out.fill(0.0);
            return StreamStatus {
                frames: 0,
                more: !session.player.transport.ended,
            };
        }

        let mut produced = 0;
        for frame in out.chunks_exact_mut(2) {
            if session.player.clock_frame(&session.song) == AdvanceResult::Completed {
                break;
            }
            let step = session.player.transport.clock_ticks_per_sample();
            let mixed = self.mixer.mix_frame(
                &mut session.player.channels,
                &session.mutes,
                &session.song,
                step,
            );
            frame[0] = mixed.left;
            frame[1] = mixed.right;
            produced += 1;
        }
        out[produced * 2..].fill(0.0);

        let ended = session.player.transport.ended;
        if ended {
            self.state = PlaybackState::Stopped;
        }

        StreamStatus {
            frames: produced,
            more: !ended,
        }
    }

    /// Generate samples into an existing interleaved buffer, silence when idle
    pub fn generate_samples_into(&mut self, buffer: &mut [f32]) {
        self.pull(buffer);
    }

    /// Generate `frames` stereo frames into a new interleaved buffer
    pub fn generate_samples(&mut self, frames: usize) -> Vec<f32> {
        let mut buffer = vec![0.0; frames * 2];
        self.generate_samples_into(&mut buffer);
        buffer
    }

    /// Flip a channel's mute flag, returning the new state
    pub fn toggle_mute(&mut self, channel: usize) -> Result<bool> {
        let session = self.session.as_ref().ok_or(ModError::NoSongLoaded)?;
        session.mutes.toggle(channel).ok_or_else(|| {
            ModError::Other(format!(
                "Channel {} out of range (0..{})",
                channel,
                session.mutes.len()
            ))
        })
    }

    /// Mute flags of the loaded song, shareable with another thread
    pub fn mute_flags(&self) -> Option<MuteFlags> {
        self.session.as_ref().map(|s| s.mutes.clone())
    }

    /// Current speaker layout
    pub fn mixing_mode(&self) -> MixingMode {
        self.mixer.mode()
    }

    /// Change the speaker layout
    pub fn set_mixing_mode(&mut self, mode: MixingMode) {
        self.config.mixing_mode = mode;
        self.mixer.set_mode(mode);
    }

    /// Step Amiga → Stereo → Mono → Amiga
    pub fn cycle_mixing_mode(&mut self) -> MixingMode {
        let mode = self.mixer.mode().next();
        self.set_mixing_mode(mode);
        mode
    }

    /// Current video standard
    pub fn standard(&self) -> Standard {
        self.config.standard
    }

    /// Change the video standard; timing follows at the next tick boundary
    pub fn set_standard(&mut self, standard: Standard) {
        self.config.standard = standard;
        if let Some(session) = self.session.as_mut() {
            session.player.transport.request_standard(standard);
        }
    }

    /// Switch between PAL and NTSC
    pub fn toggle_standard(&mut self) -> Standard {
        let standard = self.config.standard.toggled();
        self.set_standard(standard);
        standard
    }

    /// Playing position and row
    pub fn position(&self) -> Option<(usize, usize)> {
        self.session.as_ref().map(|s| s.player.playing())
    }

    /// Row of the loaded song, for pattern displays
    pub fn row_at(&self, position: usize, row: usize) -> Option<&Row> {
        self.session.as_ref()?.song.row_at(position, row)
    }

    /// Row currently playing
    pub fn current_row(&self) -> Option<&Row> {
        let (position, row) = self.position()?;
        self.row_at(position, row)
    }

    /// Distinct sample numbers active on any channel, ascending
    pub fn samples_in_use(&self) -> Vec<u8> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let mut numbers: Vec<u8> = session
            .player
            .channels
            .iter()
            .map(|c| c.sample_number)
            .filter(|&n| n > 0)
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }

    /// Playback wrapped to the restart position or jumped backwards
    pub fn has_looped(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.player.transport.has_looped)
            .unwrap_or(false)
    }

    /// Song reached its end
    pub fn is_finished(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.player.transport.ended)
            .unwrap_or(false)
    }

    /// Last mixed frame, for level meters
    pub fn last_frame(&self) -> StereoFrame {
        self.mixer.last_frame()
    }

    /// Consistent view of the player for displays
    pub fn snapshot(&self) -> Option<PlayerSnapshot> {
        let session = self.session.as_ref()?;
        let song = &session.song;
        let transport = &session.player.transport;
        let (position, row) = session.player.playing();

        Some(PlayerSnapshot {
            state: self.state,
            song_name: song.name.clone(),
            format_tag: song.format.tag_label().to_string(),
            sample_names: song.samples.iter().map(|s| s.name.clone()).collect(),
            num_positions: song.num_positions,
            num_patterns: song.patterns.len(),
            position,
            pattern: song.positions.get(position).copied().unwrap_or(0),
            row,
            speed: transport.speed,
            channels: session
                .player
                .channels
                .iter()
                .enumerate()
                .map(|(idx, c)| ChannelSnapshot {
                    sample_number: c.sample_number,
                    period: c.period,
                    volume: c.volume(),
                    muted: session.mutes.is_muted(idx),
                })
                .collect(),
            standard: transport.standard(),
            mixing_mode: self.mixer.mode(),
            last_frame: self.mixer.last_frame(),
            has_looped: transport.has_looped,
            ended: transport.ended,
        })
    }

    fn rewind(&mut self) {
        let timing = self.config.timing();
        if let Some(session) = self.session.as_mut() {
            session.player = PlayerState::new(&session.song, timing);
        }
        self.mixer.reset();
    }
}

impl Default for ModPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController for ModPlayer {
    fn play(&mut self) -> Result<()> {
        let session = self.session.as_ref().ok_or(ModError::NoSongLoaded)?;
        if session.player.transport.ended {
            self.rewind();
        }
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.rewind();
        self.state = PlaybackState::Stopped;
        Ok(())
    }

    fn state(&self) -> PlaybackState {
        self.state
    }
}

/// Convenience helper to create a player and load a module into it.
pub fn load_song(data: &[u8]) -> Result<(ModPlayer, LoadSummary)> {
    let mut player = ModPlayer::new();
    let summary = player.load(data)?;
    Ok((player, summary))
}
