//! Shared player for audio and display threads
//!
//! One lock guards the whole session. The audio callback pulls frames under
//! it, the display takes cloned snapshots, and loading parses outside it
//! before swapping the new song in.

use crate::mod_parser::parse_module;
use crate::paula::MixingMode;
use crate::replayer::{
    LoadSummary, ModPlayer, MuteFlags, PlaybackController, PlaybackState, PlayerSnapshot,
    Standard, StreamStatus,
};
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Pull statistics for monitoring the audio callback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Stereo frames delivered with audio
    pub frames_pulled: u64,
    /// Pulls that had to pad with silence while playing
    pub underruns: u64,
}

/// Cloneable handle around a [`ModPlayer`]
#[derive(Debug, Clone)]
pub struct SharedPlayer {
    player: Arc<Mutex<ModPlayer>>,
    stats: Arc<Mutex<PlaybackStats>>,
}

impl SharedPlayer {
    /// Wrap a player
    pub fn new(player: ModPlayer) -> Self {
        SharedPlayer {
            player: Arc::new(Mutex::new(player)),
            stats: Arc::new(Mutex::new(PlaybackStats::default())),
        }
    }

    /// Fill an interleaved stereo buffer from the audio thread
    pub fn pull(&self, out: &mut [f32]) -> StreamStatus {
        let mut player = self.player.lock();
        let playing = player.state() == PlaybackState::Playing;
        let status = player.pull(out);
        drop(player);

        let mut stats = self.stats.lock();
        stats.frames_pulled += status.frames as u64;
        if playing && status.more && status.frames < out.len() / 2 {
            stats.underruns += 1;
        }
        status
    }

    /// Consistent view for the display thread
    pub fn snapshot(&self) -> Option<PlayerSnapshot> {
        self.player.lock().snapshot()
    }

    /// Decode `data` without holding the lock, then swap it in
    pub fn load(&self, data: &[u8]) -> Result<LoadSummary> {
        let song = parse_module(data)?;
        Ok(self.player.lock().load_song(song))
    }

    /// Start playback
    pub fn play(&self) -> Result<()> {
        self.player.lock().play()
    }

    /// Pause playback
    pub fn pause(&self) -> Result<()> {
        self.player.lock().pause()
    }

    /// Stop and rewind
    pub fn stop(&self) -> Result<()> {
        self.player.lock().stop()
    }

    /// Play or pause
    pub fn toggle_play(&self) -> Result<PlaybackState> {
        self.player.lock().toggle_play()
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.player.lock().state()
    }

    /// Flip a channel's mute flag
    pub fn toggle_mute(&self, channel: usize) -> Result<bool> {
        self.player.lock().toggle_mute(channel)
    }

    /// Mute flags of the current song; writes through them skip the lock
    pub fn mute_flags(&self) -> Option<MuteFlags> {
        self.player.lock().mute_flags()
    }

    /// Step to the next mixing mode
    pub fn cycle_mixing_mode(&self) -> MixingMode {
        self.player.lock().cycle_mixing_mode()
    }

    /// Switch PAL/NTSC at the next tick
    pub fn toggle_standard(&self) -> Standard {
        self.player.lock().toggle_standard()
    }

    /// Get current playback statistics
    pub fn stats(&self) -> PlaybackStats {
        *self.stats.lock()
    }

    /// Run `f` with exclusive access to the player
    pub fn with_player<R>(&self, f: impl FnOnce(&mut ModPlayer) -> R) -> R {
        f(&mut self.player.lock())
    }
}
