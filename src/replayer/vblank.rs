//! VBlank (Vertical Blanking) Synchronization
//!
//! The audio-frame sub-clock that turns output samples into tracker ticks.
//! One tick occurs every `samples_per_tick` frames; the clock starts
//! primed so the very first frame is a tick.

use super::TimingConfig;

/// VBlank tick clock
#[derive(Debug, Clone)]
pub struct VblankClock {
    /// Frames between ticks
    samples_per_tick: u32,
    /// Frames elapsed in the current tick
    sample_count: u32,
    /// Total ticks since reset
    tick_count: u64,
}

impl VblankClock {
    /// Create a new clock from a timing configuration
    pub fn new(config: TimingConfig) -> Self {
        Self::with_samples_per_tick(config.samples_per_tick())
    }

    /// Create a clock with an explicit tick length
    pub fn with_samples_per_tick(samples_per_tick: u32) -> Self {
        let samples_per_tick = samples_per_tick.max(1);
        VblankClock {
            samples_per_tick,
            sample_count: samples_per_tick,
            tick_count: 0,
        }
    }

    /// Clock the synchronizer by one output frame.
    /// Returns true if a tick should be processed before mixing this frame.
    pub fn clock(&mut self) -> bool {
        let tick = self.sample_count >= self.samples_per_tick;
        if tick {
            self.sample_count = 0;
            self.tick_count += 1;
        }
        self.sample_count += 1;
        tick
    }

    /// Frames per tick
    pub fn samples_per_tick(&self) -> u32 {
        self.samples_per_tick
    }

    /// Change the tick length; takes effect from the current tick onward
    pub fn set_samples_per_tick(&mut self, samples: u32) {
        self.samples_per_tick = samples.max(1);
    }

    /// Total ticks since reset
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Rewind so the next frame is a tick again
    pub fn reset(&mut self) {
        self.sample_count = self.samples_per_tick;
        self.tick_count = 0;
    }
}

impl Default for VblankClock {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_a_tick() {
        let mut clock = VblankClock::default();
        assert!(clock.clock());
        assert_eq!(clock.tick_count(), 1);
    }

    #[test]
    fn test_tick_interval() {
        let mut clock = VblankClock::default();
        assert!(clock.clock());
        let mut frames = 0;
        while !clock.clock() {
            frames += 1;
        }
        // 881 quiet frames between ticks at 44.1kHz PAL
        assert_eq!(frames, 881);
        assert_eq!(clock.tick_count(), 2);
    }

    #[test]
    fn test_reset_primes_clock() {
        let mut clock = VblankClock::with_samples_per_tick(4);
        clock.clock();
        clock.clock();
        clock.reset();
        assert!(clock.clock());
        assert_eq!(clock.tick_count(), 1);
    }

    #[test]
    fn test_zero_length_is_clamped() {
        let mut clock = VblankClock::with_samples_per_tick(0);
        assert!(clock.clock());
        assert!(clock.clock());
    }
}
