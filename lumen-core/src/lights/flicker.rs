//! Randomly flickering light.

use rand::Rng;
use tracing::trace;

use crate::config::FlickerConfig;

// Keeps zero-length periods from spinning forever inside one frame.
const MIN_PERIOD: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    On,
    Off,
    BurstOn(u32),
    BurstOff(u32),
}

/// On/off flicker driven by the frame clock.
///
/// The light stays on for a random while, goes dark for a random while,
/// then sometimes stutters through a burst of very short toggles.
#[derive(Debug, Clone)]
pub struct Flicker<R: Rng> {
    config: FlickerConfig,
    rng: R,
    phase: Phase,
    timer: f32,
    toggles: u64,
}

impl<R: Rng> Flicker<R> {
    /// Start lit, in an on period.
    pub fn new(config: FlickerConfig, rng: R) -> Self {
        let mut flicker = Self {
            config,
            rng,
            phase: Phase::On,
            timer: 0.0,
            toggles: 0,
        };
        flicker.timer = flicker.on_period();
        flicker
    }

    /// Whether the light is on right now.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        matches!(self.phase, Phase::On | Phase::BurstOn(_))
    }

    /// Number of on/off changes so far.
    #[must_use]
    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    /// Advance by `dt` seconds and report whether the light is on.
    pub fn update(&mut self, dt: f32) -> bool {
        self.timer -= dt;
        while self.timer <= 0.0 {
            let was_lit = self.is_lit();
            self.phase = match self.phase {
                Phase::On => {
                    self.timer += self.off_period();
                    Phase::Off
                }
                Phase::Off => {
                    let chance = f64::from(self.config.flicker_probability.clamp(0.0, 1.0));
                    if self.rng.gen_bool(chance) {
                        let (lo, hi) = self.config.burst_toggles;
                        let count = if hi > lo { self.rng.gen_range(lo..=hi) } else { lo };
                        trace!(count, "flicker burst");
                        self.timer += self.burst_period();
                        if count == 0 {
                            self.timer += self.on_period();
                            Phase::On
                        } else {
                            Phase::BurstOn(count)
                        }
                    } else {
                        self.timer += self.on_period();
                        Phase::On
                    }
                }
                Phase::BurstOn(n) => {
                    self.timer += self.burst_period();
                    Phase::BurstOff(n)
                }
                Phase::BurstOff(n) if n > 1 => {
                    self.timer += self.burst_period();
                    Phase::BurstOn(n - 1)
                }
                Phase::BurstOff(_) => {
                    self.timer += self.on_period();
                    Phase::On
                }
            };
            if was_lit != self.is_lit() {
                self.toggles += 1;
            }
        }
        self.is_lit()
    }

    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        let value = if hi > lo { self.rng.gen_range(lo..hi) } else { lo };
        value.max(MIN_PERIOD)
    }

    fn on_period(&mut self) -> f32 {
        self.uniform(self.config.min_on_time, self.config.max_on_time)
    }

    fn off_period(&mut self) -> f32 {
        self.uniform(self.config.min_off_time, self.config.max_off_time)
    }

    fn burst_period(&mut self) -> f32 {
        let (lo, hi) = self.config.burst_interval;
        self.uniform(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn flicker(config: FlickerConfig) -> Flicker<StdRng> {
        Flicker::new(config, StdRng::seed_from_u64(3))
    }

    #[test]
    fn starts_lit() {
        let f = flicker(FlickerConfig::default());
        assert!(f.is_lit());
    }

    #[test]
    fn fixed_periods_alternate() {
        let config = FlickerConfig {
            min_on_time: 1.0,
            max_on_time: 1.0,
            min_off_time: 0.5,
            max_off_time: 0.5,
            flicker_probability: 0.0,
            ..FlickerConfig::default()
        };
        let mut f = flicker(config);
        assert!(f.update(0.9));
        assert!(!f.update(0.2));
        assert!(!f.update(0.2));
        assert!(f.update(0.25));
        assert_eq!(f.toggles(), 2);
    }

    #[test]
    fn certain_burst_toggles_quickly() {
        let config = FlickerConfig {
            min_on_time: 1.0,
            max_on_time: 1.0,
            min_off_time: 0.5,
            max_off_time: 0.5,
            flicker_probability: 1.0,
            burst_toggles: (3, 3),
            burst_interval: (0.05, 0.05),
            ..FlickerConfig::default()
        };
        let mut f = flicker(config);
        f.update(1.0); // off
        f.update(0.5); // burst on
        let before = f.toggles();
        // 3 bursts of on+off at 0.05s each.
        f.update(0.32);
        assert!(f.toggles() >= before + 5);
        assert!(f.is_lit());
    }

    #[test]
    fn zero_periods_do_not_hang() {
        let config = FlickerConfig {
            min_on_time: 0.0,
            max_on_time: 0.0,
            min_off_time: 0.0,
            max_off_time: 0.0,
            ..FlickerConfig::default()
        };
        let mut f = flicker(config);
        f.update(0.1);
        assert!(f.toggles() > 0);
    }
}
