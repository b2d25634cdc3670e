//! Player movement and the light-driven fear meter.

use tracing::{debug, info};
use vek::{Quaternion, Vec3};

use crate::config::PlayerConfig;

/// Kinematic player body.
///
/// Horizontal motion is direct; vertical motion is a simple ballistic
/// integration that stops at `ground_height`.
#[derive(Debug, Clone)]
pub struct PlayerMotor {
    config: PlayerConfig,
    position: Vec3<f32>,
    facing: Quaternion<f32>,
    vertical_velocity: f32,
    ground_height: f32,
    grounded: bool,
    speed: f32,
}

impl PlayerMotor {
    /// A grounded player standing at `position`.
    #[must_use]
    pub fn new(config: PlayerConfig, position: Vec3<f32>) -> Self {
        Self {
            config,
            position,
            facing: Quaternion::identity(),
            vertical_velocity: 0.0,
            ground_height: position.y,
            grounded: true,
            speed: 0.0,
        }
    }

    /// Apply stick input for one frame.
    pub fn move_axis(&mut self, horizontal: f32, vertical: f32, dt: f32) {
        let movement = Vec3::new(horizontal, 0.0, vertical);
        self.speed = movement.magnitude();
        if self.speed > f32::EPSILON {
            let target = Quaternion::rotation_y(movement.x.atan2(movement.z));
            let t = (self.config.turn_rate * dt).clamp(0.0, 1.0);
            self.facing = Quaternion::slerp(self.facing, target, t);
        }
        self.position += movement * self.config.move_speed * dt;
    }

    /// Jump if on the ground. Returns whether the jump happened.
    pub fn jump(&mut self) -> bool {
        if !self.grounded {
            return false;
        }
        self.vertical_velocity = self.config.jump_force;
        self.grounded = false;
        debug!("player jumped");
        true
    }

    /// Touch the ground.
    pub fn land(&mut self) {
        self.grounded = true;
        self.vertical_velocity = 0.0;
        self.position.y = self.ground_height;
    }

    /// Integrate gravity for one frame.
    pub fn update(&mut self, dt: f32) {
        if self.grounded {
            return;
        }
        self.vertical_velocity -= self.config.gravity * dt;
        self.position.y += self.vertical_velocity * dt;
        if self.position.y <= self.ground_height && self.vertical_velocity <= 0.0 {
            self.land();
        }
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Vec3<f32> {
        self.position
    }

    /// Facing rotation.
    #[must_use]
    pub fn facing(&self) -> Quaternion<f32> {
        self.facing
    }

    /// Whether the player stands on the ground.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Stick magnitude of the last move, for the run animation.
    #[must_use]
    pub fn speed_param(&self) -> f32 {
        self.speed
    }

    /// Vertical velocity, for the jump animation.
    #[must_use]
    pub fn velocity_param(&self) -> f32 {
        self.vertical_velocity
    }
}

/// Coarse fear level derived from mental health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FearStep {
    /// Not yet evaluated.
    None,
    /// Mental health below 0.2.
    Panic,
    /// Below 0.4.
    Terror,
    /// Below 0.6.
    Dread,
    /// Below 0.8.
    Unease,
    /// Below 1.0.
    Calm,
    /// Full mental health.
    Serene,
}

impl FearStep {
    /// Step for a mental health value in `[0, 1]`: `mh / 0.2 + 1`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_mental_health(mental_health: f32) -> Self {
        let step = (mental_health.max(0.0) / 0.2 + 1.0) as u32;
        match step {
            0 => Self::None,
            1 => Self::Panic,
            2 => Self::Terror,
            3 => Self::Dread,
            4 => Self::Unease,
            5 => Self::Calm,
            _ => Self::Serene,
        }
    }
}

/// Player mood as shown by the character animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    /// Standing in at least one lit spot.
    Nice,
    /// In the dark.
    Fear,
}

/// Animation trigger fired on a mood change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodTrigger {
    /// Back in the light.
    Replay,
    /// Fell into darkness.
    Scared,
}

const TICK_SECS: f32 = 1.0;
const LIGHT_GAIN: f32 = 0.02;
const DARK_LOSS: f32 = 0.01;

/// Mental health that recovers in light and drains in darkness.
#[derive(Debug, Clone)]
pub struct Sanity {
    in_spots: u32,
    mental_health: f32,
    mood: Mood,
    step: FearStep,
    timer: f32,
}

impl Default for Sanity {
    fn default() -> Self {
        Self {
            in_spots: 0,
            mental_health: 1.0,
            mood: Mood::Nice,
            step: FearStep::None,
            timer: 0.0,
        }
    }
}

impl Sanity {
    /// Full health, nice mood.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entered a light spot. Unlit spots do not count.
    pub fn enter_light(&mut self, intensity: f32) {
        if intensity > 0.0 {
            self.in_spots += 1;
        }
    }

    /// Left a light spot.
    pub fn exit_light(&mut self) {
        self.in_spots = self.in_spots.saturating_sub(1);
    }

    /// Lit spots the player stands in.
    #[must_use]
    pub fn spots(&self) -> u32 {
        self.in_spots
    }

    /// Current mental health, `[0, 1]` give or take a step.
    #[must_use]
    pub fn mental_health(&self) -> f32 {
        self.mental_health
    }

    /// Current mood.
    #[must_use]
    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Fear level as of the last tick.
    #[must_use]
    pub fn fear_step(&self) -> FearStep {
        self.step
    }

    /// Run [`tick`](Self::tick) once per elapsed second.
    pub fn update(&mut self, dt: f32) -> Vec<MoodTrigger> {
        let mut triggers = Vec::new();
        self.timer += dt;
        while self.timer >= TICK_SECS {
            self.timer -= TICK_SECS;
            triggers.extend(self.tick());
        }
        triggers
    }

    /// One mental-health step.
    pub fn tick(&mut self) -> Option<MoodTrigger> {
        let mood = if self.in_spots > 0 {
            if self.mental_health <= 0.98 {
                self.set_mental_health(self.mental_health + LIGHT_GAIN);
            }
            Mood::Nice
        } else {
            if self.mental_health > 0.0 {
                self.set_mental_health(self.mental_health - DARK_LOSS);
            }
            Mood::Fear
        };

        if mood == self.mood {
            return None;
        }
        self.mood = mood;
        info!(?mood, health = self.mental_health, "player mood changed");
        Some(match mood {
            Mood::Nice => MoodTrigger::Replay,
            Mood::Fear => MoodTrigger::Scared,
        })
    }

    fn set_mental_health(&mut self, value: f32) {
        self.mental_health = value;
        let step = FearStep::from_mental_health(value);
        if step != self.step {
            debug!(?step, "fear step changed");
        }
        self.step = step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_at_configured_speed() {
        let mut motor = PlayerMotor::new(PlayerConfig::default(), Vec3::zero());
        motor.move_axis(1.0, 0.0, 0.5);
        assert!((motor.position().x - 2.5).abs() < 1e-5);
        assert!((motor.speed_param() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn turns_toward_movement() {
        let mut motor = PlayerMotor::new(PlayerConfig::default(), Vec3::zero());
        for _ in 0..60 {
            motor.move_axis(1.0, 0.0, 0.016);
        }
        let forward = motor.facing() * Vec3::unit_z();
        assert!(forward.x > 0.99);
    }

    #[test]
    fn jump_only_when_grounded() {
        let mut motor = PlayerMotor::new(PlayerConfig::default(), Vec3::zero());
        assert!(motor.jump());
        assert!(!motor.jump());
        motor.update(0.1);
        assert!(motor.position().y > 0.0);
        for _ in 0..100 {
            motor.update(0.02);
        }
        assert!(motor.is_grounded());
        assert!(motor.position().y.abs() < f32::EPSILON);
        assert!(motor.jump());
    }

    #[test]
    fn fear_steps_follow_health() {
        assert_eq!(FearStep::from_mental_health(1.0), FearStep::Serene);
        assert_eq!(FearStep::from_mental_health(0.99), FearStep::Calm);
        assert_eq!(FearStep::from_mental_health(0.5), FearStep::Dread);
        assert_eq!(FearStep::from_mental_health(0.0), FearStep::Panic);
    }

    #[test]
    fn darkness_drains_and_scares_once() {
        let mut sanity = Sanity::new();
        assert_eq!(sanity.tick(), Some(MoodTrigger::Scared));
        assert_eq!(sanity.tick(), None);
        assert!((sanity.mental_health() - 0.98).abs() < 1e-5);
        assert_eq!(sanity.fear_step(), FearStep::Calm);
    }

    #[test]
    fn light_restores_and_replays() {
        let mut sanity = Sanity::new();
        for _ in 0..3 {
            sanity.tick();
        }
        sanity.enter_light(1.0);
        assert_eq!(sanity.tick(), Some(MoodTrigger::Replay));
        assert!((sanity.mental_health() - 0.99).abs() < 1e-5);
        // Above 0.98 no more gain.
        assert_eq!(sanity.tick(), None);
        assert!((sanity.mental_health() - 0.99).abs() < 1e-5);
    }

    #[test]
    fn unlit_spots_do_not_count() {
        let mut sanity = Sanity::new();
        sanity.enter_light(0.0);
        assert_eq!(sanity.spots(), 0);
        sanity.exit_light();
        assert_eq!(sanity.spots(), 0);
    }

    #[test]
    fn update_ticks_each_second() {
        let mut sanity = Sanity::new();
        let triggers = sanity.update(2.5);
        assert_eq!(triggers, vec![MoodTrigger::Scared]);
        assert!((sanity.mental_health() - 0.98).abs() < 1e-5);
    }

    #[test]
    fn health_stops_draining_at_zero() {
        let mut sanity = Sanity::new();
        for _ in 0..200 {
            sanity.tick();
        }
        assert!(sanity.mental_health() <= 0.0);
        assert!(sanity.mental_health() > -0.011);
    }
}
