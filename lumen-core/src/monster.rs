//! Monster agent walking straight at a destination or a followed target.

use tracing::{debug, info};
use vek::Vec3;

use crate::config::MonsterConfig;

/// Animation events raised by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterEvent {
    /// A new destination was set.
    StartedMoving,
    /// Came within stopping distance of the destination.
    ReachedDestination,
}

/// Destination-seeking agent.
#[derive(Debug, Clone)]
pub struct MonsterAgent {
    position: Vec3<f32>,
    velocity: Vec3<f32>,
    speed: f32,
    stopping_distance: f32,
    destination: Option<Vec3<f32>>,
    following: bool,
    reached: bool,
    outbox: Vec<MonsterEvent>,
}

impl MonsterAgent {
    /// An idle agent at `position`.
    #[must_use]
    pub fn new(config: &MonsterConfig, position: Vec3<f32>) -> Self {
        Self {
            position,
            velocity: Vec3::zero(),
            speed: config.speed,
            stopping_distance: config.stopping_distance,
            destination: None,
            following: false,
            reached: false,
            outbox: Vec::new(),
        }
    }

    /// Spawn behind `player` (toward -Z) and start following.
    #[must_use]
    pub fn spawn_following(config: &MonsterConfig, player: Vec3<f32>) -> Self {
        let mut agent = Self::new(config, player - Vec3::new(0.0, 0.0, config.spawn_behind));
        agent.follow(true);
        info!(position = ?agent.position, "monster spawned behind player");
        agent
    }

    /// Head for `point`; clears the reached flag.
    pub fn set_destination(&mut self, point: Vec3<f32>) {
        self.destination = Some(point);
        self.reached = false;
        self.outbox.push(MonsterEvent::StartedMoving);
        debug!(?point, "monster destination set");
    }

    /// Track the target passed to [`update`](Self::update).
    pub fn follow(&mut self, enabled: bool) {
        self.following = enabled;
    }

    /// Whether the agent follows its target.
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.following
    }

    /// Advance one frame. `target` is used while following.
    pub fn update(&mut self, dt: f32, target: Vec3<f32>) {
        if self.following {
            let restart = match self.destination {
                None => true,
                Some(_) => self.reached && self.position.distance(target) > self.stopping_distance,
            };
            if restart {
                self.set_destination(target);
            } else {
                self.destination = Some(target);
            }
        }

        let Some(destination) = self.destination else {
            self.velocity = Vec3::zero();
            return;
        };

        let to_go = destination - self.position;
        let remaining = to_go.magnitude();
        if remaining <= self.stopping_distance {
            self.velocity = Vec3::zero();
            if !self.reached {
                self.reached = true;
                self.outbox.push(MonsterEvent::ReachedDestination);
                info!("monster reached its destination");
            }
            return;
        }

        let step = (self.speed * dt).min(remaining - self.stopping_distance);
        self.velocity = to_go / remaining * self.speed;
        self.position += to_go / remaining * step;
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec3<f32> {
        self.position
    }

    /// Whether the current destination has been reached.
    #[must_use]
    pub fn has_reached(&self) -> bool {
        self.reached
    }

    /// Speed for the walk animation.
    #[must_use]
    pub fn speed_param(&self) -> f32 {
        self.velocity.magnitude()
    }

    /// Take the events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<MonsterEvent> {
        std::mem::take(&mut self.outbox)
    }
}
