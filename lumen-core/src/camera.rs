//! Follow camera with axis lock and a top-down mode.

use serde::{Deserialize, Serialize};
use tracing::info;
use vek::{Quaternion, Vec3};

use crate::config::CameraConfig;

/// How the camera tracks its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Side view tracking X; Z is locked.
    #[default]
    FollowX,
    /// Side view tracking Z; X is locked.
    FollowZ,
    /// Above and behind the target, pitched down.
    TopDown,
}

impl ViewMode {
    /// The mode after this one, wrapping.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::FollowX => Self::FollowZ,
            Self::FollowZ => Self::TopDown,
            Self::TopDown => Self::FollowX,
        }
    }
}

/// Smoothed follow camera.
#[derive(Debug, Clone)]
pub struct CameraRig {
    config: CameraConfig,
    mode: ViewMode,
    position: Vec3<f32>,
    rotation: Quaternion<f32>,
}

impl CameraRig {
    /// A rig at the origin in the configured mode.
    #[must_use]
    pub fn new(config: CameraConfig) -> Self {
        let mode = config.view_mode;
        Self {
            config,
            mode,
            position: Vec3::zero(),
            rotation: Quaternion::identity(),
        }
    }

    /// Current mode.
    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch to the next mode.
    pub fn cycle_view_mode(&mut self) {
        self.mode = self.mode.next();
        info!(mode = ?self.mode, "camera view mode changed");
    }

    /// Switch to `mode`.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        info!(mode = ?self.mode, "camera view mode set");
    }

    /// Jump straight to the desired pose for `target`.
    pub fn snap_to(&mut self, target: Vec3<f32>) {
        self.position = self.desired_position(target);
        self.rotation = self.desired_rotation(target);
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Vec3<f32> {
        self.position
    }

    /// World rotation.
    #[must_use]
    pub fn rotation(&self) -> Quaternion<f32> {
        self.rotation
    }

    /// Viewing direction.
    #[must_use]
    pub fn forward(&self) -> Vec3<f32> {
        self.rotation * Vec3::unit_z()
    }

    /// Where the camera wants to be for `target` in the current mode.
    #[must_use]
    pub fn desired_position(&self, target: Vec3<f32>) -> Vec3<f32> {
        let c = &self.config;
        let [ox, oy, oz] = c.side_view_offset;
        let y = if c.smooth_y_follow {
            target.y + c.y_offset
        } else {
            target.y + oy
        };
        match self.mode {
            ViewMode::FollowX => Vec3::new(target.x + ox, y, c.fixed_z + oz),
            ViewMode::FollowZ => Vec3::new(c.fixed_x + ox, y, target.z + oz),
            ViewMode::TopDown => {
                let back = c.top_view_distance * (90.0 - c.top_view_angle).to_radians().cos();
                Vec3::new(target.x, target.y + c.top_view_height, target.z - back)
            }
        }
    }

    /// Advance one frame toward `target`.
    pub fn update(&mut self, target: Vec3<f32>, dt: f32) {
        let t = (self.config.smooth_speed * dt).clamp(0.0, 1.0);
        let desired = self.desired_position(target);
        self.position += (desired - self.position) * t;

        match self.mode {
            ViewMode::TopDown => {
                let goal = self.desired_rotation(target);
                self.rotation = Quaternion::slerp(self.rotation, goal, t);
            }
            ViewMode::FollowX | ViewMode::FollowZ => {
                self.rotation = self.desired_rotation(target);
            }
        }
    }

    fn desired_rotation(&self, target: Vec3<f32>) -> Quaternion<f32> {
        match self.mode {
            ViewMode::TopDown => Quaternion::rotation_x(self.config.top_view_angle.to_radians()),
            ViewMode::FollowX | ViewMode::FollowZ => look_at(self.position, target),
        }
    }
}

/// Rotation whose forward axis points from `eye` to `target`.
fn look_at(eye: Vec3<f32>, target: Vec3<f32>) -> Quaternion<f32> {
    let dir = target - eye;
    if dir.magnitude_squared() <= f32::EPSILON {
        return Quaternion::identity();
    }
    let dir = dir.normalized();
    let yaw = dir.x.atan2(dir.z);
    let pitch = (-dir.y).clamp(-1.0, 1.0).asin();
    Quaternion::rotation_y(yaw) * Quaternion::rotation_x(pitch)
}
