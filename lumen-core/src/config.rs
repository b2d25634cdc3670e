//! Configuration for Lumen.
//!
//! Maps directly to `lumen.toml`. Every section and field is optional; the
//! defaults are the values the installation was tuned with.
//!
//! ```toml
//! [general]
//! log_level = "debug"
//!
//! [simon]
//! cells_in_play = 6
//! max_levels = 0      # unbounded
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::camera::ViewMode;
use crate::grid::GridLayout;
use crate::lights::{EndMode, StartMode};
use crate::pixel_art::PixelArtImage;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LumenConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Launchpad device selection.
    #[serde(default)]
    pub launchpad: LaunchpadConfig,
    /// Simon memory game tuning.
    #[serde(default)]
    pub simon: SimonConfig,
    /// Pixel-art display.
    #[serde(default)]
    pub pixel_art: PixelArtConfig,
    /// MQTT broker connection.
    #[serde(default)]
    pub mqtt: MqttConfig,
    /// 3D dialogue text reveal.
    #[serde(default)]
    pub dialogue: DialogueConfig,
    /// Follow camera.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Light sequencing.
    #[serde(default)]
    pub lights: LightsConfig,
    /// Flickering spotlights.
    #[serde(default)]
    pub flicker: FlickerConfig,
    /// Player movement.
    #[serde(default)]
    pub player: PlayerConfig,
    /// Monster agent.
    #[serde(default)]
    pub monster: MonsterConfig,
}

impl LumenConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `LumenError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::LumenError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Render back to TOML (used by `lumen config --dump`).
    ///
    /// # Errors
    /// Returns `LumenError::Config` if serialization fails.
    pub fn to_toml(&self) -> crate::error::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::LumenError::Config(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error. `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Target frame rate of the driving loop.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl GeneralConfig {
    /// Duration of one frame at the configured rate.
    #[must_use]
    pub fn frame_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }
}

/// Launchpad device selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchpadConfig {
    /// Ports whose name contains this string are used.
    pub device_name_contains: String,
    /// Row orientation of the note layout.
    pub layout: GridLayout,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            device_name_contains: "Launchpad".to_string(),
            layout: GridLayout::TopDown,
        }
    }
}

/// Simon memory game tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimonConfig {
    /// How many distinct cells take part in a session (1..=16).
    pub cells_in_play: usize,
    /// How long each cell stays lit during playback.
    pub show_ms: u64,
    /// Dark gap between two cells during playback.
    pub gap_ms: u64,
    /// Levels to clear for victory; 0 means play until the first mistake.
    pub max_levels: u32,
    /// Show the score as digits after a mistake.
    pub show_score: bool,
}

impl Default for SimonConfig {
    fn default() -> Self {
        Self {
            cells_in_play: 4,
            show_ms: 500,
            gap_ms: 300,
            max_levels: 6,
            show_score: false,
        }
    }
}

impl SimonConfig {
    /// Playback on-time per cell.
    #[must_use]
    pub fn show_time(&self) -> Duration {
        Duration::from_millis(self.show_ms)
    }

    /// Playback off-time between cells.
    #[must_use]
    pub fn gap_time(&self) -> Duration {
        Duration::from_millis(self.gap_ms)
    }

    /// The victory level, `None` when unbounded.
    #[must_use]
    pub fn level_cap(&self) -> Option<u32> {
        (self.max_levels > 0).then_some(self.max_levels)
    }
}

/// Pixel-art display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelArtConfig {
    /// Image shown at startup.
    pub image: PixelArtImage,
}

/// MQTT broker connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker host name or address.
    pub broker_address: String,
    /// Broker TCP port.
    pub broker_port: u16,
    /// Optional user name.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
    /// Client id prefix; a unique suffix is appended at connect time.
    pub client_id: String,
    /// The single subscribed topic.
    pub topic: String,
    /// Fixed wait between reconnect attempts.
    pub reconnect_interval_secs: u64,
    /// Keep-alive sent to the broker.
    pub keep_alive_secs: u64,
    /// Log a status line periodically.
    pub verbose_logging: bool,
    /// Frames between two status lines.
    pub status_log_interval_frames: u64,
    /// Maximum undelivered events kept for the frame loop.
    pub queue_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_address: "192.168.1.100".to_string(),
            broker_port: 1883,
            username: None,
            password: None,
            client_id: "UnityClient".to_string(),
            topic: "ESP32-1".to_string(),
            reconnect_interval_secs: 5,
            keep_alive_secs: 60,
            verbose_logging: true,
            status_log_interval_frames: 300,
            queue_capacity: 256,
        }
    }
}

impl MqttConfig {
    /// Reconnect interval as a duration, never below one second.
    #[must_use]
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_secs.max(1))
    }
}

/// 3D dialogue text reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Horizontal advance per glyph.
    pub character_spacing: f32,
    /// Extra horizontal advance per space.
    pub word_spacing: f32,
    /// Vertical advance per line.
    pub line_spacing: f32,
    /// Base delay between glyphs, in seconds.
    pub reveal_speed: f32,
    /// Downward impulse given to glyphs when a dialogue is cleared.
    pub drop_force: f32,
    /// Seconds a dropped glyph lives before it is removed.
    pub character_lifetime: f32,
    /// Angular speed of the bob animation.
    pub animation_speed: f32,
    /// Seconds the full text stays up before the next one.
    pub hold_secs: f32,
    /// Texts played in order.
    pub texts: Vec<String>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            character_spacing: 0.5,
            word_spacing: 0.5,
            line_spacing: 1.0,
            reveal_speed: 0.1,
            drop_force: 2.0,
            character_lifetime: 2.0,
            animation_speed: 1.0,
            hold_secs: 2.0,
            texts: Vec::new(),
        }
    }
}

/// Follow camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Mode at startup.
    pub view_mode: ViewMode,
    /// Smoothing rate, per second.
    pub smooth_speed: f32,
    /// Offset from the target in side views.
    pub side_view_offset: [f32; 3],
    /// Height above the target in top-down view.
    pub top_view_height: f32,
    /// Downward pitch in top-down view, degrees.
    pub top_view_angle: f32,
    /// Distance behind the target in top-down view.
    pub top_view_distance: f32,
    /// Z the camera is locked to while following X.
    pub fixed_z: f32,
    /// X the camera is locked to while following Z.
    pub fixed_x: f32,
    /// Height above the target in side views.
    pub y_offset: f32,
    /// Follow the target vertically in side views.
    pub smooth_y_follow: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::FollowX,
            smooth_speed: 10.0,
            side_view_offset: [0.0, 5.0, -10.0],
            top_view_height: 15.0,
            top_view_angle: 70.0,
            top_view_distance: 5.0,
            fixed_z: 0.0,
            fixed_x: 0.0,
            y_offset: 5.0,
            smooth_y_follow: true,
        }
    }
}

/// One light of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightEntry {
    /// Display name for logs.
    pub name: String,
    /// Full intensity, recorded as the fade target.
    #[serde(alias = "initial_intensity")]
    pub intensity: f32,
    /// Seconds at full intensity.
    pub duration: f32,
    /// Seconds to fade to zero.
    pub fade_out_time: f32,
    /// Pause before the next light starts.
    pub delay_before_next: f32,
}

impl Default for LightEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            intensity: 1.0,
            duration: 5.0,
            fade_out_time: 1.5,
            delay_before_next: 0.0,
        }
    }
}

/// Light sequencing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    /// Lights in sequence order.
    pub lights: Vec<LightEntry>,
    /// How lights come on.
    pub start_mode: StartMode,
    /// How lights go off.
    pub end_mode: EndMode,
    /// Restart after the last light.
    pub loop_sequence: bool,
    /// Seconds before the first light.
    pub initial_delay: f32,
    /// Fade-in time when all lights start together.
    pub simultaneous_start_time: f32,
    /// Fade-out time when all lights end together.
    pub simultaneous_end_time: f32,
    /// Fade lights in rather than switching them on.
    pub use_progressive_start: bool,
    /// Fade-in time per light in sequential mode.
    pub progressive_start_time: f32,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            lights: Vec::new(),
            start_mode: StartMode::Sequential,
            end_mode: EndMode::Sequential,
            loop_sequence: false,
            initial_delay: 0.0,
            simultaneous_start_time: 1.0,
            simultaneous_end_time: 2.0,
            use_progressive_start: true,
            progressive_start_time: 0.5,
        }
    }
}

/// Flickering spotlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlickerConfig {
    /// Shortest on period, seconds.
    pub min_on_time: f32,
    /// Longest on period, seconds.
    pub max_on_time: f32,
    /// Shortest off period, seconds.
    pub min_off_time: f32,
    /// Longest off period, seconds.
    pub max_off_time: f32,
    /// Chance of a rapid burst after an off period.
    pub flicker_probability: f32,
    /// Toggles per burst, inclusive range.
    pub burst_toggles: (u32, u32),
    /// Seconds per burst toggle, range.
    pub burst_interval: (f32, f32),
    /// Edge size of the generated square cookie mask.
    pub cookie_resolution: usize,
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            min_on_time: 0.1,
            max_on_time: 2.0,
            min_off_time: 0.05,
            max_off_time: 0.5,
            flicker_probability: 0.3,
            burst_toggles: (2, 5),
            burst_interval: (0.01, 0.1),
            cookie_resolution: 256,
        }
    }
}

/// Player movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Units per second at full stick.
    pub move_speed: f32,
    /// Upward velocity given by a jump.
    pub jump_force: f32,
    /// Facing slerp rate, per second.
    pub turn_rate: f32,
    /// Downward acceleration while airborne.
    pub gravity: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 5.0,
            turn_rate: 10.0,
            gravity: 9.81,
        }
    }
}

/// Monster agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterConfig {
    /// Units per second.
    pub speed: f32,
    /// Distance at which a destination counts as reached.
    pub stopping_distance: f32,
    /// How far behind the player a following monster spawns.
    pub spawn_behind: f32,
}

impl Default for MonsterConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            stopping_distance: 0.5,
            spawn_behind: 3.0,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_frame_rate() -> u32 {
    60
}
