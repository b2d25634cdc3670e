//! Scene hooks.
//!
//! Trigger volumes and light zones are axis-aligned boxes in the scene.
//! When a tagged body enters one, the hook turns that into a
//! [`StageEvent`]; the stage never inspects volumes itself.

use lumen_core::camera::ViewMode;
use lumen_core::pixel_art::PixelArtImage;
use tracing::debug;
use vek::{Aabb, Vec3};

use crate::events::StageEvent;

/// Tag carried by the player body.
pub const PLAYER_TAG: &str = "Player";
/// Tag carried by the camera body.
pub const CAMERA_TAG: &str = "MainCamera";

/// Dialogue boxes appear this far along the followed axis.
const DIALOGUE_AHEAD: f32 = 3.0;
/// And this far above the player.
const DIALOGUE_ABOVE: f32 = 2.0;

/// What a trigger volume does when entered.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerKind {
    /// Switch the camera to a view mode.
    Camera(ViewMode),
    /// Show texts next to the player.
    Dialogue {
        /// Texts, played in order.
        texts: Vec<String>,
    },
    /// Call every monster to the entry point.
    FloorIsLava,
    /// Spawn a monster behind the player.
    MonsterFollow,
    /// Arm the Simon game.
    Simon,
    /// Draw an image on the Launchpad.
    PixelArt(PixelArtImage),
}

impl TriggerKind {
    /// Whether a volume of this kind disables itself after firing.
    #[must_use]
    pub fn is_one_shot(&self) -> bool {
        !matches!(self, Self::Camera(_) | Self::FloorIsLava)
    }

    /// Whether a body with `tag` sets this kind off.
    #[must_use]
    pub fn accepts(&self, tag: &str) -> bool {
        match self {
            Self::PixelArt(_) => tag == PLAYER_TAG || tag == CAMERA_TAG,
            _ => tag == PLAYER_TAG,
        }
    }
}

/// A box that fires a [`TriggerKind`] on entry.
#[derive(Debug, Clone)]
pub struct TriggerVolume {
    name: String,
    bounds: Aabb<f32>,
    kind: TriggerKind,
    once: bool,
    fired: bool,
    inside: bool,
}

impl TriggerVolume {
    /// A volume with the kind's default one-shot behaviour.
    #[must_use]
    pub fn new(name: impl Into<String>, bounds: Aabb<f32>, kind: TriggerKind) -> Self {
        let once = kind.is_one_shot();
        Self {
            name: name.into(),
            bounds,
            kind,
            once,
            fired: false,
            inside: false,
        }
    }

    /// Override whether the volume fires only once.
    #[must_use]
    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Name for logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The action.
    #[must_use]
    pub fn kind(&self) -> &TriggerKind {
        &self.kind
    }

    /// Whether `position` is inside the box.
    #[must_use]
    pub fn contains(&self, position: Vec3<f32>) -> bool {
        self.bounds.contains_point(position)
    }

    /// A one-shot volume that has already fired.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.once && self.fired
    }

    /// A body tagged `tag` entered at `position`.
    ///
    /// `view_mode` is the camera mode at the time, which decides where a
    /// dialogue box goes.
    pub fn on_enter(&mut self, tag: &str, position: Vec3<f32>, view_mode: ViewMode) -> Option<StageEvent> {
        if self.is_spent() || !self.kind.accepts(tag) {
            return None;
        }
        self.fired = true;
        debug!(trigger = %self.name, %tag, "trigger entered");

        let event = match &self.kind {
            TriggerKind::Camera(mode) => StageEvent::ViewMode(*mode),
            TriggerKind::Dialogue { texts } => StageEvent::DialogueRequested {
                position: dialogue_anchor(position, view_mode),
                texts: texts.clone(),
            },
            TriggerKind::FloorIsLava => StageEvent::MonsterListener(position),
            TriggerKind::MonsterFollow => StageEvent::SpawnMonster { position },
            TriggerKind::Simon => StageEvent::ArmSimon,
            TriggerKind::PixelArt(image) => StageEvent::ShowPixelArt(*image),
        };
        Some(event)
    }

    /// Feed the current position of a tagged body; fires on the frame it
    /// crosses into the box.
    pub fn track(&mut self, tag: &str, position: Vec3<f32>, view_mode: ViewMode) -> Option<StageEvent> {
        let inside = self.contains(position);
        let entered = inside && !self.inside;
        self.inside = inside;
        if entered {
            self.on_enter(tag, position, view_mode)
        } else {
            None
        }
    }
}

/// Where a dialogue box spawns relative to the player.
#[must_use]
pub fn dialogue_anchor(player: Vec3<f32>, view_mode: ViewMode) -> Vec3<f32> {
    let ahead = match view_mode {
        ViewMode::FollowX => Vec3::new(DIALOGUE_AHEAD, 0.0, 0.0),
        ViewMode::FollowZ => Vec3::new(0.0, 0.0, DIALOGUE_AHEAD),
        ViewMode::TopDown => Vec3::zero(),
    };
    player + ahead + Vec3::new(0.0, DIALOGUE_ABOVE, 0.0)
}

/// A lit area. Standing in it restores sanity.
#[derive(Debug, Clone)]
pub struct LightZone {
    bounds: Aabb<f32>,
    light: usize,
    inside: bool,
}

/// Crossing a light zone boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneCrossing {
    /// Moved into the zone.
    Entered,
    /// Moved out of it.
    Exited,
}

impl LightZone {
    /// A zone lit by sequencer light `light`.
    #[must_use]
    pub fn new(bounds: Aabb<f32>, light: usize) -> Self {
        Self {
            bounds,
            light,
            inside: false,
        }
    }

    /// Index of the light that illuminates the zone.
    #[must_use]
    pub fn light(&self) -> usize {
        self.light
    }

    /// Whether the player is currently counted as inside.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.inside
    }

    /// Feed the player position; reports boundary crossings.
    pub fn track(&mut self, position: Vec3<f32>) -> Option<ZoneCrossing> {
        let inside = self.bounds.contains_point(position);
        if inside == self.inside {
            return None;
        }
        self.inside = inside;
        Some(if inside { ZoneCrossing::Entered } else { ZoneCrossing::Exited })
    }
}

/// Jump input.
#[must_use]
pub fn on_jump() -> StageEvent {
    StageEvent::PlayerJump
}

/// Stick input. Values are clamped to `[-1, 1]`.
#[must_use]
pub fn on_move(h: f32, v: f32) -> StageEvent {
    StageEvent::PlayerMove {
        h: h.clamp(-1.0, 1.0),
        v: v.clamp(-1.0, 1.0),
    }
}
