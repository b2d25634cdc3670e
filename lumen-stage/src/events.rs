//! Scene events.
//!
//! Hooks and input produce these; [`crate::stage::Stage::dispatch`] routes
//! them to the controller that handles them.

use lumen_core::camera::ViewMode;
use lumen_core::pixel_art::PixelArtImage;
use serde::Serialize;
use vek::Vec3;

/// Something that happened in the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StageEvent {
    /// Jump requested.
    PlayerJump,
    /// Stick input for this frame.
    PlayerMove {
        /// Horizontal axis, `[-1, 1]`.
        h: f32,
        /// Vertical axis, `[-1, 1]`.
        v: f32,
    },
    /// Once per second: re-evaluate the fear meter.
    PlayerFear,
    /// Monsters should head for this point.
    MonsterListener(Vec3<f32>),
    /// Camera mode change.
    ViewMode(ViewMode),
    /// Show texts at a position.
    DialogueRequested {
        /// World anchor of the first glyph.
        position: Vec3<f32>,
        /// Texts, played in order.
        texts: Vec<String>,
    },
    /// Spawn a monster that follows the player.
    SpawnMonster {
        /// Player position when the hook fired.
        position: Vec3<f32>,
    },
    /// Enable the Simon game.
    ArmSimon,
    /// Draw a pixel-art image.
    ShowPixelArt(PixelArtImage),
}

impl StageEvent {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayerJump => "player_jump",
            Self::PlayerMove { .. } => "player_move",
            Self::PlayerFear => "player_fear",
            Self::MonsterListener(_) => "monster_listener",
            Self::ViewMode(_) => "view_mode",
            Self::DialogueRequested { .. } => "dialogue_requested",
            Self::SpawnMonster { .. } => "spawn_monster",
            Self::ArmSimon => "arm_simon",
            Self::ShowPixelArt(_) => "show_pixel_art",
        }
    }

    /// Whether the event is emitted every frame and too noisy to log.
    #[must_use]
    pub fn is_per_frame(&self) -> bool {
        matches!(self, Self::PlayerMove { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_tag() {
        let json = serde_json::to_string(&StageEvent::ArmSimon).expect("serializes");
        assert_eq!(json, r#"{"event":"arm_simon"}"#);
        let json = serde_json::to_value(StageEvent::PlayerMove { h: 1.0, v: 0.0 }).expect("serializes");
        assert_eq!(json["event"], "player_move");
        assert_eq!(json["h"], 1.0);
    }

    #[test]
    fn names_match_tags() {
        let events = [
            StageEvent::PlayerFear,
            StageEvent::ViewMode(ViewMode::TopDown),
            StageEvent::ShowPixelArt(PixelArtImage::Ghost),
        ];
        for event in events {
            let json = serde_json::to_value(&event).expect("serializes");
            assert_eq!(json["event"], event.name());
        }
    }
}
