//! # Lumen Core Library
//!
//! Device-agnostic logic for an interactive installation built around a
//! Novation Launchpad, an ESP32 button board and a small 3D scene.
//!
//! ```text
//!   pad presses ──► PadEvent ──► SimonGame ──► Script ──► ScriptPlayer ──► LedSurface
//!                                    │                                         ▲
//!                                    └──────── PixelArtDisplay ────────────────┘
//!
//!   mqtt payloads ──► MqttEvent ──► ButtonBoard ──► RandomLightSwitch
//!
//!   frame dt ──► LightSequencer · Flicker · CameraRig · PlayerMotor · Sanity
//!                MonsterAgent · DialogueStage
//! ```
//!
//! Nothing in this crate touches a device: LEDs go through the
//! [`led::LedSurface`] trait, randomness through [`picker::CellPicker`], and
//! every timed behaviour is advanced by an explicit frame delta.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod config;
pub mod dialogue;
pub mod digits;
pub mod error;
pub mod esp32;
pub mod grid;
pub mod led;
pub mod lights;
pub mod monster;
pub mod pad;
pub mod picker;
pub mod pixel_art;
pub mod player;
pub mod script;
pub mod simon;

pub use config::LumenConfig;
pub use error::{LumenError, Result};
pub use grid::{GridMap, GridPos};
pub use led::{LedCommand, LedSurface};
pub use pad::PadEvent;
pub use simon::{SimonGame, SimonState};
