//! # lumen-stage: Scene Wiring for Lumen
//!
//! Ties the game logic in `lumen-core` to the device transports in
//! `lumen-io` and drives them from one frame loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 lumen binary                  │
//! │  ┌────────────────────────────────────────┐  │
//! │  │              lumen-stage               │  │
//! │  │  ┌──────────┐ ┌─────────┐ ┌─────────┐  │  │
//! │  │  │  Hooks   │►│ Events  │►│  Stage  │  │  │
//! │  │  └──────────┘ └─────────┘ └────┬────┘  │  │
//! │  │                  Systems ──────┘       │  │
//! │  │         ┌──────────────┐ ┌──────────┐  │  │
//! │  │         │  lumen-core  │ │ lumen-io │  │  │
//! │  │         └──────────────┘ └──────────┘  │  │
//! │  └────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events`: scene events and their names
//! - `hooks`: trigger volumes and light zones that emit events
//! - `stage`: the coordinator that owns every controller
//! - `systems`: the per-frame update order
//! - `logging`: tracing subscriber setup for the binary

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod events;
pub mod hooks;
pub mod logging;
pub mod stage;
pub mod systems;

pub use events::StageEvent;
pub use hooks::{LightZone, TriggerKind, TriggerVolume};
pub use stage::Stage;
pub use systems::{run_frame, FrameReport};
