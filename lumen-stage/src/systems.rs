//! Frame systems.
//!
//! One call to [`run_frame`] is one tick of the installation. The order is
//! fixed:
//!
//! | Step            | Work                                         |
//! |-----------------|----------------------------------------------|
//! | Device input    | drain pad and broker queues                  |
//! | Actors          | player, camera, monsters, fear timer         |
//! | Hooks           | trigger volumes, light zones                 |
//! | Events          | dispatch everything queued this frame        |
//! | Effects         | lights, dialogues, Simon, LED output         |

use std::time::Duration;

use lumen_core::led::LedSurface;
use lumen_core::picker::CellPicker;

use crate::stage::Stage;

/// Summary of one tick, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Frame number after the tick.
    pub frame: u64,
    /// Pad events that were waiting.
    pub pad_events: usize,
    /// Broker events that were waiting.
    pub mqtt_events: usize,
}

/// Run one frame of `dt`.
pub fn run_frame<P: CellPicker>(stage: &mut Stage<P>, dt: Duration, surface: &mut dyn LedSurface) -> FrameReport {
    let pad_events = stage.pad_queue().len();
    let mqtt_events = stage.mqtt_queue().len();
    stage.drain_pads();
    stage.drain_mqtt();

    let secs = dt.as_secs_f32();
    stage.update_actors(secs);
    stage.check_triggers();
    stage.check_light_zones();
    stage.drain_events(surface);
    stage.update_effects(dt, surface);

    FrameReport {
        frame: stage.end_frame(),
        pad_events,
        mqtt_events,
    }
}

/// Run `frames` ticks of `dt` back to back.
pub fn run_frames<P: CellPicker>(stage: &mut Stage<P>, frames: u64, dt: Duration, surface: &mut dyn LedSurface) {
    for _ in 0..frames {
        run_frame(stage, dt, surface);
    }
}
