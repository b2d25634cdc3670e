//! Scene lighting: timed sequences, flicker, cookie masks and the
//! button-driven random switch.

pub mod cookie;
pub mod flicker;
pub mod sequencer;
pub mod switch;

pub use cookie::{cookie_value, square_cookie};
pub use flicker::Flicker;
pub use sequencer::{EndMode, LightSequencer, StartMode};
pub use switch::RandomLightSwitch;
