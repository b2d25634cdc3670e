//! Decoded Launchpad input.

use crate::grid::{GridMap, SideButton};

/// A button event from the device, already decoded from MIDI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadEvent {
    /// Note-on with non-zero velocity.
    Pressed {
        /// Note number.
        note: u8,
        /// Press velocity.
        velocity: u8,
    },
    /// Note-off, or note-on with velocity 0.
    Released {
        /// Note number.
        note: u8,
    },
    /// Control-Change (top-row buttons).
    Control {
        /// Controller number.
        cc: u8,
        /// Controller value; 0 on release.
        value: u8,
    },
}

impl PadEvent {
    /// Build from a note-on. Velocity 0 means release.
    #[must_use]
    pub fn from_note_on(note: u8, velocity: u8) -> Self {
        if velocity == 0 {
            Self::Released { note }
        } else {
            Self::Pressed { note, velocity }
        }
    }

    /// The note of a pad event, if it has one.
    #[must_use]
    pub fn note(&self) -> Option<u8> {
        match *self {
            Self::Pressed { note, .. } | Self::Released { note } => Some(note),
            Self::Control { .. } => None,
        }
    }
}

/// Human-readable name of what a note or controller addresses.
#[must_use]
pub fn describe(grid: &GridMap, event: &PadEvent) -> String {
    match *event {
        PadEvent::Control { cc, .. } => match SideButton::from_control(cc) {
            Some(SideButton::Top(b)) => format!("top button {b:?}"),
            _ => format!("controller {cc}"),
        },
        PadEvent::Pressed { note, .. } | PadEvent::Released { note } => {
            if let Some(pos) = grid.pos_for(note) {
                format!("pad {pos}")
            } else if let Some(SideButton::Right(b)) = SideButton::from_note(note) {
                format!("side button {b:?}")
            } else {
                format!("note {note}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_velocity_is_release() {
        assert_eq!(PadEvent::from_note_on(11, 0), PadEvent::Released { note: 11 });
        assert_eq!(
            PadEvent::from_note_on(11, 127),
            PadEvent::Pressed {
                note: 11,
                velocity: 127
            }
        );
    }

    #[test]
    fn describes_pads_and_buttons() {
        let grid = GridMap::default();
        assert_eq!(
            describe(&grid, &PadEvent::from_note_on(81, 1)),
            "pad (0, 0)"
        );
        assert_eq!(
            describe(&grid, &PadEvent::from_note_on(89, 1)),
            "side button Volume"
        );
        assert_eq!(
            describe(&grid, &PadEvent::Control { cc: 111, value: 127 }),
            "top button Mixer"
        );
        assert_eq!(describe(&grid, &PadEvent::from_note_on(5, 1)), "note 5");
    }
}
