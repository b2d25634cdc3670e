//! LED output surface.
//!
//! Everything that lights a pad goes through [`LedSurface`]. The MIDI
//! adapter in `lumen-io` implements it for a real Launchpad;
//! [`RecordingSurface`] implements it in memory for tests and dry runs.
//!
//! Surfaces are written from the frame loop only. A failed send is logged
//! and skipped by the helpers here; it never aborts a frame.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::Result;
use crate::grid::{GridMap, GridPos, RIGHT_BUTTONS, TOP_BUTTONS};

/// Launchpad palette indices used by the games.
pub mod palette {
    /// LED off.
    pub const OFF: u8 = 0;
    /// Bright white.
    pub const WHITE: u8 = 3;
    /// Alert red.
    pub const RED: u8 = 5;
    /// Pad green.
    pub const GREEN: u8 = 21;
    /// Progress: step completed.
    pub const PROGRESS_DONE: u8 = 87;
    /// Progress: step pending.
    pub const PROGRESS_PENDING: u8 = 96;
}

/// A single LED write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedCommand {
    /// Note-on on channel 0; velocity is the palette color.
    Note {
        /// Note number.
        note: u8,
        /// Palette color, `0` is off.
        color: u8,
    },
    /// Control-Change on channel 0 (top-row buttons).
    Control {
        /// Controller number.
        cc: u8,
        /// Palette color, `0` is off.
        value: u8,
    },
}

impl LedCommand {
    /// Raw three-byte MIDI message for this command.
    #[must_use]
    pub fn to_midi(self) -> [u8; 3] {
        match self {
            Self::Note { note, color } => [0x90, note & 0x7F, color & 0x7F],
            Self::Control { cc, value } => [0xB0, cc & 0x7F, value & 0x7F],
        }
    }
}

/// Anything that can display LED colors.
pub trait LedSurface {
    /// Send one command.
    ///
    /// # Errors
    /// Returns `LumenError::Device` if the device rejected the write.
    fn send(&mut self, command: LedCommand) -> Result<()>;
}

/// Send a command, logging instead of propagating failures.
pub fn send_logged(surface: &mut dyn LedSurface, command: LedCommand) {
    if let Err(e) = surface.send(command) {
        warn!(?command, error = %e, "LED write failed");
    }
}

// ---------------------------------------------------------------------------
// Painting helpers
// ---------------------------------------------------------------------------

/// Light one pad. Off-grid positions are skipped.
pub fn set_pixel(surface: &mut dyn LedSurface, grid: &GridMap, pos: GridPos, color: u8) {
    if let Some(note) = grid.note_for(pos) {
        send_logged(surface, LedCommand::Note { note, color });
    }
}

/// Paint all 64 pads with one color.
pub fn fill_grid(surface: &mut dyn LedSurface, grid: &GridMap, color: u8) {
    for note in grid.notes() {
        send_logged(surface, LedCommand::Note { note, color });
    }
}

/// Turn off the 64 pads, leaving the side buttons alone.
pub fn clear_grid(surface: &mut dyn LedSurface, grid: &GridMap) {
    fill_grid(surface, grid, palette::OFF);
}

/// Commands that turn off every side button.
pub fn side_buttons_off() -> impl Iterator<Item = LedCommand> {
    TOP_BUTTONS
        .into_iter()
        .map(|cc| LedCommand::Control {
            cc,
            value: palette::OFF,
        })
        .chain(RIGHT_BUTTONS.into_iter().map(|note| LedCommand::Note {
            note,
            color: palette::OFF,
        }))
}

/// Commands for an aggressive "everything off".
///
/// Covers every note and controller of the 7-bit range plus the legacy
/// `16 * y + x` layout used by older Launchpad models, so stale colors are
/// cleared whatever mode the device booted in.
pub fn reset_all_commands() -> Vec<LedCommand> {
    let mut commands = Vec::with_capacity(128 * 2 + 81);
    commands.extend((0..128u8).map(|note| LedCommand::Note {
        note,
        color: palette::OFF,
    }));
    commands.extend((0..128u8).map(|cc| LedCommand::Control {
        cc,
        value: palette::OFF,
    }));
    for y in 0..9u8 {
        for x in 0..9u8 {
            commands.push(LedCommand::Note {
                note: 16 * y + x,
                color: palette::OFF,
            });
        }
    }
    commands
}

/// Reset every LED on the device.
pub fn reset_all(surface: &mut dyn LedSurface) {
    for command in reset_all_commands() {
        send_logged(surface, command);
    }
}

// ---------------------------------------------------------------------------
// In-memory surface
// ---------------------------------------------------------------------------

/// A surface that remembers what was sent.
///
/// Keeps the last color per note and per controller plus the complete
/// command log. Used by tests and by the CLI's `--dry-run` mode.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    notes: BTreeMap<u8, u8>,
    controls: BTreeMap<u8, u8>,
    log: Vec<LedCommand>,
    fail_sends: bool,
}

impl RecordingSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose every send fails, as an unplugged device would.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    /// Current color of a note (0 when never lit).
    #[must_use]
    pub fn note_color(&self, note: u8) -> u8 {
        self.notes.get(&note).copied().unwrap_or(palette::OFF)
    }

    /// Current value of a controller (0 when never set).
    #[must_use]
    pub fn control_value(&self, cc: u8) -> u8 {
        self.controls.get(&cc).copied().unwrap_or(palette::OFF)
    }

    /// Current color of a pad.
    #[must_use]
    pub fn pixel(&self, grid: &GridMap, pos: GridPos) -> u8 {
        grid.note_for(pos).map_or(palette::OFF, |n| self.note_color(n))
    }

    /// Notes currently lit with a non-zero color.
    #[must_use]
    pub fn lit_notes(&self) -> Vec<u8> {
        self.notes
            .iter()
            .filter(|&(_, &c)| c != palette::OFF)
            .map(|(&n, _)| n)
            .collect()
    }

    /// Every command received, oldest first.
    #[must_use]
    pub fn log(&self) -> &[LedCommand] {
        &self.log
    }

    /// Forget the command log, keeping the current colors.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl LedSurface for RecordingSurface {
    fn send(&mut self, command: LedCommand) -> Result<()> {
        if self.fail_sends {
            return Err(crate::LumenError::Device("surface disconnected".into()));
        }
        match command {
            LedCommand::Note { note, color } => {
                self.notes.insert(note, color);
            }
            LedCommand::Control { cc, value } => {
                self.controls.insert(cc, value);
            }
        }
        self.log.push(command);
        Ok(())
    }
}
