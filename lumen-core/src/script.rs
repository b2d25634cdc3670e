//! Timed LED scripts.
//!
//! Animations (sequence playback, error flashes, victory fills) are plain
//! data: a [`Script`] is an ordered list of LED writes and waits. A
//! [`ScriptPlayer`] executes one script at a time against an
//! [`LedSurface`], driven by the elapsed time of each frame.
//!
//! ```text
//!  frame loop ──dt──► ScriptPlayer::advance ──► Led / Led / Wait(300ms) ─┐
//!                           ▲                                            │
//!                           └──────────── resumes next frame ◄───────────┘
//! ```
//!
//! Starting a new script replaces the running one, so a superseded
//! animation can never write to the grid again.

use std::time::Duration;

use crate::grid::{GridMap, GridPos};
use crate::led::{send_logged, LedCommand, LedSurface};

/// One instruction of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Write to the surface immediately.
    Led(LedCommand),
    /// Suspend for a duration.
    Wait(Duration),
}

/// An ordered list of LED writes and waits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append an LED command.
    #[must_use]
    pub fn led(self, command: LedCommand) -> Self {
        self.step(Step::Led(command))
    }

    /// Append many LED commands.
    #[must_use]
    pub fn leds(mut self, commands: impl IntoIterator<Item = LedCommand>) -> Self {
        self.steps.extend(commands.into_iter().map(Step::Led));
        self
    }

    /// Light a note.
    #[must_use]
    pub fn note(self, note: u8, color: u8) -> Self {
        self.led(LedCommand::Note { note, color })
    }

    /// Set a controller.
    #[must_use]
    pub fn control(self, cc: u8, value: u8) -> Self {
        self.led(LedCommand::Control { cc, value })
    }

    /// Light a pad; off-grid positions are skipped.
    #[must_use]
    pub fn pixel(self, grid: &GridMap, pos: GridPos, color: u8) -> Self {
        match grid.note_for(pos) {
            Some(note) => self.note(note, color),
            None => self,
        }
    }

    /// Paint all 64 pads.
    #[must_use]
    pub fn fill(self, grid: &GridMap, color: u8) -> Self {
        let commands: Vec<_> = grid
            .notes()
            .map(|note| LedCommand::Note { note, color })
            .collect();
        self.leds(commands)
    }

    /// Turn off all 64 pads.
    #[must_use]
    pub fn clear_grid(self, grid: &GridMap) -> Self {
        self.fill(grid, 0)
    }

    /// Suspend for `ms` milliseconds.
    #[must_use]
    pub fn wait_ms(self, ms: u64) -> Self {
        self.wait(Duration::from_millis(ms))
    }

    /// Suspend for a duration.
    #[must_use]
    pub fn wait(self, duration: Duration) -> Self {
        self.step(Step::Wait(duration))
    }

    /// Append another script.
    #[must_use]
    pub fn then(mut self, other: Script) -> Self {
        self.steps.extend(other.steps);
        self
    }

    /// The steps in order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Sum of all waits.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.steps
            .iter()
            .map(|s| match s {
                Step::Wait(d) => *d,
                Step::Led(_) => Duration::ZERO,
            })
            .sum()
    }

    /// Whether the script has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// What [`ScriptPlayer::advance`] did this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Nothing is playing.
    Idle,
    /// The script is suspended in a wait.
    Running,
    /// The script ran its last step during this call.
    Finished,
}

/// Executes one [`Script`] at a time, a frame at a time.
#[derive(Debug, Default)]
pub struct ScriptPlayer {
    current: Option<Script>,
    cursor: usize,
    // Time already spent inside the wait at `cursor`.
    waited: Duration,
}

impl ScriptPlayer {
    /// Create an idle player.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `script`, cancelling whatever was playing.
    pub fn play(&mut self, script: Script) {
        self.current = Some(script);
        self.cursor = 0;
        self.waited = Duration::ZERO;
    }

    /// Stop the running script without finishing it.
    pub fn cancel(&mut self) {
        self.current = None;
        self.cursor = 0;
        self.waited = Duration::ZERO;
    }

    /// Whether a script is loaded and not yet finished.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    /// Run the script for `dt` of elapsed time.
    ///
    /// LED steps execute immediately; a wait consumes time from `dt` and,
    /// if `dt` runs out first, suspends until the next call. Time left over
    /// after a wait completes flows into the following steps, so a long frame
    /// can cross several waits.
    pub fn advance(&mut self, dt: Duration, surface: &mut dyn LedSurface) -> PlayerStatus {
        let Some(script) = self.current.as_ref() else {
            return PlayerStatus::Idle;
        };

        let mut budget = dt;
        while let Some(step) = script.steps.get(self.cursor) {
            match *step {
                Step::Led(command) => {
                    send_logged(surface, command);
                    self.cursor += 1;
                }
                Step::Wait(length) => {
                    let remaining = length.saturating_sub(self.waited);
                    if budget >= remaining {
                        budget -= remaining;
                        self.waited = Duration::ZERO;
                        self.cursor += 1;
                    } else {
                        self.waited += budget;
                        return PlayerStatus::Running;
                    }
                }
            }
        }

        self.cancel();
        PlayerStatus::Finished
    }
}
