//! Simon memory game on the Launchpad matrix.
//!
//! ## State machine
//!
//! ```text
//!            arm()                 start cell
//!   Idle ───────────► AwaitingStart ─────────► ShowingSequence ◄──┐
//!    ▲                    ▲                         │ playback    │ full match
//!    │                    │ animation               ▼ done        │
//!    │                  Error ◄──── mismatch ── AwaitingPlayerInput
//!    │                                              │ full match at the cap
//!    └──────────── animation ─── Victory ◄──────────┘
//! ```
//!
//! A session picks `cells_in_play` cells from the 16 central pads, gives
//! each its own color, and then grows a sequence by one random cell per level.
//! Every animation is a [`Script`]; the state only moves on when its script
//! finishes, and starting a new script cancels the previous one.
//!
//! All randomness comes from the [`CellPicker`] passed at construction.

use tracing::{debug, info, warn};

use crate::config::SimonConfig;
use crate::digits::draw_number;
use crate::grid::{GridMap, GridPos, RIGHT_BUTTONS, TOP_BUTTONS};
use crate::led::{palette, reset_all_commands, send_logged, side_buttons_off, LedCommand, LedSurface};
use crate::pad::PadEvent;
use crate::picker::{shuffle, CellPicker};
use crate::script::{PlayerStatus, Script, ScriptPlayer};

/// The four central pads that start a session.
pub const START_CELLS: [GridPos; 4] = [
    GridPos::new(3, 3),
    GridPos::new(4, 3),
    GridPos::new(3, 4),
    GridPos::new(4, 4),
];

/// Corner pads flashed to cue the player after playback.
pub const CUE_CELLS: [GridPos; 4] = [
    GridPos::new(0, 0),
    GridPos::new(7, 0),
    GridPos::new(0, 7),
    GridPos::new(7, 7),
];

/// Colors handed out to the cells in play.
pub const CELL_COLORS: [u8; 8] = [5, 21, 52, 13, 95, 9, 73, 46];

/// Number of progress indicators around the matrix.
pub const MAX_INDICATORS: usize = TOP_BUTTONS.len() + RIGHT_BUTTONS.len();

const MENU_DELAY_MS: u64 = 300;
const LEVEL_PREROLL_MS: u64 = 500;
const PLAYBACK_PREROLL_MS: u64 = 300;
const CUE_FLASHES: usize = 3;
const CUE_MS: u64 = 80;
const ERROR_FLASHES: usize = 3;
const ERROR_FLASH_MS: u64 = 200;
const SCORE_HOLD_MS: u64 = 1000;
const ERROR_TAIL_MS: u64 = 500;
const VICTORY_FILL_STEP_MS: u64 = 10;
const VICTORY_HOLD_MS: u64 = 3000;
const VICTORY_BLINKS: usize = 5;
const VICTORY_BLINK_MS: u64 = 200;
const VICTORY_TAIL_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimonState {
    /// Not armed, or finished.
    Idle,
    /// Start cells lit, waiting for one to be pressed.
    AwaitingStart,
    /// Playing back the sequence; input ignored.
    ShowingSequence,
    /// Comparing presses against the sequence.
    AwaitingPlayerInput,
    /// Mistake animation; returns to `AwaitingStart`.
    Error,
    /// Celebration; returns to `Idle` and disarms.
    Victory,
}

/// A cell taking part in the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveCell {
    /// Grid position.
    pub pos: GridPos,
    /// Note number of the pad.
    pub note: u8,
    /// Color shown when the cell is played.
    pub color: u8,
}

/// What a press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// No effect in the current state.
    Ignored,
    /// A new session began.
    Started,
    /// Matched the sequence; `position` presses matched so far.
    Correct {
        /// Matched presses this level.
        position: usize,
    },
    /// Reproduced the whole sequence of `level`.
    LevelComplete {
        /// Level just cleared.
        level: u32,
    },
    /// Cleared the last level.
    Victory,
    /// Wrong cell; the session is over.
    Mismatch {
        /// Levels fully cleared.
        score: u32,
    },
}

/// Notifications for whoever drives the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimonEvent {
    /// The state changed.
    Transition {
        /// Previous state.
        from: SimonState,
        /// New state.
        to: SimonState,
    },
    /// A session ended with this many levels cleared.
    Score(u32),
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// The Simon engine. Owns no device; drive it with [`update`](Self::update).
#[derive(Debug)]
pub struct SimonGame<P: CellPicker> {
    config: SimonConfig,
    grid: GridMap,
    picker: P,
    player: ScriptPlayer,
    state: SimonState,
    armed: bool,
    level: u32,
    position: usize,
    sequence: Vec<u8>,
    active: Vec<ActiveCell>,
    last_score: Option<u32>,
    // Immediate pad feedback, flushed before the script on the next update.
    outbox: Vec<LedCommand>,
    events: Vec<SimonEvent>,
}

impl<P: CellPicker> SimonGame<P> {
    /// Create an idle, disarmed game.
    #[must_use]
    pub fn new(mut config: SimonConfig, grid: GridMap, picker: P) -> Self {
        // Each cell in play needs its own color.
        let limit = candidate_pool().len().min(CELL_COLORS.len());
        if config.cells_in_play == 0 || config.cells_in_play > limit {
            warn!(
                cells_in_play = config.cells_in_play,
                limit, "cells_in_play out of range, clamping"
            );
            config.cells_in_play = config.cells_in_play.clamp(1, limit);
        }
        Self {
            config,
            grid,
            picker,
            player: ScriptPlayer::new(),
            state: SimonState::Idle,
            armed: false,
            level: 0,
            position: 0,
            sequence: Vec::new(),
            active: Vec::new(),
            last_score: None,
            outbox: Vec::new(),
            events: Vec::new(),
        }
    }

    // -- accessors ---------------------------------------------------------

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SimonState {
        self.state
    }

    /// Current level; 0 before the first level of a session.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// The notes to reproduce, oldest first.
    #[must_use]
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    /// Presses matched so far in this level.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Cells in play this session.
    #[must_use]
    pub fn active_cells(&self) -> &[ActiveCell] {
        &self.active
    }

    /// Color of an active cell.
    #[must_use]
    pub fn color_of(&self, note: u8) -> Option<u8> {
        self.active.iter().find(|c| c.note == note).map(|c| c.color)
    }

    /// Score of the last finished session.
    #[must_use]
    pub fn last_score(&self) -> Option<u32> {
        self.last_score
    }

    /// Whether input is enabled.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether a script is still animating.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.player.is_playing()
    }

    /// The note layout in use.
    #[must_use]
    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    /// The game's configuration after clamping.
    #[must_use]
    pub fn config(&self) -> &SimonConfig {
        &self.config
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<SimonEvent> {
        std::mem::take(&mut self.events)
    }

    // -- control -----------------------------------------------------------

    /// Enable input and show the start menu.
    pub fn arm(&mut self) {
        info!("simon armed");
        self.armed = true;
        self.show_menu();
    }

    /// Disable input and turn every LED off.
    pub fn disarm(&mut self) {
        info!("simon disarmed");
        self.armed = false;
        self.reset_session();
        self.outbox.clear();
        self.player.play(Script::new().leds(reset_all_commands()));
        self.transition(SimonState::Idle);
    }

    /// Feed a decoded pad event.
    pub fn handle_pad(&mut self, event: PadEvent) -> PressOutcome {
        match event {
            PadEvent::Pressed { note, .. } => self.press(note),
            PadEvent::Released { note } => {
                self.release(note);
                PressOutcome::Ignored
            }
            PadEvent::Control { .. } => PressOutcome::Ignored,
        }
    }

    /// Raw note-on; velocity 0 counts as a release.
    pub fn note_on(&mut self, note: u8, velocity: u8) -> PressOutcome {
        self.handle_pad(PadEvent::from_note_on(note, velocity))
    }

    /// Raw note-off.
    pub fn note_off(&mut self, note: u8) {
        self.release(note);
    }

    /// A pad was pressed.
    pub fn press(&mut self, note: u8) -> PressOutcome {
        if !self.armed {
            return PressOutcome::Ignored;
        }
        match self.state {
            SimonState::AwaitingStart => {
                let is_start = START_CELLS
                    .iter()
                    .any(|&pos| self.grid.note_for(pos) == Some(note));
                if is_start {
                    self.start_session();
                    PressOutcome::Started
                } else {
                    PressOutcome::Ignored
                }
            }
            SimonState::AwaitingPlayerInput => self.check_press(note),
            SimonState::Idle
            | SimonState::ShowingSequence
            | SimonState::Error
            | SimonState::Victory => PressOutcome::Ignored,
        }
    }

    /// A pad was released; active cells go dark again.
    pub fn release(&mut self, note: u8) {
        let in_session = matches!(
            self.state,
            SimonState::AwaitingPlayerInput | SimonState::ShowingSequence
        );
        if in_session && self.color_of(note).is_some() {
            self.outbox.push(LedCommand::Note {
                note,
                color: palette::OFF,
            });
        }
    }

    /// Advance animations by `dt` and flush pending LED writes.
    pub fn update(&mut self, dt: std::time::Duration, surface: &mut dyn LedSurface) {
        for command in self.outbox.drain(..) {
            send_logged(surface, command);
        }
        if self.player.advance(dt, surface) == PlayerStatus::Finished {
            self.on_script_finished();
        }
    }

    // -- internals ---------------------------------------------------------

    fn transition(&mut self, to: SimonState) {
        let from = self.state;
        if from == to {
            return;
        }
        debug!(?from, ?to, level = self.level, "simon transition");
        self.state = to;
        self.events.push(SimonEvent::Transition { from, to });
    }

    fn reset_session(&mut self) {
        self.level = 0;
        self.position = 0;
        self.sequence.clear();
        self.active.clear();
    }

    fn show_menu(&mut self) {
        self.reset_session();
        let mut script = Script::new()
            .leds(side_buttons_off())
            .clear_grid(&self.grid)
            .wait_ms(MENU_DELAY_MS);
        for pos in START_CELLS {
            script = script.pixel(&self.grid, pos, palette::GREEN);
        }
        self.player.play(script);
        self.transition(SimonState::AwaitingStart);
    }

    fn start_session(&mut self) {
        self.reset_session();
        self.choose_cells();
        info!(
            cells = ?self.active.iter().map(|c| c.pos).collect::<Vec<_>>(),
            "simon session started"
        );
        self.next_level();
    }

    fn choose_cells(&mut self) {
        let mut pool = candidate_pool();
        shuffle(&mut self.picker, &mut pool);
        let mut colors = CELL_COLORS;
        shuffle(&mut self.picker, &mut colors);

        self.active = pool
            .into_iter()
            .take(self.config.cells_in_play)
            .zip(colors)
            .filter_map(|(pos, color)| {
                let note = self.grid.note_for(pos)?;
                Some(ActiveCell {
                    pos,
                    note,
                    color,
                })
            })
            .collect();
    }

    /// Move to the next level; returns `true` when that meant victory.
    fn next_level(&mut self) -> bool {
        self.level += 1;
        if self.config.level_cap().is_some_and(|cap| self.level > cap) {
            self.enter_victory();
            return true;
        }

        let pick = self.picker.index(self.active.len());
        if let Some(cell) = self.active.get(pick) {
            self.sequence.push(cell.note);
        }
        self.position = 0;
        debug!(level = self.level, sequence = ?self.sequence, "simon level");

        let script = self.progress_script().then(self.playback_script());
        self.player.play(script);
        self.transition(SimonState::ShowingSequence);
        false
    }

    fn check_press(&mut self, note: u8) -> PressOutcome {
        let Some(color) = self.color_of(note) else {
            return PressOutcome::Ignored;
        };
        self.outbox.push(LedCommand::Note { note, color });

        let expected = self.sequence.get(self.position).copied();
        if expected != Some(note) {
            let score = self.level.saturating_sub(1);
            info!(level = self.level, score, note, ?expected, "simon mismatch");
            self.last_score = Some(score);
            self.events.push(SimonEvent::Score(score));
            let script = self.error_script(score);
            self.player.play(script);
            self.transition(SimonState::Error);
            return PressOutcome::Mismatch { score };
        }

        self.position += 1;
        if self.position < self.sequence.len() {
            return PressOutcome::Correct {
                position: self.position,
            };
        }

        let cleared = self.level;
        if self.next_level() {
            PressOutcome::Victory
        } else {
            PressOutcome::LevelComplete { level: cleared }
        }
    }

    fn enter_victory(&mut self) {
        let score = self.level.saturating_sub(1);
        info!(score, "simon victory");
        self.last_score = Some(score);
        self.events.push(SimonEvent::Score(score));
        let script = self.victory_script();
        self.player.play(script);
        self.transition(SimonState::Victory);
    }

    fn on_script_finished(&mut self) {
        match self.state {
            SimonState::ShowingSequence => self.transition(SimonState::AwaitingPlayerInput),
            SimonState::Error => self.show_menu(),
            SimonState::Victory => {
                self.armed = false;
                self.reset_session();
                self.transition(SimonState::Idle);
            }
            SimonState::Idle | SimonState::AwaitingStart | SimonState::AwaitingPlayerInput => {}
        }
    }

    // -- scripts -----------------------------------------------------------

    fn indicator_total(&self) -> usize {
        let total = self.config.level_cap().unwrap_or(self.level);
        usize::try_from(total).unwrap_or(MAX_INDICATORS).min(MAX_INDICATORS)
    }

    fn progress_script(&self) -> Script {
        let done = usize::try_from(self.level.saturating_sub(1)).unwrap_or(usize::MAX);
        let commands = (0..self.indicator_total()).filter_map(|step| {
            let color = if step < done {
                palette::PROGRESS_DONE
            } else {
                palette::PROGRESS_PENDING
            };
            indicator_command(step, color)
        });
        Script::new().leds(commands.collect::<Vec<_>>())
    }

    fn playback_script(&self) -> Script {
        let mut script = Script::new()
            .wait_ms(LEVEL_PREROLL_MS)
            .clear_grid(&self.grid)
            .wait_ms(PLAYBACK_PREROLL_MS);

        for &note in &self.sequence {
            let color = self.color_of(note).unwrap_or(palette::WHITE);
            script = script
                .note(note, color)
                .wait(self.config.show_time())
                .note(note, palette::OFF)
                .wait(self.config.gap_time());
        }

        for _ in 0..CUE_FLASHES {
            for pos in CUE_CELLS {
                script = script.pixel(&self.grid, pos, palette::GREEN);
            }
            script = script.wait_ms(CUE_MS);
            for pos in CUE_CELLS {
                script = script.pixel(&self.grid, pos, palette::OFF);
            }
            script = script.wait_ms(CUE_MS);
        }
        script
    }

    fn error_script(&self, score: u32) -> Script {
        let mut script = Script::new();
        for _ in 0..ERROR_FLASHES {
            script = script
                .fill(&self.grid, palette::RED)
                .wait_ms(ERROR_FLASH_MS)
                .clear_grid(&self.grid)
                .wait_ms(ERROR_FLASH_MS);
        }
        if self.config.show_score {
            for (pos, color) in draw_number(score, palette::RED) {
                script = script.pixel(&self.grid, pos, color);
            }
            script = script.wait_ms(SCORE_HOLD_MS).clear_grid(&self.grid);
        }
        script.wait_ms(ERROR_TAIL_MS)
    }

    fn victory_script(&self) -> Script {
        let indicators = (0..self.indicator_total())
            .filter_map(|step| indicator_command(step, palette::PROGRESS_DONE))
            .collect::<Vec<_>>();
        let mut script = Script::new().leds(indicators);

        for pos in GridPos::all() {
            script = script
                .pixel(&self.grid, pos, palette::GREEN)
                .wait_ms(VICTORY_FILL_STEP_MS);
        }
        script = script.wait_ms(VICTORY_HOLD_MS);
        for _ in 0..VICTORY_BLINKS {
            script = script
                .clear_grid(&self.grid)
                .wait_ms(VICTORY_BLINK_MS)
                .fill(&self.grid, palette::GREEN)
                .wait_ms(VICTORY_BLINK_MS);
        }
        script
            .wait_ms(VICTORY_TAIL_MS)
            .leds(reset_all_commands())
    }
}

/// The 16 central pads sessions draw their cells from.
#[must_use]
pub fn candidate_pool() -> Vec<GridPos> {
    (3..7u8)
        .flat_map(|y| (2..6u8).map(move |x| GridPos::new(x, y)))
        .collect()
}

/// LED command for progress step `step` (0-based).
///
/// Steps 0-7 use the top-row buttons, 8-15 the right column.
#[must_use]
pub fn indicator_command(step: usize, color: u8) -> Option<LedCommand> {
    if let Some(&cc) = TOP_BUTTONS.get(step) {
        return Some(LedCommand::Control { cc, value: color });
    }
    RIGHT_BUTTONS
        .get(step.checked_sub(TOP_BUTTONS.len())?)
        .map(|&note| LedCommand::Note { note, color })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::led::RecordingSurface;
    use crate::picker::ScriptedPicker;

    fn game(config: SimonConfig, picks: Vec<usize>) -> SimonGame<ScriptedPicker> {
        SimonGame::new(config, GridMap::default(), ScriptedPicker::new(picks))
    }

    fn start_note(game: &SimonGame<ScriptedPicker>) -> u8 {
        game.grid.note_for(START_CELLS[0]).expect("start cell on grid")
    }

    /// Run scripts until the game stops animating.
    fn settle(game: &mut SimonGame<ScriptedPicker>, surface: &mut RecordingSurface) {
        for _ in 0..10_000 {
            game.update(Duration::from_millis(16), surface);
            if !game.is_animating() {
                return;
            }
        }
        panic!("script never finished");
    }

    #[test]
    fn starts_idle_and_ignores_presses() {
        let mut game = game(SimonConfig::default(), vec![]);
        assert_eq!(game.state(), SimonState::Idle);
        let note = start_note(&game);
        assert_eq!(game.press(note), PressOutcome::Ignored);
    }

    #[test]
    fn arm_lights_start_cells_after_delay() {
        let mut game = game(SimonConfig::default(), vec![]);
        let mut surface = RecordingSurface::new();
        game.arm();
        assert_eq!(game.state(), SimonState::AwaitingStart);

        game.update(Duration::from_millis(100), &mut surface);
        assert!(surface.lit_notes().is_empty());

        settle(&mut game, &mut surface);
        for pos in START_CELLS {
            assert_eq!(surface.pixel(&game.grid, pos), palette::GREEN);
        }
    }

    #[test]
    fn only_start_cells_start_a_session() {
        let mut game = game(SimonConfig::default(), vec![]);
        game.arm();
        let corner = game.grid.note_for(GridPos::new(0, 0)).expect("on grid");
        assert_eq!(game.press(corner), PressOutcome::Ignored);
        assert_eq!(game.state(), SimonState::AwaitingStart);

        let note = start_note(&game);
        assert_eq!(game.press(note), PressOutcome::Started);
        assert_eq!(game.state(), SimonState::ShowingSequence);
        assert_eq!(game.level(), 1);
        assert_eq!(game.sequence().len(), 1);
    }

    #[test]
    fn active_cells_are_distinct_and_from_pool() {
        let config = SimonConfig {
            cells_in_play: 8,
            ..SimonConfig::default()
        };
        let mut game = game(config, vec![7, 3, 9, 1, 0, 4]);
        game.arm();
        game.press(start_note(&game));

        let pool = candidate_pool();
        let cells = game.active_cells();
        assert_eq!(cells.len(), 8);
        for (i, a) in cells.iter().enumerate() {
            assert!(pool.contains(&a.pos));
            for b in &cells[i + 1..] {
                assert_ne!(a.pos, b.pos);
                assert_ne!(a.color, b.color);
            }
        }
    }

    #[test]
    fn presses_during_playback_are_ignored() {
        let mut game = game(SimonConfig::default(), vec![]);
        game.arm();
        game.press(start_note(&game));
        let first = game.sequence()[0];
        assert_eq!(game.press(first), PressOutcome::Ignored);
        assert_eq!(game.position(), 0);
    }

    #[test]
    fn playback_shows_sequence_then_awaits_input() {
        let mut game = game(SimonConfig::default(), vec![]);
        let mut surface = RecordingSurface::new();
        game.arm();
        settle(&mut game, &mut surface);
        game.press(start_note(&game));
        surface.clear_log();
        settle(&mut game, &mut surface);

        assert_eq!(game.state(), SimonState::AwaitingPlayerInput);
        let note = game.sequence()[0];
        let color = game.color_of(note).expect("active");
        assert!(
            surface
                .log()
                .contains(&LedCommand::Note { note, color })
        );
        // Level 1 of 6: first indicator pending, none done.
        assert_eq!(surface.control_value(104), palette::PROGRESS_PENDING);
    }

    #[test]
    fn wrong_press_records_score() {
        let mut game = game(SimonConfig::default(), vec![]);
        let mut surface = RecordingSurface::new();
        game.arm();
        game.press(start_note(&game));
        settle(&mut game, &mut surface);

        let expected = game.sequence()[0];
        let wrong = game
            .active_cells()
            .iter()
            .map(|c| c.note)
            .find(|&n| n != expected)
            .expect("several cells in play");
        assert_eq!(game.press(wrong), PressOutcome::Mismatch { score: 0 });
        assert_eq!(game.state(), SimonState::Error);
        assert_eq!(game.last_score(), Some(0));

        settle(&mut game, &mut surface);
        assert_eq!(game.state(), SimonState::AwaitingStart);
    }

    #[test]
    fn inactive_cells_ignored_during_input() {
        let mut game = game(SimonConfig::default(), vec![]);
        let mut surface = RecordingSurface::new();
        game.arm();
        game.press(start_note(&game));
        settle(&mut game, &mut surface);

        let corner = game.grid.note_for(GridPos::new(0, 0)).expect("on grid");
        assert_eq!(game.press(corner), PressOutcome::Ignored);
        assert_eq!(game.state(), SimonState::AwaitingPlayerInput);
    }

    #[test]
    fn press_lights_and_release_darkens() {
        let mut game = game(SimonConfig::default(), vec![]);
        let mut surface = RecordingSurface::new();
        game.arm();
        game.press(start_note(&game));
        settle(&mut game, &mut surface);

        let note = game.sequence()[0];
        let color = game.color_of(note).expect("active");
        game.note_on(note, 100);
        game.update(Duration::ZERO, &mut surface);
        assert_eq!(surface.note_color(note), color);

        game.note_on(note, 0);
        game.update(Duration::ZERO, &mut surface);
        assert_eq!(surface.note_color(note), palette::OFF);
    }

    #[test]
    fn victory_after_last_level() {
        let config = SimonConfig {
            max_levels: 2,
            ..SimonConfig::default()
        };
        let mut game = game(config, vec![]);
        let mut surface = RecordingSurface::new();
        game.arm();
        game.press(start_note(&game));

        settle(&mut game, &mut surface);
        let seq = game.sequence().to_vec();
        assert_eq!(game.press(seq[0]), PressOutcome::LevelComplete { level: 1 });

        settle(&mut game, &mut surface);
        let seq = game.sequence().to_vec();
        assert_eq!(seq.len(), 2);
        assert_eq!(game.press(seq[0]), PressOutcome::Correct { position: 1 });
        assert_eq!(game.press(seq[1]), PressOutcome::Victory);
        assert_eq!(game.state(), SimonState::Victory);
        assert_eq!(game.last_score(), Some(2));

        settle(&mut game, &mut surface);
        assert_eq!(game.state(), SimonState::Idle);
        assert!(!game.is_armed());
        assert!(surface.lit_notes().is_empty());
    }

    #[test]
    fn disarm_cancels_session() {
        let mut game = game(SimonConfig::default(), vec![]);
        let mut surface = RecordingSurface::new();
        game.arm();
        game.press(start_note(&game));
        game.disarm();
        assert_eq!(game.state(), SimonState::Idle);
        assert!(game.sequence().is_empty());
        settle(&mut game, &mut surface);
        assert!(surface.lit_notes().is_empty());
        assert_eq!(game.press(start_note(&game)), PressOutcome::Ignored);
    }

    #[test]
    fn score_digits_drawn_when_enabled() {
        let config = SimonConfig {
            show_score: true,
            ..SimonConfig::default()
        };
        let script = game(config, vec![]).error_script(3);
        let plain = game(SimonConfig::default(), vec![]).error_script(3);
        assert!(script.duration() > plain.duration());
    }

    #[test]
    fn indicators_spill_to_right_column() {
        assert_eq!(
            indicator_command(0, 96),
            Some(LedCommand::Control { cc: 104, value: 96 })
        );
        assert_eq!(
            indicator_command(8, 96),
            Some(LedCommand::Note { note: 89, color: 96 })
        );
        assert_eq!(indicator_command(16, 96), None);
    }

    #[test]
    fn cells_in_play_is_clamped() {
        let config = SimonConfig {
            cells_in_play: 40,
            ..SimonConfig::default()
        };
        let game = game(config, vec![]);
        assert_eq!(game.config().cells_in_play, CELL_COLORS.len());
    }

    #[test]
    fn more_cells_than_colors_still_get_distinct_colors() {
        let config = SimonConfig {
            cells_in_play: 12,
            ..SimonConfig::default()
        };
        let mut game = SimonGame::new(config, GridMap::default(), crate::picker::RngPicker::seeded(7));
        game.arm();
        let note = game.grid.note_for(START_CELLS[0]).expect("start cell on grid");
        assert_eq!(game.press(note), PressOutcome::Started);

        let mut colors: Vec<u8> = game.active_cells().iter().map(|c| c.color).collect();
        assert_eq!(colors.len(), CELL_COLORS.len());
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), CELL_COLORS.len());
    }

    /// Start a session and settle into `AwaitingPlayerInput`.
    fn awaiting_input(cells_in_play: usize) -> (SimonGame<ScriptedPicker>, RecordingSurface) {
        let config = SimonConfig {
            cells_in_play,
            ..SimonConfig::default()
        };
        let mut game = game(config, vec![]);
        let mut surface = RecordingSurface::new();
        game.arm();
        settle(&mut game, &mut surface);
        assert_eq!(game.press(start_note(&game)), PressOutcome::Started);
        settle(&mut game, &mut surface);
        assert_eq!(game.state(), SimonState::AwaitingPlayerInput);
        (game, surface)
    }

    #[test]
    fn active_start_cell_during_input_is_an_ordinary_press() {
        let (mut game, _surface) = awaiting_input(8);
        let expected = game.sequence()[0];
        let note = START_CELLS
            .iter()
            .filter_map(|&pos| game.grid.note_for(pos))
            .find(|&n| n != expected && game.color_of(n).is_some())
            .expect("an active start cell that is not expected");

        assert_eq!(game.press(note), PressOutcome::Mismatch { score: 0 });
        assert_eq!(game.state(), SimonState::Error);
        assert_eq!(game.level(), 1);
        assert_eq!(game.sequence().len(), 1);
    }

    #[test]
    fn inactive_start_cell_during_input_is_ignored() {
        let (mut game, _surface) = awaiting_input(1);
        let note = START_CELLS
            .iter()
            .filter_map(|&pos| game.grid.note_for(pos))
            .find(|&n| game.color_of(n).is_none())
            .expect("an inactive start cell");
        let sequence = game.sequence().to_vec();
        game.drain_events();

        assert_eq!(game.press(note), PressOutcome::Ignored);
        assert_eq!(game.state(), SimonState::AwaitingPlayerInput);
        assert_eq!(game.level(), 1);
        assert_eq!(game.position(), 0);
        assert_eq!(game.sequence(), sequence.as_slice());
        assert!(game.drain_events().is_empty());
    }
}
