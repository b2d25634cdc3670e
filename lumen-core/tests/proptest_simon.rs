//! Property-Based Tests for the Simon engine and the dialogue markup.
//!
//! Uses `proptest` to check the session invariants for arbitrary seeds,
//! cell counts and level caps, and the markup parser for arbitrary text.

use std::time::Duration;

use proptest::prelude::*;

use lumen_core::config::SimonConfig;
use lumen_core::dialogue::process_modifiers;
use lumen_core::grid::{GridLayout, GridMap, GridPos};
use lumen_core::led::RecordingSurface;
use lumen_core::picker::{shuffle, RngPicker, ScriptedPicker};
use lumen_core::simon::{PressOutcome, SimonGame, SimonState, START_CELLS};

type Game = SimonGame<RngPicker<rand::rngs::StdRng>>;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_config() -> impl Strategy<Value = SimonConfig> {
    (2usize..=16, 0u32..=6, any::<bool>()).prop_map(|(cells, max_levels, show_score)| SimonConfig {
        cells_in_play: cells,
        max_levels,
        show_score,
        show_ms: 20,
        gap_ms: 10,
    })
}

fn arb_layout() -> impl Strategy<Value = GridLayout> {
    prop_oneof![Just(GridLayout::TopDown), Just(GridLayout::BottomUp)]
}

fn settle(game: &mut Game, surface: &mut RecordingSurface) {
    for _ in 0..20_000 {
        game.update(Duration::from_millis(16), surface);
        if !game.is_animating() {
            return;
        }
    }
    panic!("animation never finished");
}

fn started(config: SimonConfig, layout: GridLayout, seed: u64) -> (Game, RecordingSurface) {
    let mut game = SimonGame::new(config, GridMap::new(layout), RngPicker::seeded(seed));
    let mut surface = RecordingSurface::new();
    game.arm();
    settle(&mut game, &mut surface);
    let note = game.grid().note_for(START_CELLS[3]).expect("start cell on grid");
    game.press(note);
    settle(&mut game, &mut surface);
    (game, surface)
}

// ---------------------------------------------------------------------------
// Property: the sequence grows by exactly one note per cleared level
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sequence_length_tracks_level(
        seed in any::<u64>(),
        layout in arb_layout(),
        levels in 1u32..5,
        cells in 1usize..=16,
    ) {
        let config = SimonConfig { cells_in_play: cells, max_levels: 0, show_ms: 20, gap_ms: 10, show_score: false };
        let (mut game, mut surface) = started(config, layout, seed);
        let mut previous: Vec<u8> = Vec::new();

        for level in 1..=levels {
            prop_assert_eq!(game.level(), level);
            prop_assert_eq!(game.sequence().len() as u32, level);
            prop_assert!(game.sequence().starts_with(&previous));
            previous = game.sequence().to_vec();

            for (i, &note) in previous.iter().enumerate() {
                prop_assert_eq!(game.position(), i);
                let outcome = game.press(note);
                if i + 1 < previous.len() {
                    prop_assert_eq!(outcome, PressOutcome::Correct { position: i + 1 });
                } else {
                    prop_assert_eq!(outcome, PressOutcome::LevelComplete { level });
                }
            }
            settle(&mut game, &mut surface);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: any wrong active cell ends the session with score level - 1
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn wrong_press_always_errors(config in arb_config(), seed in any::<u64>(), pick in any::<usize>()) {
        let (mut game, mut surface) = started(config, GridLayout::TopDown, seed);
        prop_assume!(game.state() == SimonState::AwaitingPlayerInput);

        let expected = game.sequence()[0];
        let wrong: Vec<u8> = game.active_cells().iter().map(|c| c.note).filter(|&n| n != expected).collect();
        prop_assume!(!wrong.is_empty());
        let note = wrong[pick % wrong.len()];

        prop_assert_eq!(game.press(note), PressOutcome::Mismatch { score: 0 });
        prop_assert_eq!(game.state(), SimonState::Error);
        prop_assert_eq!(game.last_score(), Some(0));

        settle(&mut game, &mut surface);
        prop_assert_eq!(game.state(), SimonState::AwaitingStart);
    }
}

// ---------------------------------------------------------------------------
// Property: a capped session ends in victory right after the cap
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn victory_after_cap(seed in any::<u64>(), cap in 1u32..=4) {
        let config = SimonConfig { cells_in_play: 4, max_levels: cap, show_ms: 20, gap_ms: 10, show_score: false };
        let (mut game, mut surface) = started(config, GridLayout::TopDown, seed);

        let mut outcome = PressOutcome::Ignored;
        for _ in 0..cap {
            for note in game.sequence().to_vec() {
                outcome = game.press(note);
            }
            if game.state() == SimonState::ShowingSequence {
                settle(&mut game, &mut surface);
            }
        }
        prop_assert_eq!(outcome, PressOutcome::Victory);
        prop_assert_eq!(game.last_score(), Some(cap));
        settle(&mut game, &mut surface);
        prop_assert_eq!(game.state(), SimonState::Idle);
    }
}

// ---------------------------------------------------------------------------
// Property: grid mapping is a bijection in both layouts
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn grid_notes_round_trip(layout in arb_layout(), x in 0u8..8, y in 0u8..8) {
        let grid = GridMap::new(layout);
        let pos = GridPos::new(x, y);
        let note = grid.note_for(pos).expect("every cell has a note");
        prop_assert_eq!(grid.pos_for(note), Some(pos));
    }
}

// ---------------------------------------------------------------------------
// Property: shuffling permutes
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn shuffle_is_a_permutation(picks in prop::collection::vec(any::<usize>(), 0..20), len in 0usize..20) {
        let mut items: Vec<usize> = (0..len).collect();
        shuffle(&mut ScriptedPicker::new(picks), &mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..len).collect::<Vec<_>>());
    }
}

// ---------------------------------------------------------------------------
// Property: text without directives passes through the markup parser
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn plain_text_is_unchanged(text in "[a-zA-Z0-9 .,?:]{0,40}") {
        let processed = process_modifiers(&text);
        prop_assert_eq!(&processed.text, &text);
        prop_assert_eq!(processed.attrs.len(), text.chars().count());
        prop_assert!(processed.attrs.iter().all(|a| (a.speed - 1.0).abs() < f32::EPSILON && a.anim == 0.0));
    }

    #[test]
    fn directives_never_leak_into_text(inner in "[a-z ]{0,12}", speed in 1u32..9) {
        let processed = process_modifiers(&format!("x/speed[{speed}]({inner})y"));
        prop_assert_eq!(processed.text, format!("x{inner}y"));
        prop_assert_eq!(processed.attrs.len(), inner.chars().count() + 2);
    }
}
