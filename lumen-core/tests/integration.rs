//! Integration Tests: end-to-end flows through the public API.
//!
//! A Simon session driven frame by frame against a recording surface,
//! pixel art on the same surface, a dialogue from markup to falling glyphs
//! and the button board feeding the random light switch.

use std::time::Duration;

use lumen_core::config::{DialogueConfig, MqttConfig, SimonConfig};
use lumen_core::dialogue::{DialogueStage, GlyphLibrary};
use lumen_core::esp32::{Button, ButtonBoard, MqttEvent};
use lumen_core::grid::{GridMap, GridPos, RIGHT_BUTTONS};
use lumen_core::led::{palette, RecordingSurface};
use lumen_core::lights::RandomLightSwitch;
use lumen_core::picker::{RngPicker, ScriptedPicker};
use lumen_core::pixel_art::{PixelArtDisplay, PixelArtImage};
use lumen_core::simon::{PressOutcome, SimonEvent, SimonGame, SimonState, START_CELLS};
use lumen_core::PadEvent;
use vek::Vec3;

const FRAME: Duration = Duration::from_millis(16);

fn settle<P: lumen_core::picker::CellPicker>(game: &mut SimonGame<P>, surface: &mut RecordingSurface) {
    for _ in 0..20_000 {
        game.update(FRAME, surface);
        if !game.is_animating() {
            return;
        }
    }
    panic!("animation never finished");
}

fn start<P: lumen_core::picker::CellPicker>(game: &mut SimonGame<P>, surface: &mut RecordingSurface) {
    game.arm();
    settle(game, surface);
    let note = game.grid().note_for(START_CELLS[0]).expect("start cell on grid");
    assert_eq!(game.press(note), PressOutcome::Started);
    settle(game, surface);
    assert_eq!(game.state(), SimonState::AwaitingPlayerInput);
}

fn wrong_note<P: lumen_core::picker::CellPicker>(game: &SimonGame<P>) -> u8 {
    let expected = game.sequence()[game.position()];
    game.active_cells()
        .iter()
        .map(|c| c.note)
        .find(|&n| n != expected)
        .expect("more than one cell in play")
}

// ---------------------------------------------------------------------------
// Simon: correct level 1, mistake in level 2
// ---------------------------------------------------------------------------

#[test]
fn mistake_on_level_two_scores_one() {
    let config = SimonConfig {
        cells_in_play: 4,
        ..SimonConfig::default()
    };
    let mut game = SimonGame::new(config, GridMap::default(), ScriptedPicker::new([5, 2, 9, 1, 3, 0, 2]));
    let mut surface = RecordingSurface::new();
    start(&mut game, &mut surface);
    game.drain_events();

    let first = game.sequence()[0];
    assert_eq!(
        game.handle_pad(PadEvent::Pressed { note: first, velocity: 100 }),
        PressOutcome::LevelComplete { level: 1 }
    );
    game.handle_pad(PadEvent::Released { note: first });
    settle(&mut game, &mut surface);
    assert_eq!(game.level(), 2);
    assert_eq!(game.sequence().len(), 2);
    assert_eq!(game.sequence()[0], first);

    let wrong = wrong_note(&game);
    assert_eq!(game.press(wrong), PressOutcome::Mismatch { score: 1 });
    assert_eq!(game.last_score(), Some(1));

    let errors = game
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SimonEvent::Transition { to: SimonState::Error, .. }))
        .count();
    assert_eq!(errors, 1);

    settle(&mut game, &mut surface);
    assert_eq!(game.state(), SimonState::AwaitingStart);
    for pos in START_CELLS {
        assert_eq!(surface.pixel(game.grid(), pos), palette::GREEN);
    }
}

// ---------------------------------------------------------------------------
// Simon: reach the cap and win
// ---------------------------------------------------------------------------

#[test]
fn clearing_every_level_wins_and_disarms() {
    let config = SimonConfig {
        cells_in_play: 3,
        max_levels: 3,
        ..SimonConfig::default()
    };
    let mut game = SimonGame::new(config, GridMap::default(), RngPicker::seeded(42));
    let mut surface = RecordingSurface::new();
    start(&mut game, &mut surface);

    let mut last = PressOutcome::Ignored;
    for level in 1..=3u32 {
        assert_eq!(game.level(), level);
        let sequence = game.sequence().to_vec();
        for note in sequence {
            last = game.press(note);
            game.note_off(note);
        }
        if level < 3 {
            assert_eq!(last, PressOutcome::LevelComplete { level });
            settle(&mut game, &mut surface);
        }
    }
    assert_eq!(last, PressOutcome::Victory);
    assert_eq!(game.state(), SimonState::Victory);
    assert_eq!(game.last_score(), Some(3));

    settle(&mut game, &mut surface);
    assert_eq!(game.state(), SimonState::Idle);
    assert!(!game.is_armed());
    assert!(surface.lit_notes().is_empty());
}

// ---------------------------------------------------------------------------
// Pixel art
// ---------------------------------------------------------------------------

#[test]
fn pixel_art_draws_image_and_palette() {
    let grid = GridMap::default();
    let mut surface = RecordingSurface::new();
    let mut display = PixelArtDisplay::new(grid.clone());

    display.show(PixelArtImage::Ghost, &mut surface);
    let pixels = PixelArtImage::Ghost.pixels();
    for pos in GridPos::all() {
        assert_eq!(
            surface.pixel(&grid, pos),
            pixels[usize::from(pos.y)][usize::from(pos.x)]
        );
    }
    for (&note, &color) in RIGHT_BUTTONS.iter().zip(PixelArtImage::Ghost.palette()) {
        assert_eq!(surface.note_color(note), color);
    }

    display.show(PixelArtImage::Heart, &mut surface);
    assert_eq!(display.current(), Some(PixelArtImage::Heart));
    // Palette slots beyond the heart's three colors are dark again.
    assert_eq!(surface.note_color(RIGHT_BUTTONS[4]), palette::OFF);
}

// ---------------------------------------------------------------------------
// Dialogue
// ---------------------------------------------------------------------------

#[test]
fn dialogue_reveals_holds_and_drops() {
    let settings = DialogueConfig {
        texts: vec!["Hi /speed[2](you)".into(), "/anim[0.2](bye)".into()],
        ..DialogueConfig::default()
    };
    let mut stage = DialogueStage::new(settings, GlyphLibrary::standard(), Vec3::new(0.0, 2.0, 3.0));
    stage.start();

    let mut frames = 0;
    while !stage.is_finished() && frames < 10_000 {
        stage.update(1.0 / 60.0);
        frames += 1;
    }
    assert!(stage.is_finished());
    assert_eq!(stage.completed(), 2);
    assert!(stage.shown().is_empty());
    // "bye" was just dropped.
    assert_eq!(stage.falling().len(), 3);
}

// ---------------------------------------------------------------------------
// ESP32 buttons switching lights
// ---------------------------------------------------------------------------

#[test]
fn button_presses_cycle_lights() {
    let mut board = ButtonBoard::new(&MqttConfig::default());
    let mut switch = RandomLightSwitch::new(vec![Some("left".into()), Some("right".into())]);
    let mut picker = ScriptedPicker::new([1, 0]);

    let events = vec![
        MqttEvent::Connected,
        MqttEvent::Message {
            topic: "ESP32-1".into(),
            payload: "2".into(),
        },
    ];
    for button in board.process(events) {
        assert_eq!(button, Button::Button2);
        switch.activate_random(&mut picker);
    }
    assert!(board.is_connected());
    assert_eq!(switch.current_name(), Some("right"));

    let pressed = board.process([MqttEvent::Message {
        topic: "ESP32-1".into(),
        payload: "1".into(),
    }]);
    assert_eq!(pressed, vec![Button::Button1]);
    switch.activate_random(&mut picker);
    assert_eq!(switch.states(), &[true, false]);
}
