//! Lumen Benchmark Suite
//!
//! Per-frame work at 60 fps leaves about 16ms. Targets:
//!   simon_full_session_cap_6 ......... < 500μs
//!   dialogue_markup_and_layout ....... < 50μs
//!   dispatch_push_drain_256 .......... < 20μs
//!   stage_frame_idle ................. < 100μs

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lumen_core::config::{LumenConfig, SimonConfig};
use lumen_core::dialogue::{layout_reveal, process_modifiers, GlyphLibrary};
use lumen_core::led::RecordingSurface;
use lumen_core::picker::{CellPicker, RngPicker};
use lumen_core::simon::{SimonGame, SimonState, START_CELLS};
use lumen_core::{GridMap, PadEvent};
use lumen_io::Dispatcher;
use lumen_stage::{run_frame, Stage};

const TICK: Duration = Duration::from_millis(16);
const MAX_TICKS: usize = 100_000;

/// Play a whole session to victory by pressing the sequence back.
fn play_session<P: CellPicker>(game: &mut SimonGame<P>, surface: &mut RecordingSurface) {
    game.arm();
    let start = game.grid().note_for(START_CELLS[0]).unwrap_or_default();
    for _ in 0..MAX_TICKS {
        game.update(TICK, surface);
        match game.state() {
            SimonState::AwaitingStart if !game.is_animating() => {
                game.press(start);
            }
            SimonState::AwaitingPlayerInput => {
                let sequence = game.sequence().to_vec();
                for note in sequence {
                    game.press(note);
                    game.release(note);
                }
            }
            _ => {}
        }
        if !game.is_armed() {
            return;
        }
    }
}

/// Benchmark: one Simon session from arming to victory at level 6.
fn bench_simon_session(c: &mut Criterion) {
    let config = SimonConfig {
        max_levels: 6,
        ..SimonConfig::default()
    };

    c.bench_function("simon_full_session_cap_6", |b| {
        b.iter(|| {
            let mut game = SimonGame::new(config.clone(), GridMap::default(), RngPicker::seeded(7));
            let mut surface = RecordingSurface::new();
            play_session(&mut game, &mut surface);
            black_box(game.last_score());
        });
    });
}

/// Benchmark: markup parsing plus glyph layout of a two-line text.
fn bench_dialogue_layout(c: &mut Criterion) {
    let settings = LumenConfig::default().dialogue;
    let glyphs = GlyphLibrary::standard();
    let text = "Something /speed[2](moves) in the dark.\n/anim[0.3](Keep) to the light!";

    c.bench_function("dialogue_markup_and_layout", |b| {
        b.iter(|| {
            let processed = process_modifiers(black_box(text));
            let plan = layout_reveal(&processed, &settings, &glyphs);
            black_box(plan);
        });
    });
}

/// Benchmark: a full queue of pad events pushed and drained.
fn bench_dispatch(c: &mut Criterion) {
    let queue = Dispatcher::new(256);

    c.bench_function("dispatch_push_drain_256", |b| {
        b.iter(|| {
            for note in 0..=255u8 {
                queue.push(PadEvent::Pressed { note, velocity: 127 });
            }
            black_box(queue.drain());
        });
    });
}

/// Benchmark: one stage frame with nothing queued.
fn bench_stage_frame(c: &mut Criterion) {
    let mut stage = Stage::new(LumenConfig::default(), RngPicker::seeded(1), RngPicker::seeded(2));
    let mut surface = RecordingSurface::new();

    c.bench_function("stage_frame_idle", |b| {
        b.iter(|| {
            let report = run_frame(black_box(&mut stage), TICK, &mut surface);
            black_box(report);
        });
    });
}

criterion_group!(
    benches,
    bench_simon_session,
    bench_dialogue_layout,
    bench_dispatch,
    bench_stage_frame,
);
criterion_main!(benches);
