//! Frame-driven dialogue runner.
//!
//! Reveals a list of texts one after the other at an anchor point:
//! glyphs appear on their schedule, the finished text holds for a while,
//! then its glyphs fall away and the next text starts.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use vek::Vec3;

use super::markup::process_modifiers;
use super::reveal::{layout_reveal, GlyphPlacement, GlyphSet};
use crate::config::DialogueConfig;

const GRAVITY: f32 = 9.81;

/// Sinusoidal vertical bob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bob {
    /// Peak offset.
    pub amplitude: f32,
    /// Angular speed.
    pub speed: f32,
    /// Phase offset, radians.
    pub phase: f32,
}

impl Bob {
    /// Vertical offset at time `t`.
    #[must_use]
    pub fn offset(&self, t: f32) -> f32 {
        self.amplitude * (t * self.speed + self.phase).sin()
    }
}

/// A glyph currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ShownGlyph {
    /// Model name.
    pub glyph: String,
    /// Rest position in world space.
    pub base: Vec3<f32>,
    /// Bob animation, when animated.
    pub bob: Option<Bob>,
}

impl ShownGlyph {
    /// World position at stage time `t`.
    #[must_use]
    pub fn position(&self, t: f32) -> Vec3<f32> {
        let dy = self.bob.map_or(0.0, |b| b.offset(t));
        self.base + Vec3::new(0.0, dy, 0.0)
    }
}

/// A cleared glyph falling away.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingGlyph {
    /// Model name.
    pub glyph: String,
    /// Current position.
    pub position: Vec3<f32>,
    /// Current velocity.
    pub velocity: Vec3<f32>,
    /// Seconds since it was dropped.
    pub age: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Revealing,
    Holding,
    Done,
}

/// Reveals a queue of texts.
pub struct DialogueStage<G: GlyphSet> {
    settings: DialogueConfig,
    glyphs: G,
    anchor: Vec3<f32>,
    texts: VecDeque<String>,
    plan: Vec<GlyphPlacement>,
    cursor: usize,
    timer: f32,
    clock: f32,
    phase: Phase,
    shown: Vec<ShownGlyph>,
    falling: Vec<FallingGlyph>,
    completed: usize,
    rng: StdRng,
}

impl<G: GlyphSet> DialogueStage<G> {
    /// A stage at `anchor` that will play `settings.texts`.
    #[must_use]
    pub fn new(settings: DialogueConfig, glyphs: G, anchor: Vec3<f32>) -> Self {
        Self::with_rng(settings, glyphs, anchor, StdRng::from_entropy())
    }

    /// Like [`new`](Self::new) with an explicit RNG for bob phases.
    #[must_use]
    pub fn with_rng(settings: DialogueConfig, glyphs: G, anchor: Vec3<f32>, rng: StdRng) -> Self {
        let texts = settings.texts.iter().cloned().collect();
        Self {
            settings,
            glyphs,
            anchor,
            texts,
            plan: Vec::new(),
            cursor: 0,
            timer: 0.0,
            clock: 0.0,
            phase: Phase::Idle,
            shown: Vec::new(),
            falling: Vec::new(),
            completed: 0,
            rng,
        }
    }

    /// Start revealing the first queued text.
    pub fn start(&mut self) {
        self.begin_next();
    }

    /// Queue another text after the current ones.
    pub fn add_dialogue(&mut self, text: impl Into<String>) {
        let text = text.into();
        debug!(%text, "dialogue queued");
        self.texts.push_back(text);
    }

    /// Texts waiting to be shown.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.texts.len()
    }

    /// Texts fully revealed so far.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Whether a text is being revealed or held.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Revealing | Phase::Holding)
    }

    /// Whether every queued text has been shown and cleared.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Glyphs on screen.
    #[must_use]
    pub fn shown(&self) -> &[ShownGlyph] {
        &self.shown
    }

    /// Glyphs falling away.
    #[must_use]
    pub fn falling(&self) -> &[FallingGlyph] {
        &self.falling
    }

    /// Seconds since the stage was created.
    #[must_use]
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Move the anchor for texts started from now on.
    pub fn set_anchor(&mut self, anchor: Vec3<f32>) {
        self.anchor = anchor;
    }

    /// Advance by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.clock += dt;
        self.update_falling(dt);

        if !self.is_running() {
            return;
        }
        self.timer -= dt;
        while self.timer <= 0.0 {
            match self.phase {
                Phase::Revealing => {
                    if let Some(placement) = self.plan.get(self.cursor).cloned() {
                        self.cursor += 1;
                        self.timer += placement.delay;
                        self.spawn(&placement);
                    } else {
                        self.phase = Phase::Holding;
                        self.timer += self.settings.hold_secs;
                    }
                }
                Phase::Holding => {
                    self.completed += 1;
                    self.begin_next();
                    if !self.is_running() {
                        break;
                    }
                }
                Phase::Idle | Phase::Done => break,
            }
        }
    }

    fn begin_next(&mut self) {
        self.drop_shown();
        let Some(text) = self.texts.pop_front() else {
            if self.completed == 0 {
                warn!("dialogue started with no texts");
            } else {
                info!(completed = self.completed, "dialogue finished");
            }
            self.phase = Phase::Done;
            return;
        };

        let processed = process_modifiers(&text);
        self.plan = layout_reveal(&processed, &self.settings, &self.glyphs);
        self.cursor = 0;
        self.timer = 0.0;
        self.phase = Phase::Revealing;
        debug!(glyphs = self.plan.len(), %text, "dialogue reveal started");
    }

    fn spawn(&mut self, placement: &GlyphPlacement) {
        let bob = placement.bob.map(|amplitude| Bob {
            amplitude,
            speed: self.settings.animation_speed,
            phase: self.rng.gen_range(0.0..TAU),
        });
        self.shown.push(ShownGlyph {
            glyph: placement.glyph.clone(),
            base: self.anchor + placement.offset,
            bob,
        });
    }

    fn drop_shown(&mut self) {
        let t = self.clock;
        let impulse = Vec3::new(0.0, -self.settings.drop_force, 0.0);
        self.falling.extend(self.shown.drain(..).map(|g| FallingGlyph {
            position: g.position(t),
            glyph: g.glyph,
            velocity: impulse,
            age: 0.0,
        }));
    }

    fn update_falling(&mut self, dt: f32) {
        let lifetime = self.settings.character_lifetime;
        for glyph in &mut self.falling {
            glyph.velocity.y -= GRAVITY * dt;
            glyph.position += glyph.velocity * dt;
            glyph.age += dt;
        }
        self.falling.retain(|g| g.age < lifetime);
    }
}

impl<G: GlyphSet> std::fmt::Debug for DialogueStage<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueStage")
            .field("phase", &self.phase)
            .field("pending", &self.texts.len())
            .field("shown", &self.shown.len())
            .field("falling", &self.falling.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::reveal::GlyphLibrary;

    fn stage(texts: &[&str]) -> DialogueStage<GlyphLibrary> {
        let settings = DialogueConfig {
            texts: texts.iter().map(|t| (*t).to_string()).collect(),
            ..DialogueConfig::default()
        };
        DialogueStage::with_rng(
            settings,
            GlyphLibrary::standard(),
            Vec3::zero(),
            StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn first_glyph_appears_immediately() {
        let mut s = stage(&["abc"]);
        s.start();
        s.update(0.0);
        assert_eq!(s.shown().len(), 1);
        s.update(0.1);
        assert_eq!(s.shown().len(), 2);
    }

    #[test]
    fn long_frame_spawns_several() {
        let mut s = stage(&["abcd"]);
        s.start();
        s.update(0.25);
        assert_eq!(s.shown().len(), 3);
    }

    #[test]
    fn holds_then_moves_to_next_text() {
        let mut s = stage(&["ab", "cd"]);
        s.start();
        // 2 glyphs * 0.1s, then 2s hold.
        s.update(0.2);
        assert_eq!(s.shown().len(), 2);
        s.update(1.9);
        assert_eq!(s.completed(), 0);
        s.update(0.2);
        assert_eq!(s.completed(), 1);
        assert_eq!(s.falling().len(), 2);
        assert_eq!(s.shown().len(), 1);
    }

    #[test]
    fn finishes_and_drops_everything() {
        let mut s = stage(&["a"]);
        s.start();
        s.update(0.1);
        s.update(2.0);
        assert!(s.is_finished());
        assert!(s.shown().is_empty());
        assert_eq!(s.falling().len(), 1);

        let before = s.falling()[0].position.y;
        s.update(0.5);
        assert!(s.falling()[0].position.y < before);
        s.update(2.0);
        assert!(s.falling().is_empty());
    }

    #[test]
    fn add_dialogue_extends_queue() {
        let mut s = stage(&["a"]);
        s.add_dialogue("b");
        assert_eq!(s.pending(), 2);
        s.start();
        s.update(0.1);
        s.update(2.0);
        assert!(s.is_running());
        assert_eq!(s.completed(), 1);
    }

    #[test]
    fn empty_queue_finishes_at_once() {
        let mut s = stage(&[]);
        s.start();
        assert!(s.is_finished());
    }

    #[test]
    fn bobbing_glyph_moves() {
        let mut s = stage(&["/anim[1](a)"]);
        s.start();
        s.update(0.0);
        let glyph = &s.shown()[0];
        let bob = glyph.bob.expect("animated");
        assert!((bob.amplitude - 1.0).abs() < f32::EPSILON);
        let positions: Vec<f32> = (0..8).map(|i| glyph.position(i as f32 * 0.5).y).collect();
        assert!(positions.iter().any(|&y| y.abs() > 0.1));
        assert!(positions.iter().all(|&y| y.abs() <= 1.0 + 1e-6));
    }
}
