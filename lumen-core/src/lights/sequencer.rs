//! Timed fade-in / hold / fade-out sequencing over a list of lights.
//!
//! A run is compiled into a flat list of [`Segment`]s and then played back
//! against the frame clock, the same way LED scripts are. Fades are linear;
//! a fade-out always starts from whatever intensity the light had when it
//! began, so a light cut short by another segment never jumps.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{LightEntry, LightsConfig};

/// Pause between two loops of a simultaneous sequence.
const SIMULTANEOUS_LOOP_GAP: f32 = 1.0;

/// How lights come on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMode {
    /// One light at a time, each running its whole cycle.
    #[default]
    Sequential,
    /// All lights fade in together.
    Simultaneous,
}

/// How lights go off in simultaneous mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndMode {
    /// One light after the other.
    #[default]
    Sequential,
    /// All lights fade out together.
    Simultaneous,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Targets {
    One(usize),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    Delay(f32),
    FadeIn(Targets, f32),
    FadeOut(Targets, f32),
    SwitchOn(usize),
}

impl Segment {
    fn length(self) -> f32 {
        match self {
            Self::Delay(t) | Self::FadeIn(_, t) | Self::FadeOut(_, t) => t.max(0.0),
            Self::SwitchOn(_) => 0.0,
        }
    }
}

/// Drives the intensities of a configured light list.
#[derive(Debug, Clone)]
pub struct LightSequencer {
    lights: Vec<LightEntry>,
    config: LightsConfig,
    intensities: Vec<f32>,
    plan: Vec<Segment>,
    cursor: usize,
    elapsed: f32,
    fade_from: Vec<f32>,
    current: Option<usize>,
    active: bool,
    loops: u32,
}

impl LightSequencer {
    /// Create a stopped sequencer; every light starts dark.
    #[must_use]
    pub fn new(config: LightsConfig) -> Self {
        if config.lights.is_empty() {
            warn!("light sequencer has no lights");
        }
        let lights = config.lights.clone();
        let n = lights.len();
        Self {
            lights,
            config,
            intensities: vec![0.0; n],
            plan: Vec::new(),
            cursor: 0,
            elapsed: 0.0,
            fade_from: vec![0.0; n],
            current: None,
            active: false,
            loops: 0,
        }
    }

    /// Start (or restart) the sequence.
    pub fn start(&mut self) {
        if self.active {
            self.stop();
        }
        info!(
            start = ?self.config.start_mode,
            end = ?self.config.end_mode,
            lights = self.lights.len(),
            "light sequence started"
        );
        self.active = true;
        self.loops = 0;
        self.plan = Vec::new();
        if self.config.initial_delay > 0.0 {
            self.plan.push(Segment::Delay(self.config.initial_delay));
        }
        self.plan.extend(self.loop_body());
        self.cursor = 0;
        self.elapsed = 0.0;
        self.enter_segment();
    }

    /// Stop and turn every light off.
    pub fn stop(&mut self) {
        self.active = false;
        self.current = None;
        self.plan.clear();
        self.intensities.iter_mut().for_each(|i| *i = 0.0);
        debug!("light sequence stopped");
    }

    /// Whether the sequence is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Index of the light currently being driven.
    #[must_use]
    pub fn current_light(&self) -> Option<usize> {
        self.current
    }

    /// Current intensity of every light.
    #[must_use]
    pub fn intensities(&self) -> &[f32] {
        &self.intensities
    }

    /// Current intensity of one light.
    #[must_use]
    pub fn intensity(&self, index: usize) -> Option<f32> {
        self.intensities.get(index).copied()
    }

    /// The configured lights.
    #[must_use]
    pub fn lights(&self) -> &[LightEntry] {
        &self.lights
    }

    /// Completed passes over the light list.
    #[must_use]
    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// Advance by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        let mut budget = dt.max(0.0);
        let mut wrapped = false;

        loop {
            let Some(&segment) = self.plan.get(self.cursor) else {
                self.loops += 1;
                if !self.config.loop_sequence || self.lights.is_empty() {
                    self.active = false;
                    self.current = None;
                    info!(loops = self.loops, "light sequence finished");
                    return;
                }
                // A second wrap in one frame means the body takes no time.
                if wrapped {
                    return;
                }
                wrapped = true;
                self.plan = self.loop_body();
                self.cursor = 0;
                self.elapsed = 0.0;
                self.enter_segment();
                continue;
            };

            let remaining = segment.length() - self.elapsed;
            if budget >= remaining {
                budget -= remaining;
                self.finish(segment);
                self.cursor += 1;
                self.elapsed = 0.0;
                self.enter_segment();
            } else {
                self.elapsed += budget;
                self.apply(segment, self.elapsed / segment.length());
                return;
            }
        }
    }

    fn loop_body(&self) -> Vec<Segment> {
        let mut body = Vec::new();
        match self.config.start_mode {
            StartMode::Sequential => {
                for (i, light) in self.lights.iter().enumerate() {
                    if self.config.use_progressive_start {
                        body.push(Segment::FadeIn(
                            Targets::One(i),
                            self.config.progressive_start_time,
                        ));
                    } else {
                        body.push(Segment::SwitchOn(i));
                    }
                    body.push(Segment::Delay(light.duration));
                    body.push(Segment::FadeOut(Targets::One(i), light.fade_out_time));
                    if light.delay_before_next > 0.0 {
                        body.push(Segment::Delay(light.delay_before_next));
                    }
                }
            }
            StartMode::Simultaneous => {
                body.push(Segment::FadeIn(
                    Targets::All,
                    self.config.simultaneous_start_time,
                ));
                let hold = self.lights.iter().map(|l| l.duration).fold(0.0, f32::max);
                body.push(Segment::Delay(hold));
                match self.config.end_mode {
                    EndMode::Sequential => {
                        for (i, light) in self.lights.iter().enumerate() {
                            body.push(Segment::FadeOut(Targets::One(i), light.fade_out_time));
                            if light.delay_before_next > 0.0 {
                                body.push(Segment::Delay(light.delay_before_next));
                            }
                        }
                    }
                    EndMode::Simultaneous => {
                        body.push(Segment::FadeOut(
                            Targets::All,
                            self.config.simultaneous_end_time,
                        ));
                    }
                }
                if self.config.loop_sequence {
                    body.push(Segment::Delay(SIMULTANEOUS_LOOP_GAP));
                }
            }
        }
        body
    }

    fn targets(&self, targets: Targets) -> std::ops::Range<usize> {
        match targets {
            Targets::One(i) => i..(i + 1).min(self.lights.len()),
            Targets::All => 0..self.lights.len(),
        }
    }

    fn enter_segment(&mut self) {
        let Some(&segment) = self.plan.get(self.cursor) else {
            return;
        };
        self.fade_from.clone_from(&self.intensities);
        match segment {
            Segment::FadeIn(Targets::One(i), _)
            | Segment::FadeOut(Targets::One(i), _)
            | Segment::SwitchOn(i) => {
                self.current = Some(i);
                debug!(light = i, name = %self.lights[i].name, "light segment");
            }
            Segment::FadeIn(Targets::All, _) | Segment::FadeOut(Targets::All, _) => {
                self.current = None;
            }
            Segment::Delay(_) => {}
        }
        if let Segment::FadeIn(..) = segment {
            self.apply(segment, 0.0);
        }
    }

    fn apply(&mut self, segment: Segment, ratio: f32) {
        let ratio = ratio.clamp(0.0, 1.0);
        match segment {
            Segment::FadeIn(targets, _) => {
                for i in self.targets(targets) {
                    self.intensities[i] = self.lights[i].intensity * ratio;
                }
            }
            Segment::FadeOut(targets, _) => {
                for i in self.targets(targets) {
                    self.intensities[i] = self.fade_from[i] * (1.0 - ratio);
                }
            }
            Segment::Delay(_) | Segment::SwitchOn(_) => {}
        }
    }

    fn finish(&mut self, segment: Segment) {
        match segment {
            Segment::FadeIn(targets, _) => {
                for i in self.targets(targets) {
                    self.intensities[i] = self.lights[i].intensity;
                }
            }
            Segment::SwitchOn(i) => {
                if let Some(light) = self.lights.get(i) {
                    self.intensities[i] = light.intensity;
                }
            }
            Segment::FadeOut(targets, _) => {
                for i in self.targets(targets) {
                    self.intensities[i] = 0.0;
                }
            }
            Segment::Delay(_) => {}
        }
    }
}
