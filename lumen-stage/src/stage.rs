//! The scene coordinator.
//!
//! [`Stage`] owns every controller of the installation and is handed by
//! reference to whoever needs it. Device threads only see the two
//! [`Dispatcher`] queues; everything else runs on the frame loop.

use std::collections::VecDeque;
use std::time::Duration;

use lumen_core::camera::CameraRig;
use lumen_core::config::LumenConfig;
use lumen_core::dialogue::{DialogueStage, GlyphLibrary};
use lumen_core::esp32::{ButtonBoard, MqttEvent};
use lumen_core::grid::GridMap;
use lumen_core::led::LedSurface;
use lumen_core::lights::{Flicker, LightSequencer, RandomLightSwitch};
use lumen_core::monster::{MonsterAgent, MonsterEvent};
use lumen_core::pad::{self, PadEvent};
use lumen_core::picker::CellPicker;
use lumen_core::pixel_art::PixelArtDisplay;
use lumen_core::player::{MoodTrigger, PlayerMotor, Sanity};
use lumen_core::simon::{SimonEvent, SimonGame};
use lumen_io::Dispatcher;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};
use vek::Vec3;

use crate::events::StageEvent;
use crate::hooks::{LightZone, PLAYER_TAG, TriggerVolume, ZoneCrossing};

/// Pad events buffered between two frames.
pub const PAD_QUEUE_CAPACITY: usize = 256;
/// Seconds between two [`StageEvent::PlayerFear`] events.
pub const FEAR_INTERVAL: f32 = 1.0;

struct ZoneSlot {
    zone: LightZone,
    counted: bool,
}

/// Every controller of the scene.
pub struct Stage<P: CellPicker> {
    config: LumenConfig,
    simon: SimonGame<P>,
    light_picker: P,
    pixel_art: PixelArtDisplay,
    buttons: ButtonBoard,
    switch: RandomLightSwitch,
    sequencer: LightSequencer,
    flickers: Vec<Flicker<StdRng>>,
    camera: CameraRig,
    player: PlayerMotor,
    stick: (f32, f32),
    sanity: Sanity,
    moods: Vec<MoodTrigger>,
    monsters: Vec<MonsterAgent>,
    dialogues: Vec<DialogueStage<GlyphLibrary>>,
    triggers: Vec<TriggerVolume>,
    zones: Vec<ZoneSlot>,
    pads: Dispatcher<PadEvent>,
    mqtt: Dispatcher<MqttEvent>,
    events: VecDeque<StageEvent>,
    scores: Vec<u32>,
    fear_timer: f32,
    frame: u64,
}

impl<P: CellPicker> Stage<P> {
    /// Build the scene from `config`.
    ///
    /// `simon_picker` draws Simon cells, `light_picker` draws the light the
    /// button board switches on.
    #[must_use]
    pub fn new(config: LumenConfig, simon_picker: P, light_picker: P) -> Self {
        let grid = GridMap::new(config.launchpad.layout);
        let simon = SimonGame::new(config.simon.clone(), grid.clone(), simon_picker);
        let slots = config
            .lights
            .lights
            .iter()
            .map(|light| (!light.name.is_empty()).then(|| light.name.clone()))
            .collect();
        let mut sequencer = LightSequencer::new(config.lights.clone());
        if !config.lights.lights.is_empty() {
            sequencer.start();
        }
        let player = PlayerMotor::new(config.player.clone(), Vec3::zero());
        let mut camera = CameraRig::new(config.camera.clone());
        camera.snap_to(player.position());

        info!(
            layout = ?config.launchpad.layout,
            lights = config.lights.lights.len(),
            view = ?camera.view_mode(),
            "stage ready"
        );

        Self {
            pixel_art: PixelArtDisplay::new(grid),
            buttons: ButtonBoard::new(&config.mqtt),
            switch: RandomLightSwitch::new(slots),
            pads: Dispatcher::new(PAD_QUEUE_CAPACITY),
            mqtt: Dispatcher::new(config.mqtt.queue_capacity),
            simon,
            light_picker,
            sequencer,
            flickers: Vec::new(),
            camera,
            player,
            stick: (0.0, 0.0),
            sanity: Sanity::new(),
            moods: Vec::new(),
            monsters: Vec::new(),
            dialogues: Vec::new(),
            triggers: Vec::new(),
            zones: Vec::new(),
            events: VecDeque::new(),
            scores: Vec::new(),
            fear_timer: 0.0,
            frame: 0,
            config,
        }
    }

    // -- scene setup --------------------------------------------------------

    /// Place a trigger volume.
    pub fn add_trigger(&mut self, trigger: TriggerVolume) {
        debug!(trigger = trigger.name(), "trigger placed");
        self.triggers.push(trigger);
    }

    /// Place a light zone.
    pub fn add_light_zone(&mut self, zone: LightZone) {
        self.zones.push(ZoneSlot { zone, counted: false });
    }

    /// Add a flickering light.
    pub fn add_flicker(&mut self, flicker: Flicker<StdRng>) {
        self.flickers.push(flicker);
    }

    /// Queue an event for the next [`drain_events`](Self::drain_events).
    pub fn push_event(&mut self, event: StageEvent) {
        self.events.push_back(event);
    }

    // -- queues ---------------------------------------------------------------

    /// Producer handle for pad events (give it to the MIDI transport).
    #[must_use]
    pub fn pad_queue(&self) -> Dispatcher<PadEvent> {
        self.pads.clone()
    }

    /// Producer handle for broker events (give it to the MQTT bridge).
    #[must_use]
    pub fn mqtt_queue(&self) -> Dispatcher<MqttEvent> {
        self.mqtt.clone()
    }

    // -- per-frame steps ------------------------------------------------------

    /// Route one event to its controller.
    pub fn dispatch(&mut self, event: StageEvent, surface: &mut dyn LedSurface) {
        if event.is_per_frame() {
            trace!(event = event.name(), "stage event");
        } else {
            debug!(event = event.name(), "stage event");
        }

        match event {
            StageEvent::PlayerJump => {
                self.player.jump();
            }
            StageEvent::PlayerMove { h, v } => self.stick = (h, v),
            StageEvent::PlayerFear => {
                if let Some(trigger) = self.sanity.tick() {
                    info!(?trigger, step = ?self.sanity.fear_step(), "mood changed");
                    self.moods.push(trigger);
                }
            }
            StageEvent::MonsterListener(point) => {
                for monster in &mut self.monsters {
                    monster.follow(false);
                    monster.set_destination(point);
                }
            }
            StageEvent::ViewMode(mode) => self.camera.set_view_mode(mode),
            StageEvent::DialogueRequested { position, texts } => {
                let settings = lumen_core::config::DialogueConfig {
                    texts,
                    ..self.config.dialogue.clone()
                };
                let mut dialogue = DialogueStage::new(settings, GlyphLibrary::standard(), position);
                dialogue.start();
                self.dialogues.push(dialogue);
            }
            StageEvent::SpawnMonster { position } => {
                self.monsters
                    .push(MonsterAgent::spawn_following(&self.config.monster, position));
            }
            StageEvent::ArmSimon => self.simon.arm(),
            StageEvent::ShowPixelArt(image) => self.pixel_art.show(image, surface),
        }
    }

    /// Dispatch every queued stage event, including ones raised meanwhile.
    pub fn drain_events(&mut self, surface: &mut dyn LedSurface) {
        while let Some(event) = self.events.pop_front() {
            self.dispatch(event, surface);
        }
    }

    /// Forward queued pad input to the Simon game.
    pub fn drain_pads(&mut self) {
        for event in self.pads.drain() {
            debug!(input = %pad::describe(self.simon.grid(), &event), "pad");
            if self.simon.is_armed() {
                let outcome = self.simon.handle_pad(event);
                trace!(?outcome, "simon input");
            }
        }
    }

    /// Handle broker traffic; each button press switches to a random light.
    pub fn drain_mqtt(&mut self) {
        let batch = self.mqtt.drain();
        for button in self.buttons.process(batch) {
            let chosen = self.switch.activate_random(&mut self.light_picker);
            info!(?button, light = ?chosen, "button switched lights");
        }
        self.buttons.status_tick(self.frame);
    }

    /// Move the player and run everything that follows them.
    pub fn update_actors(&mut self, dt: f32) {
        let (h, v) = self.stick;
        self.player.move_axis(h, v, dt);
        self.player.update(dt);
        let target = self.player.position();
        self.camera.update(target, dt);

        for monster in &mut self.monsters {
            monster.update(dt, target);
            for event in monster.drain_events() {
                match event {
                    MonsterEvent::StartedMoving => debug!("monster moving"),
                    MonsterEvent::ReachedDestination => debug!(position = ?monster.position(), "monster arrived"),
                }
            }
        }

        self.fear_timer += dt;
        while self.fear_timer >= FEAR_INTERVAL {
            self.fear_timer -= FEAR_INTERVAL;
            self.events.push_back(StageEvent::PlayerFear);
        }
    }

    /// Fire trigger volumes the player crossed into; spent one-shots go away.
    pub fn check_triggers(&mut self) {
        let position = self.player.position();
        let view_mode = self.camera.view_mode();
        for trigger in &mut self.triggers {
            if let Some(event) = trigger.track(PLAYER_TAG, position, view_mode) {
                self.events.push_back(event);
            }
        }
        self.triggers.retain(|trigger| !trigger.is_spent());
    }

    /// Update sanity from the lit zones the player stands in.
    pub fn check_light_zones(&mut self) {
        let position = self.player.position();
        for slot in &mut self.zones {
            match slot.zone.track(position) {
                Some(ZoneCrossing::Entered) => {
                    let intensity = light_level(&self.sequencer, &self.switch, slot.zone.light());
                    if intensity > 0.0 {
                        self.sanity.enter_light(intensity);
                        slot.counted = true;
                    }
                }
                Some(ZoneCrossing::Exited) if slot.counted => {
                    self.sanity.exit_light();
                    slot.counted = false;
                }
                _ => {}
            }
        }
    }

    /// Advance lights, dialogues and the Launchpad games.
    pub fn update_effects(&mut self, dt: Duration, surface: &mut dyn LedSurface) {
        let secs = dt.as_secs_f32();
        self.sequencer.update(secs);
        for flicker in &mut self.flickers {
            flicker.update(secs);
        }

        for dialogue in &mut self.dialogues {
            dialogue.update(secs);
        }
        self.dialogues.retain(|dialogue| !dialogue.is_finished());

        self.simon.update(dt, surface);
        for event in self.simon.drain_events() {
            if let SimonEvent::Score(score) = event {
                info!(score, "simon session over");
                self.scores.push(score);
            }
        }
    }

    /// Count a finished frame.
    pub fn end_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    // -- accessors --------------------------------------------------------------

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &LumenConfig {
        &self.config
    }

    /// Frames completed.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The Simon game.
    #[must_use]
    pub fn simon(&self) -> &SimonGame<P> {
        &self.simon
    }

    /// The Simon game, mutably.
    pub fn simon_mut(&mut self) -> &mut SimonGame<P> {
        &mut self.simon
    }

    /// Scores of finished Simon sessions, oldest first.
    #[must_use]
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// The pixel-art display.
    #[must_use]
    pub fn pixel_art(&self) -> &PixelArtDisplay {
        &self.pixel_art
    }

    /// The pixel-art display, mutably.
    pub fn pixel_art_mut(&mut self) -> &mut PixelArtDisplay {
        &mut self.pixel_art
    }

    /// The ESP32 button board.
    #[must_use]
    pub fn buttons(&self) -> &ButtonBoard {
        &self.buttons
    }

    /// The random light switch.
    #[must_use]
    pub fn switch(&self) -> &RandomLightSwitch {
        &self.switch
    }

    /// The light sequencer.
    #[must_use]
    pub fn sequencer(&self) -> &LightSequencer {
        &self.sequencer
    }

    /// Flickering lights.
    #[must_use]
    pub fn flickers(&self) -> &[Flicker<StdRng>] {
        &self.flickers
    }

    /// The camera rig.
    #[must_use]
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// The player body.
    #[must_use]
    pub fn player(&self) -> &PlayerMotor {
        &self.player
    }

    /// The player's sanity meter.
    #[must_use]
    pub fn sanity(&self) -> &Sanity {
        &self.sanity
    }

    /// Mood triggers fired so far.
    #[must_use]
    pub fn moods(&self) -> &[MoodTrigger] {
        &self.moods
    }

    /// Spawned monsters.
    #[must_use]
    pub fn monsters(&self) -> &[MonsterAgent] {
        &self.monsters
    }

    /// Dialogues still on screen.
    #[must_use]
    pub fn dialogues(&self) -> &[DialogueStage<GlyphLibrary>] {
        &self.dialogues
    }

    /// Trigger volumes not yet spent.
    #[must_use]
    pub fn triggers(&self) -> &[TriggerVolume] {
        &self.triggers
    }

    /// Stage events waiting for dispatch.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

/// Brightness of light `index`: the sequencer fade, or full when the
/// button board switched it on.
fn light_level(sequencer: &LightSequencer, switch: &RandomLightSwitch, index: usize) -> f32 {
    let faded = sequencer.intensity(index).unwrap_or(0.0);
    let switched = if switch.states().get(index).copied().unwrap_or(false) {
        1.0
    } else {
        0.0
    };
    faded.max(switched)
}

impl<P: CellPicker> std::fmt::Debug for Stage<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("frame", &self.frame)
            .field("simon", &self.simon.state())
            .field("monsters", &self.monsters.len())
            .field("dialogues", &self.dialogues.len())
            .field("triggers", &self.triggers.len())
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}
