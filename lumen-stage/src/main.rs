//! `lumen`: drive the installation from the command line.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lumen_core::config::LumenConfig;
use lumen_core::dialogue::{self, GlyphLibrary};
use lumen_core::led::{self, LedSurface, RecordingSurface};
use lumen_core::pad;
use lumen_core::picker::{CellPicker, RngPicker};
use lumen_core::pixel_art::PixelArtImage;
use lumen_core::GridMap;
use lumen_io::{Dispatcher, Launchpad, LaunchpadPorts, MqttBridge, PortListing, PortWatcher};
use lumen_stage::{logging, run_frame, Stage, StageEvent};
use serde_json::json;
use tracing::{info, warn};

const RECONNECT_WAIT: Duration = Duration::from_secs(1);

#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Launchpad games, MQTT lights and dialogue reveal for the Lumen installation")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Stop after this many frames.
    #[arg(long, global = true)]
    frames: Option<u64>,
    /// Log as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    /// Run without a Launchpad; LED output is recorded and discarded.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,
    /// Seed for the random pickers.
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play the Simon memory game.
    Simon,
    /// Show a pixel-art image.
    PixelArt {
        #[arg(long)]
        image: Option<PixelArtImage>,
    },
    /// Log every pad press.
    Pads,
    /// Switch lights from the ESP32 button board.
    MqttLights,
    /// Print the reveal plan of a dialogue text as JSON.
    Dialogue { text: String },
    /// List MIDI ports.
    Ports,
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => LumenConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => LumenConfig::default(),
    };
    logging::init(&config.general.log_level, cli.log_json)?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)).context("installing Ctrl-C handler")?;

    match &cli.command {
        Commands::Simon => cmd_simon(&cli, config, &running),
        Commands::PixelArt { image } => cmd_pixel_art(&cli, config, *image, &running),
        Commands::Pads => cmd_pads(&cli, &config, &running),
        Commands::MqttLights => cmd_mqtt_lights(&cli, config, &running),
        Commands::Dialogue { text } => cmd_dialogue(&config, text),
        Commands::Ports => cmd_ports(),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn new_stage(cli: &Cli, config: LumenConfig) -> Stage<RngPicker<rand::rngs::StdRng>> {
    let (simon, lights) = match cli.seed {
        Some(seed) => (RngPicker::seeded(seed), RngPicker::seeded(seed.wrapping_add(1))),
        None => (RngPicker::from_entropy(), RngPicker::from_entropy()),
    };
    Stage::new(config, simon, lights)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    /// Ctrl-C or the frame limit.
    Stopped,
    /// MIDI devices were plugged or unplugged.
    PortsChanged,
}

/// Run `stage` on the Launchpad, or on a recording surface when offline.
///
/// A change in the MIDI port list closes the device and reconnects; the
/// current pixel-art image is drawn again on the new connection.
fn drive<P: CellPicker>(
    cli: &Cli,
    stage: &mut Stage<P>,
    setup: &[StageEvent],
    running: &AtomicBool,
) -> Result<()> {
    for event in setup {
        stage.push_event(event.clone());
    }

    if cli.offline {
        let mut surface = RecordingSurface::new();
        frame_loop(stage, &mut surface, cli.frames, running, None);
        info!(commands = surface.log().len(), "offline run finished");
        return Ok(());
    }

    let mut watcher = PortWatcher::new()?;
    loop {
        let Some(mut launchpad) = connect_launchpad(stage, running) else {
            return Ok(());
        };
        led::reset_all(launchpad.output());
        stage.pixel_art_mut().redraw(launchpad.output());

        let exit = frame_loop(stage, launchpad.output(), cli.frames, running, Some(&mut watcher));
        launchpad.close();
        if exit == LoopExit::Stopped {
            return Ok(());
        }
        info!("rescanning midi ports");
    }
}

/// Scan until a matching Launchpad opens or the user stops.
fn connect_launchpad<P: CellPicker>(stage: &Stage<P>, running: &AtomicBool) -> Option<Launchpad> {
    let name = &stage.config().launchpad.device_name_contains;
    while running.load(Ordering::SeqCst) {
        match LaunchpadPorts::scan(name).and_then(|ports| ports.connect(stage.pad_queue())) {
            Ok(launchpad) => return Some(launchpad),
            Err(e) => {
                warn!(error = %e, retry_in = ?RECONNECT_WAIT, "launchpad not available");
                std::thread::sleep(RECONNECT_WAIT);
            }
        }
    }
    None
}

fn frame_loop<P: CellPicker>(
    stage: &mut Stage<P>,
    surface: &mut dyn LedSurface,
    frames: Option<u64>,
    running: &AtomicBool,
    mut watcher: Option<&mut PortWatcher>,
) -> LoopExit {
    let frame_time = stage.config().general.frame_time();
    let mut last = Instant::now();

    while running.load(Ordering::SeqCst) {
        if frames.is_some_and(|limit| stage.frame() >= limit) {
            break;
        }
        if let Some(watcher) = watcher.as_deref_mut() {
            if watcher.changed() {
                return LoopExit::PortsChanged;
            }
        }

        let now = Instant::now();
        let dt = now - last;
        last = now;
        run_frame(stage, dt, surface);

        let spent = now.elapsed();
        if spent < frame_time {
            std::thread::sleep(frame_time - spent);
        }
    }
    info!(frames = stage.frame(), "frame loop stopped");
    LoopExit::Stopped
}

fn cmd_simon(cli: &Cli, config: LumenConfig, running: &AtomicBool) -> Result<()> {
    let mut stage = new_stage(cli, config);
    drive(cli, &mut stage, &[StageEvent::ArmSimon], running)?;
    if let Some(score) = stage.scores().last() {
        info!(score, sessions = stage.scores().len(), "simon finished");
    }
    Ok(())
}

fn cmd_pixel_art(cli: &Cli, config: LumenConfig, image: Option<PixelArtImage>, running: &AtomicBool) -> Result<()> {
    let image = image.unwrap_or(config.pixel_art.image);
    let mut stage = new_stage(cli, config);
    drive(cli, &mut stage, &[StageEvent::ShowPixelArt(image)], running)
}

fn cmd_mqtt_lights(cli: &Cli, config: LumenConfig, running: &AtomicBool) -> Result<()> {
    let mut stage = new_stage(cli, config);
    let mut bridge = MqttBridge::spawn(&stage.config().mqtt, stage.mqtt_queue())?;
    info!(client_id = bridge.client_id(), "waiting for button presses");

    let mut surface = RecordingSurface::new();
    frame_loop(&mut stage, &mut surface, cli.frames, running, None);
    bridge.disconnect();
    if let Some(name) = stage.switch().current_name() {
        info!(light = name, "last light on");
    }
    Ok(())
}

fn cmd_pads(cli: &Cli, config: &LumenConfig, running: &AtomicBool) -> Result<()> {
    let grid = GridMap::new(config.launchpad.layout);
    let events = Dispatcher::new(lumen_stage::stage::PAD_QUEUE_CAPACITY);
    let ports = LaunchpadPorts::scan(&config.launchpad.device_name_contains).context("looking for a Launchpad")?;
    let launchpad = ports.connect(events.clone())?;
    info!(name = launchpad.name(), "press pads; Ctrl-C to stop");

    let frame_time = config.general.frame_time();
    let mut frame = 0u64;
    while running.load(Ordering::SeqCst) && cli.frames.is_none_or(|limit| frame < limit) {
        for event in events.drain() {
            info!(?event, input = %pad::describe(&grid, &event), "pad");
        }
        frame += 1;
        std::thread::sleep(frame_time);
    }
    launchpad.close();
    Ok(())
}

fn cmd_dialogue(config: &LumenConfig, text: &str) -> Result<()> {
    let processed = dialogue::process_modifiers(text);
    let glyphs = GlyphLibrary::standard();
    let plan = dialogue::layout_reveal(&processed, &config.dialogue, &glyphs);
    let total = dialogue::reveal::reveal_time(&plan);

    let glyphs: Vec<_> = plan
        .iter()
        .map(|p| {
            json!({
                "char": p.ch.to_string(),
                "glyph": p.glyph,
                "offset": [p.offset.x, p.offset.y, p.offset.z],
                "delay": p.delay,
                "bob": p.bob,
            })
        })
        .collect();
    let out = json!({
        "text": processed.text,
        "reveal_secs": total,
        "glyphs": glyphs,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_ports() -> Result<()> {
    let listing = PortListing::scan()?;
    println!("inputs:");
    for name in &listing.inputs {
        println!("  {name}");
    }
    println!("outputs:");
    for name in &listing.outputs {
        println!("  {name}");
    }
    Ok(())
}
