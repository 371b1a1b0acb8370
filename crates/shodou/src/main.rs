//! Shodou - Blob Sequencing for Audiovisual Installations
//!
//! Replays a recorded capture of detected contours through the sequencing
//! engine and sends the resulting notes to a MIDI port.

mod logging_setup;
mod runner;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use runner::{ConsoleInput, LogSink, RunOptions, Runner};
use shodou_control::KeyBindings;
use shodou_core::{AnimationManager, NoteSink, RigConfig, ScanMode};
use shodou_io::Capture;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a capture file through the sequencers
    Play {
        /// Capture file (.ron or .json)
        capture: PathBuf,
        /// Rig configuration file; the built-in rig when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the capture's frame rate
        #[arg(long)]
        fps: Option<f32>,
        /// Sequencers to start, by index
        #[arg(short, long, value_delimiter = ',')]
        play: Vec<usize>,
        /// Start every sequencer
        #[arg(long)]
        all: bool,
        /// Log notes instead of sending MIDI
        #[arg(long)]
        dry_run: bool,
        /// Start in manual scan mode
        #[arg(long)]
        manual: bool,
        /// Passes over the capture; loops forever when omitted
        #[arg(long)]
        loops: Option<usize>,
        /// Do not sleep between frames
        #[arg(long)]
        fast: bool,
        /// Key bindings file (JSON)
        #[arg(long)]
        bindings: Option<PathBuf>,
        /// Ignore stdin
        #[arg(long)]
        no_console: bool,
        /// Only log to the console
        #[arg(long)]
        no_log_file: bool,
    },
    /// List MIDI output ports
    Ports,
    /// Write the built-in rig configuration to a file
    InitConfig {
        /// Destination (.ron or .json)
        path: PathBuf,
    },
}

struct PlayArgs {
    capture: PathBuf,
    fps: Option<f32>,
    play: Vec<usize>,
    all: bool,
    dry_run: bool,
    manual: bool,
    loops: Option<usize>,
    fast: bool,
    bindings: Option<PathBuf>,
    no_console: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            capture,
            config,
            fps,
            play,
            all,
            dry_run,
            manual,
            loops,
            fast,
            bindings,
            no_console,
            no_log_file,
        } => {
            let mut rig = load_rig(config.as_deref())?;
            if no_log_file {
                rig.logging.file_output = false;
            }
            let _log_guard = logging_setup::init(&rig.logging)?;

            info!("==========================================");
            info!("===       Shodou Session Started       ===");
            info!("==========================================");

            play_capture(
                &rig,
                PlayArgs {
                    capture,
                    fps,
                    play,
                    all,
                    dry_run,
                    manual,
                    loops,
                    fast,
                    bindings,
                    no_console,
                },
            )
        }
        Commands::Ports => list_ports(),
        Commands::InitConfig { path } => {
            RigConfig::default()
                .save(&path)
                .with_context(|| format!("Failed to write rig config: {:?}", path))?;
            println!("Wrote default rig to {}", path.display());
            Ok(())
        }
    }
}

fn load_rig(path: Option<&Path>) -> Result<RigConfig> {
    match path {
        Some(path) => RigConfig::load(path)
            .with_context(|| format!("Failed to load rig config: {:?}", path)),
        None => Ok(RigConfig::default()),
    }
}

fn play_capture(rig: &RigConfig, args: PlayArgs) -> Result<()> {
    let mut capture = Capture::load(&args.capture)
        .with_context(|| format!("Failed to load capture: {:?}", args.capture))?;
    if let Some(fps) = args.fps {
        if !fps.is_finite() || fps <= 0.0 {
            bail!("--fps must be positive, got {}", fps);
        }
        capture.fps = fps;
    }

    let bindings = match &args.bindings {
        Some(path) => KeyBindings::load_from_file(path)
            .with_context(|| format!("Failed to load key bindings: {:?}", path))?,
        None => KeyBindings::new(),
    };

    if args.dry_run {
        return run_with_sink(rig, &capture, bindings, LogSink, &args);
    }

    #[cfg(feature = "midi")]
    {
        let transport = shodou_control::MidirTransport::open(&rig.midi_port)
            .context("Failed to open MIDI output")?;
        let output = shodou_control::MidiNoteOutput::new(transport);
        run_with_sink(rig, &capture, bindings, output, &args)
    }

    #[cfg(not(feature = "midi"))]
    {
        warn!("Built without MIDI support, logging notes instead");
        run_with_sink(rig, &capture, bindings, LogSink, &args)
    }
}

fn run_with_sink<N: NoteSink>(
    rig: &RigConfig,
    capture: &Capture,
    bindings: KeyBindings,
    sink: N,
    args: &PlayArgs,
) -> Result<()> {
    let mut engine = rig.build_engine(sink, AnimationManager::new());

    let count = engine.sequencers().len();
    let selected: Vec<usize> = if args.all {
        (0..count).collect()
    } else {
        args.play.clone()
    };
    for &index in &selected {
        if index >= count {
            warn!("No sequencer {} (rig has {})", index, count);
            continue;
        }
        engine.play(index);
    }

    let input = if args.no_console {
        crossbeam_channel::never::<ConsoleInput>()
    } else {
        info!("Console ready: type a key name (q, w, backspace, m, esc) or 'pick X Y'");
        runner::spawn_console()
    };

    let scan_mode = if args.manual {
        ScanMode::Manual
    } else {
        ScanMode::Auto
    };

    let options = RunOptions {
        dt: capture.frame_interval(),
        loops: args.loops,
        realtime: !args.fast,
        status_interval: 5.0,
    };

    let mut runner = Runner::new(engine, bindings, scan_mode, input);
    let played = runner.run(capture, &options);
    info!(
        "Session finished after {} frames, {} blobs held, {:?} scan",
        played,
        runner.engine().blobs().len(),
        runner.scan_mode()
    );
    Ok(())
}

#[cfg(feature = "midi")]
fn list_ports() -> Result<()> {
    let ports = shodou_control::MidirTransport::list_ports().context("Failed to query MIDI")?;
    if ports.is_empty() {
        println!("No MIDI output ports");
    }
    for (i, name) in ports.iter().enumerate() {
        println!("{}: {}", i, name);
    }
    Ok(())
}

#[cfg(not(feature = "midi"))]
fn list_ports() -> Result<()> {
    bail!("Built without MIDI support")
}
