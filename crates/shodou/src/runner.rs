//! Frame loop replaying a capture through the engine
//!
//! Operator input arrives on a channel fed by a console thread; it is drained
//! at the start of every frame, before ingestion and the engine tick.

use crossbeam_channel::{Receiver, Sender};
use shodou_control::{Key, KeyBindings};
use shodou_core::{
    ingest_at_point, ingest_frame, AnimationManager, BlobSequencingEngine, NoteSink, RawFrame,
    ScanMode, Sequence,
};
use shodou_io::Capture;
use std::io::BufRead;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One line of console input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleInput {
    /// A key name, looked up in the bindings
    Key(Key),
    /// Pick the blobs under a point of the current frame (manual mode)
    Pick { x: f32, y: f32 },
}

impl ConsoleInput {
    /// Parse `pick X Y` or a single key name
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let first = parts.next()?;
        if first.eq_ignore_ascii_case("pick") {
            let x = parts.next()?.parse().ok()?;
            let y = parts.next()?.parse().ok()?;
            return Some(ConsoleInput::Pick { x, y });
        }
        if parts.next().is_some() {
            return None;
        }
        Key::parse(first).map(ConsoleInput::Key)
    }
}

/// Read stdin lines on a background thread
pub fn spawn_console() -> Receiver<ConsoleInput> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || read_console(tx));
    rx
}

fn read_console(tx: Sender<ConsoleInput>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        match ConsoleInput::parse(&line) {
            Some(input) => {
                if tx.send(input).is_err() {
                    break;
                }
            }
            None if line.trim().is_empty() => {}
            None => warn!("Unknown input: {}", line.trim()),
        }
    }
}

/// Playback settings
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Seconds per frame; must be positive
    pub dt: f32,
    /// Stop after this many passes over the capture; forever when `None`
    pub loops: Option<usize>,
    /// Sleep to hold the frame rate instead of running as fast as possible
    pub realtime: bool,
    /// Seconds between status lines
    pub status_interval: f32,
}

/// Engine plus the operator state around it
pub struct Runner<N: NoteSink> {
    engine: BlobSequencingEngine<N, AnimationManager>,
    bindings: KeyBindings,
    scan_mode: ScanMode,
    input: Receiver<ConsoleInput>,
}

impl<N: NoteSink> Runner<N> {
    pub fn new(
        engine: BlobSequencingEngine<N, AnimationManager>,
        bindings: KeyBindings,
        scan_mode: ScanMode,
        input: Receiver<ConsoleInput>,
    ) -> Self {
        Self {
            engine,
            bindings,
            scan_mode,
            input,
        }
    }

    pub fn engine(&self) -> &BlobSequencingEngine<N, AnimationManager> {
        &self.engine
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }

    /// Drain pending input; `false` once quit was requested
    fn handle_input(&mut self, frame: &RawFrame) -> bool {
        while let Ok(input) = self.input.try_recv() {
            match input {
                ConsoleInput::Key(key) => match self.bindings.find_action(key) {
                    Some(action) => {
                        debug!("Key {:?} -> {:?}", key, action);
                        if !action.apply(&mut self.engine, &mut self.scan_mode) {
                            return false;
                        }
                    }
                    None => debug!("Unbound key {:?}", key),
                },
                ConsoleInput::Pick { x, y } => {
                    if self.scan_mode == ScanMode::Manual {
                        ingest_at_point(&mut self.engine, frame, x, y);
                    } else {
                        warn!("Picking blobs requires manual scan mode");
                    }
                }
            }
        }
        true
    }

    /// Run one frame; `false` once quit was requested
    pub fn step(&mut self, frame: &RawFrame, dt: f32) -> bool {
        if !self.handle_input(frame) {
            return false;
        }
        if self.scan_mode == ScanMode::Auto {
            ingest_frame(&mut self.engine, frame);
        }
        self.engine.tick(dt);
        true
    }

    /// Replay `capture`; returns the number of frames played
    pub fn run(&mut self, capture: &Capture, options: &RunOptions) -> usize {
        if capture.is_empty() {
            warn!("Capture has no frames");
            return 0;
        }

        let mut played = 0;
        let mut passes = 0;
        let mut since_status = 0.0;

        'session: loop {
            for frame in &capture.frames {
                let started = Instant::now();
                if !self.step(frame, options.dt) {
                    info!("Quit requested");
                    break 'session;
                }
                played += 1;

                since_status += options.dt;
                if since_status >= options.status_interval {
                    since_status = 0.0;
                    self.log_status();
                }

                if options.realtime {
                    let frame_time = Duration::from_secs_f32(options.dt);
                    if let Some(rest) = frame_time.checked_sub(started.elapsed()) {
                        thread::sleep(rest);
                    }
                }
            }

            passes += 1;
            if options.loops.is_some_and(|n| passes >= n) {
                break;
            }
        }

        played
    }

    fn log_status(&self) {
        let playing: Vec<usize> = self
            .engine
            .sequencers()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_playing())
            .map(|(i, _)| i)
            .collect();
        info!(
            "Status: {} blobs, playing {:?}, {} animations, {:?} scan",
            self.engine.blobs().len(),
            playing,
            self.engine.animation_sink().len(),
            self.scan_mode
        );
    }
}

/// Note sink for dry runs: notes only go to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl NoteSink for LogSink {
    fn note_on(&mut self, pitch: u8, velocity: u8, channel: u8, duration: f32) {
        info!(
            "note ch={:>2} pitch={:>3} vel={:>3} dur={:.2}s",
            channel, pitch, velocity, duration
        );
    }

    fn control_change(&mut self, controller: u8, value: u8, channel: u8) {
        debug!("cc   ch={:>2} cc={:>3} value={:>3}", channel, controller, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shodou_core::{NoteLog, OrdinalSequencer, RawBlob, Rect, Rgba, Vec2};

    fn frame() -> RawFrame {
        let blob = |x: f32, y: f32, side: f32| RawBlob {
            points: vec![Vec2::new(x, y)],
            bounding_rect: Rect::new(x, y, side, side),
            centroid: Vec2::new(x + side / 2.0, y + side / 2.0),
            area: side * side,
            length: side * 4.0,
            hole: false,
        };
        RawFrame {
            width: 100.0,
            height: 100.0,
            offset_w: 0.0,
            blobs: vec![blob(10.0, 10.0, 40.0), blob(20.0, 20.0, 10.0), blob(70.0, 70.0, 10.0)],
        }
    }

    fn runner(scan_mode: ScanMode) -> (Runner<NoteLog>, Sender<ConsoleInput>) {
        let mut engine = BlobSequencingEngine::new(NoteLog::new(), AnimationManager::new());
        engine.add_sequencer(OrdinalSequencer::new(0.25, true, 1, Rgba::WHITE));
        let (tx, rx) = crossbeam_channel::unbounded();
        (
            Runner::new(engine, KeyBindings::new(), scan_mode, rx),
            tx,
        )
    }

    #[test]
    fn test_console_parse() {
        assert_eq!(
            ConsoleInput::parse("q"),
            Some(ConsoleInput::Key(Key::Char('q')))
        );
        assert_eq!(
            ConsoleInput::parse("pick 12.5 40"),
            Some(ConsoleInput::Pick { x: 12.5, y: 40.0 })
        );
        assert_eq!(ConsoleInput::parse("pick 1"), None);
        assert_eq!(ConsoleInput::parse("q w"), None);
        assert_eq!(ConsoleInput::parse("   "), None);
    }

    #[test]
    fn test_auto_mode_ingests_every_frame() {
        let (mut runner, tx) = runner(ScanMode::Auto);
        tx.send(ConsoleInput::Key(Key::Char('q'))).unwrap();

        assert!(runner.step(&frame(), 0.1));
        assert_eq!(runner.engine().blobs().len(), 3);
        assert!(runner.engine().sequencers()[0].is_playing());
        assert_eq!(runner.engine().note_sink().note_count(), 1);
    }

    #[test]
    fn test_manual_mode_picks_at_point() {
        let (mut runner, tx) = runner(ScanMode::Manual);
        assert!(runner.step(&frame(), 0.1));
        assert!(runner.engine().blobs().is_empty());

        tx.send(ConsoleInput::Pick { x: 15.0, y: 15.0 }).unwrap();
        assert!(runner.step(&frame(), 0.1));
        assert_eq!(runner.engine().blobs().len(), 2);

        tx.send(ConsoleInput::Key(Key::Backspace)).unwrap();
        tx.send(ConsoleInput::Key(Key::Char('m'))).unwrap();
        assert!(runner.step(&frame(), 0.1));
        assert_eq!(runner.scan_mode(), ScanMode::Auto);
        assert_eq!(runner.engine().blobs().len(), 3);
    }

    #[test]
    fn test_run_loops_and_quits() {
        let (mut runner, tx) = runner(ScanMode::Auto);
        let mut capture = Capture::new(10.0);
        for _ in 0..4 {
            capture.push_frame(frame());
        }
        let options = RunOptions {
            dt: capture.frame_interval(),
            loops: Some(2),
            realtime: false,
            status_interval: 1.0,
        };
        assert_eq!(runner.run(&capture, &options), 8);

        tx.send(ConsoleInput::Key(Key::Escape)).unwrap();
        let forever = RunOptions {
            loops: None,
            ..options
        };
        assert_eq!(runner.run(&capture, &forever), 0);
    }
}
