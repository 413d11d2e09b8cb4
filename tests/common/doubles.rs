use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use eyewatch::detector::FaceLandmarks;
use eyewatch::overlay::Overlay;
use eyewatch::ports::{
    CueError, CuePlayer, FrameSource, LandmarkDetector, Renderer, SourceError, StopSignal,
};

/// A frame is just the faces the detector double should report.
pub type Frame = Vec<FaceLandmarks>;

pub enum Step {
    Frame(Frame),
    Fail,
}

#[derive(Default)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
    pub delivered: usize,
    pub releases: usize,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            steps: frames.into_iter().map(Step::Frame).collect(),
            ..Self::default()
        }
    }

    pub fn with_steps(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            ..Self::default()
        }
    }
}

impl FrameSource for ScriptedSource {
    type Frame = Frame;

    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        match self.steps.pop_front() {
            Some(Step::Frame(frame)) => {
                self.delivered += 1;
                Ok(Some(frame))
            }
            Some(Step::Fail) => Err(SourceError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "camera unplugged",
            ))),
            None => Ok(None),
        }
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

pub struct PassThrough;

impl LandmarkDetector<Frame> for PassThrough {
    fn detect(&mut self, frame: &Frame) -> Vec<FaceLandmarks> {
        frame.clone()
    }
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub overlays: Vec<Overlay>,
    pub frames_seen: usize,
}

impl Renderer<Frame> for RecordingRenderer {
    fn render(&mut self, _frame: &Frame, overlay: &Overlay) {
        self.frames_seen += 1;
        self.overlays.push(overlay.clone());
    }
}

/// Stops after `after` checks.
pub struct StopAfter {
    after: usize,
    checks: Cell<usize>,
}

impl StopAfter {
    pub fn new(after: usize) -> Self {
        Self {
            after,
            checks: Cell::new(0),
        }
    }
}

impl StopSignal for StopAfter {
    fn should_stop(&self) -> bool {
        let n = self.checks.get() + 1;
        self.checks.set(n);
        n >= self.after
    }
}

pub struct Never;

impl StopSignal for Never {
    fn should_stop(&self) -> bool {
        false
    }
}

/// Simulates a slow audio subsystem.
pub struct SleepyPlayer {
    delay: Duration,
    pub plays: AtomicUsize,
    pub cues: Mutex<Vec<String>>,
}

impl SleepyPlayer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            plays: AtomicUsize::new(0),
            cues: Mutex::new(Vec::new()),
        }
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl CuePlayer for SleepyPlayer {
    fn play(&self, cue: &str) -> Result<(), CueError> {
        thread::sleep(self.delay);
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.cues.lock().expect("cues lock").push(cue.to_string());
        Ok(())
    }
}

pub struct FailingPlayer {
    pub attempts: AtomicUsize,
}

impl FailingPlayer {
    pub fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }
}

impl CuePlayer for FailingPlayer {
    fn play(&self, _cue: &str) -> Result<(), CueError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CueError::Spawn(io::Error::new(
            io::ErrorKind::NotFound,
            "no audio device",
        )))
    }
}

pub struct PanickingPlayer;

impl CuePlayer for PanickingPlayer {
    fn play(&self, _cue: &str) -> Result<(), CueError> {
        panic!("audio backend crashed");
    }
}
