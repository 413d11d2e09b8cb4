//! Collaborator contracts the frame pipeline drives.
//!
//! Camera I/O, the landmark model, drawing and audio playback live behind
//! these traits; the pipeline only sees frames, landmarks and status.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::detector::FaceLandmarks;
use crate::overlay::Overlay;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open frame source {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("frame source i/o error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum CueError {
    #[error("alert sound not found: {}", .0.display())]
    MissingAsset(PathBuf),
    #[error("failed to start cue player: {0}")]
    Spawn(#[source] io::Error),
    #[error("cue player exited unsuccessfully: {status}")]
    PlayerFailed { status: String },
}

/// Supplies frames one at a time.
pub trait FrameSource {
    type Frame;

    /// `Ok(None)` is a clean end of stream; `Err` is an unrecoverable failure.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>, SourceError>;

    /// Releases the underlying device or file. Called exactly once when the
    /// session stops, whatever the reason.
    fn release(&mut self) {}
}

/// Maps a frame to zero or more faces.
pub trait LandmarkDetector<F> {
    fn detect(&mut self, frame: &F) -> Vec<FaceLandmarks>;
}

/// Draws the frame with its status overlay. Never fails from the pipeline's
/// point of view.
pub trait Renderer<F> {
    fn render(&mut self, frame: &F, overlay: &Overlay);
}

/// Plays the audible cue. Runs off the frame loop, so it may block.
pub trait CuePlayer: Send + Sync {
    fn play(&self, cue: &str) -> Result<(), CueError>;
}

/// Checked once per frame; `true` ends the session.
pub trait StopSignal {
    fn should_stop(&self) -> bool;
}
