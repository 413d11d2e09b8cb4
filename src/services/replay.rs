//! Landmark replay from a JSON-lines recording.
//!
//! One frame per line:
//! `{"timestamp_ms": 33, "faces": [[[0.41, 0.37], [0.43, 0.36], ...]]}`
//!
//! Stands in for camera + landmark model: the recording already carries the
//! landmarks, so the detector just hands them through.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::detector::FaceLandmarks;
use crate::ports::{FrameSource, LandmarkDetector, SourceError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub faces: Vec<Vec<[f64; 2]>>,
}

pub struct ReplaySource<R = BufReader<File>> {
    reader: R,
    line_no: u64,
    frame_interval: Option<Duration>,
    last_emit: Option<Instant>,
    skipped: u64,
    released: bool,
}

impl ReplaySource {
    pub fn open(path: &str, fps: f64) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_string(),
            source,
        })?;
        tracing::info!(path, fps, "Opened landmark recording");
        Ok(Self::from_reader(BufReader::new(file), fps))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// `fps <= 0` replays as fast as frames can be processed.
    pub fn from_reader(reader: R, fps: f64) -> Self {
        let frame_interval = (fps.is_finite() && fps > 0.0).then(|| Duration::from_secs_f64(1.0 / fps));
        Self {
            reader,
            line_no: 0,
            frame_interval,
            last_emit: None,
            skipped: 0,
            released: false,
        }
    }

    /// Malformed lines skipped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn pace(&mut self) {
        if let (Some(interval), Some(last)) = (self.frame_interval, self.last_emit) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.last_emit = Some(Instant::now());
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    type Frame = RecordedFrame;

    fn next_frame(&mut self) -> Result<Option<RecordedFrame>, SourceError> {
        if self.released {
            return Ok(None);
        }

        // Raw bytes: a line that is not UTF-8 is a bad record, not a broken stream.
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_slice::<RecordedFrame>(trimmed) {
                Ok(frame) => {
                    self.pace();
                    return Ok(Some(frame));
                }
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(line = self.line_no, error = %e, "Skipping malformed frame record");
                }
            }
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            tracing::debug!(lines = self.line_no, skipped = self.skipped, "Released landmark recording");
        }
    }
}

/// Hands through the landmarks stored in each recorded frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordedLandmarks;

impl LandmarkDetector<RecordedFrame> for RecordedLandmarks {
    fn detect(&mut self, frame: &RecordedFrame) -> Vec<FaceLandmarks> {
        frame
            .faces
            .iter()
            .map(|face| FaceLandmarks::from(face.clone()))
            .collect()
    }
}
