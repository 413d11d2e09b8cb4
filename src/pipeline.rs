//! Per-frame orchestration.
//!
//! One frame is fully processed (landmarks, openness, debounce, alert,
//! render) before the next is pulled. The closure state lives here and is
//! only touched by the thread running the loop.

use std::fmt;

use chrono::{DateTime, Utc};
use eye_metrics::PerclosWindow;
use serde::Serialize;
use uuid::Uuid;

use crate::alert::{AlertDispatcher, AlertOutcome, DispatchStats};
use crate::config::DetectorConfig;
use crate::detector::{
    ClosureState, DebounceMachine, EyeIndexScheme, FaceLandmarks, FacePolicy,
};
use crate::overlay::Overlay;
use crate::ports::{FrameSource, LandmarkDetector, Renderer, StopSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum StopReason {
    StopSignal,
    EndOfStream,
    SourceFailure(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StopSignal => f.write_str("stop signal"),
            Self::EndOfStream => f.write_str("end of stream"),
            Self::SourceFailure(e) => write!(f, "frame source failure: {e}"),
        }
    }
}

/// Outcome of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub faces: usize,
    /// Last usable reading fed to the debounce machine this frame.
    pub reading: Option<f64>,
    pub state: ClosureState,
    pub alert: AlertOutcome,
    pub overlay: Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameCounters {
    pub frames: u64,
    pub frames_without_face: u64,
    pub frames_without_signal: u64,
    pub alert_frames: u64,
    pub blinks: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub counters: FrameCounters,
    pub final_state: ClosureState,
    pub cues: DispatchStats,
    pub stop_reason: StopReason,
}

pub struct FramePipeline {
    machine: DebounceMachine,
    scheme: EyeIndexScheme,
    face_policy: FacePolicy,
    perclos: PerclosWindow,
    dispatcher: AlertDispatcher,
    state: ClosureState,
    counters: FrameCounters,
    /// Dispatcher totals when the current session began.
    cue_baseline: DispatchStats,
    status: SessionStatus,
}

impl FramePipeline {
    pub fn new(config: &DetectorConfig, dispatcher: AlertDispatcher) -> Self {
        Self {
            machine: DebounceMachine::from_config(config),
            scheme: config.landmark_scheme,
            face_policy: config.face_policy,
            perclos: PerclosWindow::new(config.perclos_window_frames),
            dispatcher,
            state: ClosureState::default(),
            counters: FrameCounters::default(),
            cue_baseline: DispatchStats::default(),
            status: SessionStatus::Running,
        }
    }

    pub fn state(&self) -> ClosureState {
        self.state
    }

    pub fn counters(&self) -> FrameCounters {
        self.counters
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    /// Runs steps 3-4 for one frame's faces and builds its overlay.
    ///
    /// No faces, or no usable eye on any face, leaves the closure state
    /// untouched.
    pub fn process_faces(&mut self, faces: &[FaceLandmarks]) -> FrameReport {
        self.counters.frames += 1;
        let mut reading = None;

        for face in self.face_policy.select(faces) {
            let Some(ear) = face.openness(self.scheme) else {
                continue;
            };
            reading = Some(ear);

            let transition = self.machine.step(&mut self.state, Some(ear));
            if transition.is_blink() {
                self.counters.blinks += 1;
            }
            if transition.entered_alert() {
                tracing::warn!(
                    closed_frames = self.state.consecutive_closed_frames,
                    ear,
                    "Alert! Eyes closed for too long."
                );
            } else if transition.changed() {
                tracing::debug!(
                    from = transition.previous.as_str(),
                    to = transition.current.as_str(),
                    ear,
                    "Closure state changed"
                );
            }
        }

        // One PERCLOS sample per frame with a signal, however many faces fed it.
        if let Some(ear) = reading {
            self.perclos.record(self.machine.is_closed(ear));
        }

        if faces.is_empty() {
            self.counters.frames_without_face += 1;
        } else if reading.is_none() {
            self.counters.frames_without_signal += 1;
        }

        let alert = self.dispatcher.notify(&self.state);
        if self.state.is_alerting() {
            self.counters.alert_frames += 1;
        }

        let eyes_closed = reading.is_some_and(|ear| self.machine.is_closed(ear));
        let perclos = self.perclos.is_warmed_up().then(|| self.perclos.value());
        let overlay = Overlay::for_frame(faces, reading, eyes_closed, &self.state, perclos);

        FrameReport {
            faces: faces.len(),
            reading,
            state: self.state,
            alert,
            overlay,
        }
    }

    /// Runs one detection session until the stop signal, end of stream or a
    /// frame source failure. The source is released on every exit path.
    pub fn run<S, D, R, X>(
        &mut self,
        source: &mut S,
        detector: &mut D,
        renderer: &mut R,
        stop: &X,
    ) -> SessionSummary
    where
        S: FrameSource,
        D: LandmarkDetector<S::Frame>,
        R: Renderer<S::Frame>,
        X: StopSignal + ?Sized,
    {
        self.begin_session();
        let session_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = tracing::info_span!("session", id = %session_id);
        let _enter = span.enter();

        tracing::info!(
            threshold = self.machine.threshold(),
            frames_required = self.machine.consecutive_frames_required(),
            scheme = %self.scheme,
            face_policy = self.face_policy.as_str(),
            "Detection session started"
        );

        let stop_reason = loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::EndOfStream,
                Err(e) => {
                    tracing::error!(error = %e, "Frame source failed");
                    break StopReason::SourceFailure(e.to_string());
                }
            };

            let faces = detector.detect(&frame);
            let report = self.process_faces(&faces);
            renderer.render(&frame, &report.overlay);

            if stop.should_stop() {
                break StopReason::StopSignal;
            }
        };

        source.release();
        self.status = SessionStatus::Stopped;

        let summary = SessionSummary {
            session_id,
            started_at,
            ended_at: Utc::now(),
            counters: self.counters,
            final_state: self.state,
            cues: self.dispatcher.stats().since(&self.cue_baseline),
            stop_reason,
        };
        tracing::info!(
            reason = %summary.stop_reason,
            frames = summary.counters.frames,
            alert_frames = summary.counters.alert_frames,
            blinks = summary.counters.blinks,
            cues_issued = summary.cues.issued,
            cues_failed = summary.cues.failed,
            "Detection session stopped"
        );
        summary
    }

    fn begin_session(&mut self) {
        self.state = ClosureState::default();
        self.counters = FrameCounters::default();
        self.perclos.reset();
        self.cue_baseline = self.dispatcher.stats();
        self.status = SessionStatus::Running;
    }
}
