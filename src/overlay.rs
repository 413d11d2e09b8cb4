use eye_metrics::Point2D;
use serde::Serialize;

use crate::constants::{STATUS_ALERT, STATUS_EYES_CLOSED, STATUS_EYES_OPEN};
use crate::detector::{ClosureState, FaceLandmarks};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub text: &'static str,
    pub severity: Severity,
}

/// What the renderer draws on top of a frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub status: Vec<StatusLine>,
    pub mesh_points: Vec<Point2D>,
    pub openness: Option<f64>,
    pub perclos: Option<f64>,
}

impl Overlay {
    /// Builds the overlay for one processed frame.
    ///
    /// Without a reading the status is left empty, like a frame with no face.
    pub fn for_frame(
        faces: &[FaceLandmarks],
        reading: Option<f64>,
        eyes_closed: bool,
        state: &ClosureState,
        perclos: Option<f64>,
    ) -> Self {
        let mut status = Vec::new();
        if reading.is_some() {
            if eyes_closed {
                status.push(StatusLine {
                    text: STATUS_EYES_CLOSED,
                    severity: Severity::Warning,
                });
                if state.is_alerting() {
                    status.push(StatusLine {
                        text: STATUS_ALERT,
                        severity: Severity::Critical,
                    });
                }
            } else {
                status.push(StatusLine {
                    text: STATUS_EYES_OPEN,
                    severity: Severity::Normal,
                });
            }
        }

        Self {
            status,
            mesh_points: faces
                .iter()
                .flat_map(|f| f.points().iter().copied())
                .collect(),
            openness: reading,
            perclos,
        }
    }

    pub fn headline(&self) -> Option<&'static str> {
        self.status.last().map(|line| line.text)
    }

    pub fn is_alerting(&self) -> bool {
        self.status.iter().any(|l| l.severity == Severity::Critical)
    }
}
