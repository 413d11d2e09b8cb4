use std::fmt;
use std::str::FromStr;

use eye_metrics::{combine_readings, EyeLandmarkSet, Point2D};

use crate::constants::{
    COMPACT_LEFT_EYE, COMPACT_RIGHT_EYE, MEDIAPIPE_LEFT_EYE, MEDIAPIPE_RIGHT_EYE,
};

/// One detected face: landmark points in the detector's fixed index order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaceLandmarks {
    points: Vec<Point2D>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Gathers six points by index. `None` if any index is out of range.
    pub fn eye(&self, indices: &[usize; 6]) -> Option<EyeLandmarkSet> {
        let mut points = [Point2D::default(); 6];
        for (slot, &idx) in points.iter_mut().zip(indices) {
            *slot = *self.points.get(idx)?;
        }
        Some(EyeLandmarkSet::new(points))
    }

    /// Combined openness of both eyes under `scheme`.
    ///
    /// An eye whose indices are missing or whose geometry is degenerate is
    /// dropped; the other eye alone is used. `None` when neither eye is usable.
    pub fn openness(&self, scheme: EyeIndexScheme) -> Option<f64> {
        let read = |indices: &[usize; 6]| {
            let eye = self.eye(indices)?;
            match eye.openness() {
                Ok(ear) => Some(ear),
                Err(e) => {
                    tracing::trace!(error = %e, "Discarding eye reading");
                    None
                }
            }
        };
        combine_readings(read(scheme.left()), read(scheme.right()))
    }
}

impl From<Vec<[f64; 2]>> for FaceLandmarks {
    fn from(raw: Vec<[f64; 2]>) -> Self {
        Self::new(raw.into_iter().map(Point2D::from).collect())
    }
}

/// Which landmark indices hold the two six-point eye sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EyeIndexScheme {
    /// 468-point face mesh.
    #[default]
    MediaPipe,
    /// Twelve points per face, left eye first.
    Compact,
}

impl EyeIndexScheme {
    pub fn left(self) -> &'static [usize; 6] {
        match self {
            Self::MediaPipe => &MEDIAPIPE_LEFT_EYE,
            Self::Compact => &COMPACT_LEFT_EYE,
        }
    }

    pub fn right(self) -> &'static [usize; 6] {
        match self {
            Self::MediaPipe => &MEDIAPIPE_RIGHT_EYE,
            Self::Compact => &COMPACT_RIGHT_EYE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MediaPipe => "mediapipe",
            Self::Compact => "compact",
        }
    }
}

impl fmt::Display for EyeIndexScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EyeIndexScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mediapipe" | "face_mesh" => Ok(Self::MediaPipe),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown landmark scheme: {other}")),
        }
    }
}

/// How faces in one frame feed the shared closure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacePolicy {
    /// Every reported face is fed, in reported order.
    #[default]
    All,
    /// Only the first reported face is considered.
    First,
}

impl FacePolicy {
    pub fn select<'a>(self, faces: &'a [FaceLandmarks]) -> &'a [FaceLandmarks] {
        match self {
            Self::All => faces,
            Self::First => &faces[..faces.len().min(1)],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::First => "first",
        }
    }
}

impl FromStr for FacePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "first" => Ok(Self::First),
            other => Err(format!("unknown face policy: {other}")),
        }
    }
}
