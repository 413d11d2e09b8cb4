use std::sync::Arc;

use eyewatch::alert::AlertDispatcher;
use eyewatch::config::{AlertConfig, DetectorConfig};
use eyewatch::detector::{EyeIndexScheme, FaceLandmarks, FacePolicy};
use eyewatch::pipeline::FramePipeline;
use eyewatch::ports::CuePlayer;
use tokio::runtime::Runtime;

/// Eye corners 0.3 apart; lid gap chosen so the eye reads exactly `ear`.
fn eye_points(ear: f64) -> Vec<[f64; 2]> {
    let h = ear * 0.3 / 2.0;
    vec![
        [0.0, 0.0],
        [0.1, -h],
        [0.2, -h],
        [0.3, 0.0],
        [0.2, h],
        [0.1, h],
    ]
}

/// Compact-scheme face whose combined openness is `ear`.
pub fn face_with_ear(ear: f64) -> FaceLandmarks {
    let mut raw = eye_points(ear);
    raw.extend(eye_points(ear));
    FaceLandmarks::from(raw)
}

/// Compact-scheme face with all points coincident.
pub fn degenerate_face() -> FaceLandmarks {
    FaceLandmarks::from(vec![[0.5, 0.5]; 12])
}

pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("tokio runtime")
}

pub fn detector_config(required: u32) -> DetectorConfig {
    DetectorConfig {
        threshold: 0.25,
        consecutive_frames_required: required,
        landmark_scheme: EyeIndexScheme::Compact,
        face_policy: FacePolicy::All,
        perclos_window_frames: 10,
    }
}

pub fn alert_config(coalesce: bool) -> AlertConfig {
    AlertConfig {
        cue_identifier: "alarm.mp3".to_string(),
        player_program: "true".to_string(),
        coalesce,
    }
}

pub fn pipeline(
    rt: &Runtime,
    config: &DetectorConfig,
    player: Arc<dyn CuePlayer>,
    coalesce: bool,
) -> FramePipeline {
    let dispatcher = AlertDispatcher::new(player, &alert_config(coalesce), rt.handle().clone());
    FramePipeline::new(config, dispatcher)
}
