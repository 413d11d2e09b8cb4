use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{
    DEFAULT_CONSECUTIVE_CLOSED_FRAMES, DEFAULT_CUE_IDENTIFIER, DEFAULT_CUE_PLAYER,
    DEFAULT_EAR_THRESHOLD, DEFAULT_LANDMARK_SOURCE, DEFAULT_PERCLOS_WINDOW_FRAMES,
    DEFAULT_REPLAY_FPS,
};
use crate::detector::{EyeIndexScheme, FacePolicy};
use crate::logging::LogConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub detector: DetectorConfig,
    pub alert: AlertConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub threshold: f64,
    pub consecutive_frames_required: u32,
    pub landmark_scheme: EyeIndexScheme,
    pub face_policy: FacePolicy,
    pub perclos_window_frames: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    pub cue_identifier: String,
    pub player_program: String,
    pub coalesce: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub path: String,
    pub replay_fps: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_EAR_THRESHOLD,
            consecutive_frames_required: DEFAULT_CONSECUTIVE_CLOSED_FRAMES,
            landmark_scheme: EyeIndexScheme::default(),
            face_policy: FacePolicy::default(),
            perclos_window_frames: DEFAULT_PERCLOS_WINDOW_FRAMES,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "EYE_AR_THRESHOLD",
                reason: format!("expected a positive number, got {}", self.threshold),
            });
        }
        if self.consecutive_frames_required == 0 {
            return Err(ConfigError::Invalid {
                key: "EYE_AR_CONSEC_FRAMES",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.perclos_window_frames == 0 {
            return Err(ConfigError::Invalid {
                key: "PERCLOS_WINDOW_FRAMES",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cue_identifier: DEFAULT_CUE_IDENTIFIER.to_string(),
            player_program: DEFAULT_CUE_PLAYER.to_string(),
            coalesce: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            detector: DetectorConfig {
                threshold: env_or_parse("EYE_AR_THRESHOLD", DEFAULT_EAR_THRESHOLD),
                consecutive_frames_required: env_or_parse(
                    "EYE_AR_CONSEC_FRAMES",
                    DEFAULT_CONSECUTIVE_CLOSED_FRAMES,
                ),
                landmark_scheme: env_or_parse("LANDMARK_SCHEME", EyeIndexScheme::default()),
                face_policy: env_or_parse("FACE_POLICY", FacePolicy::default()),
                perclos_window_frames: env_or_parse(
                    "PERCLOS_WINDOW_FRAMES",
                    DEFAULT_PERCLOS_WINDOW_FRAMES,
                ),
            },
            alert: AlertConfig {
                cue_identifier: env_or("ALERT_SOUND", DEFAULT_CUE_IDENTIFIER),
                player_program: env_or("ALERT_PLAYER", DEFAULT_CUE_PLAYER),
                coalesce: env_or_bool("ALERT_COALESCE", true),
            },
            source: SourceConfig {
                path: env_or("LANDMARK_SOURCE", DEFAULT_LANDMARK_SOURCE),
                replay_fps: env_or_parse("REPLAY_FPS", DEFAULT_REPLAY_FPS),
            },
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_level: self.log_level.clone(),
            enable_file_logs: self.enable_file_logs,
            log_dir: self.log_dir.clone(),
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => parse_bool(&raw).unwrap_or_else(|| {
            tracing::warn!(
                key,
                value = %raw,
                "Failed to parse env var, using default"
            );
            default
        }),
        Err(_) => default,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
