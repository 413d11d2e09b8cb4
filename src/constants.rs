/// EAR 闭眼阈值，低于此值视为闭眼
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.25;

/// 触发告警所需的连续闭眼帧数
pub const DEFAULT_CONSECUTIVE_CLOSED_FRAMES: u32 = 20;

/// PERCLOS 滑动窗口（帧），30 FPS 下约 30 秒
pub const DEFAULT_PERCLOS_WINDOW_FRAMES: usize = 900;

/// 默认告警音频文件
pub const DEFAULT_CUE_IDENTIFIER: &str = "alarm.mp3";

/// 默认音频播放命令
#[cfg(target_os = "macos")]
pub const DEFAULT_CUE_PLAYER: &str = "afplay";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_CUE_PLAYER: &str = "aplay";

/// 默认关键点回放文件
pub const DEFAULT_LANDMARK_SOURCE: &str = "landmarks.jsonl";

/// 默认回放帧率，0 表示不限速
pub const DEFAULT_REPLAY_FPS: f64 = 30.0;

/// MediaPipe Face Mesh 左眼6点索引（外眼角、上眼睑×2、内眼角、下眼睑×2）
pub const MEDIAPIPE_LEFT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// MediaPipe Face Mesh 右眼6点索引
pub const MEDIAPIPE_RIGHT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// 紧凑格式：每张脸只有12个点，左眼在前
pub const COMPACT_LEFT_EYE: [usize; 6] = [0, 1, 2, 3, 4, 5];
pub const COMPACT_RIGHT_EYE: [usize; 6] = [6, 7, 8, 9, 10, 11];

pub const STATUS_EYES_OPEN: &str = "STATUS: EYES OPEN";
pub const STATUS_EYES_CLOSED: &str = "STATUS: EYES CLOSED!";
pub const STATUS_ALERT: &str = "ALERT! ALERT!";
