//! 眼部开合度度量库
//!
//! 基于面部关键点计算逐帧的眼部开合度指标，供上层闭眼检测流水线使用。
//! 本 crate 只包含纯数值计算，不做 I/O，也不记录日志。
//!
//! ## 模块
//! - `ear`: EAR (Eye Aspect Ratio) 眼部纵横比计算
//! - `perclos`: PERCLOS 闭眼帧占比统计

use serde::{Deserialize, Serialize};

pub mod ear;
pub mod perclos;

// 重新导出核心类型，方便外部使用
pub use ear::{
    combine_readings, combined_openness, openness, EyeLandmarkSet, OpennessError,
    EYE_LANDMARK_COUNT, MIN_HORIZONTAL_SPAN,
};
pub use perclos::PerclosWindow;

/// 二维关键点，坐标系由上游关键点检测器决定（归一化或像素均可，同一帧内需一致）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 到另一点的欧氏距离
    pub fn distance(&self, other: &Point2D) -> f64 {
        distance(*self, *other)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// 两点间欧氏距离: sqrt((x1-x2)^2 + (y1-y2)^2)
pub fn distance(p1: Point2D, p2: Point2D) -> f64 {
    ((p1.x - p2.x).powi(2) + (p1.y - p2.y).powi(2)).sqrt()
}
