//! EAR (Eye Aspect Ratio) 计算模块
//!
//! 提供基于标准6点眼部关键点的 EAR 计算。EAR 越小表示眼睛越闭合，
//! 是闭眼检测的核心指标。
//!
//! 公式: EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)

use thiserror::Error;

use crate::Point2D;

/// 单眼关键点数量
pub const EYE_LANDMARK_COUNT: usize = 6;

/// 水平眼角距离低于此值视为退化几何（关键点重合）
pub const MIN_HORIZONTAL_SPAN: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OpennessError {
    #[error("degenerate eye geometry: horizontal span {horizontal} is below the minimum")]
    DegenerateGeometry { horizontal: f64 },
    #[error("eye landmarks contain non-finite coordinates")]
    NonFinite,
}

/// 单眼的6个有序关键点
///
/// 点序固定:
/// - 0, 3: 外眼角 / 内眼角（水平方向）
/// - 1, 2: 上眼睑（外侧、内侧）
/// - 4, 5: 下眼睑（内侧、外侧）
///
/// 另一只眼使用镜像顺序。点序由上游关键点检测器保证，EAR 的正确性完全依赖于此。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeLandmarkSet([Point2D; EYE_LANDMARK_COUNT]);

impl EyeLandmarkSet {
    pub const fn new(points: [Point2D; EYE_LANDMARK_COUNT]) -> Self {
        Self(points)
    }

    /// 从切片构造，长度不为6时返回 None
    pub fn from_slice(points: &[Point2D]) -> Option<Self> {
        let points: [Point2D; EYE_LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self(points))
    }

    pub fn points(&self) -> &[Point2D; EYE_LANDMARK_COUNT] {
        &self.0
    }

    pub fn openness(&self) -> Result<f64, OpennessError> {
        openness(self)
    }
}

/// 标准6点 EAR 计算
///
/// 水平距离小于 [`MIN_HORIZONTAL_SPAN`] 时返回 `DegenerateGeometry`，
/// 调用方应视为"本帧无可靠读数"。
pub fn openness(eye: &EyeLandmarkSet) -> Result<f64, OpennessError> {
    let p = eye.points();
    if !p.iter().all(Point2D::is_finite) {
        return Err(OpennessError::NonFinite);
    }

    let horizontal = p[0].distance(&p[3]);
    if horizontal < MIN_HORIZONTAL_SPAN {
        return Err(OpennessError::DegenerateGeometry { horizontal });
    }

    let vertical1 = p[1].distance(&p[5]);
    let vertical2 = p[2].distance(&p[4]);
    let ear = (vertical1 + vertical2) / (2.0 * horizontal);

    // 坐标极大时平方和可能溢出
    if !ear.is_finite() {
        return Err(OpennessError::NonFinite);
    }
    Ok(ear)
}

/// 双眼联合 EAR：两眼都可用时取平均，仅一只可用时退化为单眼，都不可用时无信号
pub fn combined_openness(left: &EyeLandmarkSet, right: &EyeLandmarkSet) -> Option<f64> {
    combine_readings(openness(left).ok(), openness(right).ok())
}

/// 合并左右眼读数，规则同 [`combined_openness`]
pub fn combine_readings(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}
