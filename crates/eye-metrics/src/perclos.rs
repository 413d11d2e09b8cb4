//! PERCLOS (Percentage of Eye Closure) 计算模块
//!
//! 统计最近 N 个有效读数帧中闭眼帧的占比。
//! - PERCLOS < 0.15: 清醒
//! - PERCLOS 0.15 - 0.30: 轻度疲劳
//! - PERCLOS > 0.30: 明显疲劳
//!
//! 仅作为参考读数展示，不参与告警判定。

use std::collections::VecDeque;

/// 基于帧数滑动窗口的 PERCLOS 计算器
#[derive(Debug, Clone)]
pub struct PerclosWindow {
    /// 窗口大小（帧）
    capacity: usize,
    /// 窗口内样本，true 表示闭眼
    samples: VecDeque<bool>,
    /// 窗口内闭眼样本数
    closed: usize,
}

impl PerclosWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            closed: 0,
        }
    }

    /// 记录一帧的闭眼判定，返回当前 PERCLOS 值 (0.0 - 1.0)
    pub fn record(&mut self, is_closed: bool) -> f64 {
        self.samples.push_back(is_closed);
        if is_closed {
            self.closed += 1;
        }

        while self.samples.len() > self.capacity {
            if let Some(true) = self.samples.pop_front() {
                self.closed -= 1;
            }
        }

        self.value()
    }

    pub fn value(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.closed as f64 / self.samples.len() as f64
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// 窗口是否已有足够数据（至少填满一半）
    pub fn is_warmed_up(&self) -> bool {
        self.samples.len() * 2 >= self.capacity
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.closed = 0;
    }
}
