//! 闭眼去抖状态机
//!
//! 三状态: Open（睁眼）→ Closing（正在闭眼）→ Alerting（告警）
//!
//! 单次眨眼只会产生短暂的 Closing，只有连续闭眼帧数达到阈值才进入 Alerting。
//! 任何一帧睁眼读数都会立即回到 Open 并清零计数，没有滞回区间。

use serde::Serialize;

use crate::config::DetectorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Open,
    Closing,
    Alerting,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
            Self::Alerting => "ALERTING",
        }
    }
}

/// 一次检测会话的闭眼状态，由流水线独占持有，每帧至多修改一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureState {
    pub phase: Phase,
    pub consecutive_closed_frames: u32,
}

impl ClosureState {
    pub fn is_alerting(&self) -> bool {
        self.phase == Phase::Alerting
    }
}

/// 单帧状态转换结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub previous: Phase,
    pub current: Phase,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    /// 刚进入告警
    pub fn entered_alert(&self) -> bool {
        self.current == Phase::Alerting && self.previous != Phase::Alerting
    }

    /// 闭眼在达到告警阈值前结束，视为一次眨眼
    pub fn is_blink(&self) -> bool {
        self.previous == Phase::Closing && self.current == Phase::Open
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceMachine {
    threshold: f64,
    consecutive_frames_required: u32,
}

impl DebounceMachine {
    pub fn new(threshold: f64, consecutive_frames_required: u32) -> Self {
        Self {
            threshold,
            consecutive_frames_required,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.threshold, config.consecutive_frames_required)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn consecutive_frames_required(&self) -> u32 {
        self.consecutive_frames_required
    }

    pub fn is_closed(&self, metric: f64) -> bool {
        metric < self.threshold
    }

    /// 推进一帧
    ///
    /// `signal` 为 None 表示本帧无可靠读数（无人脸或几何退化），状态与计数保持不变。
    pub fn step(&self, state: &mut ClosureState, signal: Option<f64>) -> Transition {
        let previous = state.phase;

        if let Some(metric) = signal {
            if self.is_closed(metric) {
                state.consecutive_closed_frames = state.consecutive_closed_frames.saturating_add(1);
                state.phase = if state.consecutive_closed_frames >= self.consecutive_frames_required {
                    Phase::Alerting
                } else {
                    Phase::Closing
                };
            } else {
                state.consecutive_closed_frames = 0;
                state.phase = Phase::Open;
            }
        }

        Transition {
            previous,
            current: state.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(machine: &DebounceMachine, signals: &[Option<f64>]) -> Vec<ClosureState> {
        let mut state = ClosureState::default();
        signals
            .iter()
            .map(|&s| {
                machine.step(&mut state, s);
                state
            })
            .collect()
    }

    fn st(phase: Phase, n: u32) -> ClosureState {
        ClosureState {
            phase,
            consecutive_closed_frames: n,
        }
    }

    #[test]
    fn alerts_after_required_streak() {
        let machine = DebounceMachine::new(0.25, 20);
        let mut state = ClosureState::default();
        for _ in 0..19 {
            machine.step(&mut state, Some(0.1));
        }
        assert_eq!(state, st(Phase::Closing, 19));

        let t = machine.step(&mut state, Some(0.1));
        assert_eq!(state, st(Phase::Alerting, 20));
        assert!(t.entered_alert());

        let t = machine.step(&mut state, Some(0.1));
        assert_eq!(state, st(Phase::Alerting, 21));
        assert!(!t.entered_alert());

        let t = machine.step(&mut state, Some(0.3));
        assert_eq!(state, st(Phase::Open, 0));
        assert!(t.changed());
        assert!(!t.is_blink());
    }

    #[test]
    fn threshold_boundary_counts_as_open() {
        let machine = DebounceMachine::new(0.25, 3);
        let states = run(&machine, &[Some(0.2), Some(0.25)]);
        assert_eq!(states[1], st(Phase::Open, 0));
    }

    #[test]
    fn metric_sequence_scenario() {
        let machine = DebounceMachine::new(0.25, 3);
        let states = run(
            &machine,
            &[Some(0.30), Some(0.20), Some(0.18), Some(0.15), Some(0.30)],
        );
        assert_eq!(
            states,
            vec![
                st(Phase::Open, 0),
                st(Phase::Closing, 1),
                st(Phase::Closing, 2),
                st(Phase::Alerting, 3),
                st(Phase::Open, 0),
            ]
        );
    }

    #[test]
    fn missing_signal_freezes_streak() {
        let machine = DebounceMachine::new(0.25, 3);
        let states = run(&machine, &[Some(0.20), None, Some(0.18), Some(0.15)]);
        assert_eq!(
            states,
            vec![
                st(Phase::Closing, 1),
                st(Phase::Closing, 1),
                st(Phase::Closing, 2),
                st(Phase::Alerting, 3),
            ]
        );
    }

    #[test]
    fn short_closure_is_a_blink() {
        let machine = DebounceMachine::new(0.25, 3);
        let mut state = ClosureState::default();
        machine.step(&mut state, Some(0.1));
        let t = machine.step(&mut state, Some(0.3));
        assert!(t.is_blink());
    }

    #[test]
    fn phase_serializes_upper_case() {
        let json = serde_json::to_string(&st(Phase::Alerting, 4)).unwrap();
        assert_eq!(json, r#"{"phase":"ALERTING","consecutiveClosedFrames":4}"#);
    }
}
