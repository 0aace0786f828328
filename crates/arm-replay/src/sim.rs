//! 模拟机械臂
//!
//! 无硬件依赖的 [`ArmClient`] 实现：每次运动耗时 `move_duration`，
//! 期间阻塞在取消作用域上，被取消时立即返回 [`MoveError::Cancelled`]。
//! 可以配置在第 N 次运动时返回硬件错误，用于演示和测试。

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::trace;

use crate::arm::{ArmClient, MoveOptions};
use crate::cancel::CancellationScope;
use crate::error::MoveError;

/// 模拟机械臂
#[derive(Debug, Default)]
pub struct SimulatedArm {
    move_duration: Duration,
    fail_at: Option<usize>,
    started: AtomicUsize,
    completed: Mutex<Vec<Vec<f64>>>,
}

impl SimulatedArm {
    /// 创建瞬时完成运动的模拟机械臂
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置每次运动的耗时
    pub fn with_move_duration(mut self, duration: Duration) -> Self {
        self.move_duration = duration;
        self
    }

    /// 第 `n` 次运动（从 0 计数）返回硬件错误
    pub fn fail_at(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    /// 已开始的运动次数
    pub fn moves_started(&self) -> usize {
        self.started.load(Ordering::Acquire)
    }

    /// 已完成运动的目标位置（按顺序）
    pub fn completed_moves(&self) -> Vec<Vec<f64>> {
        self.completed.lock().clone()
    }

    /// 当前位置（最后一次完成的运动目标）
    pub fn current_position(&self) -> Option<Vec<f64>> {
        self.completed.lock().last().cloned()
    }
}

impl ArmClient for SimulatedArm {
    fn move_to_joint_positions(
        &self,
        positions: &[f64],
        _options: Option<&MoveOptions>,
        scope: &CancellationScope,
    ) -> Result<(), MoveError> {
        let n = self.started.fetch_add(1, Ordering::AcqRel);
        trace!(n, ?positions, "simulated move started");

        if self.fail_at == Some(n) {
            return Err(MoveError::Hardware(format!(
                "simulated fault on move {}",
                n
            )));
        }

        if scope.wait_timeout(self.move_duration) {
            return Err(MoveError::Cancelled);
        }

        self.completed.lock().push(positions.to_vec());
        Ok(())
    }
}
