//! 执行引擎
//!
//! 实现 `execute`（完整的重复遍历）与 `move_to_index`（单路点移动）。
//!
//! # 顺序保证
//!
//! - 单轮内按路点顺序、轮与轮之间按顺序，严格串行
//! - 运动锁在整个调用期间持有，多个调用方的运动不会交错
//!
//! # 状态机
//!
//! ```text
//! Idle ──▶ Running ──┬──▶ Completed
//!                    ├──▶ Failed
//!                    └──▶ Cancelled
//! ```

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::arm::{ArmClient, MoveOptions};
use crate::cancel::CancellationScope;
use crate::config::Config;
use crate::error::{ControllerError, MoveContext, MoveError};

/// 单次调用的执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// 尚未执行过任何命令
    Idle,
    /// 正在执行
    Running,
    /// 最近一次执行成功完成
    Completed,
    /// 最近一次执行因运动错误失败
    Failed,
    /// 最近一次执行被取消
    Cancelled,
}

/// 执行引擎
pub struct ExecutionEngine {
    config: Arc<Config>,
    arm: Arc<dyn ArmClient>,
    options: Option<MoveOptions>,
    /// 运动锁：保证同一时刻只有一个调用在向机械臂下发运动
    motion: Mutex<()>,
    state: Mutex<ExecutionState>,
}

impl ExecutionEngine {
    pub fn new(config: Arc<Config>, arm: Arc<dyn ArmClient>) -> Self {
        ExecutionEngine {
            config,
            arm,
            options: None,
            motion: Mutex::new(()),
            state: Mutex::new(ExecutionState::Idle),
        }
    }

    /// 设置下发给驱动的运动选项
    pub fn set_options(&mut self, options: MoveOptions) {
        self.options = Some(options);
    }

    /// 最近一次调用的状态
    pub fn state(&self) -> ExecutionState {
        *self.state.lock()
    }

    /// 完整执行：重复 `repeat_count` 轮，每轮按顺序经过所有路点
    ///
    /// 返回完成的轮数（等于 `repeat_count`）。首个失败立即终止，不报告部分进度。
    pub fn execute(&self, scope: &CancellationScope) -> Result<u32, ControllerError> {
        let _motion = self.motion.lock();
        self.set_state(ExecutionState::Running);

        let result = self.run_iterations(scope);
        self.finish(&result);
        result
    }

    fn run_iterations(&self, scope: &CancellationScope) -> Result<u32, ControllerError> {
        let repeats = self.config.repeat_count();

        for iteration in 0..repeats {
            info!(iteration, scope = scope.id(), "Running iteration {}", iteration);
            for (waypoint, positions) in self.config.waypoints().iter().enumerate() {
                self.move_once(
                    positions,
                    scope,
                    MoveContext::Iteration {
                        iteration,
                        waypoint,
                    },
                )?;
            }
        }

        Ok(repeats)
    }

    /// 单路点移动
    ///
    /// 越界索引直接失败，不下发任何运动。
    pub fn move_to_index(
        &self,
        index: i64,
        scope: &CancellationScope,
    ) -> Result<usize, ControllerError> {
        let bound = self.config.waypoints().len();
        let checked = usize::try_from(index)
            .ok()
            .filter(|&i| i < bound)
            .ok_or(ControllerError::IndexOutOfRange { index, bound })?;

        let _motion = self.motion.lock();
        self.set_state(ExecutionState::Running);

        let result = self
            .move_once(
                &self.config.waypoints()[checked],
                scope,
                MoveContext::Index(checked),
            )
            .map(|()| checked);
        self.finish(&result);
        result
    }

    fn move_once(
        &self,
        positions: &[f64],
        scope: &CancellationScope,
        context: MoveContext,
    ) -> Result<(), ControllerError> {
        // 等待运动锁期间作用域可能已被取消
        if scope.is_cancelled() {
            return Err(ControllerError::Cancelled);
        }

        debug!(%context, ?positions, "moving arm");
        match self
            .arm
            .move_to_joint_positions(positions, self.options.as_ref(), scope)
        {
            Ok(()) => Ok(()),
            Err(MoveError::Cancelled) => Err(ControllerError::Cancelled),
            Err(_) if scope.is_cancelled() => Err(ControllerError::Cancelled),
            Err(source) => {
                warn!(%context, error = %source, "arm move failed");
                Err(ControllerError::MoveFailed { context, source })
            },
        }
    }

    fn set_state(&self, state: ExecutionState) {
        *self.state.lock() = state;
    }

    fn finish<T>(&self, result: &Result<T, ControllerError>) {
        let state = match result {
            Ok(_) => ExecutionState::Completed,
            Err(ControllerError::Cancelled) => ExecutionState::Cancelled,
            Err(_) => ExecutionState::Failed,
        };
        self.set_state(state);
    }
}
