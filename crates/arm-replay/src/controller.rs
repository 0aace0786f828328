//! 重复运动控制器
//!
//! 命令的唯一入口：解析命令、读取当前取消作用域、交给执行引擎。
//!
//! # 并发
//!
//! `RepeatArmMovements` 是 `Send + Sync` 的，可以在多个线程间共享（`Arc`）。
//! 读取作用域与 `cancel` 的替换在同一把锁内完成；执行期间不持有该锁，
//! 因此另一个线程发出的 `cancel` 可以立即打断正在进行的运动。
//!
//! # 示例
//!
//! ```rust,no_run
//! use arm_replay::{Config, RepeatArmMovements, SimulatedArm};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let config = Config::new("arm-1", vec![vec![0.0, 0.0], vec![1.0, 0.5]], 2)?;
//! let controller = RepeatArmMovements::new(config, Arc::new(SimulatedArm::new()));
//!
//! let response = controller.do_command(&json!({"command": "execute"}))?;
//! assert_eq!(response, json!({"executed_repeats": 2}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::arm::{ArmClient, Dependencies, MoveOptions};
use crate::cancel::CancellationController;
use crate::command::{Command, CommandResponse};
use crate::config::{Config, RawConfig};
use crate::engine::{ExecutionEngine, ExecutionState};
use crate::error::ControllerError;

/// 重复运动控制器
pub struct RepeatArmMovements {
    config: Arc<Config>,
    engine: ExecutionEngine,
    cancellation: CancellationController,
    closed: AtomicBool,
}

impl RepeatArmMovements {
    /// 用已校验的配置和机械臂构造控制器
    pub fn new(config: Config, arm: Arc<dyn ArmClient>) -> Self {
        let config = Arc::new(config);
        info!(
            arm = config.arm(),
            waypoints = config.waypoints().len(),
            repeats = config.repeat_count(),
            "repeat arm movements controller created"
        );

        RepeatArmMovements {
            engine: ExecutionEngine::new(config.clone(), arm),
            config,
            cancellation: CancellationController::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// 从依赖集合中查找配置指定的机械臂并构造控制器
    pub fn from_dependencies(config: Config, deps: &Dependencies) -> Result<Self, ControllerError> {
        let arm = deps
            .arm(config.arm())
            .ok_or_else(|| ControllerError::ArmNotFound(config.arm().to_string()))?;
        Ok(Self::new(config, arm))
    }

    /// 从未校验的配置文档构造控制器
    ///
    /// 先校验配置（失败返回 [`ControllerError::ConfigInvalid`]），再查找机械臂。
    pub fn from_raw_config(raw: RawConfig, deps: &Dependencies) -> Result<Self, ControllerError> {
        let config = Config::try_from(raw)?;
        Self::from_dependencies(config, deps)
    }

    /// 设置运动选项（透传给驱动）
    pub fn with_move_options(mut self, options: MoveOptions) -> Self {
        self.engine.set_options(options);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 最近一次执行的状态
    pub fn state(&self) -> ExecutionState {
        self.engine.state()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 处理 JSON 请求，返回 JSON 响应
    pub fn do_command(&self, request: &Value) -> Result<Value, ControllerError> {
        let command = Command::from_value(request)?;
        self.dispatch(command).map(|response| response.to_value())
    }

    /// 执行已解析的命令
    pub fn dispatch(&self, command: Command) -> Result<CommandResponse, ControllerError> {
        if self.is_closed() {
            return Err(ControllerError::Closed);
        }

        match command {
            Command::Execute => {
                let scope = self.cancellation.active_scope();
                let executed_repeats = self.engine.execute(&scope)?;
                Ok(CommandResponse::Executed { executed_repeats })
            },
            Command::MoveToIndex { index } => {
                let scope = self.cancellation.active_scope();
                let moved_to_index = self.engine.move_to_index(index, &scope)?;
                Ok(CommandResponse::MovedToIndex { moved_to_index })
            },
            Command::Cancel => {
                self.cancel();
                Ok(CommandResponse::Cancelled { cancelled: true })
            },
        }
    }

    /// 取消当前作用域上的所有运动，并安装新作用域
    pub fn cancel(&self) {
        let old = self.cancellation.cancel();
        info!(scope = old.id(), "Cancelled current arm movement");
    }

    /// 关闭控制器
    ///
    /// 使当前作用域失效以释放正在进行的运动；之后的命令返回 [`ControllerError::Closed`]。
    /// 幂等。
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.cancellation.invalidate();
            info!(arm = self.config.arm(), "repeat arm movements controller closed");
        }
    }
}

impl Drop for RepeatArmMovements {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedArm;
    use serde_json::json;
    use std::time::Duration;

    fn controller() -> RepeatArmMovements {
        let config = Config::new("arm-1", vec![vec![0.0], vec![1.0]], 2).unwrap();
        RepeatArmMovements::new(config, Arc::new(SimulatedArm::new()))
    }

    #[test]
    fn test_do_command_execute() {
        let controller = controller();
        assert_eq!(
            controller.do_command(&json!({"command": "execute"})),
            Ok(json!({"executed_repeats": 2}))
        );
        assert_eq!(controller.state(), ExecutionState::Completed);
    }

    #[test]
    fn test_do_command_cancel_when_idle() {
        let controller = controller();
        assert_eq!(
            controller.do_command(&json!({"command": "cancel"})),
            Ok(json!({"cancelled": true}))
        );
        assert_eq!(
            controller.do_command(&json!({"command": "move_to_index", "index": 1})),
            Ok(json!({"moved_to_index": 1}))
        );
    }

    #[test]
    fn test_from_dependencies_missing_arm() {
        let config = Config::new("arm-9", vec![vec![0.0]], 1).unwrap();
        let deps = Dependencies::new().with_arm("arm-1", Arc::new(SimulatedArm::new()));
        let err = RepeatArmMovements::from_dependencies(config, &deps).err();
        assert_eq!(err, Some(ControllerError::ArmNotFound("arm-9".to_string())));
    }

    #[test]
    fn test_from_dependencies_resolves_arm() {
        let config = Config::new("arm-1", vec![vec![0.0]], 1).unwrap();
        let deps = Dependencies::new().with_arm("arm-1", Arc::new(SimulatedArm::new()));
        let controller = RepeatArmMovements::from_dependencies(config, &deps).unwrap();
        assert_eq!(controller.config().arm(), "arm-1");
    }

    #[test]
    fn test_commands_rejected_after_close() {
        let controller = controller();
        controller.close();
        controller.close();
        assert!(controller.is_closed());
        assert_eq!(controller.dispatch(Command::Execute), Err(ControllerError::Closed));
        assert_eq!(controller.dispatch(Command::Cancel), Err(ControllerError::Closed));
    }

    #[test]
    fn test_close_releases_in_flight_move() {
        let config = Config::new("arm-1", vec![vec![0.0]], 1).unwrap();
        let arm = Arc::new(SimulatedArm::new().with_move_duration(Duration::from_secs(30)));
        let controller = Arc::new(RepeatArmMovements::new(config, arm.clone()));

        let worker = {
            let controller = controller.clone();
            std::thread::spawn(move || controller.dispatch(Command::Execute))
        };

        while arm.moves_started() == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        controller.close();

        assert_eq!(worker.join().unwrap(), Err(ControllerError::Cancelled));
    }
}
