//! # Arm Replay
//!
//! 机械臂路点回放控制器：按顺序重复经过一组固定的关节路点，
//! 支持中途取消以及直接移动到任意路点。
//!
//! ## 模块
//!
//! - `config` - 回放配置（TOML/JSON 加载与校验）
//! - `arm` - 机械臂能力接口（[`ArmClient`]）与依赖查找
//! - `cancel` - 基于作用域的取消机制
//! - `engine` - 执行引擎（`execute` / `move_to_index`）
//! - `command` - 命令协议解析与响应
//! - `controller` - 命令入口 [`RepeatArmMovements`]
//! - `sim` - 无硬件依赖的模拟机械臂
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use arm_replay::{Command, Config, RepeatArmMovements, SimulatedArm};
//! use std::sync::Arc;
//!
//! let config = Config::load_from_file("replay.toml")?;
//! let controller = RepeatArmMovements::new(config, Arc::new(SimulatedArm::new()));
//! let response = controller.dispatch(Command::Execute)?;
//! println!("{:?}", response);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod arm;
pub mod cancel;
pub mod command;
pub mod config;
pub mod controller;
pub mod engine;
mod error;
pub mod sim;

pub use arm::{ArmClient, Dependencies, MoveOptions};
pub use cancel::{CancellationController, CancellationScope};
pub use command::{Command, CommandParams, CommandResponse};
pub use config::{Config, RawConfig, Waypoint};
pub use controller::RepeatArmMovements;
pub use engine::{ExecutionEngine, ExecutionState};
pub use error::{ConfigError, ControllerError, MoveContext, MoveError, SharedIoError};
pub use sim::SimulatedArm;
