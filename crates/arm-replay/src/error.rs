//! 错误类型定义
//!
//! - [`ConfigError`]：配置校验失败（构造期，致命）
//! - [`MoveError`]：机械臂驱动返回的单次运动错误
//! - [`ControllerError`]：命令执行返回给调用方的错误

use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// 配置校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 未指定机械臂
    #[error("arm must be specified and cannot be empty")]
    EmptyArm,

    /// 未指定任何路点
    #[error("joint_positions must be specified and cannot be empty")]
    NoWaypoints,

    /// 某个路点没有任何关节值
    #[error("joint_positions[{index}] must contain at least one joint value")]
    EmptyWaypoint { index: usize },

    /// 重复次数非正
    #[error("num_repeats must be greater than zero, got {value}")]
    NonPositiveRepeats { value: i64 },

    /// 重复次数超出上限
    #[error("num_repeats must not exceed {max}, got {value}")]
    TooManyRepeats { value: i64, max: u32 },

    /// 配置文件格式不支持
    #[error("unsupported config format: {0} (expected .toml or .json)")]
    UnsupportedFormat(String),

    /// 配置文件解析失败
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// 配置文件读取失败
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: SharedIoError,
    },
}

/// 可克隆的 IO 错误
///
/// 错误类型需要 `Clone + PartialEq`，`io::Error` 两者都不满足，
/// 因此用 `Arc` 共享；比较时按错误类别和消息比较。
#[derive(Debug, Clone)]
pub struct SharedIoError(Arc<io::Error>);

impl SharedIoError {
    /// 错误类别
    pub fn kind(&self) -> io::ErrorKind {
        self.0.kind()
    }

    /// 原始 IO 错误
    pub fn io_error(&self) -> &io::Error {
        &self.0
    }
}

impl From<io::Error> for SharedIoError {
    fn from(err: io::Error) -> Self {
        SharedIoError(Arc::new(err))
    }
}

impl fmt::Display for SharedIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for SharedIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl PartialEq for SharedIoError {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.kind() == other.kind() && self.0.to_string() == other.0.to_string())
    }
}

/// 机械臂运动错误
///
/// 由 [`ArmClient`](crate::ArmClient) 实现返回。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoveError {
    /// 运动过程中观察到作用域被取消
    #[error("move cancelled")]
    Cancelled,

    /// 硬件/驱动故障
    #[error("hardware fault: {0}")]
    Hardware(String),

    /// 驱动拒绝执行该目标（如超出限位）
    #[error("move rejected: {0}")]
    Rejected(String),
}

/// 运动失败发生的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveContext {
    /// `execute` 的第 `iteration` 轮、第 `waypoint` 个路点
    Iteration { iteration: u32, waypoint: usize },
    /// `move_to_index` 的目标索引
    Index(usize),
}

impl fmt::Display for MoveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveContext::Iteration {
                iteration,
                waypoint,
            } => write!(f, "on iteration {} (waypoint {})", iteration, waypoint),
            MoveContext::Index(index) => write!(f, "at index {}", index),
        }
    }
}

/// 控制器错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerError {
    /// 配置无效，控制器无法构造
    #[error("invalid config: {0}")]
    ConfigInvalid(#[from] ConfigError),

    /// 依赖中找不到配置指定的机械臂
    #[error("failed to get arm {0:?} from dependencies")]
    ArmNotFound(String),

    /// 未知命令
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// 参数缺失或类型错误
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// 路点索引越界
    #[error("index {index} out of range (0..{bound})")]
    IndexOutOfRange { index: i64, bound: usize },

    /// 机械臂运动失败
    #[error("failed to move arm to joint positions {context}: {source}")]
    MoveFailed {
        context: MoveContext,
        #[source]
        source: MoveError,
    },

    /// 执行被取消
    #[error("execution cancelled")]
    Cancelled,

    /// 控制器已关闭
    #[error("controller is closed")]
    Closed,
}

impl ControllerError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        ControllerError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
