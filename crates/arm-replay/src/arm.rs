//! 机械臂能力接口
//!
//! 控制器只通过 [`ArmClient::move_to_joint_positions`] 与机械臂交互，
//! 运动规划、逆运动学、安全限位等均由驱动实现负责。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::cancel::CancellationScope;
use crate::error::MoveError;

/// 运动选项
///
/// 目前仅透传给驱动；`None` 表示使用驱动默认值。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveOptions {
    /// 最大关节速度（驱动单位/秒）
    pub max_velocity: Option<f64>,
    /// 最大关节加速度（驱动单位/秒²）
    pub max_acceleration: Option<f64>,
}

/// 机械臂客户端
///
/// 实现必须是阻塞的：直到运动完成、失败，或 `scope` 被取消才返回。
/// 观察到取消时应返回 [`MoveError::Cancelled`]。
pub trait ArmClient: Send + Sync {
    /// 移动到目标关节位置
    fn move_to_joint_positions(
        &self,
        positions: &[f64],
        options: Option<&MoveOptions>,
        scope: &CancellationScope,
    ) -> Result<(), MoveError>;
}

impl<T: ArmClient + ?Sized> ArmClient for Arc<T> {
    fn move_to_joint_positions(
        &self,
        positions: &[f64],
        options: Option<&MoveOptions>,
        scope: &CancellationScope,
    ) -> Result<(), MoveError> {
        (**self).move_to_joint_positions(positions, options, scope)
    }
}

/// 已解析的依赖集合（机械臂名称 → 客户端）
#[derive(Clone, Default)]
pub struct Dependencies {
    arms: HashMap<String, Arc<dyn ArmClient>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个机械臂
    pub fn with_arm(mut self, name: impl Into<String>, arm: Arc<dyn ArmClient>) -> Self {
        self.insert(name, arm);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, arm: Arc<dyn ArmClient>) {
        self.arms.insert(name.into(), arm);
    }

    /// 按名称查找机械臂
    pub fn arm(&self, name: &str) -> Option<Arc<dyn ArmClient>> {
        self.arms.get(name).cloned()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("arms", &self.arms.keys().collect::<Vec<_>>())
            .finish()
    }
}
