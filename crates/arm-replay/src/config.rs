//! # 回放配置
//!
//! 描述一次回放任务：使用哪个机械臂、按什么顺序经过哪些路点、重复多少次。
//!
//! 配置文件支持 TOML 与 JSON 两种格式（按扩展名区分），字段名与宿主属性一致：
//!
//! ```toml
//! arm = "arm-1"
//! num_repeats = 2
//! joint_positions = [
//!     [0.0, 0.0, 0.0],
//!     [90.0, 0.0, 0.0],
//! ]
//! ```
//!
//! 解析得到 [`RawConfig`]，经 [`Config::try_from`] 校验后得到不可变的 [`Config`]。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// 路点：一组有序的关节值（单位与长度由具体机械臂决定）
pub type Waypoint = Vec<f64>;

/// 未校验的配置文档
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    /// 机械臂名称
    #[serde(default)]
    pub arm: String,

    /// 路点序列
    #[serde(default)]
    pub joint_positions: Vec<Waypoint>,

    /// 重复次数
    #[serde(default)]
    pub num_repeats: i64,
}

impl RawConfig {
    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 从 JSON 文本解析
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 校验配置
    ///
    /// 依次检查：机械臂名称非空、路点非空、每个路点非空、重复次数为正。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arm.is_empty() {
            return Err(ConfigError::EmptyArm);
        }
        if self.joint_positions.is_empty() {
            return Err(ConfigError::NoWaypoints);
        }
        if let Some(index) = self.joint_positions.iter().position(|jp| jp.is_empty()) {
            return Err(ConfigError::EmptyWaypoint { index });
        }
        if self.num_repeats <= 0 {
            return Err(ConfigError::NonPositiveRepeats {
                value: self.num_repeats,
            });
        }
        if self.num_repeats > i64::from(u32::MAX) {
            return Err(ConfigError::TooManyRepeats {
                value: self.num_repeats,
                max: u32::MAX,
            });
        }
        Ok(())
    }

    /// 从文件加载（不校验）
    ///
    /// 按扩展名选择格式：`.toml` 或 `.json`。
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e.into(),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// 已校验的回放配置
///
/// 构造后不可变。字段只能通过访问器读取。
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    arm: String,
    waypoints: Vec<Waypoint>,
    repeat_count: u32,
}

impl Config {
    /// 直接构造并校验
    pub fn new(
        arm: impl Into<String>,
        waypoints: Vec<Waypoint>,
        repeat_count: i64,
    ) -> Result<Self, ConfigError> {
        Self::try_from(RawConfig {
            arm: arm.into(),
            joint_positions: waypoints,
            num_repeats: repeat_count,
        })
    }

    /// 从文件加载并校验配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::try_from(RawConfig::load_from_file(path)?)
    }

    /// 机械臂名称
    pub fn arm(&self) -> &str {
        &self.arm
    }

    /// 路点序列
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// 重复次数（> 0）
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        raw.validate()?;
        let repeat_count =
            u32::try_from(raw.num_repeats).map_err(|_| ConfigError::TooManyRepeats {
                value: raw.num_repeats,
                max: u32::MAX,
            })?;

        Ok(Config {
            arm: raw.arm,
            waypoints: raw.joint_positions,
            repeat_count,
        })
    }
}
