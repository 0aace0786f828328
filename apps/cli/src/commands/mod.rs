//! 命令定义和实现

pub mod exec;
pub mod validate;

pub use exec::ExecCommand;
pub use validate::ValidateCommand;

use anyhow::{Context, Result};
use arm_replay::{Config, Dependencies, MoveOptions, RawConfig, RepeatArmMovements, SimulatedArm};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// 控制器参数（配置文件 + 模拟机械臂）
#[derive(Args, Debug, Clone)]
pub struct ControllerArgs {
    /// 配置文件路径（.toml 或 .json）
    #[arg(short, long)]
    pub config: PathBuf,

    /// 模拟机械臂每次运动耗时（毫秒）
    #[arg(long, default_value_t = 500)]
    pub move_duration_ms: u64,

    /// 最大关节速度（透传给机械臂驱动）
    #[arg(long)]
    pub max_velocity: Option<f64>,

    /// 最大关节加速度（透传给机械臂驱动）
    #[arg(long)]
    pub max_acceleration: Option<f64>,
}

impl ControllerArgs {
    /// 加载配置
    pub fn load_config(&self) -> Result<Config> {
        Config::load_from_file(&self.config)
            .with_context(|| format!("加载配置失败: {}", self.config.display()))
    }

    /// 运动选项（未指定任何上限时为 `None`）
    pub fn move_options(&self) -> Option<MoveOptions> {
        if self.max_velocity.is_none() && self.max_acceleration.is_none() {
            return None;
        }
        Some(MoveOptions {
            max_velocity: self.max_velocity,
            max_acceleration: self.max_acceleration,
        })
    }

    /// 构造控制器
    ///
    /// 模拟机械臂以配置中的名称注册到依赖集合，由控制器校验配置并解析机械臂。
    pub fn build(&self) -> Result<Arc<RepeatArmMovements>> {
        let raw = RawConfig::load_from_file(&self.config)
            .with_context(|| format!("加载配置失败: {}", self.config.display()))?;
        let arm = SimulatedArm::new().with_move_duration(Duration::from_millis(self.move_duration_ms));
        let deps = Dependencies::new().with_arm(raw.arm.clone(), Arc::new(arm));

        let mut controller = RepeatArmMovements::from_raw_config(raw, &deps)
            .with_context(|| format!("无法创建控制器: {}", self.config.display()))?;
        if let Some(options) = self.move_options() {
            controller = controller.with_move_options(options);
        }
        Ok(Arc::new(controller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_from_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"arm": "arm-1", "joint_positions": [[0.0], [1.0]], "num_repeats": 2}}"#
        )
        .unwrap();

        let args = ControllerArgs {
            config: file.path().to_path_buf(),
            move_duration_ms: 0,
            max_velocity: None,
            max_acceleration: None,
        };
        let controller = args.build().unwrap();
        assert_eq!(controller.config().repeat_count(), 2);
    }

    #[test]
    fn test_build_reports_invalid_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "arm = \"\"\nnum_repeats = 1\njoint_positions = [[0.0]]").unwrap();

        let args = ControllerArgs {
            config: file.path().to_path_buf(),
            move_duration_ms: 0,
            max_velocity: None,
            max_acceleration: None,
        };
        let err = args.build().err().unwrap();
        assert!(format!("{:#}", err).contains("arm must be specified"));
    }

    #[test]
    fn test_move_options_from_flags() {
        let mut args = ControllerArgs {
            config: PathBuf::from("replay.toml"),
            move_duration_ms: 0,
            max_velocity: None,
            max_acceleration: None,
        };
        assert_eq!(args.move_options(), None);

        args.max_velocity = Some(0.5);
        assert_eq!(
            args.move_options(),
            Some(MoveOptions {
                max_velocity: Some(0.5),
                max_acceleration: None,
            })
        );
    }
}
