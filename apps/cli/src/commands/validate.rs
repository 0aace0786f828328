//! validate 命令
//!
//! 加载并校验配置文件，打印摘要

use anyhow::Result;
use clap::Args;

use super::ControllerArgs;

/// 校验命令参数
#[derive(Args, Debug)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub controller: ControllerArgs,
}

impl ValidateCommand {
    /// 执行校验
    pub fn execute(&self) -> Result<()> {
        let config = self.controller.load_config()?;

        println!("✅ 配置有效: {}", self.controller.config.display());
        println!("  机械臂: {}", config.arm());
        println!("  重复次数: {}", config.repeat_count());
        println!("  路点数: {}", config.waypoints().len());
        for (i, waypoint) in config.waypoints().iter().enumerate() {
            println!("    [{}] {:?}", i, waypoint);
        }

        Ok(())
    }
}
