//! exec 命令
//!
//! 执行单条命令；运行期间按 Ctrl-C 发送 cancel

use anyhow::{Context, Result};
use arm_replay::{Command, RepeatArmMovements};
use clap::Args;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use super::ControllerArgs;

/// 单条命令参数
#[derive(Args, Debug)]
pub struct ExecCommand {
    #[command(flatten)]
    pub controller: ControllerArgs,

    /// 命令：`execute`、`move_to_index <i>`、`cancel`，或 JSON 请求
    #[arg(long)]
    pub command: String,
}

impl ExecCommand {
    /// 执行命令
    pub async fn execute(&self) -> Result<()> {
        let command = Command::parse_text(&self.command).context("无法解析命令")?;
        let controller = self.controller.build()?;

        let response = run_with_ctrl_c(controller, command).await?;
        println!("{}", response.to_value());
        Ok(())
    }
}

/// 在专用线程执行命令，收到 Ctrl-C 时取消
pub async fn run_with_ctrl_c(
    controller: Arc<RepeatArmMovements>,
    command: Command,
) -> Result<arm_replay::CommandResponse> {
    let worker = controller.clone();
    // ✅ 在专用 OS 线程中运行，不阻塞 Tokio Worker
    let mut task = spawn_blocking(move || worker.dispatch(command));

    let finished = tokio::select! {
        result = &mut task => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let result = match finished {
        Some(result) => result,
        None => {
            eprintln!();
            eprintln!("🛑 收到停止信号，正在取消...");
            controller.cancel();
            task.await
        },
    };

    result
        .context("任务执行失败")?
        .with_context(|| format!("{} 失败", command.name()))
}
