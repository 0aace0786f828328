//! # Arm Replay CLI
//!
//! 路点回放控制器的命令行工具（使用模拟机械臂）。
//!
//! ## 双模式架构
//!
//! ### One-shot 模式（推荐用于 CI/脚本）
//!
//! ```bash
//! # 校验配置
//! arm-replay-cli validate --config replay.toml
//!
//! # 执行单条命令（Ctrl-C 取消）
//! arm-replay-cli exec --config replay.toml --command execute
//! arm-replay-cli exec --config replay.toml --command '{"command": "move_to_index", "index": 1}'
//! ```
//!
//! ### REPL 模式（推荐用于调试）
//!
//! ```bash
//! $ arm-replay-cli shell --config replay.toml
//! replay> execute
//! replay> cancel
//! replay> move_to_index 0
//! replay> exit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod modes;

use commands::{ExecCommand, ValidateCommand};
use modes::repl::{ShellArgs, run_repl};

/// Arm Replay CLI - 路点回放命令行工具
#[derive(Parser, Debug)]
#[command(name = "arm-replay-cli")]
#[command(about = "Command-line interface for repeated arm waypoint replay", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 校验配置文件
    Validate {
        #[command(flatten)]
        args: ValidateCommand,
    },

    /// 执行单条命令
    Exec {
        #[command(flatten)]
        args: ExecCommand,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell {
        #[command(flatten)]
        args: ShellArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arm_replay_cli=info,arm_replay=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { args } => args.execute(),

        Commands::Exec { args } => args.execute().await,

        Commands::Shell { args } => run_repl(args).await,
    }
}
