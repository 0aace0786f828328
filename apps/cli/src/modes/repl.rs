//! REPL 模式（交互式 Shell）
//!
//! 使用专用输入线程 + crossbeam 通道，保留历史记录，不阻塞 tokio。
//! 一个常驻的转发任务把输入行搬到 tokio 通道，主循环的 `select!` 丢弃接收时不会丢行。
//! `execute` / `move_to_index` 在后台 `spawn_blocking` 中运行，
//! 因此执行期间仍可输入 `cancel`（或按 Ctrl+C）打断运动。

use anyhow::Result;
use arm_replay::{Command, ExecutionState, RepeatArmMovements};
use clap::Args;
use crossbeam_channel::{Receiver, bounded};
use rustyline::Editor;
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::commands::ControllerArgs;

/// Shell 参数
#[derive(Args, Debug)]
pub struct ShellArgs {
    #[command(flatten)]
    pub controller: ControllerArgs,
}

/// 输入行的分类
#[derive(Debug, PartialEq)]
pub enum ReplLine {
    /// 空行
    Empty,
    /// 退出
    Exit,
    /// 帮助
    Help,
    /// 状态
    Status,
    /// Ctrl+C
    Interrupt,
    /// 控制器命令
    Command(Command),
    /// 无法解析
    Invalid(String),
}

impl ReplLine {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => ReplLine::Empty,
            "exit" | "quit" => ReplLine::Exit,
            "help" => ReplLine::Help,
            "status" => ReplLine::Status,
            SIGINT => ReplLine::Interrupt,
            other => match Command::parse_text(other) {
                Ok(command) => ReplLine::Command(command),
                Err(err) => ReplLine::Invalid(err.to_string()),
            },
        }
    }
}

/// 输入线程用来表示 Ctrl+C 的特殊命令
const SIGINT: &str = "SIGINT";

/// REPL 会话（持有控制器）
pub struct ReplSession {
    controller: Arc<RepeatArmMovements>,
}

impl ReplSession {
    pub fn new(controller: Arc<RepeatArmMovements>) -> Self {
        Self { controller }
    }

    /// 状态描述
    pub fn status(&self) -> String {
        let state = match self.controller.state() {
            ExecutionState::Idle => "空闲",
            ExecutionState::Running => "执行中",
            ExecutionState::Completed => "已完成",
            ExecutionState::Failed => "失败",
            ExecutionState::Cancelled => "已取消",
        };
        let config = self.controller.config();
        format!(
            "{} (arm: {}, 路点: {}, 重复: {})",
            state,
            config.arm(),
            config.waypoints().len(),
            config.repeat_count()
        )
    }

    /// 执行控制器命令
    ///
    /// `cancel` 同步执行；其余命令在后台线程执行，完成后打印结果。
    pub fn run_command(&self, command: Command) {
        if command == Command::Cancel {
            match self.controller.dispatch(command) {
                Ok(response) => println!("{}", response.to_value()),
                Err(err) => eprintln!("❌ Error: {}", err),
            }
            return;
        }

        if self.controller.state() == ExecutionState::Running {
            println!("⏳ 上一条命令仍在执行，本命令将在其结束后开始（可用 cancel 取消）");
        }

        let controller = self.controller.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || controller.dispatch(command)).await;
            match result {
                Ok(Ok(response)) => println!("✅ {}", response.to_value()),
                Ok(Err(err)) => eprintln!("❌ {}: {}", command.name(), err),
                Err(err) => warn!(error = %err, "command task failed"),
            }
        });
    }

    /// 取消当前作用域
    pub fn interrupt(&self) {
        eprintln!("🛑 取消当前运动");
        self.controller.cancel();
    }

    /// 关闭控制器
    pub fn close(&self) {
        self.controller.close();
    }
}

/// REPL 输入（专用输入线程）
pub struct ReplInput {
    lines: mpsc::Receiver<String>,
    _input_thread: thread::JoinHandle<Result<()>>,
}

impl ReplInput {
    /// 创建专用输入线程（保留历史记录）
    pub fn new() -> Self {
        let (command_tx, command_rx) = bounded::<String>(10);

        // ⭐ 在专用线程内创建 Editor（生命周期 = REPL 会话）
        let input_thread = thread::spawn(move || {
            use rustyline::history::DefaultHistory;

            let mut rl = Editor::<(), DefaultHistory>::new()
                .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;

            let history_path = ".arm_replay_history";
            rl.load_history(history_path).ok(); // 首次运行没有历史文件

            println!("Arm Replay CLI v{} - 交互式 Shell", env!("CARGO_PKG_VERSION"));
            println!("输入 'help' 查看帮助，'exit' 退出");
            println!();

            loop {
                match rl.readline("replay> ") {
                    Ok(line) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }

                        let exit = line == "exit" || line == "quit";
                        let _ = rl.add_history_entry(line.clone());

                        if command_tx.send(line).is_err() || exit {
                            rl.save_history(history_path).ok();
                            break;
                        }
                    },

                    Err(rustyline::error::ReadlineError::Interrupted) => {
                        // Ctrl+C：在主线程处理取消
                        println!("^C");
                        let _ = command_tx.send(SIGINT.to_string());
                    },

                    Err(rustyline::error::ReadlineError::Eof) => {
                        rl.save_history(history_path).ok();
                        let _ = command_tx.send("exit".to_string());
                        break;
                    },

                    Err(err) => {
                        eprintln!("Error: {:?}", err);
                        break;
                    },
                }
            }

            Ok(())
        });

        Self {
            lines: forward_lines(command_rx),
            _input_thread: input_thread,
        }
    }

    /// 等待用户输入
    ///
    /// 可安全地用在 `select!` 中：未完成的接收被丢弃时不会消耗输入行。
    pub async fn recv_command(&mut self) -> Option<String> {
        self.lines.recv().await
    }
}

/// 启动常驻转发任务：crossbeam 通道 → tokio 通道
///
/// 输入线程关闭发送端后，返回的接收端在读完剩余行后得到 `None`。
fn forward_lines(input: Receiver<String>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(10);
    tokio::task::spawn_blocking(move || {
        while let Ok(line) = input.recv() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
        debug!("repl input forwarder stopped");
    });
    rx
}

/// 运行 REPL 模式
pub async fn run_repl(args: ShellArgs) -> Result<()> {
    let session = ReplSession::new(args.controller.build()?);
    let mut input = ReplInput::new();

    println!();
    println!("📋 {}", session.status());
    println!();

    loop {
        tokio::select! {
            line = input.recv_command() => {
                let Some(line) = line else {
                    break;
                };

                match ReplLine::parse(&line) {
                    ReplLine::Empty => {},
                    ReplLine::Exit => {
                        println!("👋 再见！");
                        break;
                    },
                    ReplLine::Help => print_help(),
                    ReplLine::Status => println!("📊 状态: {}", session.status()),
                    ReplLine::Interrupt => session.interrupt(),
                    ReplLine::Command(command) => session.run_command(command),
                    ReplLine::Invalid(reason) => {
                        eprintln!("❌ Error: {}", reason);
                        eprintln!("💡 提示: 输入 'help' 查看所有命令");
                    },
                }
            }

            _ = tokio::signal::ctrl_c() => {
                session.interrupt();
            }
        }
    }

    session.close();
    Ok(())
}

/// 打印帮助信息
fn print_help() {
    println!("可用命令:");
    println!("  execute                       按配置重复执行所有路点");
    println!("  move_to_index <i>             移动到第 i 个路点（从 0 开始）");
    println!("  cancel                        取消正在进行的运动");
    println!("  {{\"command\": ...}}             JSON 格式的请求");
    println!("  status                        显示执行状态");
    println!("  help                          显示帮助");
    println!("  exit / quit                   退出");
    println!();
    println!("快捷键:");
    println!("  Ctrl+C                        取消运动");
    println!("  Ctrl+D                        退出");
    println!();
}
