//! 运行模式
//!
//! - One-shot 模式：见 [`crate::commands`]
//! - REPL 模式：交互式 Shell，长命令在后台执行，可随时 cancel

pub mod repl;
