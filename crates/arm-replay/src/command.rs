//! 命令定义与解析
//!
//! 命令协议（JSON）：
//!
//! | 请求 | 响应 |
//! |------|------|
//! | `{"command": "execute"}` | `{"executed_repeats": n}` |
//! | `{"command": "move_to_index", "index": i}` | `{"moved_to_index": i}` |
//! | `{"command": "cancel"}` | `{"cancelled": true}` |

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ControllerError;

/// 命令参数包
pub type CommandParams = Map<String, Value>;

/// 已解析的命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 完整执行
    Execute,
    /// 移动到指定路点（未做范围检查）
    MoveToIndex { index: i64 },
    /// 取消当前作用域
    Cancel,
}

impl Command {
    /// 命令名称
    pub fn name(&self) -> &'static str {
        match self {
            Command::Execute => "execute",
            Command::MoveToIndex { .. } => "move_to_index",
            Command::Cancel => "cancel",
        }
    }

    /// 从参数包解析
    pub fn from_params(params: &CommandParams) -> Result<Self, ControllerError> {
        let name = match params.get("command") {
            Some(Value::String(name)) => name.as_str(),
            Some(_) => {
                return Err(ControllerError::invalid_parameter(
                    "command",
                    "must be a string",
                ));
            },
            None => {
                return Err(ControllerError::invalid_parameter(
                    "command",
                    "missing 'command' key",
                ));
            },
        };

        match name {
            "execute" => Ok(Command::Execute),
            "move_to_index" => {
                let index = params
                    .get("index")
                    .ok_or_else(|| {
                        ControllerError::invalid_parameter(
                            "index",
                            "move_to_index requires an 'index' key",
                        )
                    })
                    .and_then(parse_index)?;
                Ok(Command::MoveToIndex { index })
            },
            "cancel" => Ok(Command::Cancel),
            other => Err(ControllerError::UnknownCommand(other.to_string())),
        }
    }

    /// 从 JSON 值解析（必须是对象）
    pub fn from_value(value: &Value) -> Result<Self, ControllerError> {
        match value {
            Value::Object(params) => Self::from_params(params),
            _ => Err(ControllerError::invalid_parameter(
                "command",
                "request must be a JSON object",
            )),
        }
    }

    /// 解析文本命令
    ///
    /// 以 `{` 开头按 JSON 解析，否则按 `<name> [index]` 解析。
    pub fn parse_text(line: &str) -> Result<Self, ControllerError> {
        let line = line.trim();
        if line.starts_with('{') {
            let value: Value = serde_json::from_str(line).map_err(|e| {
                ControllerError::invalid_parameter("command", format!("invalid JSON: {}", e))
            })?;
            return Self::from_value(&value);
        }

        let mut parts = line.split_whitespace();
        let mut params = CommandParams::new();
        if let Some(name) = parts.next() {
            params.insert("command".to_string(), Value::String(name.to_string()));
        }
        if let Some(arg) = parts.next() {
            let index = match arg.parse::<i128>() {
                Ok(wide) => i64::try_from(wide).map_err(|_| index_out_of_range(arg))?,
                Err(_) => {
                    return Err(ControllerError::invalid_parameter(
                        "index",
                        format!("'{}' is not an integer", arg),
                    ));
                },
            };
            params.insert("index".to_string(), Value::from(index));
        }
        Self::from_params(&params)
    }
}

/// 索引必须是整数；整数值的浮点数（如 `2.0`）也接受
fn parse_index(value: &Value) -> Result<i64, ControllerError> {
    if let Some(index) = value.as_i64() {
        return Ok(index);
    }
    if let Some(wide) = value.as_u64() {
        return Err(index_out_of_range(wide));
    }
    // i64::MAX as f64 == 2^63，不在 i64 范围内
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        },
        Some(f) if f.fract() == 0.0 => Err(index_out_of_range(f)),
        Some(f) => Err(ControllerError::invalid_parameter(
            "index",
            format!("{} is not an integer", f),
        )),
        None => Err(ControllerError::invalid_parameter(
            "index",
            format!("expected an integer, got {}", value),
        )),
    }
}

fn index_out_of_range(index: impl std::fmt::Display) -> ControllerError {
    ControllerError::invalid_parameter("index", format!("{} is out of range", index))
}

/// 命令响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Executed { executed_repeats: u32 },
    MovedToIndex { moved_to_index: usize },
    Cancelled { cancelled: bool },
}

impl CommandResponse {
    /// 转换为 JSON 值
    pub fn to_value(&self) -> Value {
        match self {
            CommandResponse::Executed { executed_repeats } => {
                serde_json::json!({ "executed_repeats": executed_repeats })
            },
            CommandResponse::MovedToIndex { moved_to_index } => {
                serde_json::json!({ "moved_to_index": moved_to_index })
            },
            CommandResponse::Cancelled { cancelled } => {
                serde_json::json!({ "cancelled": cancelled })
            },
        }
    }
}
