//! 脚本加载错误

use thiserror::Error;

/// 脚本文件加载/校验错误
#[derive(Error, Debug)]
pub enum ScriptLoadError {
    /// 读取或写入脚本文件失败
    #[error("Script file IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析或序列化失败
    #[error("Script JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 脚本内容无效
    #[error("Invalid script: {0}")]
    Invalid(String),
}
