//! 驱动层错误类型定义

use thiserror::Error;

/// 脚本运行时错误
///
/// 由 [`ScriptRuntime`](crate::runtime::ScriptRuntime) 的回调返回，
/// 或由调度线程在回调 panic 时构造。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// 回调执行失败（脚本主动报错）
    #[error("Script callback failed: {0}")]
    Failed(String),

    /// 脚本缺少必要的入口或数据
    #[error("Script entry missing: {0}")]
    Missing(String),

    /// 回调 panic（在调度线程边界被捕获）
    #[error("Script callback panicked: {0}")]
    Panicked(String),
}

impl ScriptError {
    /// 构造 `Failed` 错误的便捷方法
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// 驱动层错误类型
///
/// 需要 `Clone`：`Simulator::stop()` 会缓存首次停止的结果，重复调用时返回副本。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoverError {
    /// 脚本初始化失败（致命，调度从未开始）
    #[error("Script initialization failed: {0}")]
    ScriptInit(#[source] ScriptError),

    /// 操作超时
    #[error("Operation timeout")]
    Timeout,

    /// 线程创建失败
    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(String),

    /// 调度线程 panic（非回调内部，回调 panic 会被捕获）
    #[error("Dispatcher thread panicked: {0}")]
    DispatcherPanicked(String),

    /// 配置无效
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// 配置文件读取失败
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RoverError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// 将 panic 负载转换为可读字符串
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
