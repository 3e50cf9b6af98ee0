//! 调度线程状态定义
//!
//! 状态迁移：
//!
//! ```text
//! Initializing ──ok──▶ Ready ◀──▶ Dispatching
//!      │                 │            │
//!      │ init 失败        └──▶ Draining ◀┘  (running = false)
//!      ▼                        │
//!   Stopped ◀───────────────────┘
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// 调度线程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DispatcherState {
    /// 初始化脚本运行时（默认）
    #[default]
    Initializing = 0,
    /// 等待事件
    Ready = 1,
    /// 正在执行回调
    Dispatching = 2,
    /// 已请求停止，不再开始新的回调
    Draining = 3,
    /// 终态，线程退出
    Stopped = 4,
}

impl DispatcherState {
    /// 从 u8 转换
    ///
    /// 如果值无效，返回 Stopped。
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Initializing,
            1 => Self::Ready,
            2 => Self::Dispatching,
            3 => Self::Draining,
            _ => Self::Stopped,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Stopped
    }
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Dispatching => "dispatching",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// 调度线程状态（原子版本，用于线程间共享）
///
/// 调度线程写入，其他线程只读（用于观测和测试）。
#[derive(Debug, Default)]
pub struct AtomicDispatcherState {
    inner: AtomicU8,
}

impl AtomicDispatcherState {
    pub fn new(state: DispatcherState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    pub fn get(&self) -> DispatcherState {
        DispatcherState::from_u8(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, state: DispatcherState) {
        self.inner.store(state.as_u8(), Ordering::Release);
    }
}
