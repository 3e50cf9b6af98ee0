//! 运行标志（running）
//!
//! 全局运行状态只允许 `Idle → Running → Stopped` 单向迁移，停止后不可重启。
//! 除了原子标志外还带有一个条件变量，生产者在周期休眠时等待它，
//! 这样 `stop()` 可以立即唤醒休眠中的线程，而不必等满一个周期。

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// 运行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RunPhase {
    /// 尚未启动（默认）
    #[default]
    Idle = 0,
    /// 线程运行中
    Running = 1,
    /// 已请求停止（终态）
    Stopped = 2,
}

impl RunPhase {
    /// 从 u8 转换
    ///
    /// 无效值视为 Stopped，保证读到异常值时线程倾向于退出。
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// 共享运行状态
#[derive(Debug, Default)]
pub struct RunState {
    phase: AtomicU8,
    lock: Mutex<()>,
    cond: Condvar,
}

impl RunState {
    /// 创建新的运行状态（Idle）
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前阶段
    pub fn phase(&self) -> RunPhase {
        RunPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// 是否处于运行中
    pub fn is_running(&self) -> bool {
        self.phase() == RunPhase::Running
    }

    /// `Idle → Running`
    ///
    /// 只能成功一次；已运行或已停止时返回 `false`。
    pub fn start(&self) -> bool {
        self.phase
            .compare_exchange(
                RunPhase::Idle.as_u8(),
                RunPhase::Running.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// 请求停止并唤醒所有休眠中的线程
    ///
    /// 返回调用前是否处于 Running。
    pub fn request_stop(&self) -> bool {
        let previous = RunPhase::from_u8(self.phase.swap(RunPhase::Stopped.as_u8(), Ordering::AcqRel));
        // 在锁内通知：已检查过标志、即将进入等待的线程不会错过这次唤醒
        let _guard = self.lock.lock();
        self.cond.notify_all();
        previous == RunPhase::Running
    }

    /// 可中断休眠
    ///
    /// 休眠 `period`，期间一旦请求停止立即返回。
    ///
    /// # 返回
    /// - `true`: 休眠结束且仍在运行
    /// - `false`: 已请求停止
    pub fn sleep(&self, period: Duration) -> bool {
        let deadline = Instant::now() + period;
        let mut guard = self.lock.lock();
        while self.is_running() {
            if self.cond.wait_until(&mut guard, deadline).timed_out() {
                return self.is_running();
            }
        }
        false
    }
}
