//! 就绪闩锁（scriptReady）
//!
//! 一次性门闩：调度线程完成脚本初始化后打开，此后永久保持打开。
//! 初始化失败时转入 `Failed`，同样是终态，等待者会被释放并得到 `Aborted`。

use crate::error::ScriptError;
use crate::run_state::RunState;
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// 闩锁状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatchState {
    /// 等待初始化
    #[default]
    Pending,
    /// 初始化完成
    Ready,
    /// 初始化失败
    Failed,
}

/// 生产者等待结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchOutcome {
    /// 已就绪，可以开始产生事件
    Ready,
    /// 初始化失败或已请求停止
    Aborted,
}

#[derive(Debug, Default)]
struct LatchInner {
    state: LatchState,
    failure: Option<ScriptError>,
}

/// 就绪闩锁
#[derive(Debug, Default)]
pub struct ReadyLatch {
    inner: Mutex<LatchInner>,
    cond: Condvar,
}

impl ReadyLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前状态
    pub fn state(&self) -> LatchState {
        self.inner.lock().state
    }

    /// 初始化失败原因（仅 Failed 状态下存在）
    pub fn failure(&self) -> Option<ScriptError> {
        self.inner.lock().failure.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LatchState::Ready
    }

    /// 打开闩锁（`Pending → Ready`），唤醒所有等待者
    ///
    /// 只在 Pending 时生效，返回是否发生了迁移。
    pub fn open(&self) -> bool {
        self.settle(LatchState::Ready, None)
    }

    /// 标记初始化失败（`Pending → Failed`），唤醒所有等待者
    pub fn fail(&self, error: ScriptError) -> bool {
        self.settle(LatchState::Failed, Some(error))
    }

    /// 唤醒所有等待者（不改变状态，用于停止流程）
    pub fn wake_all(&self) {
        let _guard = self.inner.lock();
        self.cond.notify_all();
    }

    /// 阻塞直到就绪、失败或停止
    pub fn wait(&self, run: &RunState) -> LatchOutcome {
        let mut inner = self.inner.lock();
        while inner.state == LatchState::Pending && run.is_running() {
            self.cond.wait(&mut inner);
        }
        match inner.state {
            LatchState::Ready if run.is_running() => LatchOutcome::Ready,
            _ => LatchOutcome::Aborted,
        }
    }

    /// 阻塞直到状态离开 Pending 或超时
    ///
    /// 超时返回 `LatchState::Pending`。
    pub fn wait_settled(&self, timeout: Duration) -> LatchState {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        while inner.state == LatchState::Pending {
            if self.cond.wait_until(&mut inner, deadline).timed_out() {
                break;
            }
        }
        inner.state
    }

    fn settle(&self, target: LatchState, failure: Option<ScriptError>) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != LatchState::Pending {
            return false;
        }
        inner.state = target;
        inner.failure = failure;
        self.cond.notify_all();
        true
    }
}
