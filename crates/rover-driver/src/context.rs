//! 共享协调上下文
//!
//! 取代进程级全局标志：运行标志、就绪闩锁、事件信号和指标集中在一个对象里，
//! 通过 `Arc<SimContext>` 交给每个线程。

use crate::event::{EventKind, EventSignal};
use crate::latch::ReadyLatch;
use crate::metrics::SimMetrics;
use crate::run_state::RunState;
use tracing::trace;

/// 线程间共享的协调状态
#[derive(Debug, Default)]
pub struct SimContext {
    /// 运行标志
    pub run: RunState,
    /// 就绪闩锁（脚本初始化完成后打开）
    pub ready: ReadyLatch,
    /// 事件合并信号
    pub signal: EventSignal,
    /// 运行指标
    pub metrics: SimMetrics,
}

impl SimContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 触发事件（记录指标）
    ///
    /// 返回 `false` 表示该事件已挂起，本次触发被合并。
    pub fn raise(&self, kind: EventKind) -> bool {
        let fresh = self.signal.raise(kind);
        self.metrics.record_raise(fresh);
        if fresh {
            trace!(event = %kind, "event raised");
        } else {
            trace!(event = %kind, "event coalesced");
        }
        fresh
    }

    /// 请求停止并唤醒所有等待者
    ///
    /// 先翻转运行标志，再依次唤醒事件信号和就绪闩锁上的等待线程。
    /// 返回调用前是否处于运行中。
    pub fn shutdown(&self) -> bool {
        let was_running = self.run.request_stop();
        self.signal.wake_all();
        self.ready.wake_all();
        was_running
    }
}
