//! 模拟器运行指标
//!
//! 原子计数器，可以在任何线程读取，不引入锁竞争。

use crate::event::EventKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// 模拟器实时指标
///
/// # 使用示例
///
/// ```rust
/// use rover_driver::{EventKind, SimMetrics};
/// use std::sync::atomic::Ordering;
///
/// let metrics = SimMetrics::new();
/// metrics.record_dispatch(EventKind::Clock);
/// metrics.raises_total.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.dispatched(EventKind::Clock), 1);
/// ```
#[derive(Debug, Default)]
pub struct SimMetrics {
    /// 事件触发总次数（包括被合并的触发）
    pub raises_total: AtomicU64,

    /// 被合并的触发次数（触发时该事件已挂起）
    ///
    /// 持续快速增长说明回调处理速度跟不上事件产生速度。
    pub raises_coalesced: AtomicU64,

    /// 每种事件的回调调用次数（下标为 `EventKind::index()`）
    pub dispatched: [AtomicU64; 5],

    /// 回调失败次数（返回错误或 panic）
    pub callback_faults: AtomicU64,

    /// 生产者线程异常退出次数
    pub producer_faults: AtomicU64,
}

impl SimMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次触发
    pub fn record_raise(&self, fresh: bool) {
        self.raises_total.fetch_add(1, Ordering::Relaxed);
        if !fresh {
            self.raises_coalesced.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 记录一次回调调用
    pub fn record_dispatch(&self, kind: EventKind) {
        self.dispatched[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次回调失败
    pub fn record_callback_fault(&self) {
        self.callback_faults.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次生产者异常退出
    pub fn record_producer_fault(&self) {
        self.producer_faults.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            raises_total: self.raises_total.load(Ordering::Relaxed),
            raises_coalesced: self.raises_coalesced.load(Ordering::Relaxed),
            dispatched: std::array::from_fn(|i| self.dispatched[i].load(Ordering::Relaxed)),
            callback_faults: self.callback_faults.load(Ordering::Relaxed),
            producer_faults: self.producer_faults.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照（不可变，用于读取）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub raises_total: u64,
    pub raises_coalesced: u64,
    pub dispatched: [u64; 5],
    pub callback_faults: u64,
    pub producer_faults: u64,
}

impl MetricsSnapshot {
    /// 某种事件的回调调用次数
    pub fn dispatched(&self, kind: EventKind) -> u64 {
        self.dispatched[kind.index()]
    }

    /// 数据包回调调用总数
    pub fn packets_dispatched(&self) -> u64 {
        EventKind::PACKETS.iter().map(|&k| self.dispatched(k)).sum()
    }

    /// 所有回调调用总数
    pub fn total_dispatched(&self) -> u64 {
        self.dispatched.iter().sum()
    }

    /// 合并率（百分比）
    ///
    /// 返回 0.0 到 100.0 之间的值。如果 `raises_total` 为 0，返回 0.0。
    pub fn coalesce_rate(&self) -> f64 {
        if self.raises_total == 0 {
            return 0.0;
        }
        (self.raises_coalesced as f64 / self.raises_total as f64) * 100.0
    }
}
