//! 周期事件生产者
//!
//! 两个独立计时的生产者：
//! - [`ClockProducer`]: 每个周期触发一次 `Clock`
//! - [`PacketProducer`]: 每个周期随机选择一种传感器数据包触发
//!
//! 生产者只通过 [`EventSignal`](crate::event::EventSignal) 与调度线程通信，
//! 从不接触 `Robot`。

use crate::context::SimContext;
use crate::event::EventKind;
use crate::latch::LatchOutcome;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 事件生产者
///
/// 生产者没有可恢复的错误路径：`next_event` 内部的 panic 会结束该生产者线程，
/// 由生命周期管理在停止时记录。
pub trait Producer: Send {
    /// 生产者名称（用于日志和线程名）
    fn name(&self) -> &str;

    /// 触发周期
    fn period(&self) -> Duration;

    /// 本周期要触发的事件
    fn next_event(&mut self) -> EventKind;
}

/// 时钟生产者
#[derive(Debug, Clone)]
pub struct ClockProducer {
    period: Duration,
}

impl ClockProducer {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Producer for ClockProducer {
    fn name(&self) -> &str {
        "clock"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn next_event(&mut self) -> EventKind {
        EventKind::Clock
    }
}

/// 传感器数据包生产者
///
/// 每个周期从四种数据包中均匀随机选择一种，模拟互不同时到达的传感器。
#[derive(Debug, Clone)]
pub struct PacketProducer {
    period: Duration,
    rng: StdRng,
}

impl PacketProducer {
    /// 创建数据包生产者
    ///
    /// `seed` 为 `None` 时使用系统熵初始化随机数生成器。
    pub fn new(period: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { period, rng }
    }
}

impl Producer for PacketProducer {
    fn name(&self) -> &str {
        "packet"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn next_event(&mut self) -> EventKind {
        EventKind::PACKETS[self.rng.gen_range(0..EventKind::PACKETS.len())]
    }
}

/// 生产者循环
///
/// 1. 等待就绪闩锁（初始化失败或停止时直接退出）
/// 2. 循环：可中断休眠一个周期；醒来后若仍在运行，触发恰好一个事件
///
/// 停止后不会再做最后一次触发。
pub fn producer_loop(mut producer: Box<dyn Producer>, ctx: Arc<SimContext>) {
    let name = producer.name().to_string();

    if ctx.ready.wait(&ctx.run) == LatchOutcome::Aborted {
        debug!(producer = %name, "producer aborted before first tick");
        return;
    }

    let period = producer.period();
    debug!(producer = %name, ?period, "producer started");

    while ctx.run.sleep(period) {
        let kind = producer.next_event();
        if !ctx.run.is_running() {
            break;
        }
        ctx.raise(kind);
    }

    debug!(producer = %name, "producer stopped");
}
