//! 事件类型与合并信号（EventSignal）
//!
//! 每种事件只有一个布尔标志：调度线程取走之前的多次触发会合并为一次，
//! 这是有意的事件合并，而不是队列。
//!
//! # 优先级
//!
//! 多个事件同时挂起时，调度线程按 [`EventKind::ALL`] 的顺序选择：
//! Clock > AccelPacket > GyroPacket > GpsPacket > LidarPacket。
//! 数据包之间的相对顺序沿用枚举顺序，没有语义含义。

use crate::run_state::RunState;
use parking_lot::{Condvar, Mutex};
use std::fmt;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    Clock = 0,
    AccelPacket = 1,
    GyroPacket = 2,
    GpsPacket = 3,
    LidarPacket = 4,
}

impl EventKind {
    /// 所有事件类型（按调度优先级排列）
    pub const ALL: [EventKind; 5] = [
        EventKind::Clock,
        EventKind::AccelPacket,
        EventKind::GyroPacket,
        EventKind::GpsPacket,
        EventKind::LidarPacket,
    ];

    /// 传感器数据包类型（数据包生产者的随机选择范围）
    pub const PACKETS: [EventKind; 4] = [
        EventKind::AccelPacket,
        EventKind::GyroPacket,
        EventKind::GpsPacket,
        EventKind::LidarPacket,
    ];

    /// 数组下标（与优先级一致）
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn is_packet(self) -> bool {
        self != EventKind::Clock
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Clock => "clock",
            EventKind::AccelPacket => "accel_packet",
            EventKind::GyroPacket => "gyro_packet",
            EventKind::GpsPacket => "gps_packet",
            EventKind::LidarPacket => "lidar_packet",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 挂起事件集合（位掩码，Bit 0-4 对应 `EventKind::ALL`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventSet(u8);

impl EventSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// 插入，返回插入前是否不存在
    pub fn insert(&mut self, kind: EventKind) -> bool {
        let fresh = !self.contains(kind);
        self.0 |= kind.bit();
        fresh
    }

    /// 移除，返回移除前是否存在
    pub fn remove(&mut self, kind: EventKind) -> bool {
        let present = self.contains(kind);
        self.0 &= !kind.bit();
        present
    }

    /// 优先级最高的挂起事件
    pub fn first(self) -> Option<EventKind> {
        EventKind::ALL.into_iter().find(|&k| self.contains(k))
    }

    /// 按优先级遍历
    pub fn iter(self) -> impl Iterator<Item = EventKind> {
        EventKind::ALL.into_iter().filter(move |&k| self.contains(k))
    }
}

impl FromIterator<EventKind> for EventSet {
    fn from_iter<I: IntoIterator<Item = EventKind>>(iter: I) -> Self {
        let mut set = EventSet::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// 合并事件信号
///
/// 标志位与条件变量共用一把锁，`raise` 在锁内修改标志，
/// 因此调度线程检查完标志、进入等待之前不会丢失唤醒。
#[derive(Debug, Default)]
pub struct EventSignal {
    pending: Mutex<EventSet>,
    cond: Condvar,
}

impl EventSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置事件标志并唤醒调度线程
    ///
    /// # 返回
    /// - `true`: 新的挂起事件
    /// - `false`: 该事件已挂起，本次触发被合并
    pub fn raise(&self, kind: EventKind) -> bool {
        let fresh = self.pending.lock().insert(kind);
        self.cond.notify_all();
        fresh
    }

    /// 阻塞直到有挂起事件或请求停止
    ///
    /// 请求停止时立即返回空集合。
    pub fn wait_for_any(&self, run: &RunState) -> EventSet {
        let mut pending = self.pending.lock();
        while run.is_running() && pending.is_empty() {
            self.cond.wait(&mut pending);
        }
        if run.is_running() {
            *pending
        } else {
            EventSet::empty()
        }
    }

    /// 取出优先级最高的挂起事件
    ///
    /// 阻塞直到有挂起事件或请求停止。运行检查、优先级选择和清除标志
    /// 在同一把锁内完成；请求停止后返回 `None`，挂起标志保持不变。
    pub fn take_next(&self, run: &RunState) -> Option<EventKind> {
        let mut pending = self.pending.lock();
        while run.is_running() && pending.is_empty() {
            self.cond.wait(&mut pending);
        }
        if !run.is_running() {
            return None;
        }
        let kind = pending.first()?;
        pending.remove(kind);
        Some(kind)
    }

    /// 清除单个事件标志，返回清除前是否挂起
    pub fn clear(&self, kind: EventKind) -> bool {
        self.pending.lock().remove(kind)
    }

    /// 当前挂起的事件
    pub fn pending(&self) -> EventSet {
        *self.pending.lock()
    }

    /// 唤醒等待者（不改变标志，用于停止流程）
    pub fn wake_all(&self) {
        let _guard = self.pending.lock();
        self.cond.notify_all();
    }
}
