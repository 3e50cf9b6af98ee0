//! 集成测试公共设施
//!
//! - `Probe`: 可配置的测试脚本运行时（阻塞、失败、延迟、并发检测）
//! - `Idle`: 永不触发的生产者，用于只通过 `raise` 注入事件的测试

#![allow(dead_code)]

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use rover_driver::{EventKind, Producer, Robot, ScriptError, ScriptRuntime};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// 测试脚本运行时
///
/// 回调完成时把事件名写入 `log`（`init` 写入 "init"）。
#[derive(Default)]
pub struct Probe {
    pub log: Arc<Mutex<Vec<String>>>,
    /// init 阻塞直到收到消息
    pub init_gate: Option<Receiver<()>>,
    pub fail_init: bool,
    /// 该事件的回调返回错误
    pub fail_on: Option<EventKind>,
    /// 第一次 clock 回调阻塞直到收到消息
    pub clock_gate: Option<Receiver<()>>,
    /// 回调开始时通知
    pub entered: Option<Sender<EventKind>>,
    pub callback_delay: Duration,
    pub busy: Arc<AtomicBool>,
    pub overlaps: Arc<AtomicU64>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(log: &Mutex<Vec<String>>) -> Vec<String> {
        log.lock().clone()
    }

    fn handle(&mut self, kind: EventKind) -> Result<(), ScriptError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(tx) = &self.entered {
            let _ = tx.send(kind);
        }
        if kind == EventKind::Clock {
            if let Some(gate) = self.clock_gate.take() {
                let _ = gate.recv();
            }
        }
        if !self.callback_delay.is_zero() {
            thread::sleep(self.callback_delay);
        }
        self.log.lock().push(kind.as_str().to_string());
        self.busy.store(false, Ordering::SeqCst);

        if self.fail_on == Some(kind) {
            return Err(ScriptError::failed(format!("{} rejected", kind)));
        }
        Ok(())
    }
}

impl ScriptRuntime for Probe {
    fn name(&self) -> &str {
        "probe"
    }

    fn init(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        if let Some(gate) = self.init_gate.take() {
            let _ = gate.recv();
        }
        if self.fail_init {
            return Err(ScriptError::failed("init rejected"));
        }
        self.log.lock().push("init".to_string());
        Ok(())
    }

    fn on_clock(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        self.handle(EventKind::Clock)
    }

    fn on_accel_packet(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        self.handle(EventKind::AccelPacket)
    }

    fn on_gyro_packet(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        self.handle(EventKind::GyroPacket)
    }

    fn on_gps_packet(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        self.handle(EventKind::GpsPacket)
    }

    fn on_lidar_packet(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
        robot.turn_left();
        self.handle(EventKind::LidarPacket)
    }
}

/// 永不触发的生产者（周期一小时，停止时被唤醒）
pub struct Idle(pub &'static str);

impl Producer for Idle {
    fn name(&self) -> &str {
        self.0
    }

    fn period(&self) -> Duration {
        Duration::from_secs(3600)
    }

    fn next_event(&mut self) -> EventKind {
        EventKind::Clock
    }
}

/// 在首次 `next_event` 时 panic 的生产者
pub struct Faulty {
    pub period: Duration,
}

impl Producer for Faulty {
    fn name(&self) -> &str {
        "faulty"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn next_event(&mut self) -> EventKind {
        panic!("sensor bus lost");
    }
}

/// 轮询直到条件成立或超时
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while !cond() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
    true
}
