//! 机器人事件模拟器核心
//!
//! 本 crate 协调三个线程驱动用户脚本：
//! - 时钟生产者：固定周期触发 `Clock` 事件
//! - 数据包生产者：固定周期随机触发一种传感器数据包事件
//! - 调度线程：独占脚本运行时和 `Robot`，按优先级逐个执行回调
//!
//! # 核心保证
//!
//! - 回调互斥：任意时刻最多一个回调在执行
//! - 就绪门：初始化回调完成之前不会产生任何事件
//! - 事件合并：同一类型的多次触发在被调度前合并为一次
//! - 优雅停止：停止后不再开始新回调，所有线程在有限时间内退出
//!
//! # 使用示例
//!
//! ```no_run
//! use rover_driver::{EventKind, Robot, ScriptError, ScriptRuntime, SimulatorBuilder};
//! use std::time::Duration;
//!
//! struct Echo;
//!
//! impl ScriptRuntime for Echo {
//!     fn init(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
//!         Ok(())
//!     }
//!
//!     fn on_clock(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
//!         robot.move_forward();
//!         Ok(())
//!     }
//! }
//!
//! let mut sim = SimulatorBuilder::new()
//!     .clock_period(Duration::from_millis(100))
//!     .build(Echo)?;
//! sim.wait_ready(Duration::from_secs(1))?;
//! sim.raise(EventKind::LidarPacket);
//! let report = sim.stop()?;
//! println!("{} callbacks", report.metrics.total_dispatched());
//! # Ok::<(), rover_driver::RoverError>(())
//! ```

mod builder;
pub mod config;
pub mod context;
pub mod dispatch_state;
mod dispatcher;
mod error;
pub mod event;
pub mod latch;
pub mod metrics;
pub mod producer;
pub mod run_state;
pub mod runtime;
mod simulator;
pub mod state;

pub use builder::SimulatorBuilder;
pub use config::SimConfig;
pub use context::SimContext;
pub use dispatch_state::{AtomicDispatcherState, DispatcherState};
pub use dispatcher::Dispatcher;
pub use error::{RoverError, ScriptError};
pub use event::{EventKind, EventSet, EventSignal};
pub use latch::{LatchOutcome, LatchState, ReadyLatch};
pub use metrics::{MetricsSnapshot, SimMetrics};
pub use producer::{ClockProducer, PacketProducer, Producer, producer_loop};
pub use run_state::{RunPhase, RunState};
pub use runtime::ScriptRuntime;
pub use simulator::{ProducerFault, ShutdownReport, Simulator};
pub use state::*;
