//! 模拟器生命周期（对外 API）
//!
//! 提供对外的 `Simulator` 结构体，封装生产者线程、调度线程和停止流程。

use crate::builder::SimulatorBuilder;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::dispatch_state::{AtomicDispatcherState, DispatcherState};
use crate::dispatcher::Dispatcher;
use crate::error::{RoverError, ScriptError, panic_message};
use crate::event::EventKind;
use crate::latch::LatchState;
use crate::metrics::MetricsSnapshot;
use crate::producer::{Producer, producer_loop};
use crate::runtime::ScriptRuntime;
use crate::state::Robot;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info, warn};

/// 生产者线程异常退出记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerFault {
    /// 生产者名称
    pub producer: String,
    /// panic 信息
    pub message: String,
}

/// 停止报告
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    /// 调度线程退出时的机器人状态
    pub robot: Robot,
    /// 停止时的指标快照
    pub metrics: MetricsSnapshot,
    /// 运行期间异常退出的生产者
    pub producer_faults: Vec<ProducerFault>,
}

struct SimThreads {
    producers: Vec<(String, JoinHandle<()>)>,
    dispatcher: JoinHandle<Result<Robot, RoverError>>,
}

/// 机器人事件模拟器
///
/// 三个独立线程：时钟生产者、数据包生产者、调度线程。
/// 生产者在调度线程完成脚本初始化之前不会触发任何事件。
///
/// # 示例
///
/// ```no_run
/// use rover_driver::{Robot, ScriptError, ScriptRuntime, SimConfig, Simulator};
///
/// struct Quiet;
/// impl ScriptRuntime for Quiet {
///     fn init(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
///         Ok(())
///     }
/// }
///
/// let mut sim = Simulator::start(SimConfig::default(), Quiet).unwrap();
/// std::thread::sleep(std::time::Duration::from_secs(10));
/// let report = sim.stop().unwrap();
/// println!("clock callbacks: {}", report.metrics.dispatched(rover_driver::EventKind::Clock));
/// ```
pub struct Simulator {
    ctx: Arc<SimContext>,
    dispatcher_state: Arc<AtomicDispatcherState>,
    threads: Option<SimThreads>,
    outcome: Option<Result<ShutdownReport, RoverError>>,
}

impl Simulator {
    /// 使用默认生产者启动模拟器（非阻塞）
    pub fn start(
        config: SimConfig,
        runtime: impl ScriptRuntime + 'static,
    ) -> Result<Self, RoverError> {
        SimulatorBuilder::new().config(config).build(runtime)
    }

    /// 创建 Builder
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::new()
    }

    /// 启动线程（内部方法，由 Builder 调用）
    ///
    /// 线程启动顺序：时钟生产者、数据包生产者、调度线程。
    /// 任一线程创建失败时，停止已启动的线程后返回错误。
    pub(crate) fn launch(
        producers: Vec<Box<dyn Producer>>,
        runtime: Box<dyn ScriptRuntime>,
        robot: Robot,
    ) -> Result<Self, RoverError> {
        let ctx = Arc::new(SimContext::new());
        let dispatcher_state = Arc::new(AtomicDispatcherState::new(DispatcherState::Initializing));
        ctx.run.start();

        let mut producer_threads = Vec::with_capacity(producers.len());
        for producer in producers {
            let name = producer.name().to_string();
            let ctx_clone = ctx.clone();
            let spawned = thread::Builder::new()
                .name(format!("rover-{}", name))
                .spawn(move || producer_loop(producer, ctx_clone));
            match spawned {
                Ok(handle) => producer_threads.push((name, handle)),
                Err(e) => {
                    abort_launch(&ctx, producer_threads);
                    return Err(RoverError::ThreadSpawn(e.to_string()));
                },
            }
        }

        let dispatcher = Dispatcher::new(runtime, robot, ctx.clone(), dispatcher_state.clone());
        let dispatcher_thread = match thread::Builder::new()
            .name("rover-dispatcher".to_string())
            .spawn(move || dispatcher.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                abort_launch(&ctx, producer_threads);
                return Err(RoverError::ThreadSpawn(e.to_string()));
            },
        };

        info!(
            producers = producer_threads.len(),
            "Simulator started"
        );

        Ok(Self {
            ctx,
            dispatcher_state,
            threads: Some(SimThreads {
                producers: producer_threads,
                dispatcher: dispatcher_thread,
            }),
            outcome: None,
        })
    }

    /// 等待调度线程完成脚本初始化
    ///
    /// # 返回
    /// - `Ok(())`: 已就绪
    /// - `Err(RoverError::ScriptInit)`: 初始化失败（模拟器永远不会进入调度）
    /// - `Err(RoverError::Timeout)`: 超时
    pub fn wait_ready(&self, timeout: Duration) -> Result<(), RoverError> {
        match self.ctx.ready.wait_settled(timeout) {
            LatchState::Ready => Ok(()),
            LatchState::Failed => Err(RoverError::ScriptInit(
                self.ctx
                    .ready
                    .failure()
                    .unwrap_or_else(|| ScriptError::Missing("init failure reason".to_string())),
            )),
            LatchState::Pending => Err(RoverError::Timeout),
        }
    }

    /// 从外部注入事件
    ///
    /// 与生产者使用同一个合并信号。停止后调用无效果，返回 `false`。
    pub fn raise(&self, kind: EventKind) -> bool {
        if !self.ctx.run.is_running() {
            warn!(event = %kind, "Ignoring raise on stopped simulator");
            return false;
        }
        self.ctx.raise(kind)
    }

    /// 是否仍在运行（`stop()` 之前为 true）
    pub fn is_running(&self) -> bool {
        self.ctx.run.is_running()
    }

    /// 调度线程当前状态
    pub fn dispatcher_state(&self) -> DispatcherState {
        self.dispatcher_state.get()
    }

    /// 获取性能指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// 仍存活的生产者数量
    pub fn alive_producers(&self) -> usize {
        self.threads
            .as_ref()
            .map(|t| t.producers.iter().filter(|(_, h)| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// 检查是否健康
    ///
    /// 所有生产者和调度线程都存活时返回 `true`。
    pub fn is_healthy(&self) -> bool {
        match &self.threads {
            Some(threads) => {
                !threads.dispatcher.is_finished()
                    && threads.producers.iter().all(|(_, h)| !h.is_finished())
            },
            None => false,
        }
    }

    /// 停止模拟器并等待所有线程退出
    ///
    /// 1. 翻转运行标志
    /// 2. 唤醒事件信号、就绪闩锁以及休眠中的生产者
    /// 3. join 所有线程（正在执行的回调会先完成）
    ///
    /// 重复调用返回首次停止的结果。
    pub fn stop(&mut self) -> Result<ShutdownReport, RoverError> {
        let Some(threads) = self.threads.take() else {
            return self.outcome.clone().unwrap_or_else(|| {
                Err(RoverError::DispatcherPanicked(
                    "simulator has no threads to stop".to_string(),
                ))
            });
        };

        let outcome = self.shutdown_and_join(threads);
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn shutdown_and_join(&self, threads: SimThreads) -> Result<ShutdownReport, RoverError> {
        if self.ctx.shutdown() {
            info!("Stopping simulator threads");
        }

        let mut producer_faults = Vec::new();
        for (name, handle) in threads.producers {
            if let Err(payload) = handle.join() {
                let message = panic_message(payload.as_ref());
                self.ctx.metrics.record_producer_fault();
                error!(fault = "producer", producer = %name, "Producer thread terminated: {}", message);
                producer_faults.push(ProducerFault {
                    producer: name,
                    message,
                });
            }
        }

        let robot = match threads.dispatcher.join() {
            Ok(result) => result?,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(fault = "dispatcher", "Dispatcher thread panicked: {}", message);
                self.dispatcher_state.set(DispatcherState::Stopped);
                return Err(RoverError::DispatcherPanicked(message));
            },
        };

        let metrics = self.ctx.metrics.snapshot();
        info!(
            dispatched = metrics.total_dispatched(),
            callback_faults = metrics.callback_faults,
            producer_faults = producer_faults.len(),
            "Simulator stopped"
        );

        Ok(ShutdownReport {
            robot,
            metrics,
            producer_faults,
        })
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        if self.threads.is_some() {
            let _ = self.stop();
        }
    }
}

fn abort_launch(ctx: &SimContext, producers: Vec<(String, JoinHandle<()>)>) {
    ctx.shutdown();
    for (_, handle) in producers {
        let _ = handle.join();
    }
}
