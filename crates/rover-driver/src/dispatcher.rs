//! 调度线程（单消费者）
//!
//! 调度线程独占持有脚本运行时和 `Robot`，所有回调都在这一个线程上串行执行，
//! 这就是唯一的互斥域：不存在两个回调并发执行，也不存在回调之外的状态访问。
//!
//! # 调度策略
//!
//! 每次唤醒只处理一个事件：按固定优先级选择、先清除标志、再调用回调。
//! 其余挂起事件留到下一轮，突发事件逐个排空，从不批处理。
//! 时钟事件因此不会被饿死；持续的时钟压力下数据包回调可能被延后，这是可接受的取舍。

use crate::context::SimContext;
use crate::dispatch_state::{AtomicDispatcherState, DispatcherState};
use crate::error::{RoverError, ScriptError, panic_message};
use crate::event::EventKind;
use crate::runtime::{self, ScriptRuntime};
use crate::state::Robot;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info};

/// 调度器
pub struct Dispatcher {
    runtime: Box<dyn ScriptRuntime>,
    robot: Robot,
    ctx: Arc<SimContext>,
    state: Arc<AtomicDispatcherState>,
}

impl Dispatcher {
    pub fn new(
        runtime: Box<dyn ScriptRuntime>,
        robot: Robot,
        ctx: Arc<SimContext>,
        state: Arc<AtomicDispatcherState>,
    ) -> Self {
        Self {
            runtime,
            robot,
            ctx,
            state,
        }
    }

    /// 调度线程主循环
    ///
    /// # 返回
    /// - `Ok(robot)`: 正常停止，返回最终的机器人状态
    /// - `Err(RoverError::ScriptInit)`: 初始化失败，从未进入调度
    pub fn run(mut self) -> Result<Robot, RoverError> {
        self.state.set(DispatcherState::Initializing);

        if let Err(e) = self.initialize() {
            error!(
                fault = "init",
                runtime = %self.runtime.name(),
                "Script initialization failed: {}",
                e
            );
            self.ctx.ready.fail(e.clone());
            self.state.set(DispatcherState::Stopped);
            return Err(RoverError::ScriptInit(e));
        }

        self.ctx.ready.open();
        self.state.set(DispatcherState::Ready);
        info!(runtime = %self.runtime.name(), "Dispatcher ready");

        // 取出时已清除标志：回调期间的新触发会成为下一轮的挂起事件
        while let Some(kind) = self.ctx.signal.take_next(&self.ctx.run) {
            self.dispatch(kind);
        }

        self.state.set(DispatcherState::Draining);
        debug!("Dispatcher draining");
        self.state.set(DispatcherState::Stopped);
        info!("Dispatcher stopped");

        Ok(self.robot)
    }

    /// 运行时准备 + 初始化回调（恰好一次）
    fn initialize(&mut self) -> Result<(), ScriptError> {
        let runtime = &mut self.runtime;
        let robot = &mut self.robot;
        guarded(|| runtime.load())?;
        guarded(|| runtime.init(robot))
    }

    /// 执行单个事件回调
    ///
    /// 回调失败（返回错误或 panic）只记录日志，事件被丢弃，不重试。
    fn dispatch(&mut self, kind: EventKind) {
        self.state.set(DispatcherState::Dispatching);
        debug!(event = %kind, "Dispatching event");

        let script = self.runtime.as_mut();
        let robot = &mut self.robot;
        let result = guarded(|| runtime::invoke(script, kind, robot));
        self.ctx.metrics.record_dispatch(kind);

        if let Err(e) = result {
            self.ctx.metrics.record_callback_fault();
            error!(fault = "callback", event = %kind, "Script callback error: {}", e);
        }

        self.state.set(DispatcherState::Ready);
    }
}

/// 在回调边界捕获 panic，统一转换为 `ScriptError`
fn guarded<F>(f: F) -> Result<(), ScriptError>
where
    F: FnOnce() -> Result<(), ScriptError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(ScriptError::Panicked(panic_message(payload.as_ref()))),
    }
}
