//! Builder 模式实现
//!
//! 提供链式构造 `Simulator` 实例的便捷方式。

use crate::config::SimConfig;
use crate::error::RoverError;
use crate::producer::{ClockProducer, PacketProducer, Producer};
use crate::runtime::ScriptRuntime;
use crate::simulator::Simulator;
use crate::state::Robot;
use std::time::Duration;

/// Simulator Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use rover_driver::{Robot, ScriptError, ScriptRuntime, SimulatorBuilder};
/// use std::time::Duration;
///
/// struct Quiet;
/// impl ScriptRuntime for Quiet {
///     fn init(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
///         Ok(())
///     }
/// }
///
/// let sim = SimulatorBuilder::new()
///     .clock_period(Duration::from_millis(100))
///     .packet_period(Duration::from_millis(200))
///     .seed(7)
///     .build(Quiet)
///     .unwrap();
/// ```
pub struct SimulatorBuilder {
    config: SimConfig,
    /// 自定义时钟事件源（默认 `ClockProducer`）
    clock: Option<Box<dyn Producer>>,
    /// 自定义数据包事件源（默认 `PacketProducer`）
    packet: Option<Box<dyn Producer>>,
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorBuilder {
    pub fn new() -> Self {
        Self {
            config: SimConfig::default(),
            clock: None,
            packet: None,
        }
    }

    /// 设置完整配置（覆盖之前的周期、种子等设置）
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置时钟周期
    ///
    /// 周期以毫秒为粒度保存，不足 1ms 的部分向上取整；
    /// 只有 `Duration::ZERO` 会得到 0 周期（连续触发）。
    pub fn clock_period(mut self, period: Duration) -> Self {
        self.config.clock_period_ms = period_to_ms(period);
        self
    }

    /// 设置数据包周期（毫秒粒度，规则同 [`clock_period`](Self::clock_period)）
    pub fn packet_period(mut self, period: Duration) -> Self {
        self.config.packet_period_ms = period_to_ms(period);
        self
    }

    /// 固定数据包类型随机种子
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// 设置激光雷达点数
    pub fn lidar_len(mut self, len: usize) -> Self {
        self.config.lidar_len = len;
        self
    }

    /// 替换时钟事件源
    pub fn clock_producer(mut self, producer: impl Producer + 'static) -> Self {
        self.clock = Some(Box::new(producer));
        self
    }

    /// 替换数据包事件源
    pub fn packet_producer(mut self, producer: impl Producer + 'static) -> Self {
        self.packet = Some(Box::new(producer));
        self
    }

    /// 构建并启动模拟器（非阻塞）
    ///
    /// # Errors
    /// - `RoverError::Config`: 配置无效
    /// - `RoverError::ThreadSpawn`: 线程创建失败
    pub fn build(self, runtime: impl ScriptRuntime + 'static) -> Result<Simulator, RoverError> {
        self.config.validate()?;

        let config = self.config;
        let clock = self
            .clock
            .unwrap_or_else(|| Box::new(ClockProducer::new(config.clock_period())));
        let packet = self
            .packet
            .unwrap_or_else(|| Box::new(PacketProducer::new(config.packet_period(), config.seed)));

        Simulator::launch(
            vec![clock, packet],
            Box::new(runtime),
            Robot::with_lidar_len(config.lidar_len),
        )
    }
}

/// 周期转换为毫秒，非零的亚毫秒部分向上取整
fn period_to_ms(period: Duration) -> u64 {
    let ms = period.as_millis();
    let ms = if period.subsec_nanos() % 1_000_000 != 0 {
        ms + 1
    } else {
        ms
    };
    u64::try_from(ms).unwrap_or(u64::MAX)
}
