//! 脚本运行时接口
//!
//! 用户行为由脚本回调驱动：一个初始化回调加五个事件回调。
//! 运行时被视为单线程引擎，由调度线程独占持有，从不与生产者共享。
//!
//! # 使用示例
//!
//! ```rust
//! use rover_driver::{Robot, ScriptError, ScriptRuntime};
//!
//! struct Wanderer;
//!
//! impl ScriptRuntime for Wanderer {
//!     fn init(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
//!         Ok(())
//!     }
//!
//!     fn on_clock(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
//!         robot.move_forward();
//!         Ok(())
//!     }
//!
//!     fn on_lidar_packet(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
//!         if robot.lidar().iter().any(|&d| d > 0 && d < 300) {
//!             robot.turn_left();
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::ScriptError;
use crate::event::EventKind;
use crate::state::Robot;

/// 脚本运行时
///
/// 只要求 `Send`（需要移动到调度线程），不要求 `Sync`：
/// 所有回调都在调度线程上串行执行。
///
/// 事件回调默认实现为空操作，脚本只需覆盖关心的事件。
pub trait ScriptRuntime: Send {
    /// 运行时名称（用于日志）
    fn name(&self) -> &str {
        "script"
    }

    /// 一次性运行时准备（解析、校验等），在 `init` 之前调用
    fn load(&mut self) -> Result<(), ScriptError> {
        Ok(())
    }

    /// 初始化回调（恰好调用一次）
    fn init(&mut self, robot: &mut Robot) -> Result<(), ScriptError>;

    fn on_clock(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_accel_packet(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_gyro_packet(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_gps_packet(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_lidar_packet(&mut self, _robot: &mut Robot) -> Result<(), ScriptError> {
        Ok(())
    }
}

/// 调用事件对应的唯一回调
pub fn invoke(
    runtime: &mut dyn ScriptRuntime,
    kind: EventKind,
    robot: &mut Robot,
) -> Result<(), ScriptError> {
    match kind {
        EventKind::Clock => runtime.on_clock(robot),
        EventKind::AccelPacket => runtime.on_accel_packet(robot),
        EventKind::GyroPacket => runtime.on_gyro_packet(robot),
        EventKind::GpsPacket => runtime.on_gps_packet(robot),
        EventKind::LidarPacket => runtime.on_lidar_packet(robot),
    }
}
