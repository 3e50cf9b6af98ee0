//! 脚本运行时
//!
//! 把 [`Script`] 的动作列表绑定到 `ScriptRuntime` 回调上。
//! 动作按顺序执行，遇到 `Fail` 立即中止当前回调。

use crate::script::{Hook, Script, ScriptAction};
use rover_driver::{
    Accelerometer, EventKind, Gps, Gyroscope, Robot, ScriptError, ScriptRuntime,
};
use tracing::{debug, info};

/// 基于 JSON 脚本的运行时
#[derive(Debug, Clone)]
pub struct ScriptedRuntime {
    script: Script,
    /// 已执行的动作数
    actions_run: u64,
}

impl ScriptedRuntime {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            actions_run: 0,
        }
    }

    /// 内置演示脚本的运行时
    pub fn demo() -> Self {
        Self::new(Script::demo())
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn actions_run(&self) -> u64 {
        self.actions_run
    }

    /// 执行入口对应的全部动作
    pub fn run_hook(&mut self, hook: Hook, robot: &mut Robot) -> Result<(), ScriptError> {
        let name = self.script.name.as_str();
        let actions = self.script.actions(hook);
        if actions.is_empty() {
            return Ok(());
        }
        debug!(script = %name, %hook, actions = actions.len(), "running hook");

        for action in actions {
            self.actions_run += 1;
            apply(name, action, robot)?;
        }
        Ok(())
    }
}

fn apply(name: &str, action: &ScriptAction, robot: &mut Robot) -> Result<(), ScriptError> {
    match action {
        ScriptAction::Log { message } => {
            info!(target: "rover::script", "[{}] {}", name, message);
        },
        ScriptAction::ReportAccelerometer => {
            let acc = robot.accelerometer();
            info!(target: "rover::script", "[{}] Acc packet: {} {} {}", name, acc.x, acc.y, acc.z);
        },
        ScriptAction::ReportGyroscope => {
            let gyro = robot.gyroscope();
            info!(target: "rover::script", "[{}] Gyro packet: {} {} {}", name, gyro.x, gyro.y, gyro.z);
        },
        ScriptAction::ReportGps => {
            let gps = robot.gps();
            info!(
                target: "rover::script",
                "[{}] Gps packet: {} {} {} {}",
                name, gps.lat, gps.lon, gps.alt, gps.num_sat
            );
        },
        ScriptAction::ReportLidar => {
            info!(target: "rover::script", "[{}] Lidar packet: {:?}", name, robot.lidar());
        },
        ScriptAction::MoveForward => robot.move_forward(),
        ScriptAction::MoveBackward => robot.move_backward(),
        ScriptAction::TurnLeft => robot.turn_left(),
        ScriptAction::TurnRight => robot.turn_right(),
        ScriptAction::SetAccelerometer { x, y, z } => {
            robot.set_accelerometer(Accelerometer::new(*x, *y, *z));
        },
        ScriptAction::SetGyroscope { x, y, z } => {
            robot.set_gyroscope(Gyroscope::new(*x, *y, *z));
        },
        ScriptAction::SetGps {
            time,
            lat,
            lon,
            alt,
            unit,
            num_sat,
        } => {
            robot.set_gps(Gps {
                time: *time,
                lat: *lat,
                lon: *lon,
                alt: *alt,
                unit: *unit,
                num_sat: *num_sat,
            });
        },
        ScriptAction::SetLidar { values } => robot.set_lidar(values.as_slice()),
        ScriptAction::Fail { message } => return Err(ScriptError::failed(message.clone())),
    }
    Ok(())
}

impl ScriptRuntime for ScriptedRuntime {
    fn name(&self) -> &str {
        &self.script.name
    }

    fn load(&mut self) -> Result<(), ScriptError> {
        self.script
            .validate()
            .map_err(|e| ScriptError::failed(e.to_string()))
    }

    fn init(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
        self.run_hook(Hook::Init, robot)
    }

    fn on_clock(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
        self.run_hook(Hook::Event(EventKind::Clock), robot)
    }

    fn on_accel_packet(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
        self.run_hook(Hook::Event(EventKind::AccelPacket), robot)
    }

    fn on_gyro_packet(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
        self.run_hook(Hook::Event(EventKind::GyroPacket), robot)
    }

    fn on_gps_packet(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
        self.run_hook(Hook::Event(EventKind::GpsPacket), robot)
    }

    fn on_lidar_packet(&mut self, robot: &mut Robot) -> Result<(), ScriptError> {
        self.run_hook(Hook::Event(EventKind::LidarPacket), robot)
    }
}
