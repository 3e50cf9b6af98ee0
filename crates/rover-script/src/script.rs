//! 脚本定义
//!
//! JSON 脚本：每个回调入口对应一个动作列表，缺失的入口视为空列表。

use crate::error::ScriptLoadError;
use rover_driver::EventKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// 脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// 脚本名称
    pub name: String,

    /// 脚本描述
    #[serde(default)]
    pub description: String,

    /// 初始化回调
    #[serde(default)]
    pub init: Vec<ScriptAction>,

    #[serde(default)]
    pub on_clock: Vec<ScriptAction>,

    #[serde(default)]
    pub on_accel_packet: Vec<ScriptAction>,

    #[serde(default)]
    pub on_gyro_packet: Vec<ScriptAction>,

    #[serde(default)]
    pub on_gps_packet: Vec<ScriptAction>,

    #[serde(default)]
    pub on_lidar_packet: Vec<ScriptAction>,
}

/// 脚本动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScriptAction {
    /// 输出一行日志
    Log { message: String },

    /// 输出当前传感器读数
    ReportAccelerometer,
    ReportGyroscope,
    ReportGps,
    ReportLidar,

    /// 运动指令
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,

    /// 写入传感器读数
    SetAccelerometer { x: i16, y: i16, z: i16 },
    SetGyroscope { x: i16, y: i16, z: i16 },
    SetGps {
        #[serde(default)]
        time: f64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        alt: f64,
        #[serde(default)]
        unit: u8,
        #[serde(default)]
        num_sat: u8,
    },
    SetLidar { values: Vec<u16> },

    /// 使当前回调失败
    Fail { message: String },
}

/// 回调入口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Init,
    Event(EventKind),
}

impl Hook {
    /// 脚本中的入口名称
    pub fn as_str(self) -> &'static str {
        match self {
            Hook::Init => "init",
            Hook::Event(EventKind::Clock) => "on_clock",
            Hook::Event(EventKind::AccelPacket) => "on_accel_packet",
            Hook::Event(EventKind::GyroPacket) => "on_gyro_packet",
            Hook::Event(EventKind::GpsPacket) => "on_gps_packet",
            Hook::Event(EventKind::LidarPacket) => "on_lidar_packet",
        }
    }

    fn all() -> impl Iterator<Item = Hook> {
        std::iter::once(Hook::Init).chain(EventKind::ALL.into_iter().map(Hook::Event))
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Script {
    /// 创建空脚本
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            init: Vec::new(),
            on_clock: Vec::new(),
            on_accel_packet: Vec::new(),
            on_gyro_packet: Vec::new(),
            on_gps_packet: Vec::new(),
            on_lidar_packet: Vec::new(),
        }
    }

    /// 内置演示脚本
    ///
    /// 启动时输出 "started"，每个时钟输出 "clock"，每个数据包输出对应读数。
    pub fn demo() -> Self {
        Self {
            description: "Prints every event and the sensor reading it carries".to_string(),
            init: vec![ScriptAction::Log {
                message: "started".to_string(),
            }],
            on_clock: vec![ScriptAction::Log {
                message: "clock".to_string(),
            }],
            on_accel_packet: vec![ScriptAction::ReportAccelerometer],
            on_gyro_packet: vec![ScriptAction::ReportGyroscope],
            on_gps_packet: vec![ScriptAction::ReportGps],
            on_lidar_packet: vec![ScriptAction::ReportLidar],
            ..Self::new("demo")
        }
    }

    /// 入口对应的动作列表
    pub fn actions(&self, hook: Hook) -> &[ScriptAction] {
        match hook {
            Hook::Init => &self.init,
            Hook::Event(EventKind::Clock) => &self.on_clock,
            Hook::Event(EventKind::AccelPacket) => &self.on_accel_packet,
            Hook::Event(EventKind::GyroPacket) => &self.on_gyro_packet,
            Hook::Event(EventKind::GpsPacket) => &self.on_gps_packet,
            Hook::Event(EventKind::LidarPacket) => &self.on_lidar_packet,
        }
    }

    /// 校验脚本内容
    ///
    /// - 名称非空
    /// - `SetLidar` 的读数非空
    pub fn validate(&self) -> Result<(), ScriptLoadError> {
        if self.name.trim().is_empty() {
            return Err(ScriptLoadError::Invalid("script name is empty".to_string()));
        }

        for hook in Hook::all() {
            for (i, action) in self.actions(hook).iter().enumerate() {
                if let ScriptAction::SetLidar { values } = action {
                    if values.is_empty() {
                        return Err(ScriptLoadError::Invalid(format!(
                            "{}[{}]: SetLidar requires at least one value",
                            hook, i
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// 从 JSON 字符串解析并校验
    pub fn from_json_str(content: &str) -> Result<Self, ScriptLoadError> {
        let script: Script = serde_json::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    /// 序列化为格式化 JSON
    pub fn to_json_pretty(&self) -> Result<String, ScriptLoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 加载脚本文件
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Script, ScriptLoadError> {
    let content = fs::read_to_string(path)?;
    Script::from_json_str(&content)
}

/// 保存脚本文件
pub fn save_script<P: AsRef<Path>>(path: P, script: &Script) -> Result<(), ScriptLoadError> {
    fs::write(path, script.to_json_pretty()?)?;
    Ok(())
}
