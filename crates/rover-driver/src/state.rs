//! 机器人状态结构定义
//!
//! `Robot` 是脚本回调可见的唯一状态面：传感器读数的 getter/setter，
//! 以及四个无参数的运动指令。
//!
//! # 所有权
//!
//! `Robot` 只由调度线程持有，回调通过 `&mut Robot` 访问；
//! 生产者线程从不接触它，因此这里不需要任何锁。

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// 默认激光雷达点数
pub const DEFAULT_LIDAR_LEN: usize = 271;

/// 加速度计读数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accelerometer {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Accelerometer {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// 陀螺仪读数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gyroscope {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Gyroscope {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// GPS 定位读数
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Gps {
    /// 定位时间
    pub time: f64,
    /// 纬度
    pub lat: f64,
    /// 经度
    pub lon: f64,
    /// 海拔
    pub alt: f64,
    /// 单位标识
    pub unit: u8,
    /// 可见卫星数
    pub num_sat: u8,
}

/// 运动指令
///
/// 实际执行不在本模块范围内，指令只会被记录和打印日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionCommand {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MotionCommand::Forward => "Move forward",
            MotionCommand::Backward => "Move backward",
            MotionCommand::TurnLeft => "Turn left",
            MotionCommand::TurnRight => "Turn right",
        };
        f.write_str(text)
    }
}

/// 机器人共享状态
#[derive(Debug, Clone, PartialEq)]
pub struct Robot {
    accelerometer: Accelerometer,
    gyroscope: Gyroscope,
    gps: Gps,
    lidar: Vec<u16>,
    last_motion: Option<MotionCommand>,
    motion_count: u64,
}

impl Default for Robot {
    fn default() -> Self {
        Self::with_lidar_len(DEFAULT_LIDAR_LEN)
    }
}

impl Robot {
    /// 创建默认状态（激光雷达 271 点，全零）
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建指定激光雷达点数的状态
    pub fn with_lidar_len(len: usize) -> Self {
        Self {
            accelerometer: Accelerometer::default(),
            gyroscope: Gyroscope::default(),
            gps: Gps::default(),
            lidar: vec![0; len],
            last_motion: None,
            motion_count: 0,
        }
    }

    pub fn accelerometer(&self) -> Accelerometer {
        self.accelerometer
    }

    pub fn set_accelerometer(&mut self, value: Accelerometer) {
        self.accelerometer = value;
    }

    pub fn gyroscope(&self) -> Gyroscope {
        self.gyroscope
    }

    pub fn set_gyroscope(&mut self, value: Gyroscope) {
        self.gyroscope = value;
    }

    pub fn gps(&self) -> Gps {
        self.gps
    }

    pub fn set_gps(&mut self, value: Gps) {
        self.gps = value;
    }

    pub fn lidar(&self) -> &[u16] {
        &self.lidar
    }

    /// 替换激光雷达数据（长度可变）
    pub fn set_lidar(&mut self, values: impl Into<Vec<u16>>) {
        self.lidar = values.into();
    }

    pub fn move_forward(&mut self) {
        self.issue(MotionCommand::Forward);
    }

    pub fn move_backward(&mut self) {
        self.issue(MotionCommand::Backward);
    }

    pub fn turn_left(&mut self) {
        self.issue(MotionCommand::TurnLeft);
    }

    pub fn turn_right(&mut self) {
        self.issue(MotionCommand::TurnRight);
    }

    /// 最近一次运动指令
    pub fn last_motion(&self) -> Option<MotionCommand> {
        self.last_motion
    }

    /// 累计运动指令数
    pub fn motion_count(&self) -> u64 {
        self.motion_count
    }

    fn issue(&mut self, cmd: MotionCommand) {
        info!(target: "rover::robot", "[robot] {}", cmd);
        self.last_motion = Some(cmd);
        self.motion_count += 1;
    }
}
