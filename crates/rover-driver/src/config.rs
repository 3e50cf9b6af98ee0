//! 模拟器配置
//!
//! 支持 TOML 文件加载，缺省字段使用默认值：
//!
//! ```toml
//! clock_period_ms = 1000
//! packet_period_ms = 2000
//! lidar_len = 271
//! seed = 42
//! ```

use crate::error::RoverError;
use crate::state::DEFAULT_LIDAR_LEN;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 模拟器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// 时钟事件周期（毫秒）
    pub clock_period_ms: u64,
    /// 传感器数据包周期（毫秒）
    pub packet_period_ms: u64,
    /// 激光雷达点数
    pub lidar_len: usize,
    /// 数据包类型随机种子（不设置时使用系统熵）
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            clock_period_ms: 1000,
            packet_period_ms: 2000,
            lidar_len: DEFAULT_LIDAR_LEN,
            seed: None,
        }
    }
}

impl SimConfig {
    /// 从 TOML 字符串解析（并校验）
    pub fn from_toml_str(content: &str) -> Result<Self, RoverError> {
        let config: SimConfig =
            toml::from_str(content).map_err(|e| RoverError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RoverError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 校验配置
    ///
    /// 周期允许为 0（生产者不休眠，连续触发，依靠合并限流）。
    pub fn validate(&self) -> Result<(), RoverError> {
        if self.lidar_len == 0 {
            return Err(RoverError::Config("lidar_len must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn clock_period(&self) -> Duration {
        Duration::from_millis(self.clock_period_ms)
    }

    pub fn packet_period(&self) -> Duration {
        Duration::from_millis(self.packet_period_ms)
    }
}
