//! 命令行参数
//!
//! 命令行参数覆盖配置文件中的同名字段。

use anyhow::{Context, Result};
use clap::Parser;
use rover_driver::SimConfig;
use rover_script::{Script, ScriptedRuntime, load_script};
use std::path::PathBuf;
use std::time::Duration;

/// Rover CLI - 机器人事件模拟器
#[derive(Parser, Debug)]
#[command(name = "rover-cli")]
#[command(about = "Run a rover script against simulated clock and sensor events", long_about = None)]
#[command(version)]
pub struct Args {
    /// TOML 配置文件
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON 脚本文件（缺省时运行内置演示脚本）
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// 时钟周期（毫秒）
    #[arg(long)]
    pub clock_period_ms: Option<u64>,

    /// 数据包周期（毫秒）
    #[arg(long)]
    pub packet_period_ms: Option<u64>,

    /// 数据包类型随机种子
    #[arg(long)]
    pub seed: Option<u64>,

    /// 运行时长（秒）
    #[arg(short, long, default_value_t = 10)]
    pub duration_secs: u64,
}

impl Args {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// 合并配置文件和命令行参数
    pub fn resolve_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SimConfig::default(),
        };

        if let Some(ms) = self.clock_period_ms {
            config.clock_period_ms = ms;
        }
        if let Some(ms) = self.packet_period_ms {
            config.packet_period_ms = ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }

    /// 加载脚本运行时
    pub fn load_runtime(&self) -> Result<ScriptedRuntime> {
        let script = match &self.script {
            Some(path) => load_script(path)
                .with_context(|| format!("failed to load script {}", path.display()))?,
            None => Script::demo(),
        };
        Ok(ScriptedRuntime::new(script))
    }
}
