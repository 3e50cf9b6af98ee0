//! # Rover CLI
//!
//! 在模拟的时钟和传感器事件上运行机器人脚本。
//!
//! ```bash
//! # 运行内置演示脚本 10 秒
//! rover-cli
//!
//! # 指定脚本和配置，运行 30 秒
//! rover-cli --script wanderer.json --config rover.toml --duration-secs 30
//!
//! # 调整日志级别
//! RUST_LOG=rover=debug rover-cli --clock-period-ms 200
//! ```
//!
//! 到时正常退出返回 0；Ctrl+C 中断或脚本初始化失败返回 1。

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{after, bounded, select};
use rover_driver::Simulator;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{error, info};

mod args;
mod logging;
mod summary;

use args::Args;

/// 等待脚本初始化的上限
const READY_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> Result<ExitCode> {
    // 初始化日志（RUST_LOG 优先，缺省 rover=info）
    logging::init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    let runtime = args.load_runtime()?;

    // Ctrl+C 只投递通知，停止流程在主线程完成
    let (interrupt_tx, interrupt_rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })
    .context("failed to set Ctrl+C handler")?;

    info!(
        script = %runtime.script().name,
        clock_ms = config.clock_period_ms,
        packet_ms = config.packet_period_ms,
        duration_secs = args.duration_secs,
        "Starting simulation"
    );

    let mut sim = Simulator::start(config, runtime)?;
    if let Err(e) = sim.wait_ready(READY_TIMEOUT) {
        error!("Simulation did not start: {}", e);
        let _ = sim.stop();
        return Ok(ExitCode::FAILURE);
    }

    let started = Instant::now();
    let interrupted = select! {
        recv(interrupt_rx) -> _ => true,
        recv(after(args.duration())) -> _ => false,
    };
    if interrupted {
        info!("Interrupted, stopping simulation");
    }

    let report = sim.stop()?;
    summary::print_summary(&report, started.elapsed(), interrupted);

    Ok(if interrupted {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
