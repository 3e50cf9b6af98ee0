//! 运行结果汇总输出

use rover_driver::{EventKind, ShutdownReport};
use std::time::Duration;

/// 打印停止报告
pub fn print_summary(report: &ShutdownReport, elapsed: Duration, interrupted: bool) {
    let metrics = &report.metrics;

    println!();
    if interrupted {
        println!("⚠️  模拟被中断（运行 {:.1}s）", elapsed.as_secs_f64());
    } else {
        println!("✅ 模拟完成（运行 {:.1}s）", elapsed.as_secs_f64());
    }

    println!("📊 回调统计:");
    for kind in EventKind::ALL {
        println!("  {:<14} {}", kind.as_str(), metrics.dispatched(kind));
    }
    println!(
        "  触发 {} 次，合并 {} 次（{:.1}%）",
        metrics.raises_total,
        metrics.raises_coalesced,
        metrics.coalesce_rate()
    );

    if metrics.callback_faults > 0 {
        println!("  ❌ 回调失败: {}", metrics.callback_faults);
    }
    for fault in &report.producer_faults {
        println!("  ❌ 生产者 {} 异常退出: {}", fault.producer, fault.message);
    }

    println!("🤖 运动指令: {}", report.robot.motion_count());
    if let Some(motion) = report.robot.last_motion() {
        println!("  最后一条: {}", motion);
    }
}
