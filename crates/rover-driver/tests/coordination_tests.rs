//! 事件协调测试
//!
//! 验证调度线程的核心保证：
//! 1. 就绪门：初始化完成前不产生事件
//! 2. 事件合并：挂起期间的重复触发只执行一次回调
//! 3. 固定优先级：Clock 先于数据包
//! 4. 回调互斥：不存在并发回调
//! 5. 回调失败不影响后续调度

mod common;

use common::{Idle, Probe, wait_until};
use rover_driver::{DispatcherState, EventKind, SimulatorBuilder};
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn test_no_event_before_init_completes() {
    let (gate_tx, gate_rx) = crossbeam_channel::bounded(1);
    let probe = Probe {
        init_gate: Some(gate_rx),
        ..Probe::new()
    };
    let log = probe.log.clone();

    // 零周期生产者：一旦就绪就持续触发
    let mut sim = SimulatorBuilder::new()
        .clock_period(Duration::ZERO)
        .packet_period(Duration::ZERO)
        .build(probe)
        .unwrap();

    thread::sleep(Duration::from_millis(100));
    assert_eq!(sim.metrics().raises_total, 0, "event raised during init");
    assert_eq!(sim.dispatcher_state(), DispatcherState::Initializing);
    assert!(Probe::entries(&log).is_empty());

    gate_tx.send(()).unwrap();
    sim.wait_ready(WAIT).unwrap();
    assert!(wait_until(WAIT, || {
        let m = sim.metrics();
        m.dispatched(EventKind::Clock) > 0 && m.packets_dispatched() > 0
    }));

    sim.stop().unwrap();
    let entries = Probe::entries(&log);
    assert_eq!(entries[0], "init");
    assert_eq!(entries.iter().filter(|e| *e == "init").count(), 1);
}

#[test]
fn test_repeated_raises_coalesce_while_pending() {
    let (gate_tx, gate_rx) = crossbeam_channel::bounded(1);
    let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
    let probe = Probe {
        clock_gate: Some(gate_rx),
        entered: Some(entered_tx),
        ..Probe::new()
    };
    let log = probe.log.clone();

    let mut sim = SimulatorBuilder::new()
        .clock_producer(Idle("clock"))
        .packet_producer(Idle("packet"))
        .build(probe)
        .unwrap();
    sim.wait_ready(WAIT).unwrap();

    assert!(sim.raise(EventKind::Clock));
    assert_eq!(entered_rx.recv_timeout(WAIT).unwrap(), EventKind::Clock);

    // 回调阻塞期间：第一次触发重新挂起，其余全部合并
    assert!(sim.raise(EventKind::Clock));
    for _ in 0..99 {
        assert!(!sim.raise(EventKind::Clock));
    }

    gate_tx.send(()).unwrap();
    assert!(wait_until(WAIT, || sim.metrics().dispatched(EventKind::Clock) == 2));
    thread::sleep(Duration::from_millis(100));

    let report = sim.stop().unwrap();
    assert_eq!(report.metrics.dispatched(EventKind::Clock), 2);
    assert_eq!(report.metrics.raises_total, 101);
    assert_eq!(report.metrics.raises_coalesced, 99);
    assert_eq!(
        Probe::entries(&log),
        vec!["init".to_string(), "clock".to_string(), "clock".to_string()]
    );
}

#[test]
fn test_clock_dispatched_before_pending_packet() {
    let (gate_tx, gate_rx) = crossbeam_channel::bounded(1);
    let probe = Probe {
        init_gate: Some(gate_rx),
        ..Probe::new()
    };
    let log = probe.log.clone();

    let mut sim = SimulatorBuilder::new()
        .clock_producer(Idle("clock"))
        .packet_producer(Idle("packet"))
        .build(probe)
        .unwrap();

    // 初始化阻塞期间挂起两个事件，数据包先触发
    sim.raise(EventKind::AccelPacket);
    sim.raise(EventKind::Clock);
    gate_tx.send(()).unwrap();

    assert!(wait_until(WAIT, || Probe::entries(&log).len() == 3));
    sim.stop().unwrap();

    assert_eq!(
        Probe::entries(&log),
        vec![
            "init".to_string(),
            "clock".to_string(),
            "accel_packet".to_string()
        ]
    );
}

#[test]
fn test_callbacks_never_overlap() {
    let probe = Probe {
        callback_delay: Duration::from_micros(50),
        ..Probe::new()
    };
    let overlaps = probe.overlaps.clone();

    let mut sim = SimulatorBuilder::new()
        .clock_period(Duration::from_millis(1))
        .packet_period(Duration::from_millis(1))
        .build(probe)
        .unwrap();
    sim.wait_ready(WAIT).unwrap();

    thread::scope(|s| {
        for kind in [EventKind::GyroPacket, EventKind::GpsPacket, EventKind::Clock] {
            let sim = &sim;
            s.spawn(move || {
                for _ in 0..2000 {
                    sim.raise(kind);
                    thread::yield_now();
                }
            });
        }
    });

    let report = sim.stop().unwrap();
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert!(report.metrics.total_dispatched() > 0);
}

#[test]
fn test_callback_error_is_not_fatal() {
    let probe = Probe {
        fail_on: Some(EventKind::AccelPacket),
        ..Probe::new()
    };
    let log = probe.log.clone();

    let mut sim = SimulatorBuilder::new()
        .clock_producer(Idle("clock"))
        .packet_producer(Idle("packet"))
        .build(probe)
        .unwrap();
    sim.wait_ready(WAIT).unwrap();

    sim.raise(EventKind::AccelPacket);
    assert!(wait_until(WAIT, || sim.metrics().callback_faults == 1));
    sim.raise(EventKind::LidarPacket);
    assert!(wait_until(WAIT, || {
        sim.metrics().dispatched(EventKind::LidarPacket) == 1
    }));
    assert!(sim.is_running());

    let report = sim.stop().unwrap();
    assert_eq!(report.metrics.callback_faults, 1);
    assert_eq!(
        Probe::entries(&log),
        vec![
            "init".to_string(),
            "accel_packet".to_string(),
            "lidar_packet".to_string()
        ]
    );
    // lidar 回调里的转向保留在最终状态
    assert_eq!(report.robot.motion_count(), 1);
}

#[test]
fn test_periodic_rates_over_one_second() {
    let mut sim = SimulatorBuilder::new()
        .clock_period(Duration::from_millis(100))
        .packet_period(Duration::from_millis(200))
        .seed(7)
        .build(Probe::new())
        .unwrap();
    sim.wait_ready(WAIT).unwrap();

    thread::sleep(Duration::from_millis(1050));
    let start = std::time::Instant::now();
    let report = sim.stop().unwrap();
    let elapsed = start.elapsed();

    let clocks = report.metrics.dispatched(EventKind::Clock);
    let packets = report.metrics.packets_dispatched();
    assert!((9..=11).contains(&clocks), "clock callbacks: {}", clocks);
    assert!((4..=6).contains(&packets), "packet callbacks: {}", packets);
    assert!(
        elapsed < Duration::from_millis(300),
        "stop took {:?}",
        elapsed
    );
}
