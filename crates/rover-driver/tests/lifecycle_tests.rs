//! 生命周期测试
//!
//! 验证启动、停止和故障路径：
//! 1. 停止及时且等待正在执行的回调完成
//! 2. 停止幂等，停止后触发无效
//! 3. 初始化失败是致命的，生产者随之退出
//! 4. 生产者 panic 不影响其他线程，在停止报告中体现

mod common;

use common::{Faulty, Idle, Probe, wait_until};
use rover_driver::{
    DispatcherState, EventKind, ProducerFault, RoverError, ScriptError, SimConfig, Simulator,
    SimulatorBuilder,
};
use std::thread;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn test_stop_is_prompt_with_long_periods() {
    let mut sim = Simulator::start(SimConfig::default(), Probe::new()).unwrap();
    sim.wait_ready(WAIT).unwrap();
    assert!(sim.is_healthy());
    assert_eq!(sim.alive_producers(), 2);

    thread::sleep(Duration::from_millis(50));
    let start = Instant::now();
    let report = sim.stop().unwrap();

    // 默认周期 1s / 2s，休眠必须被停止打断
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(report.metrics.total_dispatched(), 0);
    assert!(report.producer_faults.is_empty());
    assert_eq!(sim.dispatcher_state(), DispatcherState::Stopped);
}

#[test]
fn test_stop_waits_for_running_callback() {
    let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
    let probe = Probe {
        entered: Some(entered_tx),
        callback_delay: Duration::from_millis(200),
        ..Probe::new()
    };
    let log = probe.log.clone();

    let mut sim = SimulatorBuilder::new()
        .clock_producer(Idle("clock"))
        .packet_producer(Idle("packet"))
        .build(probe)
        .unwrap();
    sim.wait_ready(WAIT).unwrap();

    sim.raise(EventKind::GpsPacket);
    assert_eq!(entered_rx.recv_timeout(WAIT).unwrap(), EventKind::GpsPacket);
    // 回调执行期间再挂起一个事件，停止后不应被调度
    sim.raise(EventKind::Clock);

    let report = sim.stop().unwrap();
    assert_eq!(
        Probe::entries(&log),
        vec!["init".to_string(), "gps_packet".to_string()]
    );
    assert_eq!(report.metrics.dispatched(EventKind::GpsPacket), 1);
    assert_eq!(report.metrics.dispatched(EventKind::Clock), 0);
}

#[test]
fn test_stop_is_idempotent() {
    let mut sim = SimulatorBuilder::new()
        .clock_producer(Idle("clock"))
        .packet_producer(Idle("packet"))
        .build(Probe::new())
        .unwrap();
    sim.wait_ready(WAIT).unwrap();
    sim.raise(EventKind::LidarPacket);
    assert!(wait_until(WAIT, || sim.metrics().total_dispatched() == 1));

    let first = sim.stop().unwrap();
    let second = sim.stop().unwrap();
    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.robot, second.robot);

    assert!(!sim.is_running());
    assert!(!sim.is_healthy());
    assert!(!sim.raise(EventKind::Clock));
    assert_eq!(sim.metrics().total_dispatched(), 1);
}

#[test]
fn test_drop_stops_threads() {
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let sim = Simulator::start(SimConfig::default(), Probe::new()).unwrap();
        sim.wait_ready(WAIT).unwrap();
        drop(sim);
        let _ = done_tx.send(());
    });

    assert!(done_rx.recv_timeout(WAIT).is_ok(), "drop did not return");
}

#[test]
fn test_init_failure_is_fatal() {
    let probe = Probe {
        fail_init: true,
        ..Probe::new()
    };
    let log = probe.log.clone();

    let mut sim = SimulatorBuilder::new()
        .clock_period(Duration::from_millis(1))
        .packet_period(Duration::from_millis(1))
        .build(probe)
        .unwrap();

    let err = sim.wait_ready(WAIT).unwrap_err();
    assert_eq!(
        err,
        RoverError::ScriptInit(ScriptError::failed("init rejected"))
    );

    // 生产者被释放并退出，从未触发任何事件
    assert!(wait_until(WAIT, || sim.alive_producers() == 0));
    assert_eq!(sim.metrics().raises_total, 0);
    assert_eq!(sim.dispatcher_state(), DispatcherState::Stopped);

    let first = sim.stop().unwrap_err();
    let second = sim.stop().unwrap_err();
    assert!(matches!(first, RoverError::ScriptInit(_)));
    assert_eq!(first, second);
    assert!(Probe::entries(&log).is_empty());
}

#[test]
fn test_wait_ready_times_out_during_slow_init() {
    let (gate_tx, gate_rx) = crossbeam_channel::bounded(1);
    let probe = Probe {
        init_gate: Some(gate_rx),
        ..Probe::new()
    };

    let mut sim = SimulatorBuilder::new()
        .clock_producer(Idle("clock"))
        .packet_producer(Idle("packet"))
        .build(probe)
        .unwrap();

    assert_eq!(
        sim.wait_ready(Duration::from_millis(50)),
        Err(RoverError::Timeout)
    );
    gate_tx.send(()).unwrap();
    assert_eq!(sim.wait_ready(WAIT), Ok(()));
    sim.stop().unwrap();
}

#[test]
fn test_producer_panic_is_isolated() {
    let mut sim = SimulatorBuilder::new()
        .clock_period(Duration::from_millis(5))
        .packet_producer(Faulty {
            period: Duration::from_millis(5),
        })
        .build(Probe::new())
        .unwrap();
    sim.wait_ready(WAIT).unwrap();

    assert!(wait_until(WAIT, || sim.alive_producers() == 1));
    assert!(!sim.is_healthy());

    // 时钟生产者和调度线程继续工作
    let clocks = sim.metrics().dispatched(EventKind::Clock);
    assert!(wait_until(WAIT, || {
        sim.metrics().dispatched(EventKind::Clock) >= clocks + 3
    }));

    let report = sim.stop().unwrap();
    assert_eq!(
        report.producer_faults,
        vec![ProducerFault {
            producer: "faulty".to_string(),
            message: "sensor bus lost".to_string(),
        }]
    );
    assert_eq!(report.metrics.producer_faults, 1);
    assert_eq!(report.metrics.packets_dispatched(), 0);
}

#[test]
fn test_shutdown_with_concurrent_raisers() {
    use rover_driver::{AtomicDispatcherState, Dispatcher, Robot, SimContext};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let ctx = Arc::new(SimContext::new());
    ctx.run.start();
    let state = Arc::new(AtomicDispatcherState::default());
    let dispatcher = Dispatcher::new(Box::new(Probe::new()), Robot::new(), ctx.clone(), state.clone());
    let dispatcher_thread = thread::spawn(move || dispatcher.run());
    assert!(wait_until(WAIT, || ctx.ready.is_ready()));

    // 停止前后都有线程持续触发
    let done = Arc::new(AtomicBool::new(false));
    let raisers: Vec<_> = EventKind::ALL
        .into_iter()
        .map(|kind| {
            let (ctx, done) = (ctx.clone(), done.clone());
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    ctx.raise(kind);
                    thread::yield_now();
                }
            })
        })
        .collect();

    assert!(wait_until(WAIT, || ctx.metrics.snapshot().total_dispatched() > 100));
    ctx.shutdown();
    dispatcher_thread.join().unwrap().unwrap();
    assert_eq!(state.get(), DispatcherState::Stopped);

    let after_stop = ctx.metrics.snapshot().total_dispatched();
    thread::sleep(Duration::from_millis(50));
    done.store(true, Ordering::Relaxed);
    for raiser in raisers {
        raiser.join().unwrap();
    }
    assert_eq!(ctx.metrics.snapshot().total_dispatched(), after_stop);
}
