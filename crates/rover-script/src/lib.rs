//! 模拟器 JSON 脚本运行时
//!
//! 脚本由若干回调入口组成，每个入口是一个按顺序执行的动作列表：
//!
//! ```json
//! {
//!   "name": "wanderer",
//!   "init": [{ "type": "Log", "message": "started" }],
//!   "on_clock": [{ "type": "MoveForward" }],
//!   "on_lidar_packet": [{ "type": "ReportLidar" }, { "type": "TurnLeft" }]
//! }
//! ```
//!
//! # 使用示例
//!
//! ```no_run
//! use rover_driver::{SimConfig, Simulator};
//! use rover_script::{ScriptedRuntime, load_script};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let script = load_script("wanderer.json")?;
//! let mut sim = Simulator::start(SimConfig::default(), ScriptedRuntime::new(script))?;
//! sim.wait_ready(std::time::Duration::from_secs(1))?;
//! sim.stop()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod runtime;
mod script;

pub use error::ScriptLoadError;
pub use runtime::ScriptedRuntime;
pub use script::{Hook, Script, ScriptAction, load_script, save_script};
