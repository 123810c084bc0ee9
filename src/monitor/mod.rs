pub mod monitor;
pub mod types;

pub use monitor::Monitor;
pub use types::{CheckFn, CheckFuture, MonitorConfig};
