pub mod energy;
pub mod monitor;

pub use monitor::MonitorService;
