pub mod checker;
/// Monitoring engine module - handles reachability checks
///
/// This module is responsible for:
/// - Probing the target over HTTP or ICMP
/// - Tracking the current up/down state and detecting transitions
/// - Scheduling the periodic check
/// - Validating the configured target
pub mod scheduler;
pub mod status;
pub mod types;
pub mod validation;

pub use checker::Prober;
pub use scheduler::MonitoringScheduler;
