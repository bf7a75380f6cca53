//! 账号池模块
//!
//! 提供账号加载、并发调度与重试

pub mod account;
pub mod scheduler;
pub mod source;
pub mod workflow;

pub use account::Account;
pub use scheduler::{Scheduler, SchedulerSettings};
pub use workflow::{AccountLabel, SessionOutcome, Workflow};
