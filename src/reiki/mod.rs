//! Reiki 接口与账号会话
//!
//! - `wallet`: 私钥 -> 地址，登录消息签名
//! - `provider`: HTTP 接口
//! - `session`: 单账号状态机
//! - `workflow`: 供调度器使用的流程实现

pub mod model;
pub mod provider;
pub mod session;
pub mod wallet;
pub mod workflow;

pub use workflow::ReikiWorkflow;
