//! Reiki 数据模型
//!
//! - `auth`: 钱包签名登录
//! - `lottery`: 转盘抽奖与余额

pub mod auth;
pub mod lottery;
