//! 单个账号流程中的错误分类
//!
//! 这些错误只在账号的重试边界内处理，不会向调度器或其他账号传播。

use thiserror::Error;

/// 账号流程错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 连接失败、超时等网络错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 非 2xx 响应或响应结构不符
    #[error("接口错误: {0}")]
    Remote(String),

    /// 登录未返回 token
    #[error("登录失败: {0}")]
    Auth(String),

    /// 私钥无法解析，重试无意义
    #[error("私钥无效: {0}")]
    Credential(String),
}

impl SessionError {
    /// 是否值得整体重试
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Credential(_))
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_status() {
            Self::Remote(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// 账号流程结果
pub type Result<T> = std::result::Result<T, SessionError>;
