//! 账号数据模型

use std::fmt;

use crate::http_client::ProxyConfig;

/// 私钥等敏感凭证，Debug/Display 均不输出原文
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 原文，仅用于签名
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// 打码后的展示形式，只保留末尾 6 位
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 6 {
            return "***".to_string();
        }
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("...{}", tail)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", self.masked())
    }
}

/// 账号：一个凭证 + 可选代理
#[derive(Debug, Clone)]
pub struct Account {
    /// 在输入文件中的序号（从 0 开始）
    pub index: usize,
    /// 私钥
    pub credential: Secret,
    /// 代理，缺省时直连
    pub proxy: Option<ProxyConfig>,
}

impl Account {
    /// 创建新账号
    pub fn new(index: usize, credential: impl Into<String>, proxy: Option<ProxyConfig>) -> Self {
        Self {
            index,
            credential: Secret::new(credential),
            proxy,
        }
    }
}
