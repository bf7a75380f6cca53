//! HTTP Client 构建模块
//!
//! 提供统一的 HTTP Client 构建功能，支持代理配置

use reqwest::{Client, Proxy, Url};
use std::fmt;
use std::time::Duration;

const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// 代理配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    /// 代理地址，支持 http/https/socks5，不含认证信息
    pub url: String,
    /// 代理认证用户名
    pub username: Option<String>,
    /// 代理认证密码
    pub password: Option<String>,
}

impl ProxyConfig {
    /// 从 url 创建代理配置
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// 设置认证信息
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// 解析代理行
    ///
    /// 支持 `host:port`、`user:pass@host:port`，可带 `http://`、`socks5://` 等前缀，
    /// 未写协议时按 http 处理
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            anyhow::bail!("代理地址为空");
        }

        let (scheme, rest) = match raw.split_once("://") {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => ("http".to_string(), raw),
        };
        if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
            anyhow::bail!("不支持的代理协议: {}", scheme);
        }

        let (auth, host) = match rest.rsplit_once('@') {
            Some((auth, host)) => (Some(auth), host),
            None => (None, rest),
        };
        let host = host.trim_end_matches('/');
        if host.is_empty() {
            anyhow::bail!("代理地址缺少主机: {}", raw);
        }

        let url = format!("{}://{}", scheme, host);
        let parsed = Url::parse(&url).map_err(|e| anyhow::anyhow!("代理地址无效 {}: {}", url, e))?;
        if parsed.host_str().is_none() {
            anyhow::bail!("代理地址缺少主机: {}", raw);
        }

        let mut config = Self::new(url);
        if let Some(auth) = auth {
            let (username, password) = auth.split_once(':').unwrap_or((auth, ""));
            config = config.with_auth(username, password);
        }
        Ok(config)
    }
}

/// 只输出地址，不输出认证信息
impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// 构建 HTTP Client
///
/// # Arguments
/// * `proxy` - 可选的代理配置
/// * `timeout_secs` - 超时时间（秒）
///
/// # Returns
/// 配置好的 reqwest::Client
pub fn build_client(proxy: Option<&ProxyConfig>, timeout_secs: u64) -> anyhow::Result<Client> {
    let mut builder = Client::builder().timeout(Duration::from_secs(timeout_secs));

    if let Some(proxy_config) = proxy {
        let mut proxy = Proxy::all(&proxy_config.url)?;

        // 设置代理认证
        if let (Some(username), Some(password)) = (&proxy_config.username, &proxy_config.password) {
            proxy = proxy.basic_auth(username, password);
        }

        builder = builder.proxy(proxy);
        tracing::debug!("HTTP Client 使用代理: {}", proxy_config.url);
    } else {
        builder = builder.no_proxy();
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_config_new() {
        let config = ProxyConfig::new("http://127.0.0.1:7890");
        assert_eq!(config.url, "http://127.0.0.1:7890");
        assert!(config.username.is_none());
        assert!(config.password.is_none());
    }

    #[test]
    fn test_parse_bare_host_port() {
        let config = ProxyConfig::parse("10.0.0.1:8080").unwrap();
        assert_eq!(config.url, "http://10.0.0.1:8080");
        assert!(config.username.is_none());
    }

    #[test]
    fn test_parse_with_auth() {
        let config = ProxyConfig::parse("user:p@ss@10.0.0.1:8080").unwrap();
        assert_eq!(config.url, "http://10.0.0.1:8080");
        assert_eq!(config.username.as_deref(), Some("user"));
        assert_eq!(config.password.as_deref(), Some("p@ss"));
        assert_eq!(config.to_string(), "http://10.0.0.1:8080");
    }

    #[test]
    fn test_parse_socks5() {
        let config = ProxyConfig::parse("SOCKS5://u:p@proxy.example:1080").unwrap();
        assert_eq!(config.url, "socks5://proxy.example:1080");
        assert_eq!(config.username.as_deref(), Some("u"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ProxyConfig::parse("").is_err());
        assert!(ProxyConfig::parse("ftp://1.2.3.4:21").is_err());
        assert!(ProxyConfig::parse("user:pass@").is_err());
    }

    #[test]
    fn test_build_client_without_proxy() {
        let client = build_client(None, 30);
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_client_with_proxy() {
        let config = ProxyConfig::parse("user:pass@127.0.0.1:7890").unwrap();
        let client = build_client(Some(&config), 30);
        assert!(client.is_ok());
    }
}
