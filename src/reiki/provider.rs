//! Reiki API Provider
//!
//! 负责与 Reiki 接口通信，一个实例对应一个账号的一次会话

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, ORIGIN, REFERER, USER_AGENT,
};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::{Result, SessionError};
use crate::http_client::{build_client, ProxyConfig};
use crate::reiki::model::auth::{ChallengeRequest, ChallengeResponse, NonceRequest, NonceResponse};
use crate::reiki::model::lottery::{LotteryBalance, MintedBalance, SpinResult};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Reiki API Provider
///
/// 登录成功后保存 bearer token，之后的请求都会携带
pub struct ReikiProvider {
    client: Client,
    base_url: Url,
    headers: HeaderMap,
    token: Option<String>,
}

impl ReikiProvider {
    /// 在给定网络路径上打开会话
    pub fn open(base_url: &str, proxy: Option<&ProxyConfig>, timeout_secs: u64) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SessionError::Remote(format!("baseUrl 无效 {}: {}", base_url, e)))?;
        let client = build_client(proxy, timeout_secs)
            .map_err(|e| SessionError::Network(format!("创建 HTTP 客户端失败: {}", e)))?;
        let headers = Self::build_headers(&base_url)?;

        Ok(Self {
            client,
            base_url,
            headers,
            token: None,
        })
    }

    /// 站点 origin，如 `https://reiki.web3go.xyz`
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    /// 站点域名（含非默认端口）
    pub fn domain(&self) -> String {
        let host = self.base_url.host_str().unwrap_or_default();
        match self.base_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    #[cfg(test)]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// 构建浏览器风格的请求头
    fn build_headers(base_url: &Url) -> Result<HeaderMap> {
        let origin = base_url.origin().ascii_serialization();
        let referer = format!("{}/taskboard", origin);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert("x-app-channel", HeaderValue::from_static("DIN"));
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&origin)
                .map_err(|e| SessionError::Remote(format!("Origin 无效: {}", e)))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&referer)
                .map_err(|e| SessionError::Remote(format!("Referer 无效: {}", e)))?,
        );
        Ok(headers)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| SessionError::Remote(format!("接口地址无效 {}: {}", path, e)))?;
        let mut builder = self.client.request(method, url).headers(self.headers.clone());
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// 发送请求并返回响应文本，非 2xx 视为接口错误
    async fn send(builder: RequestBuilder, path: &str) -> Result<String> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::Remote(format!("{} 请求失败: {} {}", path, status, body)));
        }

        Ok(response.text().await?)
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder, path: &str) -> Result<T> {
        let body = Self::send(builder, path).await?;
        serde_json::from_str(&body)
            .map_err(|e| SessionError::Remote(format!("{} 响应解析失败: {} ({})", path, e, body)))
    }

    /// 获取登录 nonce 与 challenge
    pub async fn nonce(&self, address: &str) -> Result<NonceResponse> {
        const PATH: &str = "/api/account/web3/web3_nonce";
        let builder = self.request(Method::POST, PATH)?.json(&NonceRequest { address });
        Self::send_json(builder, PATH).await
    }

    /// 提交签名换取 token
    pub async fn login(&mut self, request: &ChallengeRequest) -> Result<()> {
        const PATH: &str = "/api/account/web3/web3_challenge";
        let builder = self.request(Method::POST, PATH)?.json(request);
        let response: ChallengeResponse = Self::send_json(builder, PATH).await?;

        let token = response
            .token()
            .ok_or_else(|| SessionError::Auth("响应中没有 token".to_string()))?;
        self.token = Some(token.to_string());
        Ok(())
    }

    /// 每日签到，同一天重复签到由服务端保证幂等
    pub async fn checkin(&self, day: &str) -> Result<()> {
        const PATH: &str = "/api/checkin";
        let builder = self.request(Method::PUT, PATH)?.query(&[("day", day)]);
        let body = Self::send(builder, PATH).await?;
        if body.trim() != "true" {
            return Err(SessionError::Remote(format!("签到未成功: {}", body)));
        }
        Ok(())
    }

    /// 链下抽奖余额
    pub async fn lottery_balance(&self) -> Result<LotteryBalance> {
        const PATH: &str = "/api/lottery/offchain";
        Self::send_json(self.request(Method::GET, PATH)?, PATH).await
    }

    /// 抽一次奖
    pub async fn spin(&self) -> Result<SpinResult> {
        const PATH: &str = "/api/lottery/try";
        Self::send_json(self.request(Method::POST, PATH)?, PATH).await
    }

    /// 已铸造余额
    pub async fn minted_balance(&self) -> Result<MintedBalance> {
        const PATH: &str = "/api/lottery/mint/info";
        Self::send_json(self.request(Method::GET, PATH)?, PATH).await
    }

    /// 关闭会话，释放连接池
    pub fn close(self) {
        tracing::debug!("关闭会话: {}", self.base_url);
        drop(self.client);
    }
}

/// 请求移动代理的换 IP 链接，响应内容忽略
pub async fn rotate_mobile_ip(change_ip_url: &str, timeout_secs: u64) -> Result<()> {
    let client = build_client(None, timeout_secs)
        .map_err(|e| SessionError::Network(format!("创建 HTTP 客户端失败: {}", e)))?;
    let response = client.get(change_ip_url).send().await?;
    if !response.status().is_success() {
        return Err(SessionError::Remote(format!(
            "换 IP 失败: {}",
            response.status()
        )));
    }
    tracing::debug!("移动代理已换 IP");
    Ok(())
}
