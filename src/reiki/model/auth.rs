use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 登录时声明的链 ID
pub const SIGN_IN_CHAIN_ID: u64 = 56;

/// 登录消息版本
pub const SIGN_IN_VERSION: u32 = 1;

/// 获取 nonce 的请求体
#[derive(Debug, Serialize)]
pub struct NonceRequest<'a> {
    pub address: &'a str,
}

/// 获取 nonce 的响应体
#[derive(Debug, Clone, Deserialize)]
pub struct NonceResponse {
    #[serde(default)]
    pub address: Option<String>,
    pub nonce: String,
    pub challenge: String,
}

/// 提交签名的请求体
#[derive(Debug, Serialize)]
pub struct ChallengeRequest {
    pub address: String,
    pub nonce: String,
    /// `{"msg":"<签名原文>"}`
    pub challenge: String,
    pub signature: String,
}

/// 提交签名的响应体，token 位于 `extra.token`
#[derive(Debug, Default, Deserialize)]
pub struct ChallengeResponse {
    #[serde(default)]
    pub extra: Option<ChallengeExtra>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChallengeExtra {
    #[serde(default)]
    pub token: Option<String>,
}

impl ChallengeResponse {
    /// 非空 token
    pub fn token(&self) -> Option<&str> {
        self.extra
            .as_ref()
            .and_then(|extra| extra.token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

/// 钱包登录消息
#[derive(Debug, Clone)]
pub struct SignInMessage<'a> {
    /// 站点域名，如 `reiki.web3go.xyz`
    pub domain: &'a str,
    /// 站点 origin，如 `https://reiki.web3go.xyz`
    pub uri: &'a str,
    pub address: &'a str,
    pub challenge: &'a str,
    pub nonce: &'a str,
    pub issued_at: DateTime<Utc>,
}

impl SignInMessage<'_> {
    /// 生成待签名原文
    pub fn render(&self) -> String {
        format!(
            "{} wants you to sign in with your Ethereum account:\n{}\n\n{}\n\nURI: {}\nVersion: {}\nChain ID: {}\nNonce: {}\nIssued At: {}",
            self.domain,
            self.address,
            self.challenge,
            self.uri,
            SIGN_IN_VERSION,
            SIGN_IN_CHAIN_ID,
            self.nonce,
            format_issued_at(&self.issued_at),
        )
    }

    /// 包装为接口需要的 challenge 字段
    pub fn to_challenge_field(&self) -> String {
        serde_json::json!({ "msg": self.render() }).to_string()
    }
}

/// UTC 毫秒精度，`Z` 结尾
pub fn format_issued_at(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap() + chrono::Duration::milliseconds(67)
    }

    #[test]
    fn test_format_issued_at() {
        assert_eq!(format_issued_at(&sample_time()), "2024-01-02T03:04:05.067Z");
    }

    #[test]
    fn test_render_sign_in_message() {
        let message = SignInMessage {
            domain: "reiki.web3go.xyz",
            uri: "https://reiki.web3go.xyz",
            address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            challenge: "Welcome to Reiki",
            nonce: "abc123",
            issued_at: sample_time(),
        };

        let expected = "reiki.web3go.xyz wants you to sign in with your Ethereum account:\n\
0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\n\n\
Welcome to Reiki\n\n\
URI: https://reiki.web3go.xyz\n\
Version: 1\n\
Chain ID: 56\n\
Nonce: abc123\n\
Issued At: 2024-01-02T03:04:05.067Z";
        assert_eq!(message.render(), expected);

        let field = message.to_challenge_field();
        assert!(field.starts_with(r#"{"msg":"reiki.web3go.xyz wants you"#));
        assert!(field.contains(r"\n\nURI: https://reiki.web3go.xyz\n"));
        let parsed: serde_json::Value = serde_json::from_str(&field).unwrap();
        assert_eq!(parsed["msg"], expected);
    }

    #[test]
    fn test_challenge_response_token() {
        let ok: ChallengeResponse =
            serde_json::from_str(r#"{"extra": {"token": "jwt-token"}}"#).unwrap();
        assert_eq!(ok.token(), Some("jwt-token"));

        let empty: ChallengeResponse = serde_json::from_str(r#"{"extra": {"token": ""}}"#).unwrap();
        assert!(empty.token().is_none());

        let missing: ChallengeResponse = serde_json::from_str(r#"{"code": 401}"#).unwrap();
        assert!(missing.token().is_none());
    }

    #[test]
    fn test_nonce_response_deserialize() {
        let json = r#"{"address": "0xabc", "nonce": "n-1", "challenge": "hello"}"#;
        let resp: NonceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.nonce, "n-1");
        assert_eq!(resp.challenge, "hello");
    }
}
