use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::http_client::ProxyConfig;

/// 随机延迟区间（秒），序列化为 `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange(pub f64, pub f64);

impl DelayRange {
    pub const ZERO: Self = Self(0.0, 0.0);

    /// 上界 <= 0 时视为关闭
    pub fn is_enabled(&self) -> bool {
        self.1 > 0.0
    }

    /// 在 [min, max] 内均匀取样
    pub fn sample(&self) -> Duration {
        let (min, max) = (self.0.max(0.0), self.1.max(0.0));
        let secs = if max > min {
            min + fastrand::f64() * (max - min)
        } else {
            max
        };
        Duration::from_secs_f64(secs)
    }

    /// 关闭的区间不校验，开启时需 0 <= min <= max 且可表示为 Duration
    fn validate(&self, name: &str) -> anyhow::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        if !self.0.is_finite() || !self.1.is_finite() {
            anyhow::bail!("{} 必须为有限数值: {:?}", name, self);
        }
        if self.0 < 0.0 || self.0 > self.1 {
            anyhow::bail!("{} 需满足 0 <= min <= max: {:?}", name, self);
        }
        Duration::try_from_secs_f64(self.1)
            .map_err(|e| anyhow::anyhow!("{} 超出范围 {:?}: {}", name, self, e))?;
        Ok(())
    }
}

impl std::str::FromStr for DelayRange {
    type Err = anyhow::Error;

    /// 解析 `min,max` 或单个数值
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let min: f64 = parts.next().unwrap_or_default().parse()?;
        let max: f64 = match parts.next() {
            Some(v) => v.parse()?,
            None => min,
        };
        if parts.next().is_some() {
            anyhow::bail!("延迟区间格式应为 min,max: {}", s);
        }
        Ok(Self(min, max))
    }
}

/// Reiki 批量签到配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// 私钥文件，每行一个
    #[serde(default = "default_keys_path")]
    pub keys_path: String,

    /// 代理文件，每行一个，与私钥按行号配对
    #[serde(default = "default_proxies_path")]
    pub proxies_path: String,

    /// 结果日志目录
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// 最大并发账号数
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// 每个账号拿到并发令牌后的随机等待区间（秒）
    #[serde(default = "default_custom_delay")]
    pub custom_delay: DelayRange,

    /// 整个流程的最大尝试次数
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// 单次 HTTP 请求超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 签到后转盘抽奖
    #[serde(default)]
    pub spin_lottery: bool,

    /// 只抽奖，不签到
    #[serde(default)]
    pub lottery_only: bool,

    /// 输出抽奖/铸造余额
    #[serde(default)]
    pub report_balance: bool,

    /// 每次抽奖消耗的金叶数
    #[serde(default = "default_lottery_step")]
    pub lottery_step: u64,

    /// 两次抽奖之间的随机间隔（秒）
    #[serde(default = "default_lottery_pause")]
    pub lottery_pause: DelayRange,

    /// 移动代理地址（可选）
    /// 与 mobile_proxy_change_ip_url 同时配置时，所有账号都走该代理
    #[serde(default)]
    pub mobile_proxy: Option<String>,

    /// 移动代理换 IP 链接（可选）
    #[serde(default)]
    pub mobile_proxy_change_ip_url: Option<String>,
}

impl Config {
    /// 从环境变量覆盖配置
    pub fn override_from_env(&mut self) {
        if let Ok(path) = env::var("KEYS_PATH") {
            self.keys_path = path;
        }
        if let Ok(path) = env::var("PROXIES_PATH") {
            self.proxies_path = path;
        }
        if let Ok(dir) = env::var("LOG_DIR") {
            self.log_dir = dir;
        }
        if let Ok(threads) = env::var("THREADS") {
            if let Ok(t) = threads.parse() {
                self.threads = t;
            }
        }
        if let Ok(attempts) = env::var("RETRY_ATTEMPTS") {
            if let Ok(a) = attempts.parse() {
                self.retry_attempts = a;
            }
        }
        if let Ok(url) = env::var("BASE_URL") {
            self.base_url = url;
        }
        if let Ok(proxy) = env::var("MOBILE_PROXY") {
            self.mobile_proxy = Some(proxy);
        }
        if let Ok(url) = env::var("MOBILE_PROXY_CHANGE_IP_URL") {
            self.mobile_proxy_change_ip_url = Some(url);
        }
    }

    /// 移动代理模式：代理地址与换 IP 链接都配置时生效
    pub fn mobile_proxy(&self) -> Option<(&str, &str)> {
        match (&self.mobile_proxy, &self.mobile_proxy_change_ip_url) {
            (Some(proxy), Some(url)) if !proxy.trim().is_empty() && !url.trim().is_empty() => {
                Some((proxy.trim(), url.trim()))
            }
            _ => None,
        }
    }

    /// 校验配置
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.threads == 0 {
            anyhow::bail!("threads 必须大于 0");
        }
        if self.retry_attempts == 0 {
            anyhow::bail!("retryAttempts 必须大于 0");
        }
        if self.lottery_step == 0 {
            anyhow::bail!("lotteryStep 必须大于 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("requestTimeoutSecs 必须大于 0");
        }
        self.custom_delay.validate("customDelay")?;
        self.lottery_pause.validate("lotteryPause")?;
        if let Some((proxy, change_ip_url)) = self.mobile_proxy() {
            ProxyConfig::parse(proxy).map_err(|e| anyhow::anyhow!("mobileProxy 无效: {}", e))?;
            reqwest::Url::parse(change_ip_url)
                .map_err(|e| anyhow::anyhow!("mobileProxyChangeIpUrl 无效: {}", e))?;
        }
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("baseUrl 无效 {}: {}", self.base_url, e))?;
        Ok(())
    }
}

fn default_keys_path() -> String {
    "inputs/keys.txt".to_string()
}

fn default_proxies_path() -> String {
    "inputs/proxies.txt".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_threads() -> usize {
    5
}

fn default_custom_delay() -> DelayRange {
    DelayRange::ZERO
}

fn default_retry_attempts() -> u32 {
    6
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_base_url() -> String {
    "https://reiki.web3go.xyz".to_string()
}

fn default_lottery_step() -> u64 {
    2000
}

fn default_lottery_pause() -> DelayRange {
    DelayRange(3.0, 5.0)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keys_path: default_keys_path(),
            proxies_path: default_proxies_path(),
            log_dir: default_log_dir(),
            threads: default_threads(),
            custom_delay: default_custom_delay(),
            retry_attempts: default_retry_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
            base_url: default_base_url(),
            spin_lottery: false,
            lottery_only: false,
            report_balance: false,
            lottery_step: default_lottery_step(),
            lottery_pause: default_lottery_pause(),
            mobile_proxy: None,
            mobile_proxy_change_ip_url: None,
        }
    }
}

impl Config {
    /// 获取默认配置文件路径
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// 从文件加载配置
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            // 配置文件不存在，返回默认配置
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
