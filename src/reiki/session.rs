//! 单个账号的会话
//!
//! 状态流转：`Idle -> ProxyResolved -> Authenticated -> ActionComplete -> LoggedOut`，
//! 任一步失败进入 `Failed`。会话一旦打开，无论成功失败都会在返回前关闭。

use std::fmt;
use std::sync::Arc;

use chrono::{Local, Utc};

use crate::error::{Result, SessionError};
use crate::http_client::ProxyConfig;
use crate::model::config::Config;
use crate::pool::{Account, SessionOutcome};
use crate::reiki::model::auth::{ChallengeRequest, SignInMessage};
use crate::reiki::provider::{rotate_mobile_ip, ReikiProvider};
use crate::reiki::wallet::Wallet;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ProxyResolved,
    Authenticated,
    ActionComplete,
    LoggedOut,
    Failed,
}

/// 账号实际使用的网络路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkPath {
    /// 直连
    Direct,
    /// 账号自带代理
    Proxy(ProxyConfig),
    /// 全局移动代理，使用前先换 IP
    Mobile {
        proxy: ProxyConfig,
        change_ip_url: String,
    },
}

impl NetworkPath {
    /// 移动代理优先，其次账号代理，否则直连
    pub fn resolve(config: &Config, account: &Account) -> Result<Self> {
        if let Some((proxy, change_ip_url)) = config.mobile_proxy() {
            let proxy = ProxyConfig::parse(proxy)
                .map_err(|e| SessionError::Network(format!("移动代理无效: {}", e)))?;
            return Ok(Self::Mobile {
                proxy,
                change_ip_url: change_ip_url.to_string(),
            });
        }

        Ok(match &account.proxy {
            Some(proxy) => Self::Proxy(proxy.clone()),
            None => Self::Direct,
        })
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        match self {
            Self::Direct => None,
            Self::Proxy(proxy) | Self::Mobile { proxy, .. } => Some(proxy),
        }
    }
}

impl fmt::Display for NetworkPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.proxy() {
            Some(proxy) => write!(f, "{}", proxy),
            None => f.write_str("direct"),
        }
    }
}

/// 单个账号的一次会话
pub struct AccountSession {
    config: Arc<Config>,
    wallet: Wallet,
    path: NetworkPath,
    state: SessionState,
    outcome: SessionOutcome,
}

impl AccountSession {
    pub fn new(config: Arc<Config>, account: &Account) -> Result<Self> {
        let wallet = Wallet::from_private_key(account.credential.expose())?;
        let path = NetworkPath::resolve(&config, account)?;

        Ok(Self {
            config,
            wallet,
            path,
            state: SessionState::Idle,
            outcome: SessionOutcome::default(),
        })
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn network_path(&self) -> &NetworkPath {
        &self.path
    }

    fn transition(&mut self, next: SessionState) {
        tracing::trace!("{} | {:?} -> {:?}", self.wallet.short(), self.state, next);
        self.state = next;
    }

    /// 执行完整步骤序列
    pub async fn execute(&mut self) -> Result<SessionOutcome> {
        debug_assert_eq!(self.state, SessionState::Idle, "会话只能执行一次");

        let mut provider = match self.open().await {
            Ok(provider) => provider,
            Err(e) => {
                self.transition(SessionState::Failed);
                return Err(e);
            }
        };

        let result = self.authenticate_and_act(&mut provider).await;
        provider.close();

        match result {
            Ok(()) => {
                self.transition(SessionState::LoggedOut);
                Ok(std::mem::take(&mut self.outcome))
            }
            Err(e) => {
                self.transition(SessionState::Failed);
                Err(e)
            }
        }
    }

    /// Idle -> ProxyResolved
    async fn open(&mut self) -> Result<ReikiProvider> {
        if let NetworkPath::Mobile { change_ip_url, .. } = &self.path {
            rotate_mobile_ip(change_ip_url, self.config.request_timeout_secs).await?;
        }

        let provider = ReikiProvider::open(
            &self.config.base_url,
            self.path.proxy(),
            self.config.request_timeout_secs,
        )?;
        self.transition(SessionState::ProxyResolved);
        Ok(provider)
    }

    async fn authenticate_and_act(&mut self, provider: &mut ReikiProvider) -> Result<()> {
        self.authenticate(provider).await?;
        self.perform_actions(provider).await
    }

    /// ProxyResolved -> Authenticated
    async fn authenticate(&mut self, provider: &mut ReikiProvider) -> Result<()> {
        let nonce = provider.nonce(self.wallet.address()).await?;
        let address = nonce
            .address
            .as_deref()
            .filter(|address| !address.is_empty())
            .unwrap_or(self.wallet.address())
            .to_string();

        let domain = provider.domain();
        let origin = provider.origin();
        let message = SignInMessage {
            domain: &domain,
            uri: &origin,
            address: &address,
            challenge: &nonce.challenge,
            nonce: &nonce.nonce,
            issued_at: Utc::now(),
        };
        let signature = self.wallet.sign_message(&message.render())?;

        let request = ChallengeRequest {
            address: address.clone(),
            nonce: nonce.nonce.clone(),
            challenge: message.to_challenge_field(),
            signature,
        };
        provider.login(&request).await?;

        tracing::debug!("{} | 登录成功", self.wallet.short());
        self.transition(SessionState::Authenticated);
        Ok(())
    }

    /// Authenticated -> ActionComplete
    async fn perform_actions(&mut self, provider: &ReikiProvider) -> Result<()> {
        if self.config.lottery_only {
            self.spin_lottery(provider).await?;
        } else {
            let day = Local::now().format("%Y-%m-%d").to_string();
            provider.checkin(&day).await?;
            tracing::info!("{} | 签到成功: {}", self.wallet.short(), day);

            if self.config.spin_lottery {
                if let Err(e) = self.spin_lottery(provider).await {
                    tracing::warn!("{} | 抽奖失败: {}", self.wallet.short(), e);
                    self.outcome.note(format!("抽奖失败: {}", e));
                }
            }
        }

        if self.config.report_balance {
            if let Err(e) = self.report_balance(provider).await {
                tracing::warn!("{} | 余额查询失败: {}", self.wallet.short(), e);
                self.outcome.note(format!("余额查询失败: {}", e));
            }
        }

        self.transition(SessionState::ActionComplete);
        Ok(())
    }

    /// 金叶足够时持续抽奖，返回抽奖次数
    async fn spin_lottery(&self, provider: &ReikiProvider) -> Result<u64> {
        let step = self.config.lottery_step;
        let mut leaves = provider.lottery_balance().await?.user_gold_leaf_count;

        if leaves < step {
            tracing::info!("{} | 金叶不足，跳过抽奖: {}", self.wallet.short(), leaves);
            return Ok(0);
        }

        let mut spins = 0;
        while leaves >= step {
            if self.config.lottery_pause.is_enabled() {
                tokio::time::sleep(self.config.lottery_pause.sample()).await;
            }
            let result = provider.spin().await?;
            leaves -= step;
            spins += 1;
            tracing::info!(
                "{} | 奖品: {} | 剩余金叶: {}",
                self.wallet.short(),
                result.prize,
                leaves
            );
        }
        Ok(spins)
    }

    async fn report_balance(&self, provider: &ReikiProvider) -> Result<()> {
        let lottery = provider.lottery_balance().await?;
        let minted = provider.minted_balance().await?;
        tracing::info!(
            "{} | 金叶: {} | 未铸造 芯片: {} 碎片: {} | 已铸造 芯片: {} 碎片: {} 晶圆: {}",
            self.wallet.short(),
            lottery.user_gold_leaf_count,
            lottery.chip_num.unwrap_or_default(),
            lottery.piece_num.unwrap_or_default(),
            minted.minted_chip.unwrap_or_default(),
            minted.minted_piece.unwrap_or_default(),
            minted.wafer.unwrap_or_default(),
        );
        Ok(())
    }
}
