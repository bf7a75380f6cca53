//! Reiki 每日签到流程

use std::sync::Arc;

use crate::error::Result;
use crate::model::config::Config;
use crate::pool::{Account, AccountLabel, SessionOutcome, Workflow};
use crate::reiki::session::{AccountSession, NetworkPath};
use crate::reiki::wallet::Wallet;

/// 每个账号一次签到会话
pub struct ReikiWorkflow {
    config: Arc<Config>,
}

impl ReikiWorkflow {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl Workflow for ReikiWorkflow {
    fn label(&self, account: &Account) -> AccountLabel {
        let identity = Wallet::from_private_key(account.credential.expose())
            .map(|wallet| wallet.address().to_string())
            .unwrap_or_else(|_| account.credential.masked());
        let network_path = NetworkPath::resolve(&self.config, account)
            .map(|path| path.to_string())
            .unwrap_or_else(|_| "invalid".to_string());

        AccountLabel {
            identity,
            network_path,
        }
    }

    async fn run(&self, account: &Account) -> Result<SessionOutcome> {
        let mut session = AccountSession::new(self.config.clone(), account)?;
        tracing::debug!(
            "{} | 开始会话 ({})",
            session.wallet().short(),
            session.network_path()
        );
        session.execute().await
    }
}
