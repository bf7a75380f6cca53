//! 调度器与具体账号流程之间的接口

use std::future::Future;

use super::account::Account;
use crate::error::Result;

/// 写入结果文件的账号标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLabel {
    /// 可公开的身份（地址或打码后的凭证）
    pub identity: String,
    /// 网络路径（代理地址或 direct）
    pub network_path: String,
}

/// 一次成功流程的结果记录
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOutcome {
    /// 可选动作的失败说明，不影响成功判定
    pub notes: Vec<String>,
}

impl SessionOutcome {
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn message(&self) -> String {
        if self.notes.is_empty() {
            "处理完成".to_string()
        } else {
            format!("处理完成 | {}", self.notes.join("; "))
        }
    }
}

/// 单个账号的完整步骤序列
///
/// 实现方不做重试，重试只在调度器中进行
pub trait Workflow: Send + Sync + 'static {
    /// 账号标识，不发起任何网络请求
    fn label(&self, account: &Account) -> AccountLabel;

    /// 执行一次完整流程（登录 -> 动作 -> 登出）
    fn run(&self, account: &Account) -> impl Future<Output = Result<SessionOutcome>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_message() {
        let mut outcome = SessionOutcome::default();
        assert_eq!(outcome.message(), "处理完成");

        outcome.note("抽奖失败: 网络错误");
        outcome.note("余额查询失败");
        assert_eq!(outcome.message(), "处理完成 | 抽奖失败: 网络错误; 余额查询失败");
    }
}
