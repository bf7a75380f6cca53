//! 账号调度器
//!
//! 每个账号一个任务，由固定大小的信号量限制同时运行的账号数。
//! 拿到令牌后先随机等待，再整体重试账号流程，直到成功或次数用尽。
//! 令牌在整个重试循环期间持有，循环结束即释放。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::account::Account;
use super::workflow::{SessionOutcome, Workflow};
use crate::error::SessionError;
use crate::model::config::{Config, DelayRange};
use crate::sink::{Outcome, ResultSink};

/// 调度参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerSettings {
    /// 同时运行的账号上限
    pub concurrency: usize,
    /// 拿到令牌后的随机等待
    pub pacing: DelayRange,
    /// 整体流程最大尝试次数
    pub retry_attempts: u32,
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            concurrency: config.threads,
            pacing: config.custom_delay,
            retry_attempts: config.retry_attempts,
        }
    }
}

/// 各任务共享的计数器
#[derive(Debug, Default)]
struct Counters {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> RunStats {
        RunStats {
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

/// 一次运行的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    succeeded: usize,
    failed: usize,
}

impl RunStats {
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// 账号调度器
pub struct Scheduler<W> {
    workflow: Arc<W>,
    sink: Arc<ResultSink>,
    settings: SchedulerSettings,
}

impl<W: Workflow> Scheduler<W> {
    pub fn new(workflow: Arc<W>, sink: Arc<ResultSink>, settings: SchedulerSettings) -> Self {
        Self {
            workflow,
            sink,
            settings,
        }
    }

    /// 运行所有账号，全部结束后返回
    ///
    /// 单个账号的失败只记入结果文件；只有结果文件写入失败、任务 panic
    /// 这类意外错误才会中止整个运行
    pub async fn run(&self, accounts: Vec<Account>) -> anyhow::Result<RunStats> {
        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));
        let counters = Arc::new(Counters::default());
        let mut tasks = JoinSet::new();

        for account in accounts {
            let unit = Unit {
                workflow: self.workflow.clone(),
                sink: self.sink.clone(),
                settings: self.settings,
                counters: counters.clone(),
            };
            tasks.spawn(unit.drive(semaphore.clone(), account));
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined.context("账号任务异常退出").and_then(|r| r);
            if let Err(e) = result {
                tracing::error!("{:#}", e);
                first_error.get_or_insert(e);
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        Ok(counters.snapshot())
    }
}

/// 单个账号的任务
struct Unit<W> {
    workflow: Arc<W>,
    sink: Arc<ResultSink>,
    settings: SchedulerSettings,
    counters: Arc<Counters>,
}

impl<W: Workflow> Unit<W> {
    async fn drive(self, semaphore: Arc<Semaphore>, account: Account) -> anyhow::Result<()> {
        let label = self.workflow.label(&account);

        let permit = semaphore
            .acquire_owned()
            .await
            .context("并发令牌池已关闭")?;

        if self.settings.pacing.is_enabled() {
            let delay = self.settings.pacing.sample();
            tracing::info!("{} | 等待 {:.1} 秒", label.identity, delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }

        let attempts = self.settings.retry_attempts.max(1);
        let mut result: Result<SessionOutcome, Option<SessionError>> = Err(None);
        for attempt in 1..=attempts {
            match self.workflow.run(&account).await {
                Ok(outcome) => {
                    result = Ok(outcome);
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        "#{} {} | 第 {}/{} 次尝试失败: {}",
                        account.index,
                        label.identity,
                        attempt,
                        attempts,
                        e
                    );
                    let retryable = e.is_retryable();
                    result = Err(Some(e));
                    if !retryable {
                        break;
                    }
                }
            }
        }
        drop(permit);

        match result {
            Ok(outcome) => {
                self.counters.succeeded.fetch_add(1, Ordering::SeqCst);
                self.sink
                    .record(Outcome::Success, &label, &outcome.message())
                    .await
            }
            Err(last_error) => {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
                let message = last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "未执行".to_string());
                self.sink.record(Outcome::Failure, &label, &message).await
            }
        }
    }
}
