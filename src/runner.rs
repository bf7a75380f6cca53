//! 运行协调：加载账号 -> 调度 -> 汇总

use std::sync::Arc;

use crate::model::config::Config;
use crate::pool::{source, Scheduler, SchedulerSettings, Workflow};
use crate::sink::ResultSink;

/// 一次运行的汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSummary {
    /// 没有可处理的账号
    NothingToDo,
    /// 全部账号已结束
    Completed { succeeded: usize, total: usize },
}

/// 运行协调器
pub struct Runner<W> {
    config: Arc<Config>,
    workflow: Arc<W>,
}

impl<W: Workflow> Runner<W> {
    pub fn new(config: Arc<Config>, workflow: W) -> Self {
        Self {
            config,
            workflow: Arc::new(workflow),
        }
    }

    pub async fn start(&self) -> anyhow::Result<RunSummary> {
        let accounts = source::load(&self.config.keys_path, &self.config.proxies_path)?;
        if accounts.is_empty() {
            tracing::info!("{} 中没有私钥，无事可做", self.config.keys_path);
            return Ok(RunSummary::NothingToDo);
        }

        let total = accounts.len();
        tracing::info!("成功加载 {} 个账号", total);

        let sink = Arc::new(ResultSink::new(&self.config.log_dir));
        let scheduler = Scheduler::new(
            self.workflow.clone(),
            sink,
            SchedulerSettings::from_config(&self.config),
        );
        let stats = scheduler.run(accounts).await?;

        let succeeded = stats.succeeded();
        if succeeded > 0 {
            tracing::info!(
                "成功处理 {}/{} 个账号，失败 {} 个",
                succeeded,
                stats.total(),
                stats.failed()
            );
        } else {
            tracing::warn!("没有账号处理成功 (0/{})", total);
        }

        Ok(RunSummary::Completed { succeeded, total })
    }
}
