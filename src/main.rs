mod error;
mod http_client;
mod model;
mod pool;
mod reiki;
mod runner;
mod sink;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use http_client::ProxyConfig;
use model::arg::Args;
use model::config::Config;
use reiki::ReikiWorkflow;
use runner::{RunSummary, Runner};

/// 加载配置：配置文件 -> 环境变量 -> 命令行
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| Config::default_config_path().to_string());

    let mut config = Config::load(&config_path)
        .map_err(|e| anyhow::anyhow!("加载配置失败 {}: {}", config_path, e))?;
    config.override_from_env();

    if let Some(keys) = &args.keys {
        config.keys_path = keys.clone();
    }
    if let Some(proxies) = &args.proxies {
        config.proxies_path = proxies.clone();
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(delay) = args.delay {
        config.custom_delay = delay;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Arc::new(load_config(&args)?);

    tracing::info!(
        "并发: {} | 启动延迟: {:?} | 最大尝试: {}",
        config.threads,
        config.custom_delay,
        config.retry_attempts
    );
    if let Some((proxy, _)) = config.mobile_proxy() {
        tracing::info!("移动代理模式: {}", ProxyConfig::parse(proxy)?);
    }

    let runner = Runner::new(config.clone(), ReikiWorkflow::new(config));
    match runner.start().await? {
        RunSummary::NothingToDo => tracing::info!("没有需要处理的账号"),
        RunSummary::Completed { succeeded, total } => {
            tracing::info!("运行结束: 成功 {} / 共 {}", succeeded, total)
        }
    }

    Ok(())
}
