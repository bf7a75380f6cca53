use clap::Parser;

use crate::model::config::DelayRange;

/// Reiki 批量每日签到
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<String>,

    /// 私钥文件路径
    #[arg(long)]
    pub keys: Option<String>,

    /// 代理文件路径
    #[arg(long)]
    pub proxies: Option<String>,

    /// 最大并发账号数
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// 启动前随机等待区间（秒），格式 min,max
    #[arg(long)]
    pub delay: Option<DelayRange>,
}
