//! 结果记录
//!
//! 成功与失败分别追加到 `success.txt` / `fail.txt`，每行 `identity|networkPath`。
//! 说明信息只进日志输出，不写入文件。

use std::path::PathBuf;

use anyhow::Context;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::pool::AccountLabel;

/// 账号最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Success => "success.txt",
            Self::Failure => "fail.txt",
        }
    }
}

/// 只追加的结果文件
pub struct ResultSink {
    dir: PathBuf,
    // 所有写入经由同一把锁
    write_lock: Mutex<()>,
}

impl ResultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path_for(&self, outcome: Outcome) -> PathBuf {
        self.dir.join(outcome.file_name())
    }

    /// 记录一个账号的结果
    pub async fn record(&self, outcome: Outcome, label: &AccountLabel, message: &str) -> anyhow::Result<()> {
        match outcome {
            Outcome::Success => tracing::info!("✔ {} | {}", label.identity, message),
            Outcome::Failure => tracing::error!("✘ {} | {}", label.identity, message),
        }

        let line = format!("{}|{}\n", label.identity, label.network_path);
        let path = self.path_for(outcome);

        let _guard = self.write_lock.lock().await;
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("创建日志目录失败: {}", self.dir.display()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("打开结果文件失败: {}", path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("写入结果文件失败: {}", path.display()))?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn label(identity: &str, network_path: &str) -> AccountLabel {
        AccountLabel {
            identity: identity.to_string(),
            network_path: network_path.to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_partitions_by_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path().join("logs"));

        sink.record(Outcome::Success, &label("0xaaa", "direct"), "处理完成")
            .await
            .unwrap();
        sink.record(Outcome::Failure, &label("0xbbb", "http://1.1.1.1:80"), "网络错误")
            .await
            .unwrap();

        let success = std::fs::read_to_string(sink.path_for(Outcome::Success)).unwrap();
        let failure = std::fs::read_to_string(sink.path_for(Outcome::Failure)).unwrap();
        assert_eq!(success, "0xaaa|direct\n");
        assert_eq!(failure, "0xbbb|http://1.1.1.1:80\n");
    }

    #[tokio::test]
    async fn test_record_appends_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("success.txt"), "old|direct\n").unwrap();
        let sink = ResultSink::new(dir.path());

        sink.record(Outcome::Success, &label("new", "direct"), "")
            .await
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("success.txt")).unwrap();
        assert_eq!(content, "old|direct\nnew|direct\n");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_records_are_not_interleaved() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(ResultSink::new(dir.path()));

        let mut handles = Vec::new();
        for i in 0..50 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                sink.record(Outcome::Success, &label(&format!("id{}", i), "direct"), "")
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let content = std::fs::read_to_string(sink.path_for(Outcome::Success)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 50);
        assert!(lines.iter().all(|l| l.starts_with("id") && l.ends_with("|direct")));
    }
}
