//! 账号来源：私钥文件 + 代理文件，按行号配对

use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;

use super::account::Account;
use crate::http_client::ProxyConfig;

/// 读取非空行（去除首尾空白）
///
/// 文件不存在时返回 `None`
fn read_lines(path: &Path) -> anyhow::Result<Option<Vec<String>>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("读取文件失败: {}", path.display())),
    }
}

/// 按行号配对私钥与代理
///
/// 账号数量等于私钥数量，代理不足的账号直连
pub fn pair(keys: Vec<String>, proxies: Vec<ProxyConfig>) -> Vec<Account> {
    let mut proxies = proxies.into_iter();
    keys.into_iter()
        .enumerate()
        .map(|(index, key)| Account::new(index, key, proxies.next()))
        .collect()
}

/// 加载账号
///
/// 私钥文件为空或不存在时返回空列表，由调用方按“无事可做”处理
pub fn load(keys_path: impl AsRef<Path>, proxies_path: impl AsRef<Path>) -> anyhow::Result<Vec<Account>> {
    let keys_path = keys_path.as_ref();
    let proxies_path = proxies_path.as_ref();

    let keys = match read_lines(keys_path)? {
        Some(keys) => keys,
        None => {
            tracing::warn!("私钥文件不存在: {}", keys_path.display());
            Vec::new()
        }
    };
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let proxy_lines = read_lines(proxies_path)?.unwrap_or_else(|| {
        tracing::debug!("代理文件不存在，全部直连: {}", proxies_path.display());
        Vec::new()
    });

    let proxies = proxy_lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            ProxyConfig::parse(line)
                .with_context(|| format!("{} 第 {} 个代理无效", proxies_path.display(), i + 1))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if proxies.len() < keys.len() {
        tracing::debug!(
            "代理数量 {} 少于账号数量 {}，多出的账号直连",
            proxies.len(),
            keys.len()
        );
    }

    Ok(pair(keys, proxies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_pair_shorter_proxy_list() {
        let keys = vec!["c0".to_string(), "c1".to_string(), "c2".to_string()];
        let proxies = vec![ProxyConfig::parse("1.1.1.1:80").unwrap()];

        let accounts = pair(keys, proxies);
        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].credential.expose(), "c0");
        assert_eq!(accounts[0].proxy.as_ref().unwrap().url, "http://1.1.1.1:80");
        assert_eq!(accounts[1].credential.expose(), "c1");
        assert!(accounts[1].proxy.is_none());
        assert_eq!(accounts[2].credential.expose(), "c2");
        assert!(accounts[2].proxy.is_none());
        assert_eq!(accounts[2].index, 2);
    }

    #[test]
    fn test_pair_extra_proxies_ignored() {
        let keys = vec!["c0".to_string()];
        let proxies = vec![
            ProxyConfig::parse("1.1.1.1:80").unwrap(),
            ProxyConfig::parse("2.2.2.2:80").unwrap(),
        ];
        let accounts = pair(keys, proxies);
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let keys = write_file("c0\n\n   \nc1\r\n c2 \n");
        let proxies = write_file("\n1.1.1.1:80\n\n");

        let accounts = load(keys.path(), proxies.path()).unwrap();
        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].credential.expose(), "c0");
        assert_eq!(accounts[1].credential.expose(), "c1");
        assert_eq!(accounts[2].credential.expose(), "c2");
        assert!(accounts[0].proxy.is_some());
        assert!(accounts[1].proxy.is_none());
    }

    #[test]
    fn test_load_empty_keys() {
        let keys = write_file("\n  \n");
        let proxies = write_file("1.1.1.1:80\n");
        let accounts = load(keys.path(), proxies.path()).unwrap();
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_load_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = load(dir.path().join("keys.txt"), dir.path().join("proxies.txt")).unwrap();
        assert!(accounts.is_empty());

        let keys = write_file("c0\n");
        let accounts = load(keys.path(), dir.path().join("proxies.txt")).unwrap();
        assert_eq!(accounts.len(), 1);
        assert!(accounts[0].proxy.is_none());
    }

    #[test]
    fn test_load_invalid_proxy_line() {
        let keys = write_file("c0\n");
        let proxies = write_file("ftp://1.1.1.1:21\n");
        let err = load(keys.path(), proxies.path()).unwrap_err();
        assert!(err.to_string().contains("第 1 个代理无效"));
    }
}
