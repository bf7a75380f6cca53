//! 以太坊钱包
//!
//! 从私钥推导 EIP-55 地址，并按 EIP-191 (personal_sign) 签名登录消息

use std::fmt;

use alloy_primitives::{eip191_hash_message, Address};
use k256::ecdsa::SigningKey;

use crate::error::{Result, SessionError};

/// 账号钱包，地址可安全写日志
pub struct Wallet {
    key: SigningKey,
    address: String,
}

impl Wallet {
    /// 从十六进制私钥创建，可带 `0x` 前缀
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let trimmed = private_key.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = hex::decode(digits)
            .map_err(|e| SessionError::Credential(format!("不是合法的十六进制: {}", e)))?;
        if bytes.len() != 32 {
            return Err(SessionError::Credential(format!(
                "私钥应为 32 字节，实际 {} 字节",
                bytes.len()
            )));
        }

        let key = SigningKey::from_slice(&bytes)
            .map_err(|_| SessionError::Credential("不是合法的 secp256k1 私钥".to_string()))?;
        let address = Address::from_public_key(key.verifying_key()).to_checksum(None);

        Ok(Self { key, address })
    }

    /// EIP-55 校验和地址
    pub fn address(&self) -> &str {
        &self.address
    }

    /// 日志用的缩写地址
    pub fn short(&self) -> String {
        format!("{}...{}", &self.address[..10], &self.address[self.address.len() - 10..])
    }

    /// personal_sign 签名，返回 `0x` + 65 字节 r||s||v
    pub fn sign_message(&self, message: &str) -> Result<String> {
        let prehash = eip191_hash_message(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(prehash.as_slice())
            .map_err(|e| SessionError::Credential(format!("签名失败: {}", e)))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet").field("address", &self.address).finish()
    }
}
