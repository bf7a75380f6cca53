use serde::Deserialize;

/// 链下抽奖余额
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotteryBalance {
    /// 可用金叶
    pub user_gold_leaf_count: u64,
    /// 未铸造的芯片
    #[serde(default)]
    pub chip_num: Option<u64>,
    /// 未铸造的碎片
    #[serde(default)]
    pub piece_num: Option<u64>,
}

/// 抽奖结果，奖品结构不固定
#[derive(Debug, Clone, Deserialize)]
pub struct SpinResult {
    pub prize: serde_json::Value,
}

/// 已铸造余额
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintedBalance {
    #[serde(default)]
    pub minted_chip: Option<u64>,
    #[serde(default)]
    pub minted_piece: Option<u64>,
    #[serde(default)]
    pub wafer: Option<u64>,
}
