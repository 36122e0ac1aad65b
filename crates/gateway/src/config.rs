//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。

use anyhow::Context;
use tokenfn_core::{FunctionConfig, TokenFunction};

/// 待ち受けアドレスを指定する環境変数名
pub const BIND_ADDR_ENV: &str = "BIND_ADDR";
/// 待ち受けアドレスの既定値
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Gatewayの起動設定。
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 待ち受けアドレス
    pub bind_addr: String,
    /// 関数の設定（共有秘密鍵）
    pub function: FunctionConfig,
}

impl GatewayConfig {
    /// 環境変数から読み込む。`JWT_SECRET` が無ければ起動失敗。
    pub fn from_env() -> anyhow::Result<Self> {
        let function = FunctionConfig::from_env().context("関数の設定を読み込めません")?;
        let bind_addr =
            std::env::var(BIND_ADDR_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        Ok(Self {
            bind_addr,
            function,
        })
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// リクエストハンドラ（不変、全リクエストで共有）
    pub function: TokenFunction,
}

impl GatewayState {
    pub fn new(function: TokenFunction) -> Self {
        Self { function }
    }
}
