//! # 関数の設定
//!
//! 共有秘密鍵はプロセス起動時に環境変数から一度だけ読み込む。
//! 欠落はリクエスト時のエラーではなく起動失敗として扱う。

use tokenfn_crypto::{TokenPolicy, TokenSigner};

use crate::TokenFunction;

/// 共有秘密鍵を保持する環境変数名
pub const SECRET_ENV: &str = "JWT_SECRET";

/// 設定読み込みのエラー型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 共有秘密鍵が未設定
    #[error("環境変数 {0} が設定されていません")]
    MissingSecret(&'static str),
    /// 共有秘密鍵が空
    #[error("環境変数 {0} が空です")]
    EmptySecret(&'static str),
}

/// 関数の設定。
#[derive(Clone)]
pub struct FunctionConfig {
    /// HS256の共有秘密鍵
    pub secret: String,
    /// 発行するトークンの時間窓
    pub policy: TokenPolicy,
}

impl std::fmt::Debug for FunctionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionConfig")
            .field("secret", &"<redacted>")
            .field("policy", &self.policy)
            .finish()
    }
}

impl FunctionConfig {
    /// 秘密鍵から設定を作る。
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret(SECRET_ENV));
        }
        Ok(Self {
            secret,
            policy: TokenPolicy::default(),
        })
    }

    /// 環境変数 `JWT_SECRET` から読み込む。
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret =
            std::env::var(SECRET_ENV).map_err(|_| ConfigError::MissingSecret(SECRET_ENV))?;
        Self::new(secret)
    }

    /// 設定からハンドラを構築する。
    pub fn build(&self) -> TokenFunction {
        TokenFunction::new(TokenSigner::new(self.secret.as_bytes())).with_policy(self.policy)
    }
}
