//! # tokenfn 暗号処理
//!
//! 共有秘密鍵による署名付きトークンの発行と検証を実装する。
//!
//! ## アルゴリズム
//! | 用途 | アルゴリズム |
//! |------|------------|
//! | 署名 | HMAC-SHA256 (JWT `HS256`) |
//! | 有効期間 | `[nbf, exp)` の半開区間、検証時刻で評価 |
//!
//! 署名とJWTのエンコードは `jsonwebtoken` に委譲し、時間窓の判定はこのクレートで行う。
//! `jsonwebtoken` の `exp` 判定は `exp` ちょうどの時刻を有効とみなし、既定で60秒の
//! 猶予も付くため、ライブラリ側の時刻検証は無効化している。

mod clock;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tokenfn_types::TokenClaims;

pub use clock::{Clock, FixedClock, SystemClock};

/// 署名・検証のアルゴリズム。これ以外の `alg` を持つトークンは拒否する。
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// トークン処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// 有効期限切れ（`now >= exp`）
    #[error("トークンの有効期限が切れています")]
    Expired,
    /// 有効開始前（`now < nbf`）
    #[error("トークンはまだ有効になっていません")]
    NotYetValid,
    /// 署名不一致・形式不正・アルゴリズム不一致
    #[error("トークンの検証に失敗しました: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    /// 署名処理に失敗
    #[error("トークンの署名に失敗しました: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    /// 発行時刻にオフセットを加えるとUNIX秒の範囲を超える
    #[error("時間窓がUNIX秒の範囲を超えます: now={now}, offset={offset}")]
    WindowOverflow {
        /// 発行時刻
        now: i64,
        /// 加算しようとしたオフセット（秒）
        offset: i64,
    },
}

// ---------------------------------------------------------------------------
// 発行ポリシー
// ---------------------------------------------------------------------------

/// 発行するトークンの時間窓。
///
/// 既定値は発行から2秒後に有効になり、5秒後に失効する（有効期間は3秒）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// 発行時刻から `nbf` までの秒数
    pub activation_delay_secs: i64,
    /// 発行時刻から `exp` までの秒数
    pub lifetime_secs: i64,
}

impl TokenPolicy {
    pub const DEFAULT_ACTIVATION_DELAY_SECS: i64 = 2;
    pub const DEFAULT_LIFETIME_SECS: i64 = 5;

    /// 発行時刻 `now` におけるクレームを構築する。
    pub fn claims_for(&self, data: serde_json::Value, now: i64) -> Result<TokenClaims, TokenError> {
        let offset_from = |offset: i64| {
            now.checked_add(offset)
                .ok_or(TokenError::WindowOverflow { now, offset })
        };
        Ok(TokenClaims {
            data,
            exp: Some(offset_from(self.lifetime_secs)?),
            nbf: Some(offset_from(self.activation_delay_secs)?),
        })
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            activation_delay_secs: Self::DEFAULT_ACTIVATION_DELAY_SECS,
            lifetime_secs: Self::DEFAULT_LIFETIME_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// 署名器
// ---------------------------------------------------------------------------

/// 共有秘密鍵によるHS256トークンの署名器。
///
/// 秘密鍵は構築時に一度だけ渡され、以後は不変。複数のリクエストから共有できる。
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &TOKEN_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// 共有秘密鍵から署名器を構築する。
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// クレームに署名してコンパクト形式のトークンを返す。
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(TOKEN_ALGORITHM), claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// ポリシーに従った時間窓でペイロードを包み、署名する。
    pub fn issue(
        &self,
        data: serde_json::Value,
        policy: &TokenPolicy,
        now: i64,
    ) -> Result<String, TokenError> {
        self.sign(&policy.claims_for(data, now)?)
    }

    /// 署名を検証し、時刻 `now` で時間窓を判定してクレームを返す。
    ///
    /// `exp` / `nbf` が無いトークンはその判定を行わない。
    pub fn verify(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding, &self.validation)?.claims;

        if claims.exp.is_some_and(|exp| now >= exp) {
            return Err(TokenError::Expired);
        }
        if claims.nbf.is_some_and(|nbf| now < nbf) {
            return Err(TokenError::NotYetValid);
        }
        Ok(claims)
    }
}
