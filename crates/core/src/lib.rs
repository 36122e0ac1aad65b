//! # tokenfn Core
//!
//! 署名付きトークンを発行・検証するサーバーレス関数のリクエストハンドラ。
//!
//! ## 処理フロー
//! 1. (メソッド, パス) からブランチを選ぶ（[`Route`]）
//! 2. ヘッダー・ボディを検証する
//! 3. トークンを署名または検証する
//! 4. レスポンスエンベロープを整形する（[`respond`]）
//!
//! ## エンドポイント
//! - `GET /` — Bearerトークン検証、埋め込みペイロードを返却
//! - `POST /token` — JSONペイロードからトークンを発行

pub mod config;
pub mod endpoints;
mod error;
mod response;
mod router;

use tokenfn_crypto::{Clock, SystemClock, TokenPolicy, TokenSigner};
use tokenfn_types::{FunctionEvent, FunctionResponse};

pub use config::{ConfigError, FunctionConfig, SECRET_ENV};
pub use error::FunctionError;
pub use response::respond;
pub use router::{Route, ISSUE_PATH, VALIDATE_PATH};

/// リクエストハンドラ。
///
/// 不変の署名器と時刻源だけを持つため、並行するリクエスト間でロックなしに共有できる。
pub struct TokenFunction {
    /// 共有秘密鍵による署名器
    signer: TokenSigner,
    /// 発行するトークンの時間窓
    policy: TokenPolicy,
    /// 時間窓の判定・発行時刻に使う時刻源
    clock: Box<dyn Clock>,
}

impl TokenFunction {
    /// システム時計と既定ポリシーでハンドラを構築する。
    pub fn new(signer: TokenSigner) -> Self {
        Self {
            signer,
            policy: TokenPolicy::default(),
            clock: Box::new(SystemClock),
        }
    }

    /// 時刻源を差し替える。
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// 発行ポリシーを差し替える。
    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 署名器への参照。
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// 1リクエストを処理する。
    ///
    /// 失敗はすべてボディなしのレスポンスになり、理由はログにのみ残す。
    pub fn handle(&self, event: &FunctionEvent) -> FunctionResponse {
        let route = Route::resolve(&event.http_method, &event.path);

        match self.dispatch(route, event) {
            Ok(response) => {
                tracing::debug!(
                    method = %event.http_method,
                    path = %event.path,
                    status = response.status_code,
                    "リクエストを処理しました"
                );
                response
            }
            Err(e) => {
                tracing::debug!(
                    method = %event.http_method,
                    path = %event.path,
                    status = e.status(),
                    reason = %e,
                    "リクエストを拒否しました"
                );
                e.to_response()
            }
        }
    }

    fn dispatch(
        &self,
        route: Route,
        event: &FunctionEvent,
    ) -> Result<FunctionResponse, FunctionError> {
        match route {
            Route::ValidateToken => {
                let data =
                    endpoints::validate_token(&self.signer, &event.headers, self.clock.now())?;
                Ok(respond(Some(&data), 200))
            }
            Route::IssueToken => {
                let body = event.decoded_body();
                let issued = endpoints::issue_token(
                    &self.signer,
                    &self.policy,
                    &event.headers,
                    body.as_deref(),
                    self.clock.now(),
                )?;
                let value = serde_json::to_value(issued)
                    .map_err(|e| FunctionError::Internal(e.to_string()))?;
                Ok(respond(Some(&value), 201))
            }
            Route::NotFound => Err(FunctionError::UnknownPath),
            Route::MethodNotAllowed => Err(FunctionError::MethodNotAllowed),
        }
    }
}

impl std::fmt::Debug for TokenFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenFunction")
            .field("signer", &self.signer)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
