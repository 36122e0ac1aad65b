//! # tokenfn Gateway
//!
//! トークン関数をローカルのHTTPサーバーとしてホストする。
//!
//! ## 役割
//! - HTTPリクエストを関数の入力イベントに変換
//! - 関数のステータス・ボディをHTTPレスポンスとして返却
//!
//! ## 関数のエンドポイント
//! - `GET /` — Bearerトークン検証
//! - `POST /token` — トークン発行
//! - それ以外 — 関数のルーターが404/405を返す
//!
//! ## 環境変数
//! - `JWT_SECRET` — 共有秘密鍵（必須）
//! - `BIND_ADDR` — 待ち受けアドレス（既定 `0.0.0.0:3000`）
//! - `RUST_LOG` — ログフィルタ（既定 `info`）

mod config;
mod endpoints;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use config::{GatewayConfig, GatewayState};
use endpoints::handle_invoke;

/// Gatewayのルーターを構築する。
fn build_router(state: Arc<GatewayState>) -> axum::Router {
    axum::Router::new()
        .fallback(handle_invoke)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// エントリポイント
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = GatewayConfig::from_env()?;
    tracing::info!(policy = ?cfg.function.policy, "トークン関数を初期化します");

    let state = Arc::new(GatewayState::new(cfg.function.build()));
    let app = build_router(state);

    tracing::info!("Gatewayを {} で起動します", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    use tokenfn_core::FunctionConfig;
    use tokenfn_crypto::Clock;
    use tokenfn_types::TokenResponse;

    /// テストから進められる時刻源
    #[derive(Clone)]
    struct SharedClock(Arc<AtomicI64>);

    impl Clock for SharedClock {
        fn now(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// テスト用Gatewayを起動し、ベースURLと時刻を返す
    async fn start_gateway() -> (String, Arc<AtomicI64>) {
        let now = Arc::new(AtomicI64::new(1_700_000_000));
        let function = FunctionConfig::new("NOTASECRET")
            .unwrap()
            .build()
            .with_clock(SharedClock(now.clone()));
        let app = build_router(Arc::new(GatewayState::new(function)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        (format!("http://127.0.0.1:{port}"), now)
    }

    /// HTTP経由で発行 → 有効区間で検証できることを確認
    #[tokio::test]
    async fn test_issue_and_validate_over_http() {
        let (base, now) = start_gateway().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/token"))
            .header("Content-Type", "application/json")
            .body(r#"{"name": "bboe"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let text = response.text().await.unwrap();
        assert!(text.ends_with('\n'));
        let issued: TokenResponse = serde_json::from_str(&text).unwrap();

        // 有効開始前
        let early = client
            .get(format!("{base}/"))
            .bearer_auth(&issued.token)
            .send()
            .await
            .unwrap();
        assert_eq!(early.status().as_u16(), 401);
        assert!(early.text().await.unwrap().is_empty());

        now.fetch_add(2, Ordering::SeqCst);
        let ok = client
            .get(format!("{base}/"))
            .bearer_auth(&issued.token)
            .send()
            .await
            .unwrap();
        assert_eq!(ok.status().as_u16(), 200);
        assert_eq!(ok.text().await.unwrap(), "{\"name\":\"bboe\"}\n");

        now.fetch_add(3, Ordering::SeqCst);
        let expired = client
            .get(format!("{base}/"))
            .bearer_auth(&issued.token)
            .send()
            .await
            .unwrap();
        assert_eq!(expired.status().as_u16(), 401);
    }

    /// ステータス表の各エラーがHTTPで返ることを確認
    #[tokio::test]
    async fn test_error_statuses_over_http() {
        let (base, _) = start_gateway().await;
        let client = reqwest::Client::new();

        let cases = [
            (reqwest::Method::DELETE, "/", 405),
            (reqwest::Method::GET, "/token", 405),
            (reqwest::Method::POST, "/", 405),
            (reqwest::Method::GET, "/unknown", 404),
            (reqwest::Method::GET, "/", 403),
        ];
        for (method, path, status) in cases {
            let response = client
                .request(method.clone(), format!("{base}{path}"))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status().as_u16(), status, "{method} {path}");
            assert!(response.text().await.unwrap().is_empty());
        }

        let wrong_type = client
            .post(format!("{base}/token"))
            .header("content-type", "text/plain")
            .body("{}")
            .send()
            .await
            .unwrap();
        assert_eq!(wrong_type.status().as_u16(), 415);

        let bad_body = client
            .post(format!("{base}/token"))
            .header("content-type", "application/json")
            .body("true")
            .send()
            .await
            .unwrap();
        assert_eq!(bad_body.status().as_u16(), 422);

        let basic = client
            .get(format!("{base}/"))
            .header("Authorization", "Basic abc")
            .send()
            .await
            .unwrap();
        assert_eq!(basic.status().as_u16(), 403);
    }
}
