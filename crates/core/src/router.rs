//! # ルーティング
//!
//! (メソッド, パス) の組から処理ブランチを一つ選ぶ。判定は上から順に行い、
//! 最初に一致したものを採用する。
//!
//! | 順 | 条件 | 結果 |
//! |----|------|------|
//! | 1 | `GET /` | トークン検証 |
//! | 2 | `POST /token` | トークン発行 |
//! | 3 | パスが `/`, `/token` 以外 | 404 |
//! | 4 | メソッドが `GET`, `POST` 以外 | 405 |
//! | 5 | `GET /token` | 405 |
//! | 6 | `POST /` | 405 |

/// トークン検証のパス
pub const VALIDATE_PATH: &str = "/";
/// トークン発行のパス
pub const ISSUE_PATH: &str = "/token";

/// ルーティング結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET /`
    ValidateToken,
    /// `POST /token`
    IssueToken,
    /// 未知のパス
    NotFound,
    /// 既知のパスに許可されていないメソッド
    MethodNotAllowed,
}

impl Route {
    /// メソッドとパスを完全一致（大文字小文字を区別）で判定する。
    pub fn resolve(method: &str, path: &str) -> Self {
        match (method, path) {
            ("GET", VALIDATE_PATH) => Route::ValidateToken,
            ("POST", ISSUE_PATH) => Route::IssueToken,
            (_, path) if path != VALIDATE_PATH && path != ISSUE_PATH => Route::NotFound,
            // 残りはすべて既知のパス: GET/POST以外、GET /token、POST /
            _ => Route::MethodNotAllowed,
        }
    }
}
