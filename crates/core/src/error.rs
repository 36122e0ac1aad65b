//! # 関数のエラー型
//!
//! 全ブランチで共通のエラー型。どのエラーもリクエストに対して終端的で、
//! ステータスコードに一対一で対応する。クライアントにはボディを返さない。

use tokenfn_crypto::TokenError;
use tokenfn_types::FunctionResponse;

/// リクエスト処理のエラー型。
#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
    /// `authorization` ヘッダーがない
    #[error("authorizationヘッダーがありません")]
    MissingAuthHeader,
    /// `authorization` ヘッダーが `Bearer <token>` 形式でない
    #[error("authorizationヘッダーの形式が不正です")]
    MalformedAuthHeader,
    /// 署名不一致・トークン形式不正・アルゴリズム不一致
    #[error("トークンの検証に失敗: {0}")]
    SignatureInvalid(String),
    /// 有効期限切れ
    #[error("トークンの有効期限が切れています")]
    TokenExpired,
    /// 有効開始前
    #[error("トークンはまだ有効になっていません")]
    TokenNotYetValid,
    /// `content-type` が `application/json` でない
    #[error("未対応のcontent-typeです: {0:?}")]
    UnsupportedContentType(Option<String>),
    /// ボディがJSONとして不正、またはオブジェクト・配列・数値でない
    #[error("不正なJSONボディ: {0}")]
    InvalidJsonBody(String),
    /// 未知のパス
    #[error("未知のパスです")]
    UnknownPath,
    /// 既知のパスに対して許可されていないメソッド
    #[error("許可されていないメソッドです")]
    MethodNotAllowed,
    /// 内部エラー（トークンの署名失敗）
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl FunctionError {
    /// 対応するHTTPステータスコード。
    pub fn status(&self) -> u16 {
        match self {
            FunctionError::MissingAuthHeader
            | FunctionError::MalformedAuthHeader
            | FunctionError::SignatureInvalid(_) => 403,
            FunctionError::TokenExpired | FunctionError::TokenNotYetValid => 401,
            FunctionError::UnsupportedContentType(_) => 415,
            FunctionError::InvalidJsonBody(_) => 422,
            FunctionError::UnknownPath => 404,
            FunctionError::MethodNotAllowed => 405,
            FunctionError::Internal(_) => 500,
        }
    }

    /// ボディなしのレスポンスに変換する。エラーの詳細は含めない。
    pub fn to_response(&self) -> FunctionResponse {
        FunctionResponse::empty(self.status())
    }
}

impl From<TokenError> for FunctionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => FunctionError::TokenExpired,
            TokenError::NotYetValid => FunctionError::TokenNotYetValid,
            TokenError::Invalid(e) => FunctionError::SignatureInvalid(e.to_string()),
            TokenError::Signing(e) => FunctionError::Internal(e.to_string()),
            err @ TokenError::WindowOverflow { .. } => FunctionError::Internal(err.to_string()),
        }
    }
}
