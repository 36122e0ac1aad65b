//! # GET /
//!
//! Bearerトークンの署名と時間窓を検証し、埋め込まれたペイロードを返す。

use serde_json::Value;
use tokenfn_crypto::TokenSigner;
use tokenfn_types::Headers;

use crate::error::FunctionError;

/// 認可スキーム（大文字小文字を区別）
pub const BEARER_SCHEME: &str = "Bearer";

/// `authorization` ヘッダーからトークン部分を取り出す。
///
/// 値をASCII空白（垂直タブを含む）で分割し、ちょうど2要素かつ先頭が `Bearer` の場合のみ受理する。
/// NBSPなどUnicodeの空白は区切りとみなさない。
pub fn bearer_token(headers: &Headers) -> Result<&str, FunctionError> {
    let value = headers
        .get("authorization")
        .ok_or(FunctionError::MissingAuthHeader)?;

    let mut parts = value
        .split(|c: char| c.is_ascii_whitespace() || c == '\x0b')
        .filter(|part| !part.is_empty());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Ok(token),
        _ => Err(FunctionError::MalformedAuthHeader),
    }
}

/// GET / — トークン検証。
///
/// 期限切れ・有効開始前は401、それ以外の検証失敗は403。
pub fn validate_token(
    signer: &TokenSigner,
    headers: &Headers,
    now: i64,
) -> Result<Value, FunctionError> {
    let token = bearer_token(headers)?;
    let claims = signer.verify(token, now)?;
    Ok(claims.data)
}
