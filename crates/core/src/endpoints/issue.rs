//! # POST /token
//!
//! JSONペイロードを時間窓付きの署名済みトークンに包んで返す。

use serde_json::Value;
use tokenfn_crypto::{TokenPolicy, TokenSigner};
use tokenfn_types::{Headers, TokenResponse};

use crate::error::FunctionError;

/// 受け付けるcontent-type（完全一致）
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// ボディをペイロードとしてパースする。
///
/// トップレベルがオブジェクト・配列・数値のいずれかである場合のみ受理する。
/// 文字列・真偽値・`null`、パース失敗、ボディなしは `InvalidJsonBody`。
pub fn parse_payload(body: Option<&str>) -> Result<Value, FunctionError> {
    let body = body.ok_or_else(|| FunctionError::InvalidJsonBody("ボディがありません".into()))?;
    let value: Value =
        serde_json::from_str(body).map_err(|e| FunctionError::InvalidJsonBody(e.to_string()))?;

    match value {
        Value::Object(_) | Value::Array(_) | Value::Number(_) => Ok(value),
        other => Err(FunctionError::InvalidJsonBody(format!(
            "トップレベルの型が許可されていません: {other}"
        ))),
    }
}

/// POST /token — トークン発行。
///
/// 1. `content-type` が `application/json` であることを確認（415）
/// 2. ボディをパース（422）
/// 3. `{data, exp, nbf}` を署名
pub fn issue_token(
    signer: &TokenSigner,
    policy: &TokenPolicy,
    headers: &Headers,
    body: Option<&str>,
    now: i64,
) -> Result<TokenResponse, FunctionError> {
    let content_type = headers.get("content-type");
    if content_type != Some(JSON_CONTENT_TYPE) {
        return Err(FunctionError::UnsupportedContentType(
            content_type.map(str::to_string),
        ));
    }

    let data = parse_payload(body)?;
    let token = signer.issue(data, policy, now)?;
    Ok(TokenResponse { token })
}
