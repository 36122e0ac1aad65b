//! # レスポンス整形

use serde_json::Value;
use tokenfn_types::FunctionResponse;

/// ボディとステータスからレスポンスエンベロープを作る。
///
/// ボディが無いかJSONの `null` なら空文字列、それ以外はコンパクトなJSON + 改行。
/// オブジェクトのキー順は挿入順を保つ。
pub fn respond(body: Option<&Value>, status_code: u16) -> FunctionResponse {
    match body {
        Some(value) if !value.is_null() => FunctionResponse {
            body: format!("{value}\n"),
            status_code,
        },
        _ => FunctionResponse::empty(status_code),
    }
}
