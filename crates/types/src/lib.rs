//! # tokenfn 共有型定義
//!
//! サーバーレス関数の入出力とトークンのクレームをRust構造体として提供する。
//!
//! ## ワイヤ形式
//! - 入力イベント: `{"httpMethod", "path", "headers", "body"}`（camelCase）
//! - 出力: `{"body", "statusCode"}`
//! - トークン: HS256署名付きJWT（クレームは `data`, `exp`, `nbf`）

use std::borrow::Cow;
use std::collections::BTreeMap;

use base64::Engine;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ヘッダー
// ---------------------------------------------------------------------------

/// ヘッダー名を小文字に正規化したマップ。
///
/// 大文字小文字だけが異なる名前が複数届いた場合は、名前の辞書順で後に来るもの
/// （すなわち小文字側）が優先される。値が `null` のヘッダーは存在しないものとして扱う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<BTreeMap<String, Option<String>>>")]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// 空のヘッダーマップを作る。
    pub fn new() -> Self {
        Self::default()
    }

    /// ヘッダーを追加する。名前は小文字に正規化され、既存の値は上書きされる。
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// 大文字小文字を区別せずにヘッダー値を取得する。
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 正規化済みの (名前, 値) を名前順に列挙する。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<Option<BTreeMap<String, Option<String>>>> for Headers {
    fn from(raw: Option<BTreeMap<String, Option<String>>>) -> Self {
        raw.into_iter()
            .flatten()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

// ---------------------------------------------------------------------------
// 関数の入力イベント
// ---------------------------------------------------------------------------

/// ホスティング環境から渡されるリクエスト記述子。
///
/// プロキシ統合イベントの他のフィールド（`requestContext` 等）は無視する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    /// HTTPメソッド（大文字小文字を区別して比較される）
    #[serde(default)]
    pub http_method: String,
    /// リクエストパス
    #[serde(default)]
    pub path: String,
    /// リクエストヘッダー（`null` は空として扱う）
    #[serde(default)]
    pub headers: Headers,
    /// 生のリクエストボディ
    #[serde(default)]
    pub body: Option<String>,
    /// ボディがBase64エンコードされているか
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl FunctionEvent {
    /// メソッドとパスからイベントを構築する。
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// ヘッダーを追加する。
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// ボディを設定する。
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// デコード済みのボディを返す。
    ///
    /// `isBase64Encoded` の場合はStandardアルファベットでデコードする。
    /// デコードできない、またはUTF-8でない場合は `None`。
    pub fn decoded_body(&self) -> Option<Cow<'_, str>> {
        let body = self.body.as_deref()?;
        if !self.is_base64_encoded {
            return Some(Cow::Borrowed(body));
        }
        let bytes = base64::engine::general_purpose::STANDARD.decode(body).ok()?;
        String::from_utf8(bytes).ok().map(Cow::Owned)
    }
}

// ---------------------------------------------------------------------------
// 関数の出力
// ---------------------------------------------------------------------------

/// 関数のレスポンスエンベロープ。
///
/// `body` はJSON文字列 + 改行、またはボディなしの場合は空文字列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub body: String,
    pub status_code: u16,
}

impl FunctionResponse {
    /// ボディなしのレスポンスを作る。
    pub fn empty(status_code: u16) -> Self {
        Self {
            body: String::new(),
            status_code,
        }
    }

    /// ボディを持つかどうか。
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

// ---------------------------------------------------------------------------
// トークン
// ---------------------------------------------------------------------------

/// 署名付きトークンのクレーム。
///
/// 発行時は `exp` と `nbf` を必ず設定する。検証時は他の発行者が作った
/// トークンも受け取り得るため、欠けたクレームは `None`（`data` は `null`）になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 呼び出し元のペイロード
    #[serde(default)]
    pub data: serde_json::Value,
    /// 有効期限（UNIX秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// 有効開始時刻（UNIX秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// POST /token のレスポンスボディ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// 署名済みトークン文字列
    pub token: String,
}
