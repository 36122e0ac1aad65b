//! # 関数のブランチ
//!
//! - `POST /token` — トークン発行
//! - `GET /` — Bearerトークン検証

pub mod issue;
pub mod validate;

pub use issue::{issue_token, parse_payload};
pub use validate::{bearer_token, validate_token};
