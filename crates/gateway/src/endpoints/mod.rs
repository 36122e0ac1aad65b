//! # Gatewayエンドポイント
//!
//! すべてのメソッド・パスを関数に中継する。404/405の判定は関数側のルーターが行う。

pub mod invoke;

pub use invoke::handle_invoke;
