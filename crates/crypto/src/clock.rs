//! # 時刻源
//!
//! トークンの時間窓は検証時点の時刻で評価する。時刻源をトレイトで抽象化し、
//! テストでは固定時刻を注入する。

use std::time::{SystemTime, UNIX_EPOCH};

/// UNIX秒を返す時刻源。
pub trait Clock: Send + Sync {
    /// 現在時刻（UNIX秒）
    fn now(&self) -> i64;
}

/// システムの壁時計。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

/// 常に同じ時刻を返す時刻源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}
