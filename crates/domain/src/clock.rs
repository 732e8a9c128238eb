//! # Clock（時刻プロバイダ）
//!
//! 署名用タイムスタンプと送信ログの記録時刻は、どちらもこのトレイト経由で取得する。
//! テストでは [`FixedClock`] を注入して時刻を固定する。

use chrono::{DateTime, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// システム時刻を返す実装
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// エポックミリ秒から作成する
    ///
    /// 表現できない値の場合は UNIX エポックに丸める。
    pub fn from_millis(millis: i64) -> Self {
        Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clockは現在時刻を返す() {
        let before = Utc::now();
        let result = SystemClock.now();
        let after = Utc::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn test_fixed_clockは何度呼んでも同じ時刻を返す() {
        let clock = FixedClock::from_millis(1_521_787_414_578);

        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().timestamp_millis(), 1_521_787_414_578);
    }
}
