//! # ビジネスイベントログの構造化ヘルパー
//!
//! 送信の結果を `jq` で追跡できるよう、ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`event.action`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。
//!
//! 送信ログストア（ホストに見せる送信履歴）とは別物。こちらは運用者向けの診断ログ。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const MAIL: &str = "mail";
    }

    /// イベントアクション
    pub mod action {
        /// API が送信要求を受け付けた
        pub const MAIL_SENT: &str = "mail.sent";
        /// 送信に失敗し、ホストに失敗を返した
        pub const MAIL_FAILED: &str = "mail.failed";
        /// ホストの既定トランスポートに委ねた
        pub const MAIL_DEFERRED: &str = "mail.deferred";
        /// 接続テストを実行した
        pub const CONNECTION_TESTED: &str = "mail.connection_tested";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}
