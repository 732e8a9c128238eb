//! # Outbound Mailer 共有ユーティリティ
//!
//! ワークスペース全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, apps）から依存できる
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - トレーシング初期化は `observability` feature の背後に置き、ライブラリ利用時の依存を増やさない

pub mod event_log;
pub mod observability;
