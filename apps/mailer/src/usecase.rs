//! # ユースケース層
//!
//! ホストのメール送信呼び出しを処理するロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: クライアント・ログストア・フックは構築時に外部から注入する
//! - **グローバル状態を持たない**: フックの登録先はインスタンスごと
//!
//! ## モジュール構成
//!
//! - [`dispatch`] - DispatchInterceptor（送信するか、委ねるか、失敗とするかの判定）
//! - [`mail_log`] - 送信ログの記録

pub mod dispatch;
pub mod mail_log;

pub use dispatch::DispatchInterceptor;
pub use mail_log::MailLogRecorder;
