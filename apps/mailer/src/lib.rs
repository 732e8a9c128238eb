//! # Outbound Mailer
//!
//! ホストアプリケーションの「メール送信」呼び出しを横取りし、
//! 署名付きの HTTP 呼び出しでクラウドメール API に振り替える。
//!
//! ## 構成
//!
//! ```text
//! host → DispatchInterceptor → AddressParser（正規化）
//!                           → MailApiClient → Signer（署名）→ HttpTransport
//!                           → MailLogRecorder → MailLogStore
//! ```
//!
//! - [`usecase`] - DispatchInterceptor と送信ログ記録
//! - [`config`] - 環境変数からのストア選択
//! - [`cli`] - 運用 CLI（接続テスト・テスト送信・送信ログ）
//! - [`error`] - CLI のエラー定義

pub mod cli;
pub mod config;
pub mod error;
pub mod usecase;

pub use error::MailerError;
pub use usecase::{DispatchInterceptor, MailLogRecorder};
