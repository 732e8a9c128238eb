//! # Outbound Mailer インフラ層
//!
//! クラウドメール API・設定ストア・ログストアとの接続を担当する。
//!
//! ## 設計方針
//!
//! ドメイン層のモデルと純粋関数（署名、アドレス解析）を使い、
//! I/O を伴う処理をここに閉じ込める。外部との境界はすべて trait で抽象化し、
//! テストではモックに差し替える。
//!
//! ## 責務
//!
//! - **MailApiClient**: 署名付き HTTP 呼び出しと応答の解釈
//! - **HTTP トランスポート**: reqwest による POST/GET
//! - **設定プロバイダ**: 環境変数・JSON ファイル
//! - **送信ログストア**: インメモリ・JSON ファイル
//! - **フック**: 送信ボディの加工、送信結果の通知、フォールバック・ログ記録ポリシー
//!
//! ## モジュール構成
//!
//! - [`client`] - MailApiClient
//! - [`error`] - インフラ層エラー定義
//! - [`hooks`] - 通知・ポリシーフック
//! - [`mail_log`] - 送信ログストア
//! - [`settings`] - 設定プロバイダ
//! - [`transport`] - HTTP トランスポート
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use outbound_mailer_infra::{DefaultMailHooks, EnvSettingsProvider, MailApiClient, ReqwestTransport};
//!
//! async fn check_connection() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MailApiClient::new(
//!         Arc::new(EnvSettingsProvider::new()),
//!         Arc::new(ReqwestTransport::new()?),
//!         Arc::new(DefaultMailHooks),
//!     )?;
//!     let check = client.test_connection().await?;
//!     println!("{}", check.message);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod hooks;
pub mod mail_log;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod settings;
pub mod transport;

pub use client::MailApiClient;
pub use error::{InfraError, InfraErrorKind};
pub use hooks::{DefaultMailHooks, MailHooks};
pub use mail_log::{InMemoryMailLogStore, JsonFileMailLogStore, MailLogStore};
pub use settings::{EnvSettingsProvider, JsonFileSettingsProvider, SettingsProvider};
pub use transport::{HttpTransport, ReqwestTransport};
