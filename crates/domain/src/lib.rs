//! # Outbound Mailer ドメイン層
//!
//! ホストアプリケーションの「メール送信」呼び出しをクラウドメール API に
//! 振り替えるための、純粋なモデルと純粋関数を定義する。
//!
//! ## 設計方針
//!
//! - **I/O を持たない**: HTTP 通信・設定ストア・ログストアはすべてインフラ層の責務
//! - **決定性**: 署名生成・ヘッダー解析は同じ入力に対して常に同じ出力を返す
//! - **失敗は値で表現**: 想定内の送信失敗は [`outcome::MailFailure`] として返す
//!
//! ## 依存関係の方向
//!
//! ```text
//! apps/mailer → infra → domain
//!        ↘        ↓
//!          shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`address`] - 宛先リスト・ヘッダーブロックの解析（AddressParser）
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層エラー
//! - [`mail`] - 送信リクエストのモデル
//! - [`mail_log`] - 送信ログエントリ
//! - [`outcome`] - 送信結果・接続テスト結果
//! - [`settings`] - 設定値、リージョン、サニタイズ
//! - [`signature`] - API リクエスト署名（Signer）
//!
//! ## 使用例
//!
//! ```rust
//! use outbound_mailer_domain::{address, signature};
//!
//! let from = address::parse_from_header("John Doe <john@example.com>");
//! assert_eq!(from.from, "john@example.com");
//! assert_eq!(from.from_name, "John Doe");
//!
//! let sig = signature::generate(
//!     "POST",
//!     "/api/v1/mails",
//!     "1521787414578",
//!     "test_access_key",
//!     "test_secret_key",
//! );
//! assert_eq!(sig.len(), 44);
//! ```

pub mod address;
pub mod clock;
pub mod error;
pub mod mail;
pub mod mail_log;
pub mod outcome;
pub mod settings;
pub mod signature;

pub use error::DomainError;
