//! # アプリケーションエラー定義
//!
//! CLI の各コマンドで発生するエラーを定義する。
//! 送信の失敗そのものはエラーではなく、コマンドの結果として扱う。

use thiserror::Error;

/// CLI コマンドで発生するエラー
#[derive(Debug, Error)]
pub enum MailerError {
    /// 入力されたメールアドレスが不正
    #[error("有効なメールアドレスを入力してください: {0}")]
    InvalidAddress(String),

    /// 設定ストア・ログストアのエラー
    #[error(transparent)]
    Infra(#[from] outbound_mailer_infra::InfraError),

    /// 出力先への書き込みエラー
    #[error("出力エラー: {0}")]
    Output(#[from] std::io::Error),

    /// JSON 出力のシリアライズエラー
    #[error("シリアライズエラー: {0}")]
    Serialization(#[from] serde_json::Error),
}
