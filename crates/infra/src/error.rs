//! # インフラ層エラー定義
//!
//! 設定ストア・ログストア・HTTP クライアントなど、外部の協調者との
//! やり取りで発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **送信失敗はここに含めない**: API の拒否や通信エラーは
//!   [`DispatchOutcome`](outbound_mailer_domain::outcome::DispatchOutcome) の値として返す
//! - **ログ可能性**: Debug によりログ出力時に詳細情報を表示
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Io, Serialization, Settings 等）

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::Io(_) => { /* ファイル操作の失敗 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// ファイル I/O エラー
    ///
    /// 設定ファイルやログファイルの読み書きに失敗した場合。
    #[error("I/O エラー: {0}")]
    Io(#[source] std::io::Error),

    /// シリアライズ/デシリアライズエラー
    ///
    /// JSON の変換に失敗した場合に使用する。
    #[error("シリアライズエラー: {0}")]
    Serialization(#[source] serde_json::Error),

    /// HTTP クライアントエラー
    ///
    /// クライアントの構築に失敗した場合。個々の送信の失敗はここに含めない。
    #[error("HTTP クライアントエラー: {0}")]
    Http(#[source] reqwest::Error),

    /// 設定エラー
    ///
    /// 設定ストアの値を解釈できない場合。
    #[error("設定エラー: {0}")]
    Settings(String),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    // ===== Convenience constructors =====

    /// 設定エラーを生成する
    pub fn settings(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Settings(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Unexpected(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<std::io::Error> for InfraError {
    fn from(source: std::io::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Io(source),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(source: serde_json::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Serialization(source),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl From<reqwest::Error> for InfraError {
    fn from(source: reqwest::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Http(source),
            span_trace: SpanTrace::capture(),
        }
    }
}
