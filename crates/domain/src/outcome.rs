//! # 送信結果
//!
//! MailApiClient は想定内の失敗で panic もエラー伝播もしない。
//! すべての結果を [`DispatchOutcome`] / [`ConnectionCheck`] の値として返す。
//!
//! | 種別 | 表現 | 発生箇所 |
//! |------|------|---------|
//! | 未設定 | [`DispatchOutcome::NotConfigured`] | 送信前のゲート（エラーではなく通常の早期リターン） |
//! | 通信エラー | [`MailFailure`]（`http_request_failed`） | HTTP 応答を得る前の失敗 |
//! | API エラー | [`MailFailure`]（API のエラーコード or `api_error`） | 200/201 以外の応答 |
//! | 認証情報なし | [`MailFailure`]（`missing_credentials`） | 接続テストのみ |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 失敗コードの定数
pub mod error_code {
    /// HTTP 応答を得られなかった（DNS / TLS / タイムアウトなど）
    pub const TRANSPORT: &str = "http_request_failed";
    /// API がエラーを返したが、応答にエラーコードが含まれていない
    pub const API_ERROR: &str = "api_error";
    /// 接続テストに必要な認証情報がない
    pub const MISSING_CREDENTIALS: &str = "missing_credentials";
}

/// 失敗メッセージの定数
pub mod error_message {
    pub const UNKNOWN: &str = "不明なエラーが発生しました";
    pub const CONNECTION_FAILED: &str = "API への接続に失敗しました";
    pub const MISSING_CREDENTIALS: &str = "API の認証情報が設定されていません";
    pub const CONNECTION_SUCCEEDED: &str = "API への接続に成功しました";
}

/// 送信・接続テストの失敗
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct MailFailure {
    pub code:         String,
    pub message:      String,
    /// API が返したエラーボディ（JSON として解釈できた場合）
    pub raw_response: Option<Value>,
}

impl MailFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code:         code.into(),
            message:      message.into(),
            raw_response: None,
        }
    }

    pub fn with_raw_response(mut self, raw_response: Value) -> Self {
        self.raw_response = Some(raw_response);
        self
    }

    /// 通信エラー
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(error_code::TRANSPORT, message)
    }

    /// 認証情報なし（接続テスト専用）
    pub fn missing_credentials() -> Self {
        Self::new(
            error_code::MISSING_CREDENTIALS,
            error_message::MISSING_CREDENTIALS,
        )
    }

    /// API のエラーボディから失敗を組み立てる
    ///
    /// 期待する形は `{"errorMessage": "...", "error": {"errorCode": "..."}}`。
    /// どちらのキーも欠けていてよく、その場合は汎用のコード・メッセージで補う。
    pub fn from_api_error(body: Option<Value>, fallback_message: &str) -> Self {
        let code = body
            .as_ref()
            .and_then(|v| v.pointer("/error/errorCode"))
            .and_then(json_scalar_to_string)
            .unwrap_or_else(|| error_code::API_ERROR.to_string());
        let message = body
            .as_ref()
            .and_then(|v| v.get("errorMessage"))
            .and_then(json_scalar_to_string)
            .unwrap_or_else(|| fallback_message.to_string());

        let failure = Self::new(code, message);
        match body {
            Some(body) => failure.with_raw_response(body),
            None => failure,
        }
    }
}

/// 送信結果
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// API が送信要求を受け付けた
    Sent {
        request_id: String,
        /// デコード済みの応答全体（ログ・通知用）
        response:   Value,
    },
    /// 送信に失敗した
    Failed(MailFailure),
    /// 送信の前提条件を満たしていない（ネットワークアクセスなし）
    NotConfigured,
}

/// 接続テストの成功結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCheck {
    pub message: String,
}

fn json_scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
