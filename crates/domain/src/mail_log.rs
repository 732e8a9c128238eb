//! # 送信ログ
//!
//! 送信 1 回ごとに 1 件記録する。ストアは直近 [`MAIL_LOG_CAPACITY`] 件だけを保持し、
//! 超過分は古いものから捨てる。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::MailFailure;

/// ログの保持件数
pub const MAIL_LOG_CAPACITY: usize = 100;

/// ログの結果種別
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MailLogStatus {
    Success,
    Error,
}

/// 送信ログのエントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailLogEntry {
    pub time:          DateTime<Utc>,
    pub status:        MailLogStatus,
    pub to:            Vec<String>,
    pub subject:       String,
    /// 成功時のみ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id:    Option<String>,
    /// 失敗時のみ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code:    Option<String>,
    /// 失敗時のみ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl MailLogEntry {
    /// 成功エントリを作成する
    pub fn success(
        time: DateTime<Utc>,
        to: Vec<String>,
        subject: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            time,
            status: MailLogStatus::Success,
            to,
            subject: subject.into(),
            request_id: Some(request_id.into()),
            error_code: None,
            error_message: None,
        }
    }

    /// 失敗エントリを作成する
    pub fn error(
        time: DateTime<Utc>,
        to: Vec<String>,
        subject: impl Into<String>,
        failure: &MailFailure,
    ) -> Self {
        Self {
            time,
            status: MailLogStatus::Error,
            to,
            subject: subject.into(),
            request_id: None,
            error_code: Some(failure.code.clone()),
            error_message: Some(failure.message.clone()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == MailLogStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_成功エントリはリクエストidを持ちエラー情報を持たない() {
        let entry = MailLogEntry::success(
            time(),
            vec!["a@example.com".to_string()],
            "件名",
            "abc123",
        );

        assert!(entry.is_success());
        assert_eq!(entry.request_id.as_deref(), Some("abc123"));
        assert_eq!(entry.error_code, None);
        assert_eq!(entry.error_message, None);
    }

    #[test]
    fn test_失敗エントリは失敗のコードとメッセージを写す() {
        let failure = MailFailure::new("invalid_recipient", "bad address");

        let entry = MailLogEntry::error(time(), vec![], "件名", &failure);

        assert_eq!(entry.status, MailLogStatus::Error);
        assert_eq!(entry.request_id, None);
        assert_eq!(entry.error_code.as_deref(), Some("invalid_recipient"));
        assert_eq!(entry.error_message.as_deref(), Some("bad address"));
    }

    #[test]
    fn test_シリアライズ時は該当しないフィールドを省略する() {
        let entry = MailLogEntry::success(
            time(),
            vec!["a@example.com".to_string()],
            "件名",
            "abc123",
        );

        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(
            value,
            json!({
                "time": "2023-11-14T22:13:20Z",
                "status": "success",
                "to": ["a@example.com"],
                "subject": "件名",
                "request_id": "abc123",
            })
        );
    }

    #[test]
    fn test_ステータスは文字列と相互変換できる() {
        assert_eq!(MailLogStatus::Error.to_string(), "error");
        assert_eq!(
            MailLogStatus::from_str("success").unwrap(),
            MailLogStatus::Success
        );
    }
}
