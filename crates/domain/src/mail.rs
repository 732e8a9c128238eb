//! # メール送信リクエスト
//!
//! ホストから受け取る緩い形式の入力（[`RawMailRequest`]）と、
//! AddressParser が正規化した後の厳密な形式（[`MailRequest`]）を定義する。
//!
//! 正規化処理そのものは [`crate::address::parse_mail_request`] にある。

use serde::{Deserialize, Serialize};

/// 宛先の種別
///
/// どのヘッダーバケットから来たかで決まる。アドレスの内容からは推測しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipientKind {
    /// To（ワイヤ上のタグ `R`）
    #[serde(rename = "R")]
    To,
    /// Cc（ワイヤ上のタグ `C`）
    #[serde(rename = "C")]
    Cc,
    /// Bcc（ワイヤ上のタグ `B`）
    #[serde(rename = "B")]
    Bcc,
}

impl RecipientKind {
    /// API ペイロードで使う 1 文字タグ
    pub fn wire_tag(self) -> &'static str {
        match self {
            Self::To => "R",
            Self::Cc => "C",
            Self::Bcc => "B",
        }
    }
}

/// 宛先
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    /// 表示名（空の場合あり）
    pub name:    String,
    pub kind:    RecipientKind,
}

/// 送信者
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    pub address: String,
    pub name:    String,
}

/// 正規化済みの送信リクエスト
///
/// `to` が空でも構築はできる。宛先を渡すのはホストの責務であり、
/// コアは検証しない（API がエラーを返す）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailRequest {
    pub to:           Vec<Recipient>,
    pub cc:           Vec<Recipient>,
    pub bcc:          Vec<Recipient>,
    /// From ヘッダーで上書きされた送信者。空のフィールドは設定値で補完される
    pub from:         SenderIdentity,
    pub reply_to:     String,
    pub subject:      String,
    pub body:         String,
    pub content_type: Option<String>,
}

impl MailRequest {
    /// To → Cc → Bcc の順で全宛先を返す
    pub fn recipients(&self) -> impl Iterator<Item = &Recipient> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }

    /// To 宛先のアドレス一覧（ログ記録用）
    pub fn to_addresses(&self) -> Vec<String> {
        self.to.iter().map(|r| r.address.clone()).collect()
    }
}

/// 宛先の入力形式
///
/// 分割済みのリスト、またはカンマ区切りの 1 文字列のどちらでも受け付ける。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    List(Vec<String>),
    Single(String),
}

impl Default for AddressInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<&str> for AddressInput {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for AddressInput {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// ヘッダーの入力形式
///
/// 分割済みの行リスト、または `\r\n` / `\n` 区切りの 1 文字列のどちらでも受け付ける。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderInput {
    Lines(Vec<String>),
    Block(String),
}

impl Default for HeaderInput {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

impl From<&str> for HeaderInput {
    fn from(value: &str) -> Self {
        Self::Block(value.to_string())
    }
}

impl From<Vec<String>> for HeaderInput {
    fn from(value: Vec<String>) -> Self {
        Self::Lines(value)
    }
}

/// ホストの「メール送信」呼び出しの引数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMailRequest {
    pub to:      AddressInput,
    pub subject: String,
    pub message: String,
    pub headers: HeaderInput,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn recipient(address: &str, kind: RecipientKind) -> Recipient {
        Recipient {
            address: address.to_string(),
            name: String::new(),
            kind,
        }
    }

    #[test]
    fn test_recipientsはto_cc_bccの順に並ぶ() {
        let request = MailRequest {
            to: vec![
                recipient("to1@example.com", RecipientKind::To),
                recipient("to2@example.com", RecipientKind::To),
            ],
            cc: vec![recipient("cc@example.com", RecipientKind::Cc)],
            bcc: vec![recipient("bcc@example.com", RecipientKind::Bcc)],
            ..Default::default()
        };

        let addresses: Vec<&str> = request.recipients().map(|r| r.address.as_str()).collect();

        assert_eq!(
            addresses,
            vec![
                "to1@example.com",
                "to2@example.com",
                "cc@example.com",
                "bcc@example.com",
            ]
        );
    }

    #[test]
    fn test_wire_tagは1文字タグを返す() {
        assert_eq!(RecipientKind::To.wire_tag(), "R");
        assert_eq!(RecipientKind::Cc.wire_tag(), "C");
        assert_eq!(RecipientKind::Bcc.wire_tag(), "B");
    }

    #[test]
    fn test_raw_mail_requestは文字列とリストのどちらの形式もデシリアライズできる() {
        let single: RawMailRequest = serde_json::from_str(
            r#"{"to": "a@example.com, b@example.com", "subject": "s", "headers": "Cc: c@example.com"}"#,
        )
        .unwrap();
        let list: RawMailRequest = serde_json::from_str(
            r#"{"to": ["a@example.com"], "message": "m", "headers": ["Cc: c@example.com"]}"#,
        )
        .unwrap();

        assert_eq!(
            single.to,
            AddressInput::Single("a@example.com, b@example.com".to_string())
        );
        assert_eq!(
            single.headers,
            HeaderInput::Block("Cc: c@example.com".to_string())
        );
        assert_eq!(list.to, AddressInput::List(vec!["a@example.com".to_string()]));
        assert_eq!(list.message, "m");
        assert_eq!(list.subject, "");
    }
}
