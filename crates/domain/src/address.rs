//! # AddressParser
//!
//! ホストの緩い形式の入力（カンマ区切りの宛先、改行区切りのヘッダー）を
//! [`MailRequest`] に正規化する純粋関数群。
//!
//! ## アドレスの文法
//!
//! From ヘッダーと各宛先は次の 2 形式のみを受け付ける:
//!
//! - `表示名 <address>`: 表示名は前後の空白とダブルクォートを除去する
//! - それ以外: 全体（前後の空白を除去）を素のアドレスとし、表示名は空
//!
//! アドレスの構文検証は行わない。

use std::sync::LazyLock;

use regex::Regex;

use crate::mail::{
    AddressInput,
    HeaderInput,
    MailRequest,
    RawMailRequest,
    Recipient,
    RecipientKind,
    SenderIdentity,
};

/// `表示名 <address>` 形式
static NAMED_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*<([^>]+)>$").expect("アドレス用の正規表現は常に有効")
});

/// From ヘッダーの解析結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFrom {
    pub from:      String,
    pub from_name: String,
}

/// ヘッダーブロックの解析結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHeaders {
    pub from:         String,
    pub from_name:    String,
    pub cc:           Vec<String>,
    pub bcc:          Vec<String>,
    pub reply_to:     String,
    pub content_type: Option<String>,
}

/// 宛先リストを分割する
///
/// 文字列の場合は `,` で分割して各要素の前後の空白を除去する。
/// 順序は保持し、重複除去や構文検証は行わない。
pub fn parse_recipient_list(raw: &AddressInput) -> Vec<String> {
    match raw {
        AddressInput::List(items) => items.iter().map(|s| s.trim().to_string()).collect(),
        AddressInput::Single(value) => split_addresses(value),
    }
}

/// ヘッダーブロックを行に分割する
///
/// `\r\n` を `\n` に正規化してから分割する。
pub fn parse_header_block(raw: &HeaderInput) -> Vec<String> {
    match raw {
        HeaderInput::Lines(lines) => lines.clone(),
        HeaderInput::Block(block) => block
            .replace("\r\n", "\n")
            .split('\n')
            .map(str::to_string)
            .collect(),
    }
}

/// ヘッダー行を解析する
///
/// 空行とコロンを含まない行は黙って読み飛ばす。未知のヘッダー名は無視する。
/// From / Reply-To / Content-Type は後勝ち、Cc / Bcc は複数行にわたって蓄積する。
pub fn parse_headers<S: AsRef<str>>(lines: &[S]) -> ParsedHeaders {
    let mut parsed = ParsedHeaders::default();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_lowercase();
        let value = value.trim();

        match name.as_str() {
            "from" => {
                let ParsedFrom { from, from_name } = parse_from_header(value);
                parsed.from = from;
                parsed.from_name = from_name;
            }
            "cc" => parsed.cc.extend(split_addresses(value)),
            "bcc" => parsed.bcc.extend(split_addresses(value)),
            "reply-to" => parsed.reply_to = value.to_string(),
            "content-type" => {
                // charset や boundary などのパラメータは捨てる
                let media_type = value.split(';').next().unwrap_or_default().trim();
                if !media_type.is_empty() {
                    parsed.content_type = Some(media_type.to_string());
                }
            }
            _ => {}
        }
    }

    parsed
}

/// From ヘッダーの値を解析する
pub fn parse_from_header(value: &str) -> ParsedFrom {
    match split_named_address(value) {
        Some((name, address)) => ParsedFrom {
            from:      address,
            from_name: name,
        },
        None => ParsedFrom {
            from:      value.trim().to_string(),
            from_name: String::new(),
        },
    }
}

/// 宛先 1 件を解析し、指定された種別でタグ付けする
pub fn parse_recipient_entry(raw: &str, kind: RecipientKind) -> Recipient {
    let (name, address) =
        split_named_address(raw).unwrap_or_else(|| (String::new(), raw.trim().to_string()));
    Recipient {
        address,
        name,
        kind,
    }
}

/// ホストの入力を [`MailRequest`] に正規化する
///
/// 分割後に空になった宛先（末尾のカンマなど）もそのまま宛先に含める。
/// 宛先の検証は API に任せ、拒否された場合は失敗として送信ログに残る。
pub fn parse_mail_request(raw: &RawMailRequest) -> MailRequest {
    let header_lines = parse_header_block(&raw.headers);
    let headers = parse_headers(header_lines.as_slice());

    MailRequest {
        to:           to_recipients(parse_recipient_list(&raw.to), RecipientKind::To),
        cc:           to_recipients(headers.cc, RecipientKind::Cc),
        bcc:          to_recipients(headers.bcc, RecipientKind::Bcc),
        from:         SenderIdentity {
            address: headers.from,
            name:    headers.from_name,
        },
        reply_to:     headers.reply_to,
        subject:      raw.subject.clone(),
        body:         raw.message.clone(),
        content_type: headers.content_type,
    }
}

fn to_recipients(entries: Vec<String>, kind: RecipientKind) -> Vec<Recipient> {
    entries
        .iter()
        .map(|entry| parse_recipient_entry(entry, kind))
        .collect()
}

fn split_addresses(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).collect()
}

/// `表示名 <address>` 形式なら (表示名, アドレス) を返す
fn split_named_address(value: &str) -> Option<(String, String)> {
    let captures = NAMED_ADDRESS.captures(value.trim())?;
    let name = captures[1]
        .trim_matches(|c: char| c == '"' || c.is_whitespace())
        .to_string();
    let address = captures[2].trim().to_string();
    Some((name, address))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // ===== parse_from_header =====

    #[rstest]
    #[case("John Doe <john@example.com>", "john@example.com", "John Doe")]
    #[case("john@example.com", "john@example.com", "")]
    #[case(r#""John Doe" <john@example.com>"#, "john@example.com", "John Doe")]
    #[case("John<john@example.com>", "john@example.com", "John")]
    #[case("  john@example.com  ", "john@example.com", "")]
    #[case("山田 太郎 < yamada@example.jp >", "yamada@example.jp", "山田 太郎")]
    #[case("<john@example.com>", "<john@example.com>", "")]
    fn test_parse_from_headerは2つの形式を解析する(
        #[case] value: &str,
        #[case] from: &str,
        #[case] from_name: &str,
    ) {
        let parsed = parse_from_header(value);

        assert_eq!(parsed.from, from);
        assert_eq!(parsed.from_name, from_name);
    }

    // ===== parse_recipient_list =====

    #[test]
    fn test_カンマ区切りの文字列を分割して前後の空白を除去する() {
        let result = parse_recipient_list(&AddressInput::from(
            "user1@example.com, user2@example.com ,user3@example.com",
        ));

        assert_eq!(
            result,
            vec!["user1@example.com", "user2@example.com", "user3@example.com"]
        );
    }

    #[test]
    fn test_分割済みのリストは順序を保ち重複を除去しない() {
        let result = parse_recipient_list(&AddressInput::List(vec![
            " b@example.com".to_string(),
            "a@example.com".to_string(),
            "b@example.com".to_string(),
        ]));

        assert_eq!(result, vec!["b@example.com", "a@example.com", "b@example.com"]);
    }

    // ===== parse_header_block =====

    #[rstest]
    #[case("From: a@example.com\r\nCc: b@example.com")]
    #[case("From: a@example.com\nCc: b@example.com")]
    fn test_ヘッダーブロックはcrlfとlfのどちらでも分割できる(#[case] block: &str) {
        let lines = parse_header_block(&HeaderInput::from(block));

        assert_eq!(lines, vec!["From: a@example.com", "Cc: b@example.com"]);
    }

    // ===== parse_headers =====

    #[test]
    fn test_parse_headersは複数のヘッダーを解析する() {
        let parsed = parse_headers(&[
            "From: Test <test@example.com>",
            "Cc: cc1@example.com",
            "Cc: cc2@example.com",
            "Bcc: bcc@example.com",
            "Content-Type: text/html",
        ]);

        assert_eq!(parsed.from, "test@example.com");
        assert_eq!(parsed.from_name, "Test");
        assert_eq!(parsed.cc, vec!["cc1@example.com", "cc2@example.com"]);
        assert_eq!(parsed.bcc, vec!["bcc@example.com"]);
        assert_eq!(parsed.content_type.as_deref(), Some("text/html"));
    }

    #[test]
    fn test_ccは1行内のカンマ区切りも蓄積する() {
        let parsed = parse_headers(&["cc: a@example.com, b@example.com", "CC: c@example.com"]);

        assert_eq!(
            parsed.cc,
            vec!["a@example.com", "b@example.com", "c@example.com"]
        );
    }

    #[test]
    fn test_content_typeはパラメータを捨てる() {
        let parsed = parse_headers(&["Content-Type: text/html; charset=UTF-8"]);

        assert_eq!(parsed.content_type.as_deref(), Some("text/html"));
    }

    #[test]
    fn test_reply_toは値をそのまま保持し後勝ち() {
        let parsed = parse_headers(&[
            "Reply-To: first@example.com",
            "Reply-To: Support <reply@example.com>",
        ]);

        assert_eq!(parsed.reply_to, "Support <reply@example.com>");
    }

    #[test]
    fn test_fromは後勝ちで表示名もリセットされる() {
        let parsed = parse_headers(&["From: Named <named@example.com>", "From: bare@example.com"]);

        assert_eq!(parsed.from, "bare@example.com");
        assert_eq!(parsed.from_name, "");
    }

    #[test]
    fn test_空行とコロンなしの行と未知のヘッダーは無視する() {
        let parsed = parse_headers(&[
            "",
            "   ",
            "From: test@example.com",
            "invalid header line",
            "X-Mailer: something",
            "Cc: cc@example.com",
        ]);

        let expected = ParsedHeaders {
            from: "test@example.com".to_string(),
            cc: vec!["cc@example.com".to_string()],
            ..Default::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_値に含まれるコロンは最初のコロンだけで分割する() {
        let parsed = parse_headers(&["Reply-To: Team: Support <support@example.com>"]);

        assert_eq!(parsed.reply_to, "Team: Support <support@example.com>");
    }

    // ===== parse_recipient_entry =====

    #[rstest]
    #[case(RecipientKind::To)]
    #[case(RecipientKind::Cc)]
    #[case(RecipientKind::Bcc)]
    fn test_宛先は指定された種別でタグ付けされる(#[case] kind: RecipientKind) {
        let recipient = parse_recipient_entry("Jane <jane@example.com>", kind);

        assert_eq!(
            recipient,
            Recipient {
                address: "jane@example.com".to_string(),
                name: "Jane".to_string(),
                kind,
            }
        );
    }

    // ===== parse_mail_request =====

    #[test]
    fn test_ホストの入力をmail_requestに正規化する() {
        let raw = RawMailRequest {
            to:      AddressInput::from("a@example.com, Bob <bob@example.com>"),
            subject: "件名".to_string(),
            message: "本文".to_string(),
            headers: HeaderInput::from(
                "From: \"Site\" <site@example.com>\r\nCc: cc@example.com\r\nBcc: bcc@example.com\r\nReply-To: reply@example.com\r\nContent-Type: text/html; charset=UTF-8",
            ),
        };

        let request = parse_mail_request(&raw);

        let expected = MailRequest {
            to:           vec![
                Recipient {
                    address: "a@example.com".to_string(),
                    name:    String::new(),
                    kind:    RecipientKind::To,
                },
                Recipient {
                    address: "bob@example.com".to_string(),
                    name:    "Bob".to_string(),
                    kind:    RecipientKind::To,
                },
            ],
            cc:           vec![Recipient {
                address: "cc@example.com".to_string(),
                name:    String::new(),
                kind:    RecipientKind::Cc,
            }],
            bcc:          vec![Recipient {
                address: "bcc@example.com".to_string(),
                name:    String::new(),
                kind:    RecipientKind::Bcc,
            }],
            from:         SenderIdentity {
                address: "site@example.com".to_string(),
                name:    "Site".to_string(),
            },
            reply_to:     "reply@example.com".to_string(),
            subject:      "件名".to_string(),
            body:         "本文".to_string(),
            content_type: Some("text/html".to_string()),
        };
        assert_eq!(request, expected);
    }

    #[test]
    fn test_空になった宛先も除去せずapiに渡す() {
        let raw = RawMailRequest {
            to: AddressInput::from("a@example.com,"),
            headers: HeaderInput::from("Cc: , c@example.com"),
            ..Default::default()
        };

        let request = parse_mail_request(&raw);

        assert_eq!(request.to_addresses(), vec!["a@example.com", ""]);
        let cc: Vec<&str> = request.cc.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(cc, vec!["", "c@example.com"]);
        assert!(request.recipients().all(|r| !r.address.contains(',')));
    }
}
