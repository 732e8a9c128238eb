//! # 設定
//!
//! 外部の設定ストアから読み込む値と、その解釈ルールを定義する。
//!
//! ## 設計方針
//!
//! - **読み取り専用**: コアは設定を書き換えない。再読み込みはインフラ層の責務
//! - **既定値**: キーが欠けていても [`MailerSettings::default`] の値で補完する
//! - **秘密情報をログに出さない**: `Debug` は鍵情報を伏せ字にする
//!
//! ## リージョンとエンドポイント
//!
//! | リージョン | ベース URL |
//! |-----------|-----------|
//! | `KR` | `https://mail.apigw.ntruss.com/api/v1` |
//! | `SGN` | `https://mail.apigw.ntruss.com/api/v1-sgn` |
//! | `JPN` | `https://mail.apigw.ntruss.com/api/v1-jpn` |
//!
//! 上記以外の値はすべて `KR` として扱う。参照時にエラーにはしない。

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::DomainError;

/// 既定のリージョン名
pub const DEFAULT_REGION: &str = "KR";

/// メール API のリージョン
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    strum::Display,
)]
pub enum Region {
    #[default]
    #[strum(serialize = "KR")]
    #[serde(rename = "KR")]
    Kr,
    #[strum(serialize = "SGN")]
    #[serde(rename = "SGN")]
    Sgn,
    #[strum(serialize = "JPN")]
    #[serde(rename = "JPN")]
    Jpn,
}

impl Region {
    /// 設定値の文字列からリージョンを決定する
    ///
    /// 未知の値は [`Region::Kr`] にフォールバックする。
    pub fn from_setting(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// リージョンのベース URL を返す
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Kr => "https://mail.apigw.ntruss.com/api/v1",
            Self::Sgn => "https://mail.apigw.ntruss.com/api/v1-sgn",
            Self::Jpn => "https://mail.apigw.ntruss.com/api/v1-jpn",
        }
    }
}

/// API 認証情報
///
/// 1 回の呼び出しの間だけ保持する。永続化しない。
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &redact(&self.access_key))
            .field("secret_key", &redact(&self.secret_key))
            .finish()
    }
}

/// メーラー設定
///
/// 設定ストアの 1 レコードに対応する。`#[serde(default)]` により、
/// 欠けたキーは既定値で補完される。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerSettings {
    pub access_key:     String,
    pub secret_key:     String,
    pub sender_address: String,
    pub sender_name:    String,
    /// リージョン名（生の設定値）。解釈は [`MailerSettings::region`] で行う
    pub region:         String,
    pub enabled:        bool,
}

impl Default for MailerSettings {
    fn default() -> Self {
        Self {
            access_key:     String::new(),
            secret_key:     String::new(),
            sender_address: String::new(),
            sender_name:    String::new(),
            region:         DEFAULT_REGION.to_string(),
            enabled:        false,
        }
    }
}

impl fmt::Debug for MailerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerSettings")
            .field("access_key", &redact(&self.access_key))
            .field("secret_key", &redact(&self.secret_key))
            .field("sender_address", &self.sender_address)
            .field("sender_name", &self.sender_name)
            .field("region", &self.region)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl MailerSettings {
    /// 送信可能な状態かどうか
    ///
    /// 有効フラグ・アクセスキー・シークレットキー・送信元アドレスの
    /// すべてが揃っている場合のみ `true`。送信処理は必ずこのゲートを通る。
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.has_credentials() && !self.sender_address.is_empty()
    }

    /// 認証情報（アクセスキーとシークレットキー）が揃っているか
    ///
    /// 接続テストは送信元アドレスを要求しないため、[`Self::is_enabled`] とは別に判定する。
    pub fn has_credentials(&self) -> bool {
        !self.access_key.is_empty() && !self.secret_key.is_empty()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
        }
    }

    pub fn region(&self) -> Region {
        Region::from_setting(&self.region)
    }

    /// 設定されたリージョンのエンドポイント
    pub fn endpoint(&self) -> &'static str {
        self.region().base_url()
    }

    /// 設定ストアから読み込んだ値を正規化する
    ///
    /// - シークレットキーは前後の空白と CR/LF だけを除去し、それ以外の文字
    ///   （スラッシュ、`+`、`=`、内側の空白など）はそのまま保持する
    /// - アクセスキー・送信者名は改行やタブを除去し、連続する空白を 1 つにまとめる
    /// - 送信元アドレスは空白を除去する
    /// - 未知のリージョンは `KR` に置き換える
    pub fn sanitized(self) -> Self {
        let region = sanitize_text(&self.region);
        let region = if region.parse::<Region>().is_ok() {
            region
        } else {
            DEFAULT_REGION.to_string()
        };

        Self {
            access_key: sanitize_text(&self.access_key),
            secret_key: sanitize_secret(&self.secret_key),
            sender_address: self
                .sender_address
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect(),
            sender_name: sanitize_text(&self.sender_name),
            region,
            enabled: self.enabled,
        }
    }

    /// 設定値を検証する
    ///
    /// 送信元アドレスが入力されているのにメールアドレスの形をしていない場合にエラーを返す。
    /// 未入力は許容する（[`Self::is_enabled`] が `false` になるだけ）。
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.sender_address.is_empty() && !is_address_shaped(&self.sender_address) {
            return Err(DomainError::Validation(format!(
                "送信元メールアドレスの形式が不正です: {}",
                self.sender_address
            )));
        }
        Ok(())
    }
}

/// シークレットキーを正規化する
///
/// 前後の空白を除去したうえで CR/LF を取り除く。
pub fn sanitize_secret(secret: &str) -> String {
    secret
        .trim()
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect()
}

/// 一般的なテキスト設定値を正規化する
fn sanitize_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// メールアドレスらしい形をしているか（ローカル部 @ ドット付きドメイン）
pub fn is_address_shaped(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "********" }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn configured() -> MailerSettings {
        MailerSettings {
            access_key:     "k".to_string(),
            secret_key:     "s".to_string(),
            sender_address: "a@b.com".to_string(),
            sender_name:    String::new(),
            region:         "KR".to_string(),
            enabled:        true,
        }
    }

    #[test]
    fn test_既定値は無効かつkrリージョン() {
        let settings = MailerSettings::default();

        assert!(!settings.is_enabled());
        assert_eq!(settings.region, "KR");
        assert_eq!(settings.access_key, "");
        assert_eq!(settings.sender_name, "");
    }

    #[test]
    fn test_すべて揃っていればis_enabledはtrue() {
        assert!(configured().is_enabled());
    }

    #[rstest]
    #[case::無効フラグ(MailerSettings { enabled: false, ..configured() })]
    #[case::アクセスキーなし(MailerSettings { access_key: String::new(), ..configured() })]
    #[case::シークレットキーなし(MailerSettings { secret_key: String::new(), ..configured() })]
    #[case::送信元アドレスなし(MailerSettings { sender_address: String::new(), ..configured() })]
    fn test_いずれかが欠けるとis_enabledはfalse(#[case] settings: MailerSettings) {
        assert!(!settings.is_enabled());
    }

    #[test]
    fn test_送信元アドレスがなくても認証情報があればhas_credentialsはtrue() {
        let settings = MailerSettings {
            sender_address: String::new(),
            enabled: false,
            ..configured()
        };
        assert!(settings.has_credentials());
        assert!(!settings.is_enabled());
    }

    #[rstest]
    #[case("KR", "https://mail.apigw.ntruss.com/api/v1")]
    #[case("SGN", "https://mail.apigw.ntruss.com/api/v1-sgn")]
    #[case("JPN", "https://mail.apigw.ntruss.com/api/v1-jpn")]
    #[case("UNKNOWN", "https://mail.apigw.ntruss.com/api/v1")]
    #[case("", "https://mail.apigw.ntruss.com/api/v1")]
    #[case("kr", "https://mail.apigw.ntruss.com/api/v1")]
    fn test_リージョンからエンドポイントを決定する(
        #[case] region: &str,
        #[case] expected: &str,
    ) {
        let settings = MailerSettings {
            region: region.to_string(),
            ..configured()
        };
        assert_eq!(settings.endpoint(), expected);
    }

    #[test]
    fn test_シークレットキーは特殊文字を保持しcrlfと前後空白のみ除去する() {
        assert_eq!(sanitize_secret("  ab/c+d e=f\r\n"), "ab/c+d e=f");
        assert_eq!(sanitize_secret("ab\r\ncd"), "abcd");
        assert_eq!(sanitize_secret("a\\b"), "a\\b");
    }

    #[test]
    fn test_sanitizedは各フィールドを正規化する() {
        let raw = MailerSettings {
            access_key:     "  key\tvalue \n".to_string(),
            secret_key:     " s/e+c=r e t\r\n".to_string(),
            sender_address: " noreply@example.com ".to_string(),
            sender_name:    "  Test   Sender ".to_string(),
            region:         "APAC".to_string(),
            enabled:        true,
        };

        let expected = MailerSettings {
            access_key:     "key value".to_string(),
            secret_key:     "s/e+c=r e t".to_string(),
            sender_address: "noreply@example.com".to_string(),
            sender_name:    "Test Sender".to_string(),
            region:         "KR".to_string(),
            enabled:        true,
        };

        assert_eq!(raw.sanitized(), expected);
    }

    #[test]
    fn test_sanitizedは既知のリージョンを保持する() {
        let settings = MailerSettings {
            region: " JPN ".to_string(),
            ..configured()
        }
        .sanitized();
        assert_eq!(settings.region(), Region::Jpn);
    }

    #[rstest]
    #[case("noreply@example.com", true)]
    #[case("", true)]
    #[case("noreply", false)]
    #[case("@example.com", false)]
    #[case("noreply@localhost", false)]
    fn test_validateは送信元アドレスの形式を検証する(
        #[case] address: &str,
        #[case] ok: bool,
    ) {
        let settings = MailerSettings {
            sender_address: address.to_string(),
            ..configured()
        };
        assert_eq!(settings.validate().is_ok(), ok);
    }

    #[test]
    fn test_debug出力に鍵情報を含めない() {
        let settings = MailerSettings {
            access_key: "ACCESS-123".to_string(),
            secret_key: "SECRET-456".to_string(),
            ..configured()
        };

        let output = format!("{settings:?} {:?}", settings.credentials());

        assert!(!output.contains("ACCESS-123"));
        assert!(!output.contains("SECRET-456"));
        assert!(output.contains("a@b.com"));
    }

    #[test]
    fn test_jsonの欠けたキーは既定値で補完される() {
        let settings: MailerSettings =
            serde_json::from_str(r#"{"access_key": "k", "enabled": true}"#).unwrap();

        assert_eq!(settings.access_key, "k");
        assert!(settings.enabled);
        assert_eq!(settings.region, "KR");
        assert_eq!(settings.sender_address, "");
    }
}
