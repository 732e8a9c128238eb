//! # Signer
//!
//! メール API の各 HTTP 呼び出しを認証する HMAC-SHA256 署名を生成する。
//!
//! ## 署名対象の文字列
//!
//! ```text
//! {METHOD} {URI}\n{TIMESTAMP}\n{ACCESS_KEY}
//! ```
//!
//! メソッドの後は半角スペース 1 つ、タイムスタンプとアクセスキーの前は
//! `\n`（`\r\n` ではない）。これをシークレットキーで HMAC-SHA256 にかけ、
//! 生のダイジェストを Base64 エンコードする（常に 44 文字）。
//!
//! 乱数やソルトは使わない。同じ入力からは常に同じ署名が得られる。

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::settings::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// タイムスタンプヘッダー名
pub const TIMESTAMP_HEADER: &str = "x-ncp-apigw-timestamp";
/// アクセスキーヘッダー名
pub const ACCESS_KEY_HEADER: &str = "x-ncp-iam-access-key";
/// 署名ヘッダー名
pub const SIGNATURE_HEADER: &str = "x-ncp-apigw-signature-v2";

/// 署名対象の HTTP メソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum HttpMethod {
    #[strum(serialize = "GET")]
    Get,
    #[strum(serialize = "POST")]
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// 署名を生成する
pub fn generate(
    method: &str,
    uri: &str,
    timestamp: &str,
    access_key: &str,
    secret_key: &str,
) -> String {
    let message = format!("{method} {uri}\n{timestamp}\n{access_key}");

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .expect("HMAC は任意長の鍵を受け付ける");
    mac.update(message.as_bytes());

    STANDARD.encode(mac.finalize().into_bytes())
}

/// エポックミリ秒のタイムスタンプ文字列を返す
///
/// マイクロ秒から四捨五入でミリ秒に丸める（切り捨てではない）。
/// 符号・小数部なしの 10 進数で、現在時刻なら 13 桁になる。
pub fn timestamp_millis(now: DateTime<Utc>) -> String {
    let micros = now.timestamp_micros();
    (micros + 500).div_euclid(1000).to_string()
}

/// 署名済みリクエストの認証情報一式
///
/// タイムスタンプ・アクセスキー・署名の 3 ヘッダーを構成する。
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method:     HttpMethod,
    pub uri:        String,
    pub timestamp:  String,
    pub signature:  String,
    pub access_key: String,
}

impl SignedRequest {
    /// リクエストに署名する
    pub fn sign(
        method: HttpMethod,
        uri: impl Into<String>,
        timestamp: impl Into<String>,
        credentials: &Credentials,
    ) -> Self {
        let uri = uri.into();
        let timestamp = timestamp.into();
        let signature = generate(
            method.as_str(),
            &uri,
            &timestamp,
            &credentials.access_key,
            &credentials.secret_key,
        );

        Self {
            method,
            uri,
            timestamp,
            signature,
            access_key: credentials.access_key.clone(),
        }
    }

    /// 認証ヘッダー（名前, 値）の一覧
    pub fn auth_headers(&self) -> Vec<(String, String)> {
        vec![
            (TIMESTAMP_HEADER.to_string(), self.timestamp.clone()),
            (ACCESS_KEY_HEADER.to_string(), self.access_key.clone()),
            (SIGNATURE_HEADER.to_string(), self.signature.clone()),
        ]
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedRequest")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}
