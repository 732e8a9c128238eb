//! # 設定プロバイダ
//!
//! 外部の設定ストアから [`MailerSettings`] を読み込む。
//!
//! ## 設計方針
//!
//! - **読み込むたびに正規化**: どのプロバイダも [`MailerSettings::sanitized`] を通した値を返す
//! - **欠けた値は既定値**: 未設定の環境変数・JSON キー・存在しないファイルは
//!   [`MailerSettings::default`] の値になる
//! - **同期 API**: 設定は小さく、呼び出しは送信前の 1 回だけなので async にしない
//!
//! ## 実装
//!
//! - [`EnvSettingsProvider`] - `NCLOUD_MAILER_*` 環境変数
//! - [`JsonFileSettingsProvider`] - JSON ファイル

use std::{
    fmt,
    path::PathBuf,
    sync::Arc,
};

use outbound_mailer_domain::settings::MailerSettings;
use serde_json::Value;

use crate::error::InfraError;

/// 環境変数名
pub mod env_var {
    pub const ACCESS_KEY: &str = "NCLOUD_MAILER_ACCESS_KEY";
    pub const SECRET_KEY: &str = "NCLOUD_MAILER_SECRET_KEY";
    pub const SENDER_ADDRESS: &str = "NCLOUD_MAILER_SENDER_ADDRESS";
    pub const SENDER_NAME: &str = "NCLOUD_MAILER_SENDER_NAME";
    pub const REGION: &str = "NCLOUD_MAILER_REGION";
    pub const ENABLED: &str = "NCLOUD_MAILER_ENABLED";
}

/// 設定プロバイダトレイト
pub trait SettingsProvider: Send + Sync {
    /// 設定を読み込む
    fn load(&self) -> Result<MailerSettings, InfraError>;
}

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// 環境変数から設定を読み込むプロバイダ
#[derive(Clone)]
pub struct EnvSettingsProvider {
    lookup: Arc<Lookup>,
}

impl EnvSettingsProvider {
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の検索関数を使うプロバイダを作成する
    ///
    /// テストでプロセス環境を汚さずに値を差し込むために使う。
    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }
}

impl Default for EnvSettingsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EnvSettingsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSettingsProvider").finish_non_exhaustive()
    }
}

impl SettingsProvider for EnvSettingsProvider {
    fn load(&self) -> Result<MailerSettings, InfraError> {
        let defaults = MailerSettings::default();
        let settings = MailerSettings {
            access_key:     self.var(env_var::ACCESS_KEY).unwrap_or(defaults.access_key),
            secret_key:     self.var(env_var::SECRET_KEY).unwrap_or(defaults.secret_key),
            sender_address: self
                .var(env_var::SENDER_ADDRESS)
                .unwrap_or(defaults.sender_address),
            sender_name:    self.var(env_var::SENDER_NAME).unwrap_or(defaults.sender_name),
            region:         self.var(env_var::REGION).unwrap_or(defaults.region),
            enabled:        self
                .var(env_var::ENABLED)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
        };
        Ok(settings.sanitized())
    }
}

/// JSON ファイルから設定を読み込むプロバイダ
///
/// ファイルは `access_key` / `secret_key` / `sender_address` / `sender_name` /
/// `region` / `enabled` をキーに持つ JSON オブジェクト。
#[derive(Debug, Clone)]
pub struct JsonFileSettingsProvider {
    path: PathBuf,
}

impl JsonFileSettingsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsProvider for JsonFileSettingsProvider {
    #[tracing::instrument(skip_all, level = "debug", fields(path = %self.path.display()))]
    fn load(&self) -> Result<MailerSettings, InfraError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("設定ファイルがないため既定値を使用");
                return Ok(MailerSettings::default());
            }
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_str(&contents)?;
        if !value.is_object() {
            return Err(InfraError::settings(format!(
                "設定ファイルが JSON オブジェクトではありません: {}",
                self.path.display()
            )));
        }

        let settings: MailerSettings = serde_json::from_value(value)?;
        Ok(settings.sanitized())
    }
}
