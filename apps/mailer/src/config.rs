//! # アプリケーション設定
//!
//! 環境変数からストアの選択を読み込み、設定プロバイダと送信ログストアを組み立てる。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `MAILER_SETTINGS_FILE` | No | 設定 JSON ファイル。未設定なら `NCLOUD_MAILER_*` 環境変数から読む |
//! | `MAILER_LOG_FILE` | No | 送信ログ JSON ファイル。未設定ならプロセス内に保持する |
//!
//! ログ出力形式（`LOG_FORMAT`）とレベル（`RUST_LOG`）は
//! [`outbound_mailer_shared::observability`] が読む。

use std::{env, path::PathBuf, sync::Arc};

use outbound_mailer_infra::{
    EnvSettingsProvider,
    InMemoryMailLogStore,
    JsonFileMailLogStore,
    JsonFileSettingsProvider,
    MailLogStore,
    SettingsProvider,
};

const SETTINGS_FILE_VAR: &str = "MAILER_SETTINGS_FILE";
const LOG_FILE_VAR: &str = "MAILER_LOG_FILE";

/// アプリケーション設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailerConfig {
    /// 設定 JSON ファイルのパス
    pub settings_file: Option<PathBuf>,
    /// 送信ログ JSON ファイルのパス
    pub log_file:      Option<PathBuf>,
}

impl MailerConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の検索関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            settings_file: path(SETTINGS_FILE_VAR),
            log_file:      path(LOG_FILE_VAR),
        }
    }

    /// 設定プロバイダを組み立てる
    pub fn settings_provider(&self) -> Arc<dyn SettingsProvider> {
        match &self.settings_file {
            Some(path) => Arc::new(JsonFileSettingsProvider::new(path)),
            None => Arc::new(EnvSettingsProvider::new()),
        }
    }

    /// 送信ログストアを組み立てる
    pub fn log_store(&self) -> Arc<dyn MailLogStore> {
        match &self.log_file {
            Some(path) => Arc::new(JsonFileMailLogStore::new(path)),
            None => Arc::new(InMemoryMailLogStore::new()),
        }
    }
}
