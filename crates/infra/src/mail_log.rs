//! # 送信ログストア
//!
//! 送信ログ（[`MailLogEntry`]）を直近の一定件数だけ保持するストア。
//!
//! ## 設計方針
//!
//! - **追記と切り詰めは 1 つのクリティカルセクション**: 並行する送信から同時に
//!   追記されても、保持件数の範囲内でエントリを失わない
//! - **古い順に返す**: [`MailLogStore::read_all`] は古い順。新しい順に並べるのは表示側の責務
//!
//! ## 実装
//!
//! - [`InMemoryMailLogStore`] - プロセス内のリングバッファ
//! - [`JsonFileMailLogStore`] - JSON 配列ファイル（一時ファイルに書いてからリネーム）

use std::{
    collections::VecDeque,
    path::PathBuf,
};

use async_trait::async_trait;
use outbound_mailer_domain::mail_log::{MAIL_LOG_CAPACITY, MailLogEntry};
use tokio::sync::Mutex;

use crate::error::InfraError;

/// 送信ログストアトレイト
#[async_trait]
pub trait MailLogStore: Send + Sync {
    /// エントリを追記し、保持件数を超えた分を古い順に捨てる
    async fn append(&self, entry: MailLogEntry) -> Result<(), InfraError>;

    /// すべてのエントリを古い順に返す
    async fn read_all(&self) -> Result<Vec<MailLogEntry>, InfraError>;

    /// すべてのエントリを削除する
    async fn clear(&self) -> Result<(), InfraError>;
}

/// インメモリの送信ログストア
#[derive(Debug)]
pub struct InMemoryMailLogStore {
    entries:  Mutex<VecDeque<MailLogEntry>>,
    capacity: usize,
}

impl InMemoryMailLogStore {
    pub fn new() -> Self {
        Self::with_capacity(MAIL_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }
}

impl Default for InMemoryMailLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailLogStore for InMemoryMailLogStore {
    async fn append(&self, entry: MailLogEntry) -> Result<(), InfraError> {
        let mut entries = self.entries.lock().await;
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<MailLogEntry>, InfraError> {
        Ok(self.entries.lock().await.iter().cloned().collect())
    }

    async fn clear(&self) -> Result<(), InfraError> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

/// JSON ファイルの送信ログストア
///
/// ファイルが存在しない場合は空として扱う。同一インスタンス内の
/// 読み込み・書き込みは非同期ミューテックスで直列化する。
#[derive(Debug)]
pub struct JsonFileMailLogStore {
    path:     PathBuf,
    capacity: usize,
    lock:     Mutex<()>,
}

impl JsonFileMailLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(path, MAIL_LOG_CAPACITY)
    }

    pub fn with_capacity(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<MailLogEntry>, InfraError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, entries: &[MailLogEntry]) -> Result<(), InfraError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl MailLogStore for JsonFileMailLogStore {
    #[tracing::instrument(skip_all, level = "debug", fields(path = %self.path.display()))]
    async fn append(&self, entry: MailLogEntry) -> Result<(), InfraError> {
        let _guard = self.lock.lock().await;

        let mut entries = self.load().await?;
        entries.push(entry);
        let overflow = entries.len().saturating_sub(self.capacity);
        entries.drain(..overflow);

        self.store(&entries).await
    }

    async fn read_all(&self) -> Result<Vec<MailLogEntry>, InfraError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn clear(&self) -> Result<(), InfraError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
