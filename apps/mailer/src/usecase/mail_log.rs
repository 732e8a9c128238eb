//! # 送信ログ記録
//!
//! 送信結果を送信ログストアに 1 件ずつ記録する。
//!
//! ## 設計方針
//!
//! - **fire-and-forget**: ストアへの書き込みに失敗しても送信結果には影響させない（WARN ログのみ）
//! - **記録ポリシー**: [`MailHooks::logging_enabled`] が `false` を返した場合は記録しない
//! - **診断ログとは別**: ここで書くのはホスト向けの送信履歴。tracing の出力は運用者向け

use std::sync::Arc;

use outbound_mailer_domain::{
    clock::Clock,
    mail::MailRequest,
    mail_log::MailLogEntry,
    outcome::MailFailure,
};
use outbound_mailer_infra::{InfraError, MailHooks, MailLogStore};

/// 送信ログ記録
#[derive(Clone)]
pub struct MailLogRecorder {
    store: Arc<dyn MailLogStore>,
    hooks: Arc<dyn MailHooks>,
    clock: Arc<dyn Clock>,
}

impl MailLogRecorder {
    pub fn new(
        store: Arc<dyn MailLogStore>,
        hooks: Arc<dyn MailHooks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hooks,
            clock,
        }
    }

    /// 送信成功を記録する
    pub async fn record_success(&self, request: &MailRequest, request_id: &str) {
        let entry = MailLogEntry::success(
            self.clock.now(),
            request.to_addresses(),
            request.subject.clone(),
            request_id,
        );
        self.append(entry).await;
    }

    /// 送信失敗を記録する
    pub async fn record_failure(&self, request: &MailRequest, failure: &MailFailure) {
        let entry = MailLogEntry::error(
            self.clock.now(),
            request.to_addresses(),
            request.subject.clone(),
            failure,
        );
        self.append(entry).await;
    }

    /// 記録済みのエントリを新しい順に返す
    pub async fn newest_first(&self) -> Result<Vec<MailLogEntry>, InfraError> {
        let mut entries = self.store.read_all().await?;
        entries.reverse();
        Ok(entries)
    }

    /// 記録済みのエントリをすべて削除する
    pub async fn clear(&self) -> Result<(), InfraError> {
        self.store.clear().await
    }

    async fn append(&self, entry: MailLogEntry) {
        if !self.hooks.logging_enabled(true) {
            tracing::debug!("送信ログの記録が無効化されているためスキップ");
            return;
        }

        if let Err(e) = self.store.append(entry).await {
            tracing::warn!(error = %e, span_trace = %e.span_trace(), "送信ログの記録に失敗");
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use outbound_mailer_domain::{
        clock::FixedClock,
        mail::{Recipient, RecipientKind},
        mail_log::MailLogStatus,
    };
    use outbound_mailer_infra::{
        DefaultMailHooks,
        InMemoryMailLogStore,
        mock::RecordingMailHooks,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    const NOW_MILLIS: i64 = 1_700_000_000_000;

    fn request() -> MailRequest {
        MailRequest {
            to: vec![Recipient {
                address: "to@example.com".to_string(),
                name:    String::new(),
                kind:    RecipientKind::To,
            }],
            subject: "件名".to_string(),
            ..Default::default()
        }
    }

    fn recorder(
        store: Arc<dyn MailLogStore>,
        hooks: Arc<dyn MailHooks>,
    ) -> MailLogRecorder {
        MailLogRecorder::new(store, hooks, Arc::new(FixedClock::from_millis(NOW_MILLIS)))
    }

    #[tokio::test]
    async fn test_成功を記録する() {
        let store = Arc::new(InMemoryMailLogStore::new());
        let sut = recorder(store.clone(), Arc::new(DefaultMailHooks));

        sut.record_success(&request(), "abc123").await;

        let entries = store.read_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, MailLogStatus::Success);
        assert_eq!(entries[0].to, vec!["to@example.com".to_string()]);
        assert_eq!(entries[0].request_id.as_deref(), Some("abc123"));
        assert_eq!(entries[0].time.timestamp_millis(), NOW_MILLIS);
    }

    #[tokio::test]
    async fn test_失敗を記録する() {
        let store = Arc::new(InMemoryMailLogStore::new());
        let sut = recorder(store.clone(), Arc::new(DefaultMailHooks));

        sut.record_failure(&request(), &MailFailure::new("api_error", "x"))
            .await;

        let entries = store.read_all().await.unwrap();
        assert_eq!(entries[0].status, MailLogStatus::Error);
        assert_eq!(entries[0].error_code.as_deref(), Some("api_error"));
    }

    #[tokio::test]
    async fn test_ログ記録ポリシーがfalseなら記録しない() {
        let store = Arc::new(InMemoryMailLogStore::new());
        let hooks = RecordingMailHooks::new();
        hooks.set_logging(false);
        let sut = recorder(store.clone(), Arc::new(hooks));

        sut.record_success(&request(), "abc123").await;

        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ストアへの書き込みに失敗しても呼び出し元には伝播しない() {
        struct BrokenStore;

        #[async_trait]
        impl MailLogStore for BrokenStore {
            async fn append(&self, _entry: MailLogEntry) -> Result<(), InfraError> {
                Err(InfraError::unexpected("ディスクがいっぱい"))
            }

            async fn read_all(&self) -> Result<Vec<MailLogEntry>, InfraError> {
                Ok(Vec::new())
            }

            async fn clear(&self) -> Result<(), InfraError> {
                Ok(())
            }
        }

        let sut = recorder(Arc::new(BrokenStore), Arc::new(DefaultMailHooks));

        // panic せずに完了すること
        sut.record_success(&request(), "abc123").await;
    }

    #[tokio::test]
    async fn test_newest_firstは新しい順に返す() {
        let store = Arc::new(InMemoryMailLogStore::new());
        let sut = recorder(store.clone(), Arc::new(DefaultMailHooks));
        sut.record_success(&request(), "first").await;
        sut.record_success(&request(), "second").await;

        let entries = sut.newest_first().await.unwrap();

        let ids: Vec<_> = entries.iter().map(|e| e.request_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("second"), Some("first")]);
    }
}
