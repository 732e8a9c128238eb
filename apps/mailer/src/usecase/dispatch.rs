//! # DispatchInterceptor
//!
//! ホストの「メール送信」呼び出しを受け取り、クラウドメール API 経由で送信するかを決める。
//!
//! ## ホストへの戻り値
//!
//! | 戻り値 | 意味 |
//! |-------|------|
//! | `None` | 処理しない。ホストの既定トランスポートに委ねる |
//! | `Some(true)` | 送信した |
//! | `Some(false)` | 送信に失敗した（詳細は送信ログにのみ残る） |
//!
//! ## 判定の流れ
//!
//! 1. 既に結果がある（他のハンドラが処理済み）→ そのまま返す
//! 2. メーラーが無効 → `None`
//! 3. 入力を正規化して送信
//! 4. 失敗 → 送信ログに記録してからフォールバックポリシーを確認し、`None` または `Some(false)`
//! 5. 成功 → 送信ログに記録して `Some(true)`
//!
//! 失敗は必ずフォールバック判定の前に記録する。ポリシーが失敗をホストから隠す場合でも
//! 送信ログには残る。

use std::sync::Arc;

use outbound_mailer_domain::{
    address::parse_mail_request,
    mail::{MailRequest, RawMailRequest},
    outcome::{DispatchOutcome, MailFailure},
};
use outbound_mailer_infra::{InfraError, MailApiClient, MailLogStore};
use outbound_mailer_shared::{event_log::event, log_business_event};

use super::MailLogRecorder;

/// DispatchInterceptor
pub struct DispatchInterceptor {
    client:   MailApiClient,
    recorder: MailLogRecorder,
}

impl DispatchInterceptor {
    /// 新しいインターセプタを作成する
    ///
    /// フックと時刻プロバイダはクライアントと共有する。
    pub fn new(client: MailApiClient, log_store: Arc<dyn MailLogStore>) -> Self {
        let recorder = MailLogRecorder::new(
            log_store,
            client.hooks().clone(),
            client.clock().clone(),
        );
        Self { client, recorder }
    }

    pub fn client(&self) -> &MailApiClient {
        &self.client
    }

    pub fn recorder(&self) -> &MailLogRecorder {
        &self.recorder
    }

    /// 外部の設定ストアを読み直す
    pub fn refresh_settings(&mut self) -> Result<(), InfraError> {
        self.client.refresh_settings()
    }

    /// ホストのメール送信呼び出しを処理する
    #[tracing::instrument(skip_all, level = "debug", fields(short_circuited = existing.is_some()))]
    pub async fn intercept(&self, existing: Option<bool>, raw: &RawMailRequest) -> Option<bool> {
        if existing.is_some() {
            return existing;
        }

        if !self.client.is_enabled() {
            tracing::debug!("メーラーが無効のため既定のトランスポートに委ねる");
            return None;
        }

        let request = parse_mail_request(raw);

        match self.client.send_mail(&request).await {
            DispatchOutcome::Sent { request_id, .. } => {
                self.recorder.record_success(&request, &request_id).await;
                log_business_event!(
                    event.category = event::category::MAIL,
                    event.action = event::action::MAIL_SENT,
                    event.result = event::result::SUCCESS,
                    mail.request_id = %request_id,
                    mail.recipients = request.to.len(),
                    "メール送信成功"
                );
                Some(true)
            }
            DispatchOutcome::Failed(failure) => self.handle_failure(&request, &failure).await,
            // is_enabled を確認済みのため通常は到達しない
            DispatchOutcome::NotConfigured => None,
        }
    }

    async fn handle_failure(&self, request: &MailRequest, failure: &MailFailure) -> Option<bool> {
        self.recorder.record_failure(request, failure).await;
        tracing::warn!(
            error.code = %failure.code,
            error.message = %failure.message,
            mail.to = ?request.to_addresses(),
            mail.subject = %request.subject,
            "メール送信に失敗"
        );

        let fallback = self
            .client
            .hooks()
            .fallback_on_error(false, failure, request);

        if fallback {
            log_business_event!(
                event.category = event::category::MAIL,
                event.action = event::action::MAIL_DEFERRED,
                event.result = event::result::FAILURE,
                error.code = %failure.code,
                "送信失敗のため既定のトランスポートに委ねる"
            );
            return None;
        }

        log_business_event!(
            event.category = event::category::MAIL,
            event.action = event::action::MAIL_FAILED,
            event.result = event::result::FAILURE,
            error.code = %failure.code,
            "メール送信失敗"
        );
        Some(false)
    }
}
