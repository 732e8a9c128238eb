//! # テスト用モック
//!
//! MailApiClient と DispatchInterceptor のテストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! outbound-mailer-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use http::StatusCode;
use outbound_mailer_domain::{mail::MailRequest, outcome::MailFailure, settings::MailerSettings};
use serde_json::Value;

use crate::{
    error::InfraError,
    hooks::MailHooks,
    settings::SettingsProvider,
    transport::{HttpRequest, HttpResponse, HttpTransport, TransportError},
};

// ===== MockHttpTransport =====

/// 応答を台本どおりに返し、受け取ったリクエストを記録するトランスポート
///
/// 台本が尽きた場合は通信エラーを返す。
#[derive(Clone, Default)]
pub struct MockHttpTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests:  Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockHttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次に返す応答を追加する
    pub fn push_response(&self, status: StatusCode, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    /// 次に返す通信エラーを追加する
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// 受け取ったリクエストの一覧
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("モックの応答が設定されていません")))
    }
}

// ===== StaticSettingsProvider =====

/// 固定値を返す設定プロバイダ
///
/// [`set`](Self::set) で外部ストアの書き換えを模擬できる。クローンは同じ値を共有する。
#[derive(Clone, Default)]
pub struct StaticSettingsProvider {
    settings: Arc<Mutex<MailerSettings>>,
}

impl StaticSettingsProvider {
    pub fn new(settings: MailerSettings) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
        }
    }

    pub fn set(&self, settings: MailerSettings) {
        *self.settings.lock().unwrap() = settings;
    }
}

impl SettingsProvider for StaticSettingsProvider {
    fn load(&self) -> Result<MailerSettings, InfraError> {
        Ok(self.settings.lock().unwrap().clone().sanitized())
    }
}

// ===== RecordingMailHooks =====

/// 通知を記録し、ポリシーの戻り値を設定できるフック
#[derive(Default)]
pub struct RecordingMailHooks {
    after_send:   Mutex<Vec<Value>>,
    errors:       Mutex<Vec<MailFailure>>,
    fallback:     Mutex<Option<bool>>,
    logging:      Mutex<Option<bool>>,
    body_patches: Mutex<Vec<(String, Value)>>,
}

impl RecordingMailHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// `fallback_on_error` の戻り値を固定する
    pub fn set_fallback(&self, fallback: bool) {
        *self.fallback.lock().unwrap() = Some(fallback);
    }

    /// `logging_enabled` の戻り値を固定する
    pub fn set_logging(&self, enabled: bool) {
        *self.logging.lock().unwrap() = Some(enabled);
    }

    /// `before_send` で送信ボディのキーを上書きする
    pub fn patch_body(&self, key: &str, value: Value) {
        self.body_patches
            .lock()
            .unwrap()
            .push((key.to_string(), value));
    }

    pub fn after_send_calls(&self) -> Vec<Value> {
        self.after_send.lock().unwrap().clone()
    }

    pub fn error_calls(&self) -> Vec<MailFailure> {
        self.errors.lock().unwrap().clone()
    }
}

impl MailHooks for RecordingMailHooks {
    fn before_send(&self, mut body: Value, _request: &MailRequest) -> Value {
        for (key, value) in self.body_patches.lock().unwrap().iter() {
            body[key.as_str()] = value.clone();
        }
        body
    }

    fn after_send(&self, response: &Value, _request: &MailRequest) {
        self.after_send.lock().unwrap().push(response.clone());
    }

    fn on_error(&self, failure: &MailFailure, _request: &MailRequest) {
        self.errors.lock().unwrap().push(failure.clone());
    }

    fn fallback_on_error(
        &self,
        default: bool,
        _failure: &MailFailure,
        _request: &MailRequest,
    ) -> bool {
        self.fallback.lock().unwrap().unwrap_or(default)
    }

    fn logging_enabled(&self, default: bool) -> bool {
        self.logging.lock().unwrap().unwrap_or(default)
    }
}
