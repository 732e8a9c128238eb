//! # MailApiClient
//!
//! 署名付きの HTTP 呼び出しでクラウドメール API にメールを送信し、
//! 応答を [`DispatchOutcome`] に解釈する。
//!
//! ## 設計方針
//!
//! - **設定はスナップショット**: 構築時に読み込んだ設定を保持し、変更の購読はしない。
//!   外部で設定が変わりうる場合は操作の前に [`MailApiClient::refresh_settings`] を呼ぶ
//! - **単一のゲート**: 送信は必ず [`MailApiClient::is_enabled`] を通り、
//!   満たさない場合はネットワークに触れずに [`DispatchOutcome::NotConfigured`] を返す
//! - **失敗は値で返す**: 通信エラーも API の拒否も [`MailFailure`] として返し、panic しない
//! - **リトライしない**: 1 回の呼び出しにつき HTTP 呼び出しは高々 1 回
//!
//! ## ワイヤプロトコル
//!
//! | 操作 | メソッド | URL | 署名対象 URI | タイムアウト |
//! |------|---------|-----|-------------|-------------|
//! | 送信 | POST | `{endpoint}/mails` | `/api/v1/mails` | 30 秒 |
//! | 接続テスト | GET | `{endpoint}/mails?pageSize=1` | `/api/v1/mails?pageSize=1` | 15 秒 |

use std::{sync::Arc, time::Duration};

use http::StatusCode;
use outbound_mailer_domain::{
    clock::{Clock, SystemClock},
    mail::{MailRequest, Recipient},
    outcome::{ConnectionCheck, DispatchOutcome, MailFailure, error_code, error_message},
    settings::MailerSettings,
    signature::{HttpMethod, SignedRequest, timestamp_millis},
};
use serde_json::{Value, json};

use crate::{
    error::InfraError,
    hooks::MailHooks,
    settings::SettingsProvider,
    transport::{HttpResponse, HttpTransport},
};

/// 送信の署名対象 URI
pub const SEND_URI: &str = "/api/v1/mails";
/// 接続テストの署名対象 URI
///
/// クエリ文字列も署名に含める。クエリを含めずに署名すると API が認証を拒否する。
pub const PROBE_URI: &str = "/api/v1/mails?pageSize=1";
/// 送信のタイムアウト
pub const SEND_TIMEOUT: Duration = Duration::from_secs(30);
/// 接続テストのタイムアウト
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// クラウドメール API クライアント
pub struct MailApiClient {
    settings_provider: Arc<dyn SettingsProvider>,
    transport:         Arc<dyn HttpTransport>,
    hooks:             Arc<dyn MailHooks>,
    clock:             Arc<dyn Clock>,
    settings:          MailerSettings,
}

impl MailApiClient {
    /// 新しいクライアントを作成する
    ///
    /// 設定プロバイダから現在の設定を読み込んでスナップショットとして保持する。
    pub fn new(
        settings_provider: Arc<dyn SettingsProvider>,
        transport: Arc<dyn HttpTransport>,
        hooks: Arc<dyn MailHooks>,
    ) -> Result<Self, InfraError> {
        let settings = load_settings(settings_provider.as_ref())?;
        Ok(Self {
            settings_provider,
            transport,
            hooks,
            clock: Arc::new(SystemClock),
            settings,
        })
    }

    /// 時刻プロバイダを差し替える
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 設定を読み直してスナップショットを置き換える
    ///
    /// 読み込みに失敗した場合は既存のスナップショットを保持したままエラーを返す。
    pub fn refresh_settings(&mut self) -> Result<(), InfraError> {
        self.settings = load_settings(self.settings_provider.as_ref())?;
        Ok(())
    }

    /// 現在の設定スナップショット
    pub fn settings(&self) -> &MailerSettings {
        &self.settings
    }

    pub fn hooks(&self) -> &Arc<dyn MailHooks> {
        &self.hooks
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// 送信可能な状態かどうか
    pub fn is_enabled(&self) -> bool {
        self.settings.is_enabled()
    }

    /// 設定されたリージョンのエンドポイント（未知のリージョンは KR）
    pub fn endpoint(&self) -> &'static str {
        self.settings.endpoint()
    }

    /// 設定された送信元アドレス（未設定なら空）
    pub fn sender_address(&self) -> &str {
        &self.settings.sender_address
    }

    /// 設定された送信者名（未設定なら空）
    pub fn sender_name(&self) -> &str {
        &self.settings.sender_name
    }

    /// 送信ボディを組み立てる
    ///
    /// 送信者はリクエストの From で上書きされていればそれを、
    /// 空であれば設定値を使う（アドレスと名前はそれぞれ独立に補完する）。
    pub fn build_body(&self, request: &MailRequest) -> Value {
        let sender_address = non_empty_or(&request.from.address, self.sender_address());
        let sender_name = non_empty_or(&request.from.name, self.sender_name());
        let recipients: Vec<Value> = request.recipients().map(recipient_json).collect();

        json!({
            "senderAddress": sender_address,
            "senderName": sender_name,
            "title": request.subject,
            "body": request.body,
            "individual": true,
            "advertising": false,
            "recipients": recipients,
        })
    }

    /// メールを送信する
    #[tracing::instrument(skip_all, level = "debug", fields(recipients = request.to.len()))]
    pub async fn send_mail(&self, request: &MailRequest) -> DispatchOutcome {
        if !self.is_enabled() {
            tracing::debug!("メーラーが未設定のため送信しない");
            return DispatchOutcome::NotConfigured;
        }

        let body = self.hooks.before_send(self.build_body(request), request);
        let signed = SignedRequest::sign(
            HttpMethod::Post,
            SEND_URI,
            timestamp_millis(self.clock.now()),
            &self.settings.credentials(),
        );
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(signed.auth_headers());
        let url = format!("{}/mails", self.endpoint());

        let outcome = match self
            .transport
            .post(&url, headers, body.to_string(), SEND_TIMEOUT)
            .await
        {
            Ok(response) => interpret_send_response(response),
            Err(e) => DispatchOutcome::Failed(MailFailure::from(e)),
        };

        match &outcome {
            DispatchOutcome::Sent {
                request_id,
                response,
            } => {
                tracing::debug!(%request_id, "API が送信要求を受け付けた");
                self.hooks.after_send(response, request);
            }
            DispatchOutcome::Failed(failure) => {
                tracing::debug!(code = %failure.code, message = %failure.message, "送信に失敗");
                self.hooks.on_error(failure, request);
            }
            DispatchOutcome::NotConfigured => {}
        }

        outcome
    }

    /// API への接続をテストする
    ///
    /// メールは送信しない。送信元アドレスは要求せず、認証情報だけを確認する。
    #[tracing::instrument(skip_all, level = "debug")]
    pub async fn test_connection(&self) -> Result<ConnectionCheck, MailFailure> {
        if !self.settings.has_credentials() {
            return Err(MailFailure::missing_credentials());
        }

        let signed = SignedRequest::sign(
            HttpMethod::Get,
            PROBE_URI,
            timestamp_millis(self.clock.now()),
            &self.settings.credentials(),
        );
        let url = format!("{}/mails?pageSize=1", self.endpoint());

        let response = self
            .transport
            .get(&url, signed.auth_headers(), PROBE_TIMEOUT)
            .await
            .map_err(MailFailure::from)?;

        if response.status == StatusCode::OK {
            return Ok(ConnectionCheck {
                message: error_message::CONNECTION_SUCCEEDED.to_string(),
            });
        }

        let body = serde_json::from_str::<Value>(&response.body).ok();
        let failure = MailFailure::from_api_error(body, error_message::CONNECTION_FAILED);
        // 接続テストでは API のエラーコードを使わず常に api_error とする
        Err(MailFailure {
            code: error_code::API_ERROR.to_string(),
            ..failure
        })
    }
}

fn load_settings(provider: &dyn SettingsProvider) -> Result<MailerSettings, InfraError> {
    let settings = provider.load()?;
    if let Err(e) = settings.validate() {
        tracing::warn!(error = %e, "設定値に問題があります");
    }
    Ok(settings)
}

fn interpret_send_response(response: HttpResponse) -> DispatchOutcome {
    let body = serde_json::from_str::<Value>(&response.body).ok();

    if response.status == StatusCode::OK || response.status == StatusCode::CREATED {
        let request_id = body
            .as_ref()
            .and_then(|v| v.get("requestId"))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        return DispatchOutcome::Sent {
            request_id,
            response: body.unwrap_or(Value::Null),
        };
    }

    DispatchOutcome::Failed(MailFailure::from_api_error(body, error_message::UNKNOWN))
}

fn recipient_json(recipient: &Recipient) -> Value {
    json!({
        "address": recipient.address,
        "name": recipient.name,
        "type": recipient.kind.wire_tag(),
    })
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
