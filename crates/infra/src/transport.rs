//! # HTTP トランスポート
//!
//! MailApiClient が使う「ヘッダーとボディ付きの POST/GET をタイムアウト付きで実行する」
//! 能力を抽象化する。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `HttpTransport` trait で HTTP 呼び出しを抽象化し、
//!   テストではモック（[`crate::mock::MockHttpTransport`]）に差し替える
//! - **応答の解釈はしない**: ステータスコードとボディをそのまま返す。
//!   成功・失敗の判定は MailApiClient の責務
//! - **通信エラーは値で返す**: 応答を得られなかった場合は [`TransportError`]

use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use outbound_mailer_domain::{outcome::MailFailure, signature::HttpMethod};
use thiserror::Error;

use crate::error::InfraError;

/// HTTP リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method:  HttpMethod,
    pub url:     String,
    /// （ヘッダー名, 値）の一覧。送信順を保つ
    pub headers: Vec<(String, String)>,
    pub body:    Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// 指定した名前のヘッダー値を返す（大文字小文字を区別しない）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP 応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body:   String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// 通信エラー（HTTP 応答を得られなかった）
///
/// [`MailFailure`] に変換すると失敗コードは `http_request_failed` になる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<TransportError> for MailFailure {
    fn from(err: TransportError) -> Self {
        MailFailure::transport(err.message)
    }
}

/// HTTP トランスポートトレイト
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// リクエストを実行する
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// JSON ボディ付きの POST を実行する
    async fn post(
        &self,
        url: &str,
        headers: Vec<(String, String)>,
        body: String,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.execute(HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers,
            body: Some(body),
            timeout,
        })
        .await
    }

    /// GET を実行する
    async fn get(
        &self,
        url: &str,
        headers: Vec<(String, String)>,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.execute(HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers,
            body: None,
            timeout,
        })
        .await
    }
}

/// reqwest による HTTP トランスポート
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// 新しいトランスポートを作成する
    ///
    /// タイムアウトはリクエストごとに指定するため、クライアント全体には設定しない。
    pub fn new() -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("outbound-mailer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[tracing::instrument(skip_all, level = "debug", fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        }
        .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(describe)?;
        let status = response.status();
        let body = response.text().await.map_err(describe)?;

        tracing::debug!(status = status.as_u16(), "HTTP 応答を受信");
        Ok(HttpResponse { status, body })
    }
}

/// reqwest のエラーを通信エラーに変換する
fn describe(err: reqwest::Error) -> TransportError {
    let message = if err.is_timeout() {
        format!("リクエストがタイムアウトしました: {err}")
    } else if err.is_connect() {
        format!("接続に失敗しました: {err}")
    } else {
        format!("HTTP リクエストに失敗しました: {err}")
    };
    TransportError::new(message)
}
