//! # 通知・ポリシーフック
//!
//! ホストが送信処理をカスタマイズ・観測するための差し込み口。
//! グローバルなフック登録ではなく、構築時に [`MailHooks`] の実装を渡す。
//!
//! | フック | 呼び出し元 | 役割 |
//! |-------|-----------|------|
//! | [`before_send`](MailHooks::before_send) | MailApiClient | 署名前に送信ボディを書き換える（1 回だけ適用） |
//! | [`after_send`](MailHooks::after_send) | MailApiClient | 送信成功の通知 |
//! | [`on_error`](MailHooks::on_error) | MailApiClient | 送信失敗の通知 |
//! | [`fallback_on_error`](MailHooks::fallback_on_error) | DispatchInterceptor | 失敗時にホストの既定トランスポートへ委ねるか |
//! | [`logging_enabled`](MailHooks::logging_enabled) | DispatchInterceptor | 送信ログを記録するか |
//!
//! 通知系フックは戻り値を持たず、送信結果を変えることはできない。

use outbound_mailer_domain::{mail::MailRequest, outcome::MailFailure};
use serde_json::Value;

/// 送信処理のフック
///
/// すべてのメソッドに既定の実装があり、必要なものだけを上書きすればよい。
pub trait MailHooks: Send + Sync {
    /// 送信ボディを加工する
    fn before_send(&self, body: Value, _request: &MailRequest) -> Value {
        body
    }

    /// 送信成功を通知する（`response` はデコード済みの API 応答）
    fn after_send(&self, _response: &Value, _request: &MailRequest) {}

    /// 送信失敗を通知する
    fn on_error(&self, _failure: &MailFailure, _request: &MailRequest) {}

    /// 失敗時にフォールバックするかを決める
    fn fallback_on_error(
        &self,
        default: bool,
        _failure: &MailFailure,
        _request: &MailRequest,
    ) -> bool {
        default
    }

    /// 送信ログを記録するかを決める
    fn logging_enabled(&self, default: bool) -> bool {
        default
    }
}

/// 何も変更しないフック
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMailHooks;

impl MailHooks for DefaultMailHooks {}
