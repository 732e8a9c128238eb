//! # 運用 CLI
//!
//! 接続テスト・テストメール送信・送信ログの確認を行うコマンド群。
//!
//! | コマンド | 内容 |
//! |---------|------|
//! | `test-connection` | 設定を読み直して API への接続をテストする（メールは送らない） |
//! | `send-test --to <address>` | インターセプタ経由でテストメールを送る |
//! | `send --to <list> --subject <s> --message <m> [--header <line>]...` | 任意のメールをインターセプタ経由で送る |
//! | `logs [--json]` | 送信ログを新しい順に表示する |
//! | `logs clear` | 送信ログを削除する |
//!
//! 結果は stdout に書く。診断ログは stderr に出る。

use std::io::Write;

use clap::{Parser, Subcommand};
use outbound_mailer_domain::{
    mail::{AddressInput, HeaderInput, RawMailRequest},
    mail_log::MailLogEntry,
    settings::is_address_shaped,
};
use outbound_mailer_shared::{event_log::event, log_business_event};

use crate::{error::MailerError, usecase::DispatchInterceptor};

/// Outbound Mailer 運用 CLI
#[derive(Debug, Parser)]
#[command(name = "outbound-mailer", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// API への接続をテストする
    TestConnection,
    /// テストメールを送信する
    SendTest {
        /// 宛先メールアドレス
        #[arg(long)]
        to:   String,
        /// 件名・本文に入れるサイト名
        #[arg(long, default_value = "outbound-mailer")]
        site: String,
    },
    /// メールを送信する
    Send {
        /// 宛先（カンマ区切り）
        #[arg(long)]
        to:      String,
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        message: String,
        /// 追加ヘッダー（`Name: value`、複数指定可）
        #[arg(long = "header")]
        headers: Vec<String>,
    },
    /// 送信ログを表示する
    Logs {
        /// JSON で出力する
        #[arg(long)]
        json:   bool,
        #[command(subcommand)]
        action: Option<LogsAction>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum LogsAction {
    /// 送信ログを削除する
    Clear,
}

/// コマンドの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Succeeded,
    Failed,
}

/// コマンドを実行する
pub async fn execute(
    command: Command,
    interceptor: &mut DispatchInterceptor,
    out: &mut dyn Write,
) -> Result<CommandStatus, MailerError> {
    match command {
        Command::TestConnection => test_connection(interceptor, out).await,
        Command::SendTest { to, site } => {
            if !is_address_shaped(to.trim()) {
                return Err(MailerError::InvalidAddress(to));
            }
            let request = test_mail(&to, &site, interceptor);
            dispatch(interceptor, &request, out).await
        }
        Command::Send {
            to,
            subject,
            message,
            headers,
        } => {
            let request = RawMailRequest {
                to: AddressInput::from(to.as_str()),
                subject,
                message,
                headers: HeaderInput::from(headers),
            };
            dispatch(interceptor, &request, out).await
        }
        Command::Logs { action: Some(LogsAction::Clear), .. } => {
            interceptor.recorder().clear().await?;
            writeln!(out, "送信ログを削除しました")?;
            Ok(CommandStatus::Succeeded)
        }
        Command::Logs { json, action: None } => {
            let entries = interceptor.recorder().newest_first().await?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
            } else if entries.is_empty() {
                writeln!(out, "送信ログはありません")?;
            } else {
                for entry in &entries {
                    writeln!(out, "{}", format_entry(entry))?;
                }
            }
            Ok(CommandStatus::Succeeded)
        }
    }
}

async fn test_connection(
    interceptor: &mut DispatchInterceptor,
    out: &mut dyn Write,
) -> Result<CommandStatus, MailerError> {
    interceptor.refresh_settings()?;

    match interceptor.client().test_connection().await {
        Ok(check) => {
            log_business_event!(
                event.category = event::category::MAIL,
                event.action = event::action::CONNECTION_TESTED,
                event.result = event::result::SUCCESS,
                "接続テスト成功"
            );
            writeln!(out, "{}", check.message)?;
            Ok(CommandStatus::Succeeded)
        }
        Err(failure) => {
            log_business_event!(
                event.category = event::category::MAIL,
                event.action = event::action::CONNECTION_TESTED,
                event.result = event::result::FAILURE,
                error.code = %failure.code,
                "接続テスト失敗"
            );
            writeln!(out, "接続テストに失敗しました: {}", failure.message)?;
            Ok(CommandStatus::Failed)
        }
    }
}

async fn dispatch(
    interceptor: &mut DispatchInterceptor,
    request: &RawMailRequest,
    out: &mut dyn Write,
) -> Result<CommandStatus, MailerError> {
    interceptor.refresh_settings()?;

    match interceptor.intercept(None, request).await {
        Some(true) => {
            writeln!(out, "メールを送信しました")?;
            Ok(CommandStatus::Succeeded)
        }
        Some(false) => {
            writeln!(
                out,
                "メールの送信に失敗しました。詳細は送信ログを確認してください"
            )?;
            Ok(CommandStatus::Failed)
        }
        None => {
            writeln!(
                out,
                "メーラーが無効なため送信しませんでした（既定のトランスポートに委ねられます）"
            )?;
            Ok(CommandStatus::Failed)
        }
    }
}

/// テストメールを組み立てる
fn test_mail(to: &str, site: &str, interceptor: &DispatchInterceptor) -> RawMailRequest {
    let sent_at = interceptor
        .client()
        .clock()
        .now()
        .format("%Y-%m-%d %H:%M:%S UTC");

    RawMailRequest {
        to:      AddressInput::from(to.trim()),
        subject: format!("[Test] Outbound Mailer test from {site}"),
        message: format!(
            "This is a test email from {site}.\n\nSent at: {sent_at}\n\n\
             If you received this email, your Outbound Mailer configuration is working correctly!"
        ),
        headers: HeaderInput::default(),
    }
}

/// 送信ログの 1 行表示
fn format_entry(entry: &MailLogEntry) -> String {
    let detail = if entry.is_success() {
        format!("request_id={}", entry.request_id.as_deref().unwrap_or("-"))
    } else {
        format!(
            "{}: {}",
            entry.error_code.as_deref().unwrap_or("-"),
            entry.error_message.as_deref().unwrap_or("")
        )
    };

    format!(
        "{}  {:<7}  {}  {}  {}",
        entry.time.format("%Y-%m-%d %H:%M:%S"),
        entry.status,
        entry.to.join(", "),
        entry.subject,
        detail
    )
}
