//! # Outbound Mailer CLI
//!
//! 設定の確認・テスト送信・送信ログの確認を行う運用ツール。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NCLOUD_MAILER_ACCESS_KEY` | No | API アクセスキー |
//! | `NCLOUD_MAILER_SECRET_KEY` | No | API シークレットキー |
//! | `NCLOUD_MAILER_SENDER_ADDRESS` | No | 既定の送信元アドレス |
//! | `NCLOUD_MAILER_SENDER_NAME` | No | 既定の送信者名 |
//! | `NCLOUD_MAILER_REGION` | No | `KR` / `SGN` / `JPN`（デフォルト: `KR`） |
//! | `NCLOUD_MAILER_ENABLED` | No | `true` で有効化 |
//! | `MAILER_SETTINGS_FILE` | No | 上記の代わりに読む設定 JSON ファイル |
//! | `MAILER_LOG_FILE` | No | 送信ログ JSON ファイル |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログレベル（デフォルト: `info,outbound_mailer=debug`） |
//!
//! ## 使用例
//!
//! ```bash
//! outbound-mailer test-connection
//! outbound-mailer send-test --to you@example.com --site "My Site"
//! outbound-mailer logs --json
//! ```

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use outbound_mailer::{
    DispatchInterceptor,
    cli::{Cli, CommandStatus, execute},
    config::MailerConfig,
};
use outbound_mailer_infra::{DefaultMailHooks, MailApiClient, ReqwestTransport};
use outbound_mailer_shared::observability::TracingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("outbound-mailer");
    outbound_mailer_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "outbound-mailer").entered();

    let config = MailerConfig::from_env();
    tracing::debug!(?config, "設定を読み込みました");

    let client = MailApiClient::new(
        config.settings_provider(),
        Arc::new(ReqwestTransport::new()?),
        Arc::new(DefaultMailHooks),
    )?;
    tracing::debug!(settings = ?client.settings(), enabled = client.is_enabled(), "メーラー設定");
    let mut interceptor = DispatchInterceptor::new(client, config.log_store());

    let mut stdout = std::io::stdout().lock();
    let status = execute(cli.command, &mut interceptor, &mut stdout).await?;

    Ok(match status {
        CommandStatus::Succeeded => ExitCode::SUCCESS,
        CommandStatus::Failed => ExitCode::FAILURE,
    })
}
