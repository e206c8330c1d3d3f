//! # Notification API サーバー
//!
//! 他サービスからのメール送信依頼を受け付け、SMTP リレーへ中継する内部サービス。
//!
//! ## 役割
//!
//! - **受付**: `POST /api/v1/notifications/email` で送信依頼を受け、即座に 202 を返す
//! - **流量制限**: 一定時間あたりの受付数を制限し、超過分は 429 で断る
//! - **配信**: SMTP 送信はワーカープールで非同期に行い、失敗はログに残すだけにする
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │  他サービス  │────▶│ Notification API │────▶│ SMTP リレー  │
//! └──────────────┘     │   port: 8080     │     │ (Mailpit 等) │
//!                      └──────────────────┘     └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `API_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `API_PORT` | No | ポート番号（デフォルト: `8080`） |
//! | `NOTIFICATION_BACKEND` | No | `smtp` または `noop`（デフォルト: `smtp`） |
//! | `SMTP_HOST` | No | SMTP ホスト（デフォルト: `localhost`） |
//! | `SMTP_PORT` | No | SMTP ポート（デフォルト: `1025`） |
//! | `NOTIFICATION_FROM_ADDRESS` | No | 送信元アドレス |
//! | `MAIL_WORKER_CONCURRENCY` | No | SMTP 送信の同時実行数（デフォルト: `8`） |
//! | `RATE_LIMIT_EMAIL_LIMIT_FOR_PERIOD` | No | ウィンドウあたりの受付数（デフォルト: `10`） |
//! | `RATE_LIMIT_EMAIL_REFRESH_PERIOD_MS` | No | ウィンドウ長（デフォルト: `1000`） |
//! | `RATE_LIMIT_EMAIL_TIMEOUT_MS` | No | 次のウィンドウを待つ最大時間（デフォルト: `0`） |
//! | `LOG_FORMAT` | No | `json` または `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Mailpit に送信）
//! cargo run -p notiflow-api
//!
//! # 送信せずにログだけ確認
//! NOTIFICATION_BACKEND=noop cargo run -p notiflow-api
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use notiflow_api::{
    app_builder::build_app,
    config::{ApiConfig, NotificationBackend},
};
use notiflow_infra::notification::{
    DeliveryExecutor,
    NoopNotificationSender,
    NotificationSender,
    SmtpNotificationSender,
};
use notiflow_shared::{
    observability::{TracingConfig, init_tracing},
    rate_limit::{FixedWindowRateLimiter, RateLimiter},
};
use tokio::net::TcpListener;
use tracing::Instrument;

/// Notification API サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(TracingConfig::from_env("notification-api"));

    // 以降のログにはすべて span.service が付く
    run()
        .instrument(tracing::info_span!("app", service = "notification-api"))
        .await
}

async fn run() -> anyhow::Result<()> {
    // 設定読み込み
    let config = ApiConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Notification API サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // 送信ポートの初期化
    let executor = DeliveryExecutor::new(config.notification.worker_concurrency);
    let sender: Arc<dyn NotificationSender> = match config.notification.backend {
        NotificationBackend::Smtp => {
            tracing::info!(
                smtp.host = %config.notification.smtp_host,
                smtp.port = config.notification.smtp_port,
                workers = config.notification.worker_concurrency,
                "SMTP 送信を使用します"
            );
            Arc::new(
                SmtpNotificationSender::new(
                    &config.notification.smtp_host,
                    config.notification.smtp_port,
                    &config.notification.from_address,
                    executor.clone(),
                )
                .context("SMTP 送信の初期化に失敗しました")?,
            )
        }
        NotificationBackend::Noop => {
            tracing::info!("Noop 送信を使用します（メールは送信されません）");
            Arc::new(NoopNotificationSender)
        }
    };

    // メール送信エンドポイントのレートリミッター
    let limiter_config = config.rate_limit.to_email_limiter_config();
    tracing::info!(
        rate_limit.name = %limiter_config.name,
        rate_limit.limit_for_period = limiter_config.limit_for_period,
        rate_limit.refresh_period_ms = limiter_config.refresh_period.as_millis() as u64,
        rate_limit.timeout_ms = limiter_config.timeout.as_millis() as u64,
        "レートリミッターを設定しました"
    );
    let limiter: Arc<dyn RateLimiter> = Arc::new(FixedWindowRateLimiter::new(limiter_config));

    let app = build_app(sender, limiter);

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Notification API サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 受付済みの送信ジョブを流し切ってから終了する
    tracing::info!(
        in_flight = executor.in_flight(),
        "送信中のジョブの完了を待機しています"
    );
    executor.wait_idle().await;
    tracing::info!("Notification API サーバーを停止しました");

    Ok(())
}

/// Ctrl+C を受けたら完了する
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("シグナルハンドラの登録に失敗: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("シャットダウンシグナルを受信しました");
}
