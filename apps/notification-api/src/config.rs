//! # Notification API 設定
//!
//! 環境変数から Notification API サーバーの設定を読み込む。
//! すべての項目にデフォルト値があり、未設定でも起動できる。

use std::{env, str::FromStr, time::Duration};

use notiflow_shared::rate_limit::RateLimitConfig;
use thiserror::Error;

/// メール送信エンドポイントに適用するレートリミッター名
pub const EMAIL_RATE_LIMITER_NAME: &str = "emailService";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 値をパースできない
    #[error("{key} の値が不正です: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// 1 以上でなければならない値に 0 が指定された
    #[error("{key} は 1 以上である必要があります")]
    MustBePositive { key: &'static str },

    /// 未知の送信バックエンド
    #[error("NOTIFICATION_BACKEND は smtp または noop を指定してください: {0:?}")]
    UnknownBackend(String),
}

/// Notification API サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// バインドアドレス
    pub host:         String,
    /// ポート番号
    pub port:         u16,
    /// 通知設定
    pub notification: NotificationConfig,
    /// メール送信エンドポイントのレートリミット
    pub rate_limit:   RateLimitSettings,
}

/// 送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationBackend {
    /// SMTP サーバー経由で送信
    Smtp,
    /// 送信しない（ログ出力のみ）
    Noop,
}

impl FromStr for NotificationBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smtp" => Ok(Self::Smtp),
            "noop" => Ok(Self::Noop),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `smtp`: Mailpit（開発）/ SMTP リレー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub backend:            NotificationBackend,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:          String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:          u16,
    /// 送信元メールアドレス（全メール共通の固定値）
    pub from_address:       String,
    /// 同時に SMTP 送信するワーカー数
    pub worker_concurrency: usize,
}

/// レートリミット設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitSettings {
    /// 1 ウィンドウあたりの許可数
    pub limit_for_period: u32,
    /// ウィンドウ長
    pub refresh_period:   Duration,
    /// 許可待ちの最大時間
    pub timeout:          Duration,
}

impl RateLimitSettings {
    /// メール送信エンドポイント用のリミッター設定に変換する
    pub fn to_email_limiter_config(&self) -> RateLimitConfig {
        RateLimitConfig::new(
            EMAIL_RATE_LIMITER_NAME,
            self.limit_for_period,
            self.refresh_period,
        )
        .with_timeout(self.timeout)
    }
}

impl ApiConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を読み込む
    ///
    /// `from_env()` の実体。テストでは HashMap を渡す。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend: NotificationBackend = lookup("NOTIFICATION_BACKEND")
            .unwrap_or_else(|| "smtp".to_string())
            .parse()?;

        let worker_concurrency: usize = parse_or(&lookup, "MAIL_WORKER_CONCURRENCY", 8)?;
        ensure_positive("MAIL_WORKER_CONCURRENCY", worker_concurrency as u64)?;

        let limit_for_period: u32 = parse_or(&lookup, "RATE_LIMIT_EMAIL_LIMIT_FOR_PERIOD", 10)?;
        ensure_positive("RATE_LIMIT_EMAIL_LIMIT_FOR_PERIOD", u64::from(limit_for_period))?;

        let refresh_period_ms: u64 =
            parse_or(&lookup, "RATE_LIMIT_EMAIL_REFRESH_PERIOD_MS", 1_000)?;
        ensure_positive("RATE_LIMIT_EMAIL_REFRESH_PERIOD_MS", refresh_period_ms)?;

        let timeout_ms: u64 = parse_or(&lookup, "RATE_LIMIT_EMAIL_TIMEOUT_MS", 0)?;

        Ok(Self {
            host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "API_PORT", 8080)?,
            notification: NotificationConfig {
                backend,
                smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
                smtp_port: parse_or(&lookup, "SMTP_PORT", 1025)?,
                from_address: lookup("NOTIFICATION_FROM_ADDRESS")
                    .unwrap_or_else(|| "alertasBIAN@fisagrp.com".to_string()),
                worker_concurrency,
            },
            rate_limit: RateLimitSettings {
                limit_for_period,
                refresh_period: Duration::from_millis(refresh_period_ms),
                timeout: Duration::from_millis(timeout_ms),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn ensure_positive(key: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::MustBePositive { key });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_未設定ならデフォルト値を使う() {
        let config = load(&[]).unwrap();

        assert_eq!(
            config,
            ApiConfig {
                host:         "0.0.0.0".to_string(),
                port:         8080,
                notification: NotificationConfig {
                    backend:            NotificationBackend::Smtp,
                    smtp_host:          "localhost".to_string(),
                    smtp_port:          1025,
                    from_address:       "alertasBIAN@fisagrp.com".to_string(),
                    worker_concurrency: 8,
                },
                rate_limit:   RateLimitSettings {
                    limit_for_period: 10,
                    refresh_period:   Duration::from_millis(1_000),
                    timeout:          Duration::ZERO,
                },
            }
        );
    }

    #[test]
    fn test_環境変数の値で上書きする() {
        let config = load(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "18080"),
            ("NOTIFICATION_BACKEND", "noop"),
            ("SMTP_HOST", "mailpit"),
            ("SMTP_PORT", "2525"),
            ("NOTIFICATION_FROM_ADDRESS", "alerts@example.com"),
            ("MAIL_WORKER_CONCURRENCY", "2"),
            ("RATE_LIMIT_EMAIL_LIMIT_FOR_PERIOD", "3"),
            ("RATE_LIMIT_EMAIL_REFRESH_PERIOD_MS", "500"),
            ("RATE_LIMIT_EMAIL_TIMEOUT_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 18080);
        assert_eq!(config.notification.backend, NotificationBackend::Noop);
        assert_eq!(config.notification.smtp_host, "mailpit");
        assert_eq!(config.notification.smtp_port, 2525);
        assert_eq!(config.notification.from_address, "alerts@example.com");
        assert_eq!(config.notification.worker_concurrency, 2);
        assert_eq!(config.rate_limit.limit_for_period, 3);
        assert_eq!(config.rate_limit.refresh_period, Duration::from_millis(500));
        assert_eq!(config.rate_limit.timeout, Duration::from_millis(250));
    }

    #[rstest]
    #[case("API_PORT", "abc")]
    #[case("SMTP_PORT", "70000")]
    #[case("MAIL_WORKER_CONCURRENCY", "-1")]
    #[case("RATE_LIMIT_EMAIL_REFRESH_PERIOD_MS", "1s")]
    fn test_パースできない値はinvalid_valueになる(#[case] key: &'static str, #[case] value: &str) {
        let result = load(&[(key, value)]);

        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                key,
                value: value.to_string(),
            })
        );
    }

    #[rstest]
    #[case("MAIL_WORKER_CONCURRENCY")]
    #[case("RATE_LIMIT_EMAIL_LIMIT_FOR_PERIOD")]
    #[case("RATE_LIMIT_EMAIL_REFRESH_PERIOD_MS")]
    fn test_0はmust_be_positiveになる(#[case] key: &'static str) {
        assert_eq!(load(&[(key, "0")]), Err(ConfigError::MustBePositive { key }));
    }

    #[test]
    fn test_未知のバックエンドはエラーになる() {
        assert_eq!(
            load(&[("NOTIFICATION_BACKEND", "ses")]),
            Err(ConfigError::UnknownBackend("ses".to_string()))
        );
    }

    #[test]
    fn test_to_email_limiter_configでリミッター名と値が引き継がれる() {
        let config = load(&[("RATE_LIMIT_EMAIL_TIMEOUT_MS", "100")]).unwrap();

        let limiter = config.rate_limit.to_email_limiter_config();

        assert_eq!(limiter.name, "emailService");
        assert_eq!(limiter.limit_for_period, 10);
        assert_eq!(limiter.refresh_period, Duration::from_secs(1));
        assert_eq!(limiter.timeout, Duration::from_millis(100));
    }
}
