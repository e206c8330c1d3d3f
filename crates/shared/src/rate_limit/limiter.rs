//! 固定ウィンドウ方式のレートリミッター
//!
//! `refresh_period` ごとに `limit_for_period` 個の許可を払い出す。
//! ウィンドウ状態は 1 つの Mutex で保護し、許可判定はその中で完結させる。

use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use tokio::time::Instant;

/// レートリミッターの能力
///
/// 実装はスレッドセーフであること（全リクエストで共有される）。
pub trait RateLimiter: Send + Sync {
    /// リミッター名（ログとフォールバックに渡される）
    fn name(&self) -> &str;

    /// 許可を 1 つ取得する
    ///
    /// 取得できない場合は、次のウィンドウが開くまでの時間を `Err` で返す。
    fn try_acquire(&self) -> Result<(), Duration>;

    /// 拒否された呼び出しが次のウィンドウを待ってよい最大時間
    fn timeout(&self) -> Duration {
        Duration::ZERO
    }
}

/// レートリミッター設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// リミッター名（例: `"emailService"`）
    pub name:             String,
    /// 1 ウィンドウあたりの許可数
    pub limit_for_period: u32,
    /// ウィンドウ長
    pub refresh_period:   Duration,
    /// 許可待ちの最大時間（0 なら即座に拒否）
    pub timeout:          Duration,
}

impl RateLimitConfig {
    pub fn new(name: impl Into<String>, limit_for_period: u32, refresh_period: Duration) -> Self {
        Self {
            name: name.into(),
            limit_for_period,
            refresh_period,
            timeout: Duration::ZERO,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug)]
struct Window {
    started_at: Instant,
    used:       u32,
}

/// 固定ウィンドウ方式のレートリミッター
///
/// ウィンドウが満了した後の最初の呼び出しで新しいウィンドウを開始する。
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    config: RateLimitConfig,
    window: Mutex<Window>,
}

impl FixedWindowRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            window: Mutex::new(Window {
                started_at: Instant::now(),
                used:       0,
            }),
        }
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn try_acquire(&self) -> Result<(), Duration> {
        let now = Instant::now();
        // 判定中に panic しても状態は整合しているので、毒化は無視して続行する
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);

        let elapsed = now.saturating_duration_since(window.started_at);
        if elapsed >= self.config.refresh_period {
            window.started_at = now;
            window.used = 0;
        }

        if window.used < self.config.limit_for_period {
            window.used += 1;
            return Ok(());
        }

        let next_window = window.started_at + self.config.refresh_period;
        Err(next_window.saturating_duration_since(now))
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }
}
