//! 許可取得
//!
//! リミッターから許可を 1 つ取得する。リミッターの `timeout()` 以内に
//! 次のウィンドウが開くなら、それまで待って再試行する。
//!
//! 呼び出し位置はハンドラ側で決める。メール送信エンドポイントでは
//! リクエストボディの抽出に成功した後に呼ぶため、パースできない
//! リクエストは許可枠を消費しない。

use std::time::Duration;

use tokio::time::Instant;

use super::RateLimiter;

/// 拒否理由（フォールバックに渡される）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRejection {
    /// 拒否したリミッター名
    pub limiter:     String,
    /// 次のウィンドウが開くまでの時間
    pub retry_after: Duration,
}

/// 許可を 1 つ取得する
///
/// `timeout()` を過ぎても許可が取れない場合は [`RateLimitRejection`] を返す。
pub async fn acquire_permission(limiter: &dyn RateLimiter) -> Result<(), RateLimitRejection> {
    let deadline = Instant::now() + limiter.timeout();

    loop {
        match limiter.try_acquire() {
            Ok(()) => return Ok(()),
            Err(retry_after) => {
                if Instant::now() + retry_after > deadline {
                    tracing::warn!(
                        rate_limit.name = %limiter.name(),
                        rate_limit.retry_after_ms = retry_after.as_millis() as u64,
                        "レートリミット超過"
                    );
                    return Err(RateLimitRejection {
                        limiter: limiter.name().to_string(),
                        retry_after,
                    });
                }
                tokio::time::sleep(retry_after).await;
            }
        }
    }
}
