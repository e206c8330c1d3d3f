//! # 配信ワーカープール
//!
//! メール送信ジョブを呼び出し元のタスクから切り離して実行する。
//!
//! ## 仕組み
//!
//! - `submit()` はジョブを `tokio::spawn` で起動し、完了を待たずに戻る
//! - 同時実行数は [`Semaphore`] で制限する。上限を超えたジョブは
//!   自タスク内で permit を待つ（これがプールの内部キュー）
//! - 呼び出し元の tracing スパンをジョブに引き継ぐ
//! - 実行中ジョブ数を数え、[`wait_idle`](DeliveryExecutor::wait_idle) で
//!   全ジョブの完了を待てる（シャットダウン時とテストで使用）

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use tokio::{
    sync::{Notify, Semaphore},
    task::JoinHandle,
};
use tracing::Instrument;

/// 配信ワーカープール
///
/// クローンしたハンドルはすべて同じプールを共有する。
#[derive(Debug, Clone)]
pub struct DeliveryExecutor {
    permits:   Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    idle:      Arc<Notify>,
}

/// 実行中ジョブ数を減らし、0 になったら待機者を起こすガード
///
/// ジョブが panic しても `Drop` で確実に減算する。
struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
    idle:      Arc<Notify>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl DeliveryExecutor {
    /// 同時実行数 `concurrency` のプールを作成する
    ///
    /// 0 を渡した場合は 1 として扱う。
    pub fn new(concurrency: usize) -> Self {
        Self {
            permits:   Arc::new(Semaphore::new(concurrency.max(1))),
            in_flight: Arc::new(AtomicUsize::new(0)),
            idle:      Arc::new(Notify::new()),
        }
    }

    /// ジョブを投入する（完了は待たない）
    ///
    /// tokio ランタイム上で呼び出すこと。
    pub fn submit<F>(&self, job: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlightGuard {
            in_flight: self.in_flight.clone(),
            idle:      self.idle.clone(),
        };
        let permits = self.permits.clone();

        tokio::spawn(
            async move {
                let _guard = guard;
                let Ok(_permit) = permits.acquire_owned().await else {
                    tracing::error!("配信ワーカープールが閉じられているためジョブを破棄");
                    return;
                };
                job.await;
            }
            .in_current_span(),
        )
    }

    /// 実行中（permit 待ちを含む）のジョブ数
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 投入済みのジョブがすべて完了するまで待つ
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}
