//! # レートリミット
//!
//! エンドポイント単位のリクエストレート上限を提供する。
//!
//! ## 構成
//!
//! - [`RateLimiter`] trait - 「今この呼び出しを通してよいか」を判定する能力
//! - [`FixedWindowRateLimiter`] - 固定ウィンドウ方式の実装
//! - [`acquire_permission`] - 許可を取得する。拒否時は [`RateLimitRejection`] を返す
//!
//! ```text
//! request → body 抽出 → acquire_permission ──(許可)──→ usecase
//!                               └──(拒否)──→ fallback (429)
//! ```
//!
//! リミッターは `Arc<dyn RateLimiter>` で注入する。グローバル状態は持たない。

mod admission;
mod limiter;

pub use admission::{RateLimitRejection, acquire_permission};
pub use limiter::{FixedWindowRateLimiter, RateLimitConfig, RateLimiter};
