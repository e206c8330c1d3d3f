//! # Notiflow 共有ユーティリティ
//!
//! このクレートは、Notiflow の各クレートで使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, api）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は feature で切り替える（`observability`）

pub mod error_response;
pub mod event_log;
pub mod health;
pub mod observability;
pub mod rate_limit;

pub use error_response::ErrorResponse;
pub use health::HealthResponse;
