//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ロジックはユースケースに委譲

pub mod health;
pub mod notification;

pub use health::health_check;
pub use notification::{
    ACCEPTED_MESSAGE,
    EMAIL_NOTIFICATION_PATH,
    NotificationState,
    SATURATED_MESSAGE,
    SendEmailRequest,
    rate_limit_fallback,
    send_email_notification,
};
