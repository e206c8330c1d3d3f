//! # Notification API エラー定義
//!
//! API 固有のエラーと、HTTP レスポンス（RFC 9457 Problem Details）への変換を定義する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notiflow_domain::NotificationError;
use notiflow_shared::{ErrorResponse, event_log::error as error_ctx};
use thiserror::Error;

/// Notification API で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// 通知ユースケースのエラー
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Notification(NotificationError::MissingMessage) => {
                tracing::warn!(
                    error.category = error_ctx::category::CLIENT,
                    error.kind = error_ctx::kind::MISSING_MESSAGE,
                    "通知メッセージなしで送信依頼を受けた"
                );
                ErrorResponse::bad_request(self.to_string())
            }
            ApiError::Notification(e) => {
                tracing::error!(
                    error.category = error_ctx::category::EXTERNAL_SERVICE,
                    error.kind = error_ctx::kind::INTERNAL,
                    "送信依頼の処理に失敗: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn parse_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_messageは400のproblem_detailsになる() {
        let response = ApiError::from(NotificationError::MissingMessage).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = parse_body(response).await;
        assert_eq!(json["status"], 400);
        assert_eq!(json["detail"], "通知メッセージが指定されていません");
    }

    #[tokio::test]
    async fn test_送信失敗は内部情報を隠して500になる() {
        let response =
            ApiError::from(NotificationError::SendFailed("SMTP 5xx at relay".to_string()))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = parse_body(response).await;
        assert_eq!(json["detail"], "内部エラーが発生しました");
        assert_eq!(
            json["type"],
            "https://notiflow.example.com/errors/internal-error"
        );
    }
}
