//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，所有 HTTP 处理函数统一返回 `Result<T, AppError>`，
//! 调用方总是收到结构化的 `{"error": "<message>"}`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息；参数校验类消息是对外契约，文本固定。
//! - 为 `ImageError` / `ConfigError` 提供 `From` 转换，无需手动 map。
//! - 实现 `IntoResponse`：意外失败映射为 500，其余全部为 400。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::image_handler::{ConfigError, ImageError};

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 缺少 `image_url` 参数
    #[error("Missing image_url parameter")]
    MissingImageUrl,

    /// `resolution` 无法解析为 1~100 的整数
    #[error("Invalid resolution value. Use a positive integer between 1 and 100.")]
    InvalidResolution,

    /// 图片编码流水线错误（下载 / 解码 / 上限 / 超时 / 意外）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 服务配置不合法（仅在启动阶段出现）
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// 监听端口等 I/O 错误（仅在启动阶段出现）
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 请求处理过程中的意外 panic
    #[error("Unexpected error while processing image")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingImageUrl | Self::InvalidResolution => StatusCode::BAD_REQUEST,
            Self::Image(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Image(_) | Self::Config(_) | Self::Io(_) | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// 错误响应体。
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_errors_keep_exact_messages() {
        assert_eq!(AppError::MissingImageUrl.to_string(), "Missing image_url parameter");
        assert_eq!(
            AppError::InvalidResolution.to_string(),
            "Invalid resolution value. Use a positive integer between 1 and 100."
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::MissingImageUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidResolution.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(ImageError::Download("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ImageError::TimeExceeded { limit_secs: 8 }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ImageError::Unexpected("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_is_single_error_field() {
        let body = serde_json::to_value(ErrorBody {
            error: AppError::InvalidResolution.to_string(),
        })
        .expect("serialize failed");
        assert_eq!(
            body,
            serde_json::json!({"error": "Invalid resolution value. Use a positive integer between 1 and 100."})
        );
    }
}
