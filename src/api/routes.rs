//! # HTTP 路由层
//!
//! 路由层仅做参数接收与结果返回，不承载业务逻辑。
//! 所有实际处理交由 `ImageServiceState`，保持处理函数薄、稳定、易测试。

use std::any::Any;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use super::params::ProcessImageParams;
use crate::error::AppError;
use crate::image_handler::ImageServiceState;

pub const PROCESS_IMAGE_PATH: &str = "/api/process_image";

/// 构建完整路由：唯一端点 + CORS + panic 兜底。
pub fn router(state: ImageServiceState) -> Router {
    with_middleware(
        Router::new()
            .route(
                PROCESS_IMAGE_PATH,
                get(process_image_query).post(process_image_body),
            )
            .with_state(state),
    )
}

/// panic 兜底在内层，CORS 在外层，兜底生成的 500 响应同样带 CORS 头。
fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
}

/// GET：参数来自 query string。
async fn process_image_query(
    State(state): State<ImageServiceState>,
    query: Option<Query<ProcessImageParams>>,
) -> Result<Response, AppError> {
    let params = query.map(|Query(params)| params).unwrap_or_default();
    process_image(&state, params).await
}

/// POST：参数来自 JSON body。
async fn process_image_body(
    State(state): State<ImageServiceState>,
    body: Bytes,
) -> Result<Response, AppError> {
    process_image(&state, ProcessImageParams::from_json_body(&body)).await
}

async fn process_image(
    state: &ImageServiceState,
    params: ProcessImageParams,
) -> Result<Response, AppError> {
    let (image_url, scale) = params.validate().inspect_err(|err| {
        log::info!("请求参数不合法：{}", err);
    })?;

    let encoded = state.process(&image_url, scale).await?;
    Ok(encoded.into_response())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    log::error!("❌ 请求处理 panic：{}", detail);

    AppError::Internal.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind failed");
        let addr = listener.local_addr().expect("read addr failed");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server failed");
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn panic_becomes_json_500_with_cors() {
        let base = spawn(with_middleware(Router::new().route("/explode", get(explode)))).await;

        let response = reqwest::Client::new()
            .get(format!("{}/explode", base))
            .header(reqwest::header::ORIGIN, "https://frontend.example")
            .send()
            .await
            .expect("request failed");

        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response
                .headers()
                .get(reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        let body: serde_json::Value =
            serde_json::from_str(&response.text().await.expect("read body failed"))
                .expect("body should be JSON");
        assert_eq!(
            body,
            serde_json::json!({"error": "Unexpected error while processing image"})
        );

        // 服务在 panic 后继续可用。
        let again = reqwest::get(format!("{}/explode", base))
            .await
            .expect("second request failed");
        assert_eq!(again.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
