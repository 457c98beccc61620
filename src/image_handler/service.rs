//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `ImageServiceState` 作为 axum 注入状态，替代全局单例函数。
//! 好处：
//! 1. 生命周期清晰（由 `main.rs` 统一创建）
//! 2. 测试可创建独立实例，减少共享状态副作用
//! 3. 每次请求互不共享可变状态，无需加锁
//!
//! ## 实现思路
//!
//! - 下载阶段在 async 任务内等待网络。
//! - 解码/缩放/编码是 CPU 密集工作，放到 `spawn_blocking` 中执行，避免阻塞运行时。
//! - 工作线程 panic 时转换为 `ImageError::Unexpected`，请求处理不会崩溃。

use std::sync::Arc;

use tokio::task::JoinError;

use super::{ImageConfig, ImageError, ImageHandler, ScaleFactor};
use crate::error::AppError;

/// 图片编码服务状态。
#[derive(Clone)]
pub struct ImageServiceState {
    handler: Arc<ImageHandler>,
}

impl ImageServiceState {
    /// 使用默认配置创建服务状态。
    ///
    /// # 示例
    /// ```rust
    /// use pixel_encoder::image_handler::ImageServiceState;
    ///
    /// let service = ImageServiceState::new()?;
    /// # Ok::<(), pixel_encoder::error::AppError>(())
    /// ```
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(ImageConfig::default())
    }

    /// 使用自定义配置创建服务状态，配置不合法时拒绝启动。
    pub fn with_config(config: ImageConfig) -> Result<Self, AppError> {
        config.validate()?;
        let handler = ImageHandler::new(config)?;
        Ok(Self {
            handler: Arc::new(handler),
        })
    }

    pub fn handler(&self) -> &ImageHandler {
        &self.handler
    }

    /// 执行完整处理流程：下载 → 解码缩放 → 编码。任一阶段失败都带错误码记录一次。
    pub async fn process(&self, source: &str, scale: ScaleFactor) -> Result<String, ImageError> {
        let result = self.run(source, scale).await;

        if let Err(err) = &result {
            log::warn!(
                "⚠️ 图片处理失败 - code={} stage={} message={}",
                err.code(),
                err.stage(),
                err
            );
        }

        result
    }

    async fn run(&self, source: &str, scale: ScaleFactor) -> Result<String, ImageError> {
        let (raw, budget) = self.handler.fetch(source).await?;

        let handler = Arc::clone(&self.handler);
        tokio::task::spawn_blocking(move || handler.encode_raw(raw, scale, &budget))
            .await
            .map_err(worker_failure)?
    }
}

/// 工作线程 panic 或被取消时，转换为不泄露细节的意外错误。
fn worker_failure(err: JoinError) -> ImageError {
    log::error!("❌ 编码工作线程异常退出：{}", err);
    ImageError::Unexpected("internal worker failure".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn service_rejects_invalid_config() {
        let mut config = ImageConfig::default();
        config.time_limit = Duration::from_secs(15);

        let result = ImageServiceState::with_config(config);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn service_exposes_effective_config() {
        let service = ImageServiceState::new().expect("service init failed");

        assert_eq!(service.handler().config().pixel_limit, 1_000_000);
    }

    #[tokio::test]
    async fn unreachable_source_is_download_failure() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .expect("bind failed")
            .port();
        let service = ImageServiceState::new().expect("service init failed");

        let result = service
            .process(&format!("http://127.0.0.1:{}/a.png", port), ScaleFactor::default())
            .await;

        // 下载失败与解码等阶段走同一条失败记录路径，带稳定的错误码与阶段。
        let err = result.expect_err("unreachable host must fail");
        assert!(matches!(err, ImageError::Download(_)));
        assert_eq!((err.code(), err.stage()), ("E_DOWNLOAD", "download"));
    }

    #[tokio::test]
    async fn panicking_worker_becomes_unexpected_error() {
        let join_err = tokio::task::spawn_blocking(|| -> Result<String, ImageError> {
            panic!("decoder blew up")
        })
        .await
        .expect_err("worker must panic");

        let err = worker_failure(join_err);

        assert!(matches!(err, ImageError::Unexpected(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "Error processing image: internal worker failure");
    }
}
