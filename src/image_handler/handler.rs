//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排，不直接与 HTTP 框架绑定。
//! 处理链路固定为：
//! 1. 以注入的时钟开始计时
//! 2. 下载原始字节
//! 3. 解码、计算目标尺寸、像素上限检查、降采样
//! 4. 逐行编码（每行开始前检查时间预算）
//!
//! 任一阶段失败都短路返回 `ImageError`，不会回到前面的阶段。
//!
//! ## 实现思路
//!
//! - 配置在构建时固定，单次请求内不会漂移。
//! - `reqwest::Client` 只构建一次并在请求间复用，超时在构建时设定。
//! - 记录 `load/decode/resize/encode/total` 阶段耗时，便于性能诊断。

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;

use super::clock::{Clock, SystemClock, TimeBudget};
use super::encoder::encode_pixels;
use super::source::{RawImageData, ScaleFactor};
use super::{ImageConfig, ImageError};

/// 图片编码器。
///
/// 封装了配置、HTTP 客户端与时钟，并编排各子模块实现完整流程。
pub struct ImageHandler {
    pub(super) config: ImageConfig,
    pub(super) client: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl ImageHandler {
    /// 使用系统时钟创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use pixel_encoder::image_handler::{ImageConfig, ImageHandler};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default())?;
    /// # Ok::<(), pixel_encoder::image_handler::ImageError>(())
    /// ```
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// 使用指定时钟创建处理器，测试中用于模拟耗时。
    pub fn with_clock(config: ImageConfig, clock: Arc<dyn Clock>) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(config.download_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ImageError::Unexpected(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            clock,
        })
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// 以当前时刻为起点开启一次处理的时间预算。
    pub fn start_budget(&self) -> TimeBudget {
        TimeBudget::start(Arc::clone(&self.clock), self.config.time_limit)
    }

    /// 处理主入口：下载、解码、缩放并编码为分隔文本。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use pixel_encoder::image_handler::{ImageConfig, ImageHandler, ScaleFactor};
    ///
    /// # async fn demo() -> Result<(), pixel_encoder::image_handler::ImageError> {
    /// let handler = ImageHandler::new(ImageConfig::default())?;
    /// let scale = ScaleFactor::new(4).expect("in range");
    /// let text = handler.encode("https://example.com/a.png", scale).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn encode(&self, source: &str, scale: ScaleFactor) -> Result<String, ImageError> {
        let (raw, budget) = self.fetch(source).await?;
        self.encode_raw(raw, scale, &budget)
    }

    /// 下载阶段：先开启时间预算再下载，预算覆盖后续全部阶段。
    pub(crate) async fn fetch(&self, source: &str) -> Result<(RawImageData, TimeBudget), ImageError> {
        let budget = self.start_budget();
        let load_start = Instant::now();
        let raw = self.load_from_url(source).await?;
        log::info!(
            "📥 图片下载完成 - 来源: {} 大小: {}KB load={}ms",
            raw.source_hint,
            raw.bytes.len() / 1024,
            load_start.elapsed().as_millis()
        );
        Ok((raw, budget))
    }

    /// 对已在内存中的图片字节执行解码到编码的全部阶段。
    pub fn encode_bytes(
        &self,
        bytes: Bytes,
        scale: ScaleFactor,
        budget: &TimeBudget,
    ) -> Result<String, ImageError> {
        self.encode_raw(
            RawImageData {
                bytes,
                source_hint: "memory".to_string(),
            },
            scale,
            budget,
        )
    }

    /// CPU 密集部分：解码、缩放、编码。不会挂起。
    pub(crate) fn encode_raw(
        &self,
        raw: RawImageData,
        scale: ScaleFactor,
        budget: &TimeBudget,
    ) -> Result<String, ImageError> {
        let prepared = self.decode_and_resize(raw, scale)?;

        let encode_start = Instant::now();
        let encoded = encode_pixels(&prepared.rgba, budget)?;
        let encode_elapsed = encode_start.elapsed();

        let (width, height) = prepared.rgba.dimensions();
        log::info!(
            "✅ 图片编码完成 - {}x{} -> {}x{} decode={}ms resize={}ms encode={}ms total={}ms output={}KB",
            prepared.source_width,
            prepared.source_height,
            width,
            height,
            prepared.decode_elapsed.as_millis(),
            prepared.resize_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            budget.elapsed().as_millis(),
            encoded.len() / 1024
        );

        Ok(encoded)
    }
}
