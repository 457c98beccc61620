//! # 下载模块
//!
//! ## 设计思路
//!
//! 只负责把 URL 对应的原始字节拉回来：单次请求、不重试、总超时 10 秒。
//! 任何网络错误、非 2xx 状态码、超时或体积超限都归为下载失败，
//! 错误信息中嵌入底层原因。
//!
//! ## 实现思路
//!
//! - 复用 `ImageHandler` 内构建好的 `reqwest::Client`（超时在构建时设定）。
//! - 流式读取响应体，边读边累计体积，超过 `max_file_size` 立即中止。
//! - 响应体签名可识别且不是图片时（`infer`），直接判定为无法识别的图片。
//! - 日志中的 URL 去掉 query 与 fragment，避免泄露签名参数。

use bytes::{Bytes, BytesMut};

use super::source::RawImageData;
use super::{ImageConfig, ImageError, ImageHandler};

const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;

impl ImageHandler {
    /// 从 URL 加载图片原始字节。
    pub(super) async fn load_from_url(&self, url: &str) -> Result<RawImageData, ImageError> {
        let redacted = Self::redact_url_for_log(url);
        log::info!("🌐 开始下载图片 - URL: {}", redacted);

        let bytes = self.download(url).await?;
        log::debug!("✅ 下载完成 - {} bytes", bytes.len());

        Ok(RawImageData {
            bytes,
            source_hint: redacted,
        })
    }

    async fn download(&self, url: &str) -> Result<Bytes, ImageError> {
        let config = &self.config;

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::map_reqwest_error(e, url, config))?;

        let status = response.status();
        if !status.is_success() {
            let class = if status.is_server_error() {
                "Server Error"
            } else if status.is_client_error() {
                "Client Error"
            } else {
                "Unexpected Status"
            };
            return Err(ImageError::Download(format!(
                "{} {}: {} for url: {}",
                status.as_u16(),
                class,
                status.canonical_reason().unwrap_or("Unknown"),
                Self::redact_url_for_log(url)
            )));
        }

        if let Some(size) = response.content_length() {
            if size > config.max_file_size {
                return Err(Self::oversized_body(size, config));
            }
        }

        let initial_capacity = response
            .content_length()
            .map(|len| len.min(config.max_file_size) as usize)
            .filter(|len| *len > 0)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = BytesMut::with_capacity(initial_capacity);

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::map_reqwest_error(e, url, config))?
        {
            let total = buffer.len() as u64 + chunk.len() as u64;
            if total > config.max_file_size {
                return Err(Self::oversized_body(total, config));
            }
            buffer.extend_from_slice(&chunk);
        }

        // 能识别出签名但不是图片（HTML、压缩包等）时直接按无法识别处理。
        if let Some(kind) = infer::get(&buffer) {
            if kind.matcher_type() != infer::MatcherType::Image {
                return Err(ImageError::Decode(format!(
                    "downloaded content is {}",
                    kind.mime_type()
                )));
            }
        }

        Ok(buffer.freeze())
    }

    fn oversized_body(size: u64, config: &ImageConfig) -> ImageError {
        ImageError::Download(format!(
            "response body of {:.2} MB exceeds the {:.2} MB limit",
            size as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        ))
    }

    /// 统一映射 reqwest 错误到下载失败。
    fn map_reqwest_error(e: reqwest::Error, url: &str, config: &ImageConfig) -> ImageError {
        let err_msg = Self::sanitize_error_message_with_redacted_url(&e.to_string(), url);

        if e.is_timeout() {
            ImageError::Download(format!(
                "request timed out after {}s ({})",
                config.download_timeout.as_secs(),
                err_msg
            ))
        } else if e.is_connect() {
            ImageError::Download(format!("failed to connect ({})", err_msg))
        } else if e.is_builder() {
            ImageError::Download(format!("invalid URL ({})", err_msg))
        } else {
            ImageError::Download(err_msg)
        }
    }

    pub(crate) fn redact_url_for_log(url: &str) -> String {
        let Ok(parsed) = reqwest::Url::parse(url) else {
            return "<invalid-url>".to_string();
        };

        let host = parsed.host_str().unwrap_or("<unknown-host>");
        let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
        let path = parsed.path();

        format!("{}://{}{}{}", parsed.scheme(), host, port, path)
    }

    fn sanitize_error_message_with_redacted_url(error_msg: &str, url: &str) -> String {
        let redacted = Self::redact_url_for_log(url);
        error_msg.replace(url, &redacted)
    }
}
