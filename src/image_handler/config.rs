//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ImageConfig`，保证运行时行为可观测、可调整、可测试。
//! 默认值即生产值：像素上限 100 万、处理预算 8 秒、下载超时 10 秒。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用配置。
//! - `validate` 在服务启动前校验参数组合，尤其保证内部时间预算严格小于
//!   宿主环境的请求时长上限，为响应传输留出余量。

use std::time::Duration;

use image::imageops::FilterType;

/// 输出像素总数上限（`new_width * new_height`）。
pub const PIXEL_LIMIT: u64 = 1_000_000;
/// 从开始处理起算的墙钟预算。
pub const TIME_LIMIT: Duration = Duration::from_secs(8);
/// 单次下载的总超时。
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// 图片编码配置。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 输出像素总数上限。
    pub pixel_limit: u64,
    /// 处理（下载 + 解码 + 缩放 + 编码）的墙钟预算。
    pub time_limit: Duration,
    /// 宿主环境的请求时长上限，`time_limit` 必须严格小于它。
    pub host_request_timeout: Duration,
    /// 网络下载总超时。
    pub download_timeout: Duration,
    /// 建立连接（TCP/TLS）超时。
    pub connect_timeout: Duration,
    /// 下载响应体允许的最大字节数。
    pub max_file_size: u64,
    /// 源图像素上限，超过即视为解压炸弹，在完整解码前拒绝。
    pub max_source_pixels: u64,
    /// 降采样滤镜。
    pub resize_filter: FilterType,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            pixel_limit: PIXEL_LIMIT,
            time_limit: TIME_LIMIT,
            host_request_timeout: Duration::from_secs(10),
            download_timeout: DOWNLOAD_TIMEOUT,
            connect_timeout: Duration::from_secs(5),
            max_file_size: 50 * 1024 * 1024,
            max_source_pixels: 178_956_970,
            resize_filter: FilterType::Lanczos3,
        }
    }
}

/// 配置组合不合法。
#[derive(Debug, thiserror::Error)]
#[error("invalid image config: {0}")]
pub struct ConfigError(pub String);

impl ImageConfig {
    /// 校验配置组合。
    ///
    /// # 示例
    /// ```rust
    /// use pixel_encoder::image_handler::ImageConfig;
    ///
    /// assert!(ImageConfig::default().validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixel_limit == 0 {
            return Err(ConfigError("pixel_limit 必须大于 0".to_string()));
        }
        if self.time_limit.is_zero() {
            return Err(ConfigError("time_limit 必须大于 0".to_string()));
        }
        if self.time_limit >= self.host_request_timeout {
            return Err(ConfigError(format!(
                "time_limit（{:?}）必须严格小于宿主请求上限（{:?}）",
                self.time_limit, self.host_request_timeout
            )));
        }
        if self.download_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(ConfigError("下载与连接超时必须大于 0".to_string()));
        }
        if self.connect_timeout > self.download_timeout {
            return Err(ConfigError(
                "connect_timeout 不能大于 download_timeout".to_string(),
            ));
        }
        if self.max_file_size == 0 || self.max_source_pixels == 0 {
            return Err(ConfigError(
                "max_file_size 与 max_source_pixels 必须大于 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_limits() {
        let config = ImageConfig::default();

        assert_eq!(config.pixel_limit, 1_000_000);
        assert_eq!(config.time_limit, Duration::from_secs(8));
        assert_eq!(config.download_timeout, Duration::from_secs(10));
        assert_eq!(config.resize_filter, FilterType::Lanczos3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_time_limit_not_below_host_timeout() {
        let mut config = ImageConfig::default();
        config.time_limit = Duration::from_secs(10);
        assert!(config.validate().is_err());

        config.time_limit = Duration::from_secs(12);
        assert!(config.validate().is_err());

        config.time_limit = Duration::from_millis(9_999);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_limits() {
        let mut config = ImageConfig::default();
        config.pixel_limit = 0;
        assert!(config.validate().is_err());

        let mut config = ImageConfig::default();
        config.download_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = ImageConfig::default();
        config.max_file_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_connect_timeout_above_download_timeout() {
        let mut config = ImageConfig::default();
        config.connect_timeout = Duration::from_secs(30);

        assert!(config.validate().is_err());
    }
}
