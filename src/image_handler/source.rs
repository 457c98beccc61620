//! # 输入与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ScaleFactor` 表示已校验的缩小倍数（1~100）
//! - `RawImageData` 表示已下载但未解码的字节
//! - `PreparedImage` 表示已缩放、已统一为 RGBA 的像素数据

use bytes::Bytes;
use image::RgbaImage;
use std::time::Duration;

/// 缩小倍数允许的最小值。
pub const MIN_SCALE: i64 = 1;
/// 缩小倍数允许的最大值。
pub const MAX_SCALE: i64 = 100;

/// 已校验的缩小倍数。
///
/// 构造即校验，核心链路拿到的一定满足 `1 <= scale <= 100`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFactor(u32);

/// 缩小倍数越界。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("scale factor {0} is outside 1..=100")]
pub struct InvalidScaleFactor(pub i64);

impl ScaleFactor {
    /// # 示例
    /// ```rust
    /// use pixel_encoder::image_handler::ScaleFactor;
    ///
    /// assert!(ScaleFactor::new(1).is_ok());
    /// assert!(ScaleFactor::new(100).is_ok());
    /// assert!(ScaleFactor::new(0).is_err());
    /// assert!(ScaleFactor::new(101).is_err());
    /// ```
    pub fn new(value: i64) -> Result<Self, InvalidScaleFactor> {
        if !(MIN_SCALE..=MAX_SCALE).contains(&value) {
            return Err(InvalidScaleFactor(value));
        }

        Ok(Self(value as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// 计算缩放后的目标尺寸：整除向下取整，每一维至少 1 像素。
    ///
    /// 10 像素宽、倍数 3 得到 3，而不是四舍五入的 4。
    pub fn target_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        ((width / self.0).max(1), (height / self.0).max(1))
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(1)
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Bytes,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: String,
}

/// 缩放阶段输出：目标尺寸的 RGBA 像素及各阶段耗时。
pub(crate) struct PreparedImage {
    pub(crate) source_width: u32,
    pub(crate) source_height: u32,
    pub(crate) rgba: RgbaImage,
    pub(crate) decode_elapsed: Duration,
    pub(crate) resize_elapsed: Duration,
}
