//! # 解码与缩放流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → 目标尺寸 RGBA”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读取 header 尺寸做像素检查，再进行完整解码，超限请求不做任何解码/缩放工作。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 源图像素上限检查（解压炸弹）
//! 3. 计算目标尺寸（整除向下取整，至少 1）并做输出像素上限检查
//! 4. 完整解码（分配上限按源图像素上限放宽，header 检查已约束尺寸）
//! 5. 转 RGBA 后用 Lanczos3 降采样；尺寸不变时直接复用原图

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, Limits, RgbaImage};
use std::io::Cursor;
use std::time::Instant;

use super::source::{PreparedImage, RawImageData, ScaleFactor};
use super::{ImageConfig, ImageError, ImageHandler};

impl ImageHandler {
    /// 将原始字节解码并缩放为目标尺寸的 RGBA 数据。
    pub(crate) fn decode_and_resize(
        &self,
        raw: RawImageData,
        scale: ScaleFactor,
    ) -> Result<PreparedImage, ImageError> {
        let config = &self.config;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_source_pixels(config, header_width, header_height)?;
        let (target_width, target_height) = scale.target_dimensions(header_width, header_height);
        Self::validate_output_pixels(config, target_width, target_height)?;

        let decode_start = Instant::now();
        let decoded = Self::decode_from_memory(&raw.bytes, Self::decode_limits(config))?;
        let decode_elapsed = decode_start.elapsed();

        // header 与实际解码尺寸理论上一致，这里以解码结果为准再校验一次。
        let (source_width, source_height) = decoded.dimensions();
        let (target_width, target_height) = scale.target_dimensions(source_width, source_height);
        Self::validate_output_pixels(config, target_width, target_height)?;

        let resize_start = Instant::now();
        let rgba = Self::resize_to_rgba(decoded, target_width, target_height, config.resize_filter)?;
        let resize_elapsed = resize_start.elapsed();

        log::info!(
            "✅ 图片解码缩放完成 - 来源: {} 原始尺寸: {}x{} 输出尺寸: {}x{}",
            raw.source_hint,
            source_width,
            source_height,
            target_width,
            target_height
        );

        Ok(PreparedImage {
            source_width,
            source_height,
            rgba,
            decode_elapsed,
            resize_elapsed,
        })
    }

    /// 仅通过内存中的图片头信息读取宽高。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(ImageError::Decode("unrecognized image signature".to_string()));
        }

        reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(e.to_string()))
    }

    /// 完整解码。`image` 默认 512MiB 的分配上限会拒绝仍在源图像素上限内的大图，
    /// 因此按 `max_source_pixels` 放宽（每像素最多 8 字节，即 16 位 RGBA）。
    fn decode_limits(config: &ImageConfig) -> Limits {
        let mut limits = Limits::default();
        limits.max_alloc = Some(config.max_source_pixels.saturating_mul(8));
        limits
    }

    fn decode_from_memory(bytes: &[u8], limits: Limits) -> Result<DynamicImage, ImageError> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        reader.limits(limits);

        reader.decode().map_err(Self::map_decode_error)
    }

    fn map_decode_error(err: image::ImageError) -> ImageError {
        match err {
            image::ImageError::Limits(limit) => ImageError::TooLarge(format!(
                "source image exceeds the decoder resource limit ({limit})"
            )),
            other => ImageError::Decode(other.to_string()),
        }
    }

    fn validate_source_pixels(config: &ImageConfig, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = width as u64 * height as u64;

        if pixels > config.max_source_pixels {
            return Err(ImageError::TooLarge(format!(
                "source image of {}x{} = {} pixels exceeds the decompression limit of {} pixels",
                width, height, pixels, config.max_source_pixels
            )));
        }

        Ok(())
    }

    /// 输出像素数超过上限时拒绝，提示调用方调大缩小倍数。
    pub(crate) fn validate_output_pixels(
        config: &ImageConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let pixels = width as u64 * height as u64;

        if pixels > config.pixel_limit {
            return Err(ImageError::TooLarge(format!(
                "output of {}x{} = {} pixels exceeds the limit of {}; increase the resolution value",
                width, height, pixels, config.pixel_limit
            )));
        }

        Ok(())
    }

    fn resize_to_rgba(
        image: DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, ImageError> {
        let rgba = image.into_rgba8();

        if rgba.dimensions() == (target_width, target_height) {
            return Ok(rgba);
        }

        // 借用原缓冲区做降采样，失败时仍可用同一份数据回退。
        match Self::resize_with_fast_image_resize(&rgba, target_width, target_height, filter) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 降采样失败，回退 image::imageops::resize：{}",
                    err
                );
                Ok(image::imageops::resize(&rgba, target_width, target_height, filter))
            }
        }
    }

    fn resize_with_fast_image_resize(
        src: &RgbaImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, ImageError> {
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::ImageRef::new(
            src_width,
            src_height,
            src.as_raw().as_slice(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| ImageError::Unexpected(format!("failed to build resize source: {e}")))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Unexpected(format!("resize failed: {e}")))?;

        RgbaImage::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| ImageError::Unexpected("resize output buffer has wrong length".to_string()))
    }

    fn to_fast_filter(filter: FilterType) -> fr::FilterType {
        match filter {
            FilterType::Nearest => fr::FilterType::Box,
            FilterType::Triangle => fr::FilterType::Bilinear,
            FilterType::CatmullRom => fr::FilterType::CatmullRom,
            FilterType::Gaussian => fr::FilterType::Mitchell,
            FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}
