//! # 像素文本编码
//!
//! 行优先遍历 RGBA 像素，每个像素输出三个记号：
//! - `alpha == 0`：`R, R, R`
//! - 其他：`r, g, b` 的十进制文本
//!
//! 每行末尾追加 `B, B, B`，全部记号以 `", "` 连接为一个字符串。
//! 每行开始前检查一次时间预算，超时立即放弃已生成的内容。

use std::fmt::Write as _;

use image::RgbaImage;

use super::clock::TimeBudget;
use super::ImageError;

pub const SEPARATOR: &str = ", ";
pub const TRANSPARENT_TOKEN: &str = "R";
pub const ROW_END_TOKEN: &str = "B";

/// 将整幅图编码为分隔文本。
pub fn encode_pixels(image: &RgbaImage, budget: &TimeBudget) -> Result<String, ImageError> {
    let (width, height) = image.dimensions();
    // 单个像素最多 "255, 255, 255, " 共 15 字节。
    let capacity = (width as usize + 1)
        .saturating_mul(15)
        .saturating_mul(height as usize);
    let mut output = String::with_capacity(capacity);

    for y in 0..height {
        budget.check()?;

        if y > 0 {
            output.push_str(SEPARATOR);
        }

        for x in 0..width {
            let [r, g, b, a] = image.get_pixel(x, y).0;
            if a == 0 {
                push_triple(&mut output, TRANSPARENT_TOKEN);
            } else {
                write!(output, "{r}, {g}, {b}")
                    .map_err(|e| ImageError::Unexpected(format!("failed to format pixel: {e}")))?;
            }
            output.push_str(SEPARATOR);
        }

        push_triple(&mut output, ROW_END_TOKEN);
    }

    Ok(output)
}

fn push_triple(output: &mut String, token: &str) {
    output.push_str(token);
    output.push_str(SEPARATOR);
    output.push_str(token);
    output.push_str(SEPARATOR);
    output.push_str(token);
}
