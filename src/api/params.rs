//! # 请求参数模型
//!
//! GET 走 query string，POST 走 JSON body，两种形态共用同一个参数结构。
//! `resolution` 既可能是整数也可能是字符串，这里统一解析为已校验的 `ScaleFactor`，
//! 核心链路只接触强类型的值。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::AppError;
use crate::image_handler::ScaleFactor;

/// `/api/process_image` 的原始参数。
#[derive(Debug, Default, Deserialize)]
pub struct ProcessImageParams {
    #[serde(default)]
    pub image_url: Option<String>,
    /// 缺省为 `None`；显式传 `null` 时为 `Some(Value::Null)`。
    #[serde(default, deserialize_with = "present_value")]
    pub resolution: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ProcessImageParams {
    /// 解析 POST body。空 body 或非法 JSON 视为空参数集。
    pub fn from_json_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// 校验参数，返回图片地址与缩小倍数。
    ///
    /// 先检查 `image_url`，再检查 `resolution`。
    pub fn validate(self) -> Result<(String, ScaleFactor), AppError> {
        let image_url = match self.image_url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(AppError::MissingImageUrl),
        };

        let scale = match self.resolution {
            None => ScaleFactor::default(),
            Some(value) => parse_resolution(&value)?,
        };

        Ok((image_url, scale))
    }
}

fn parse_resolution(value: &Value) -> Result<ScaleFactor, AppError> {
    let parsed = match value {
        Value::Number(number) => number.as_i64().or_else(|| whole_float(number.as_f64()?)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|v| ScaleFactor::new(v).ok())
        .ok_or(AppError::InvalidResolution)
}

/// `2.0` 这类没有小数部分的浮点数按整数接受，`2.5` 仍然非法。
fn whole_float(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() <= i64::MAX as f64).then(|| value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json(value: Value) -> ProcessImageParams {
        ProcessImageParams::from_json_body(value.to_string().as_bytes())
    }

    #[test]
    fn missing_or_empty_url_is_rejected_first() {
        assert!(matches!(
            ProcessImageParams::default().validate(),
            Err(AppError::MissingImageUrl)
        ));
        assert!(matches!(
            from_json(json!({"image_url": "", "resolution": "abc"})).validate(),
            Err(AppError::MissingImageUrl)
        ));
    }

    #[test]
    fn resolution_defaults_to_one() {
        let (url, scale) = from_json(json!({"image_url": "https://example.com/a.png"}))
            .validate()
            .expect("valid params");

        assert_eq!(url, "https://example.com/a.png");
        assert_eq!(scale.get(), 1);
    }

    #[test]
    fn resolution_accepts_integer_or_numeric_string() {
        let (_, scale) = from_json(json!({"image_url": "u", "resolution": 7}))
            .validate()
            .expect("valid params");
        assert_eq!(scale.get(), 7);

        let (_, scale) = from_json(json!({"image_url": "u", "resolution": " 100 "}))
            .validate()
            .expect("valid params");
        assert_eq!(scale.get(), 100);
    }

    #[test]
    fn whole_float_resolution_is_accepted() {
        let (_, scale) = from_json(json!({"image_url": "u", "resolution": 2.0}))
            .validate()
            .expect("2.0 is a whole number");
        assert_eq!(scale.get(), 2);

        assert!(matches!(
            from_json(json!({"image_url": "u", "resolution": 0.0})).validate(),
            Err(AppError::InvalidResolution)
        ));
        assert!(matches!(
            from_json(json!({"image_url": "u", "resolution": 100.5})).validate(),
            Err(AppError::InvalidResolution)
        ));
    }

    #[test]
    fn invalid_resolutions_are_rejected() {
        let invalid = [
            json!("0"),
            json!(0),
            json!("101"),
            json!(101),
            json!("-1"),
            json!(-1),
            json!("abc"),
            json!("2.5"),
            json!(2.5),
            json!(true),
            json!(null),
            json!([1]),
            json!("99999999999999999999999"),
        ];

        for value in invalid {
            let result = from_json(json!({"image_url": "u", "resolution": value.clone()})).validate();
            assert!(
                matches!(result, Err(AppError::InvalidResolution)),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_body_is_treated_as_empty() {
        let params = ProcessImageParams::from_json_body(b"image_url=https://example.com/a.png");
        assert!(matches!(params.validate(), Err(AppError::MissingImageUrl)));

        let params = ProcessImageParams::from_json_body(b"");
        assert!(matches!(params.validate(), Err(AppError::MissingImageUrl)));
    }
}
