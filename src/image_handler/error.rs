//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载编码链路中的所有失败类别，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 每个分支的 `Display` 文本会原样返回给 HTTP 调用方，因此只包含
//! 构造时写入的描述信息，不携带堆栈或内部细节。

/// 图片编码统一错误类型。
///
/// 该类型会在接口层被上转为 `AppError`，最终序列化为 `{"error": ...}`。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// 网络失败、非 2xx 状态码或下载超时。
    #[error("Error downloading image: {0}")]
    Download(String),

    /// 字节无法识别为任何受支持的图片格式。
    #[error("Error processing image: unable to identify image ({0})")]
    Decode(String),

    /// 输出像素数（或源图像素数）超过上限。
    #[error("Error processing image: {0}")]
    TooLarge(String),

    /// 处理耗时超过时间预算。
    #[error("Error processing image: processing exceeded the {limit_secs}s time limit; increase the resolution value")]
    TimeExceeded { limit_secs: u64 },

    /// 其他意外失败（工作线程 panic、缓冲区长度异常等）。
    #[error("Error processing image: {0}")]
    Unexpected(String),
}

impl ImageError {
    /// 稳定错误码，用于日志检索。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Download(_) => "E_DOWNLOAD",
            Self::Decode(_) => "E_DECODE",
            Self::TooLarge(_) => "E_TOO_LARGE",
            Self::TimeExceeded { .. } => "E_TIME_EXCEEDED",
            Self::Unexpected(_) => "E_UNEXPECTED",
        }
    }

    /// 失败所处阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Download(_) => "download",
            Self::Decode(_) => "decode",
            Self::TooLarge(_) => "guard",
            Self::TimeExceeded { .. } => "encode",
            Self::Unexpected(_) => "internal",
        }
    }

    /// 是否属于调用方可通过调整输入规避的错误（映射为 4xx）。
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Unexpected(_))
    }
}
