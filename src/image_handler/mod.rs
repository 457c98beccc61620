//! # 图片像素编码模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“下载 → 解码 → 缩放 → 上限检查 → 逐行编码”按职责拆分为多个子模块，
//! 数据严格单向流动，任一阶段失败都短路为 `ImageError`。
//!
//! - `service`：承载可注入状态（`ImageServiceState`），把 CPU 工作移出异步线程
//! - `handler`：编排整条处理流水线
//! - `loader`：负责 URL 下载与体积校验
//! - `pipeline`：负责解码、像素限制、降采样
//! - `encoder`：负责逐行文本编码与时间预算检查
//! - `clock`：可注入时钟与时间预算
//! - `config/error/source`：配置、错误、输入与中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! HTTP 请求
//!    ↓
//! api::routes（参数解析与校验）
//!    ↓
//! service.rs（State 注入、spawn_blocking）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（下载 + 体积校验）
//!    ├─ pipeline.rs（解码 + 像素限制 + 降采样）
//!    └─ encoder.rs（逐行编码 + 时间预算）
//!    ↓
//! 文本结果或 AppError
//! ```

pub mod clock;
mod config;
pub mod encoder;
mod error;
mod handler;
mod loader;
mod pipeline;
mod service;
mod source;

pub use clock::{Clock, SystemClock, TimeBudget};
pub use config::{ConfigError, ImageConfig, DOWNLOAD_TIMEOUT, PIXEL_LIMIT, TIME_LIMIT};
pub use error::ImageError;
pub use handler::ImageHandler;
pub use service::ImageServiceState;
pub use source::{InvalidScaleFactor, ScaleFactor, MAX_SCALE, MIN_SCALE};
