//! # 像素文本编码服务 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │   GET  /api/process_image?image_url=..&resolution=..     │
//! │   POST /api/process_image  {"image_url":..,"resolution":..}│
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ axum（CORS + panic 兜底）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  ┌─ api ────────── 参数解析与校验、路由                   │
//! │  │                                                       │
//! │  ├─ error ──────── AppError → {"error": ...} + 状态码      │
//! │  │                                                       │
//! │  └─ image_handler  下载 → 解码 → 缩放 → 上限 → 逐行编码  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有 HTTP 处理函数的错误类型 |
//! | [`api`] | `/api/process_image` 的 GET/POST 处理、参数校验、CORS |
//! | [`image_handler`] | 把远程图片缩小后编码为 `r, g, b, ..., B, B, B` 文本 |

pub mod api;
pub mod error;
pub mod image_handler;
