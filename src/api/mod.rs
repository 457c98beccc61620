//! # HTTP 接口层（api）
//!
//! - `params`：两种请求形态的参数模型与校验
//! - `routes`：路由、CORS 与 panic 兜底

pub mod params;
pub mod routes;

pub use params::ProcessImageParams;
pub use routes::{router, PROCESS_IMAGE_PATH};
