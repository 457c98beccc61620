//! # 像素文本编码服务 — 应用入口
//!
//! 本文件仅负责参数解析、日志初始化与 HTTP 服务启动。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::time::Duration;

use clap::Parser;
use pixel_encoder::api;
use pixel_encoder::error::AppError;
use pixel_encoder::image_handler::{ImageConfig, ImageServiceState};

#[derive(Parser, Debug)]
#[command(name = "pixel-encoder", version, about)]
struct Args {
    /// 监听地址
    #[arg(long, env = "PIXEL_ENCODER_BIND", default_value = "0.0.0.0")]
    bind: String,
    /// 监听端口
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    /// 处理时间预算（秒），必须小于宿主请求上限
    #[arg(long, env = "PIXEL_ENCODER_TIME_LIMIT_SECS", default_value_t = 8)]
    time_limit_secs: u64,
    /// 宿主环境的请求时长上限（秒）
    #[arg(long, env = "PIXEL_ENCODER_HOST_TIMEOUT_SECS", default_value_t = 10)]
    host_timeout_secs: u64,
    /// 下载超时（秒）
    #[arg(long, env = "PIXEL_ENCODER_DOWNLOAD_TIMEOUT_SECS", default_value_t = 10)]
    download_timeout_secs: u64,
    /// 下载体积上限（MB）
    #[arg(long, env = "PIXEL_ENCODER_MAX_FILE_SIZE_MB", default_value_t = 50)]
    max_file_size_mb: u64,
}

impl Args {
    fn image_config(&self) -> ImageConfig {
        let defaults = ImageConfig::default();
        let download_timeout = Duration::from_secs(self.download_timeout_secs);
        ImageConfig {
            time_limit: Duration::from_secs(self.time_limit_secs),
            host_request_timeout: Duration::from_secs(self.host_timeout_secs),
            download_timeout,
            connect_timeout: defaults.connect_timeout.min(download_timeout),
            max_file_size: self.max_file_size_mb.saturating_mul(1024 * 1024),
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.image_config();
    log::info!(
        "setup: pixel_limit={} time_limit={:?} download_timeout={:?} filter={:?}",
        config.pixel_limit,
        config.time_limit,
        config.download_timeout,
        config.resize_filter
    );

    let state = match ImageServiceState::with_config(config) {
        Ok(state) => state,
        Err(err) => {
            log::error!("setup: 图片服务初始化失败: {err}");
            return Err(err);
        }
    };

    let app = api::router(state);
    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("setup: listening on http://{}{}", addr, api::PROCESS_IMAGE_PATH);

    axum::serve(listener, app).await?;
    Ok(())
}
