//! Wavedrop Server
//!
//! 静态文件服务器：
//! - `GET /` 落地页，其余路径由静态目录提供
//! - `POST /Protected/uploads` 上传单个文件
//! - `GET /Protected/uploads/:filename` 下载文件

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wavedrop_core::AppSettings;

#[derive(Parser, Debug)]
#[command(name = "wavedrop-server", version, about = "Wavedrop 静态文件与上传服务")]
struct Args {
    /// 监听端口
    #[arg(short, long, env = "WAVEDROP_PORT")]
    port: Option<u16>,
    /// 监听地址
    #[arg(short, long, env = "WAVEDROP_BIND")]
    bind: Option<String>,
    /// 静态文件目录
    #[arg(long, env = "WAVEDROP_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,
    /// 上传文件保存目录
    #[arg(long, env = "WAVEDROP_UPLOADS_DIR")]
    uploads_dir: Option<PathBuf>,
    /// 配置文件 (默认: ~/.config/wavedrop/settings.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    /// 命令行参数覆盖配置文件
    fn apply(self, mut settings: AppSettings) -> AppSettings {
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(bind) = self.bind {
            settings.bind_addr = bind;
        }
        if let Some(dir) = self.public_dir {
            settings.public_dir = dir;
        }
        if let Some(dir) = self.uploads_dir {
            settings.uploads_dir = dir;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => AppSettings::load_from(path),
        None => AppSettings::load(),
    };
    let settings = args.apply(settings);

    // 桥接 log crate（wavedrop-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    // 初始化日志
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .try_init();

    tracing::info!("Wavedrop server starting...");

    tokio::select! {
        res = wavedrop_core::server::serve(settings) => {
            if let Err(e) = &res {
                tracing::error!("Server exited: {:?}", e);
            }
            res
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}
