//! HTTP 服务
//!
//! # 路由
//!
//! - `POST /Protected/uploads` 接收单个 multipart `file` 字段，按原始文件名保存
//! - `GET /Protected/uploads/:filename` 返回已保存文件
//! - `GET /` 返回落地页 `index.html`
//! - 其余路径由静态目录提供

mod handlers;

use crate::config::AppSettings;
use crate::storage::UploadStore;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use handlers::UPLOAD_FIELD;

pub const UPLOAD_ROUTE: &str = "/Protected/uploads";
pub const DOWNLOAD_ROUTE: &str = "/Protected/uploads/:filename";

/// 服务器状态
pub struct AppState {
    pub settings: AppSettings,
    pub store: UploadStore,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        let store = UploadStore::new(&settings.uploads_dir);
        Self { settings, store }
    }
}

/// 构建路由（不绑定端口）
pub fn router(state: Arc<AppState>) -> Router {
    let index = ServeFile::new(state.settings.index_path());
    let assets = ServeDir::new(&state.settings.public_dir);

    Router::new()
        .route_service("/", index)
        .route(UPLOAD_ROUTE, post(handlers::upload))
        .route(DOWNLOAD_ROUTE, get(handlers::download))
        .fallback_service(assets)
        // 不限制上传大小
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 绑定 `settings.listen_addr()` 并运行服务
pub async fn serve(settings: AppSettings) -> anyhow::Result<()> {
    let listener = TcpListener::bind(settings.listen_addr()).await?;
    serve_on(listener, settings).await
}

/// 在已绑定的监听器上运行服务
pub async fn serve_on(listener: TcpListener, settings: AppSettings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(settings));
    state.store.ensure_dir().await?;

    let addr = listener.local_addr()?;
    info!("App listening at http://{}", addr);
    info!(
        "Serving {:?}, storing uploads in {:?}",
        state.settings.public_dir,
        state.store.dir()
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}
