//! Wavedrop Core Library
//!
//! 静态文件服务器（单一上传/下载路由）以及装饰性背景动画引擎。
//! 两部分互不依赖。
//!
//! # 模块
//!
//! - **server**: axum 路由，上传、下载、落地页和静态资源
//! - **storage**: 按原始文件名保存上传文件
//! - **animation**: 波浪平面 / 粒子网络的逐帧更新
//! - **config**: 设置的加载与保存
//! - **logging**: 查看器使用的日志条目与缓冲区
//!
//! # 使用示例
//!
//! ## 运行服务
//!
//! ```ignore
//! use wavedrop_core::{AppSettings, server};
//!
//! let settings = AppSettings::load();
//! server::serve(settings).await?;
//! ```
//!
//! ## 驱动动画
//!
//! ```ignore
//! use wavedrop_core::animation::{Pointer, Scene, Viewport};
//!
//! let mut scene = Scene::random(Viewport::new(1920, 1080), &mut rand::thread_rng());
//! loop {
//!     scene.step(Pointer::Absent);
//!     // 读取 scene.variant() 绘制
//! }
//! ```

pub mod animation;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod storage;

pub use glam;

pub use animation::{Mode, Pointer, Scene, Viewport};
pub use config::AppSettings;
pub use error::ServiceError;
pub use logging::{LogBuffer, LogEntry, LogLevel};
pub use server::{AppState, router};
pub use storage::UploadStore;
