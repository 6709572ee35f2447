//! 应用配置和持久化
//!
//! 提供监听地址、静态目录、上传目录等设置的存储和读取。

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 3000;

/// 服务设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 监听地址
    pub bind_addr: String,
    /// 监听端口
    pub port: u16,
    /// 静态文件目录（包含 index.html）
    pub public_dir: PathBuf,
    /// 上传文件保存目录
    pub uploads_dir: PathBuf,
    /// 默认日志过滤器（RUST_LOG 优先）
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from("Public"),
            uploads_dir: PathBuf::from("Protected/uploads"),
            log_filter: "info,wavedrop_core=debug,tower_http=info".to_string(),
        }
    }
}

impl AppSettings {
    /// 获取配置文件路径
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wavedrop")
            .join("settings.toml")
    }

    /// 加载设置（如果文件不存在则使用默认值）
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// 从指定路径加载设置，解析失败时回退到默认值
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(settings) => {
                        debug!("Loaded settings from {:?}", path);
                        return settings;
                    }
                    Err(e) => {
                        log::warn!("Failed to parse settings: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read settings file: {}, using defaults", e);
                }
            }
        }
        Self::default()
    }

    /// 保存设置
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// `bind_addr:port` 形式的监听地址
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// 落地页路径
    pub fn index_path(&self) -> PathBuf {
        self.public_dir.join("index.html")
    }
}
