//! 上传文件存储
//!
//! 文件按客户端提供的原始文件名保存在固定目录下。同名上传直接覆盖，
//! 服务本身从不删除文件。

use axum::body::Bytes;
use futures_util::{Stream, StreamExt, pin_mut};
use log::{debug, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// 上传目录
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 创建上传目录（已存在时无操作）
    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// 文件名对应的存储路径
    ///
    /// 只保留最后一个路径分量，`..`、空名等没有文件名分量的输入返回 `None`。
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        let file_name = Path::new(name).file_name()?;
        Some(self.dir.join(file_name))
    }

    /// 将数据流逐块写入文件，返回实际使用的文件名
    ///
    /// 数据不会整体缓存在内存中。流中途出错时删除已写入的部分文件。
    pub async fn save_stream<S, E>(&self, name: &str, stream: S) -> Result<String, E>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: From<io::Error>,
    {
        let path = self.path_for(name).ok_or_else(|| invalid_name(name))?;
        let file = File::create(&path).await?;

        match write_chunks(file, stream).await {
            Ok(written) => {
                info!("Stored upload {:?} ({} bytes)", path, written);
                Ok(path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default())
            }
            Err(e) => {
                warn!("Upload {:?} interrupted, removing partial file", path);
                let _ = fs::remove_file(&path).await;
                Err(e)
            }
        }
    }

    /// 打开已保存的文件
    pub async fn open(&self, name: &str) -> io::Result<File> {
        let path = self
            .path_for(name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, invalid_name(name)))?;
        debug!("Opening {:?}", path);
        File::open(&path).await
    }
}

async fn write_chunks<S, E>(mut file: File, stream: S) -> Result<u64, E>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: From<io::Error>,
{
    pin_mut!(stream);
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if !chunk.is_empty() {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
    }
    file.flush().await?;
    Ok(written)
}

fn invalid_name(name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("no file name in {:?}", name),
    )
}
