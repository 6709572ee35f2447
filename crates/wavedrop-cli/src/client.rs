//! HTTP Client - 与上传服务通信

use anyhow::{Context, Result, anyhow, bail};
use futures_util::StreamExt;
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use wavedrop_core::server::UPLOAD_FIELD;

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

/// 服务端上传路由下的 URL
pub fn uploads_url(server: &str, name: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(server).with_context(|| format!("invalid server URL: {}", server))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| anyhow!("server URL cannot be a base: {}", server))?;
        segments.pop_if_empty().extend(["Protected", "uploads"]);
        if let Some(name) = name {
            segments.push(name);
        }
    }
    Ok(url)
}

/// 未指定输出路径时的默认保存位置：当前目录下的同名文件
///
/// 只取名称的最后一个路径分量，与服务端保存规则一致。
pub fn default_output(name: &str) -> Result<PathBuf> {
    Path::new(name)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("cannot derive an output file from {:?}, use -o", name))
}

pub struct UploadClient {
    server: String,
    http: reqwest::Client,
}

impl UploadClient {
    pub fn new(server: &str) -> Self {
        Self {
            server: server.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// 上传文件，返回服务端保存的文件名
    pub async fn upload(&self, path: &Path) -> Result<String> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("not a file path: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;

        let form = Form::new().part(UPLOAD_FIELD, Part::bytes(bytes).file_name(name));
        let response = self
            .http
            .post(uploads_url(&self.server, None)?)
            .multipart(form)
            .send()
            .await
            .map_err(|e| connect_hint(e, &self.server))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            bail!("upload failed ({}): {}", status, body);
        }
        Ok(body)
    }

    /// 下载文件到 `output`，返回写入的字节数
    pub async fn download(&self, name: &str, output: &Path) -> Result<u64> {
        let response = self
            .http
            .get(uploads_url(&self.server, Some(name))?)
            .send()
            .await
            .map_err(|e| connect_hint(e, &self.server))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("download failed ({}): {}", status, body);
        }

        let mut file = tokio::fs::File::create(output)
            .await
            .with_context(|| format!("failed to create {}", output.display()))?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

fn connect_hint(error: reqwest::Error, server: &str) -> anyhow::Error {
    if error.is_connect() {
        anyhow!(
            "无法连接到服务器 {}: {}\n   运行: cargo run -p wavedrop-server 启动服务",
            server,
            error
        )
    } else {
        error.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use wavedrop_core::AppSettings;
    use wavedrop_core::server::serve_on;

    #[test]
    fn test_uploads_url() {
        assert_eq!(
            uploads_url(DEFAULT_SERVER, None).unwrap().as_str(),
            "http://localhost:3000/Protected/uploads"
        );
        assert_eq!(
            uploads_url("http://example.com/", Some("my file.txt"))
                .unwrap()
                .as_str(),
            "http://example.com/Protected/uploads/my%20file.txt"
        );
    }

    #[test]
    fn test_default_output_keeps_last_component() {
        assert_eq!(default_output("notes.txt").unwrap(), PathBuf::from("notes.txt"));
        assert_eq!(default_output("../x").unwrap(), PathBuf::from("x"));
        assert_eq!(default_output("a/b").unwrap(), PathBuf::from("b"));
        assert!(default_output("..").is_err());
        assert!(default_output("").is_err());
    }

    /// 启动本地服务，完整走一遍上传和下载
    #[tokio::test]
    async fn test_upload_and_download_against_server() {
        let root = std::env::temp_dir().join(format!("wavedrop-cli-{}", std::process::id()));
        tokio::fs::create_dir_all(&root).await.unwrap();
        let settings = AppSettings {
            public_dir: root.join("Public"),
            uploads_dir: root.join("uploads"),
            ..Default::default()
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(serve_on(listener, settings));

        let source = root.join("src.bin");
        tokio::fs::write(&source, b"hello world").await.unwrap();

        let client = UploadClient::new(&server);
        assert_eq!(client.upload(&source).await.unwrap(), "src.bin");

        let output = root.join("copy.bin");
        assert_eq!(client.download("src.bin", &output).await.unwrap(), 11);
        assert_eq!(tokio::fs::read(&output).await.unwrap(), b"hello world");

        // 非成功状态返回错误，且不创建输出文件
        let missing = root.join("missing.bin");
        let err = client.download("nope.bin", &missing).await.unwrap_err();
        assert!(err.to_string().contains("404"), "{}", err);
        assert!(!missing.exists());

        handle.abort();
        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[test]
    fn test_invalid_server_url() {
        assert!(uploads_url("not a url", None).is_err());
        assert!(uploads_url("mailto:someone@example.com", None).is_err());
    }
}
