//! 集成测试 - 上传/下载服务
//!
//! 直接通过 `tower::ServiceExt::oneshot` 驱动路由，不绑定端口。

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use wavedrop_core::{AppSettings, AppState, router};

const BOUNDARY: &str = "wavedrop-test-boundary";

/// 每个测试使用独立的临时目录
struct Fixture {
    root: PathBuf,
    state: Arc<AppState>,
}

impl Fixture {
    async fn new() -> Self {
        let root = std::env::temp_dir().join(format!("wavedrop-test-{}", uuid::Uuid::new_v4()));
        let public_dir = root.join("Public");
        tokio::fs::create_dir_all(&public_dir).await.unwrap();
        tokio::fs::write(public_dir.join("index.html"), "<h1>landing</h1>")
            .await
            .unwrap();
        tokio::fs::write(public_dir.join("style.css"), "body { margin: 0 }")
            .await
            .unwrap();

        let settings = AppSettings {
            public_dir,
            uploads_dir: root.join("Protected").join("uploads"),
            ..Default::default()
        };
        let state = Arc::new(AppState::new(settings));
        state.store.ensure_dir().await.unwrap();

        Self { root, state }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        router(self.state.clone()).oneshot(request).await.unwrap()
    }

    async fn upload(&self, parts: &[Part<'_>]) -> Response {
        self.send(multipart_request(parts)).await
    }

    async fn get(&self, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    data: &'a [u8],
}

fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, filename
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        if part.filename.is_some() {
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/Protected/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

fn file_part<'a>(filename: &'a str, data: &'a [u8]) -> Part<'a> {
    Part {
        name: "file",
        filename: Some(filename),
        data,
    }
}

/// 上传 X 后下载 X 得到相同字节
#[tokio::test]
async fn test_upload_then_download_roundtrip() {
    let fixture = Fixture::new().await;
    let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    let response = fixture.upload(&[file_part("blob.bin", &data)]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"blob.bin");

    let response = fixture.get("/Protected/uploads/blob.bin").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        data.len().to_string()
    );
    assert_eq!(body_bytes(response).await, data);
}

/// 超过 axum 默认 2 MB 请求体上限的文件也能完整保存
#[tokio::test]
async fn test_large_upload_roundtrip() {
    let fixture = Fixture::new().await;
    let data: Vec<u8> = (0..5 * 1024 * 1024u32).map(|i| (i % 251) as u8).collect();

    let response = fixture.upload(&[file_part("large.bin", &data)]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"large.bin");

    let stored = fixture.state.store.dir().join("large.bin");
    assert_eq!(
        tokio::fs::metadata(&stored).await.unwrap().len(),
        data.len() as u64
    );

    let response = fixture.get("/Protected/uploads/large.bin").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await == data);
}

#[tokio::test]
async fn test_upload_without_file_part_is_bad_request() {
    let fixture = Fixture::new().await;

    let response = fixture
        .upload(&[Part {
            name: "comment",
            filename: None,
            data: b"hello",
        }])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_bytes(response).await, b"No files were uploaded.");
}

/// `file` 字段没有文件名时视为普通文本字段
#[tokio::test]
async fn test_file_field_without_filename_is_bad_request() {
    let fixture = Fixture::new().await;

    let response = fixture
        .upload(&[Part {
            name: "file",
            filename: None,
            data: b"plain text",
        }])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_non_multipart_is_client_error() {
    let fixture = Fixture::new().await;

    let request = Request::builder()
        .method("POST")
        .uri("/Protected/uploads")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("not a form"))
        .unwrap();
    let response = fixture.send(request).await;
    assert!(response.status().is_client_error(), "{}", response.status());
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let fixture = Fixture::new().await;

    let response = fixture.get("/Protected/uploads/missing.txt").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!body_bytes(response).await.is_empty());
}

/// 同名上传覆盖旧文件
#[tokio::test]
async fn test_reupload_overwrites() {
    let fixture = Fixture::new().await;

    fixture.upload(&[file_part("notes.txt", b"first")]).await;
    let response = fixture.upload(&[file_part("notes.txt", b"second")]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = fixture.get("/Protected/uploads/notes.txt").await;
    assert_eq!(body_bytes(response).await, b"second");
}

#[tokio::test]
async fn test_other_fields_are_ignored() {
    let fixture = Fixture::new().await;

    let response = fixture
        .upload(&[
            Part {
                name: "comment",
                filename: None,
                data: b"ignored",
            },
            file_part("report.txt", b"contents"),
        ])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"report.txt");
}

#[tokio::test]
async fn test_download_content_type_from_extension() {
    let fixture = Fixture::new().await;
    fixture.upload(&[file_part("hello.txt", b"hi")]).await;

    let response = fixture.get("/Protected/uploads/hello.txt").await;
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"), "{}", content_type);
}

/// 带目录的文件名只保留最后一段，保存在上传目录内
#[tokio::test]
async fn test_upload_name_keeps_last_component() {
    let fixture = Fixture::new().await;

    let response = fixture
        .upload(&[file_part("../escape.txt", b"contained")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"escape.txt");

    let stored = fixture.state.store.dir().join("escape.txt");
    assert_eq!(tokio::fs::read(stored).await.unwrap(), b"contained");
    assert!(!fixture.root.join("Protected").join("escape.txt").exists());
}

#[tokio::test]
async fn test_root_serves_landing_page() {
    let fixture = Fixture::new().await;

    let response = fixture.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"<h1>landing</h1>");
}

#[tokio::test]
async fn test_static_assets_served_from_public_dir() {
    let fixture = Fixture::new().await;

    let response = fixture.get("/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"body { margin: 0 }");

    let response = fixture.get("/missing.css").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
