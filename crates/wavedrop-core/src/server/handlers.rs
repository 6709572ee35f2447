use super::AppState;
use crate::error::ServiceError;
use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use log::{debug, info};
use std::io;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// 上传表单中的文件字段名
pub const UPLOAD_FIELD: &str = "file";

/// 保存第一个 `file` 字段，返回保存的文件名
///
/// 其他字段以及没有文件名的 `file` 字段会被忽略。
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<String, ServiceError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if state.store.path_for(&file_name).is_none() {
            continue;
        }

        info!("Receiving upload: {}", file_name);
        let chunks = field.map(|chunk| chunk.map_err(ServiceError::from));
        let stored = state.store.save_stream(&file_name, chunks).await?;
        return Ok(stored);
    }

    Err(ServiceError::MissingFile)
}

pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ServiceError> {
    let file = state.store.open(&filename).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a file", filename),
        )
        .into());
    }

    info!("Serving download: {} ({} bytes)", filename, metadata.len());
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    let stream = ReaderStream::new(file);

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
