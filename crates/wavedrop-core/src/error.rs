//! 上传/下载服务的错误类型

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// 请求中没有 `file` 文件字段
    #[error("No files were uploaded.")]
    MissingFile,

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    Io(#[from] io::Error),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::MissingFile => StatusCode::BAD_REQUEST,
            ServiceError::Multipart(e) => e.status(),
            ServiceError::Io(e) if e.kind() == io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::debug!("Request rejected ({}): {}", status, self);
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServiceError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::from(io::Error::from(io::ErrorKind::NotFound)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::from(io::Error::from(io::ErrorKind::PermissionDenied)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_file_message() {
        assert_eq!(
            ServiceError::MissingFile.to_string(),
            "No files were uploaded."
        );
    }
}
