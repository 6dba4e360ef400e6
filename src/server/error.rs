// 该文件是 Luoshen （洛神） 项目的一部分。
// src/server/error.rs - HTTP 错误响应
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use axum::{
  Json,
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::{input::ImageFileInputError, storage::StorageError};

#[derive(Error, Debug)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),
  #[error("File not found")]
  NotFound,
  /// 删除接口以 JSON 返回 404
  #[error("File not found")]
  NotFoundJson,
  /// multipart 读取失败，状态码沿用 axum 的判定（如超出上传上限时为 413）
  #[error("{1}")]
  Multipart(StatusCode, String),
  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  pub fn status_code(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound | ApiError::NotFoundJson => StatusCode::NOT_FOUND,
      ApiError::Multipart(status, _) => *status,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status_code();
    match self {
      ApiError::NotFoundJson => {
        (status, Json(json!({ "message": "File not found" }))).into_response()
      }
      other => (status, other.to_string()).into_response(),
    }
  }
}

impl From<StorageError> for ApiError {
  fn from(err: StorageError) -> Self {
    match err {
      StorageError::NotFound(_) | StorageError::InvalidName(_) => {
        warn!("{}", err);
        ApiError::NotFound
      }
      StorageError::IoError(e) => {
        error!("存储错误: {}", e);
        ApiError::Internal("Storage error".to_string())
      }
    }
  }
}

impl From<ImageFileInputError> for ApiError {
  fn from(err: ImageFileInputError) -> Self {
    match err {
      ImageFileInputError::ImageLoadError(e) => {
        warn!("无法解码上传图像: {}", e);
        ApiError::BadRequest("Invalid image".to_string())
      }
      other => {
        error!("读取上传文件失败: {}", other);
        ApiError::Internal("Storage error".to_string())
      }
    }
  }
}

impl From<MultipartError> for ApiError {
  fn from(err: MultipartError) -> Self {
    warn!("multipart 解析失败: {}", err);
    ApiError::Multipart(err.status(), err.body_text())
  }
}

impl From<anyhow::Error> for ApiError {
  fn from(err: anyhow::Error) -> Self {
    error!("检测流程失败: {:#}", err);
    ApiError::Internal("Detection failed".to_string())
  }
}

impl From<tokio::task::JoinError> for ApiError {
  fn from(err: tokio::task::JoinError) -> Self {
    error!("检测任务异常退出: {}", err);
    ApiError::Internal("Detection failed".to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_codes() {
    assert_eq!(
      ApiError::BadRequest("No file uploaded".into()).status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::NotFoundJson.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
      ApiError::Internal("x".into()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn storage_errors_map_to_not_found() {
    let err: ApiError = StorageError::InvalidName("..".into()).into();
    assert!(matches!(err, ApiError::NotFound));
    let err: ApiError = StorageError::IoError(std::io::Error::other("disk")).into();
    assert!(matches!(err, ApiError::Internal(_)));
  }

  #[test]
  fn upload_read_failure_is_internal() {
    let err: ApiError = ImageFileInputError::IoError(std::io::Error::other("disk")).into();
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let decode = image::ImageError::IoError(std::io::Error::other("truncated"));
    let err: ApiError = ImageFileInputError::ImageLoadError(decode).into();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Invalid image");
  }

  #[test]
  fn multipart_keeps_status() {
    let err = ApiError::Multipart(StatusCode::PAYLOAD_TOO_LARGE, "failed to read stream".into());
    assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(err.to_string(), "failed to read stream");
  }
}
