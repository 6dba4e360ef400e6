// 该文件是 Luoshen （洛神） 项目的一部分。
// src/storage.rs - 上传与结果目录管理
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

use std::path::{Path, PathBuf};

use chrono::Local;
use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

const RESULT_PREFIX: &str = "result_";
const FALLBACK_EXTENSION: &str = "png";

#[derive(Error, Debug)]
pub enum StorageError {
  #[error("文件不存在: {0}")]
  NotFound(String),
  #[error("非法文件名: {0}")]
  InvalidName(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 上传目录与结果目录，二者均为扁平目录
#[derive(Debug, Clone)]
pub struct Storage {
  upload_dir: PathBuf,
  result_dir: PathBuf,
}

impl Storage {
  /// 打开存储目录，不存在时创建
  pub fn open(
    upload_dir: impl Into<PathBuf>,
    result_dir: impl Into<PathBuf>,
  ) -> Result<Self, StorageError> {
    let storage = Storage {
      upload_dir: upload_dir.into(),
      result_dir: result_dir.into(),
    };
    std::fs::create_dir_all(&storage.upload_dir)?;
    std::fs::create_dir_all(&storage.result_dir)?;
    info!(
      "上传目录: {}, 结果目录: {}",
      storage.upload_dir.display(),
      storage.result_dir.display()
    );

    Ok(storage)
  }

  pub fn upload_dir(&self) -> &Path {
    &self.upload_dir
  }

  pub fn result_dir(&self) -> &Path {
    &self.result_dir
  }

  /// 保存上传内容，返回生成的文件名 `{时间戳}_{uuid}{扩展名}`
  pub fn save_upload(&self, original_name: &str, data: &[u8]) -> Result<String, StorageError> {
    let name = upload_name(original_name);
    let path = self.upload_dir.join(&name);
    std::fs::write(&path, data)?;
    debug!(
      "保存上传文件: {} ({} 字节) -> {}",
      original_name,
      data.len(),
      path.display()
    );

    Ok(name)
  }

  pub fn upload_path(&self, name: &str) -> PathBuf {
    self.upload_dir.join(name)
  }

  /// 结果文件的完整路径，文件名需通过校验
  pub fn result_path(&self, name: &str) -> Result<PathBuf, StorageError> {
    validate_name(name)?;
    Ok(self.result_dir.join(name))
  }

  /// 列出结果目录中的普通文件，按文件名排序
  pub fn list_results(&self) -> Result<Vec<String>, StorageError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(&self.result_dir)? {
      let entry = entry?;
      if !entry.file_type()?.is_file() {
        continue;
      }
      if let Some(name) = entry.file_name().to_str() {
        names.push(name.to_string());
      }
    }
    names.sort();

    Ok(names)
  }

  pub fn open_result(&self, name: &str) -> Result<Vec<u8>, StorageError> {
    let path = self.existing_result(name)?;
    Ok(std::fs::read(path)?)
  }

  pub fn delete_result(&self, name: &str) -> Result<(), StorageError> {
    let path = self.existing_result(name)?;
    std::fs::remove_file(&path)?;
    info!("删除结果文件: {}", path.display());
    Ok(())
  }

  fn existing_result(&self, name: &str) -> Result<PathBuf, StorageError> {
    let path = self.result_path(name)?;
    if !path.is_file() {
      return Err(StorageError::NotFound(name.to_string()));
    }
    Ok(path)
  }
}

fn upload_name(original_name: &str) -> String {
  let timestamp = Local::now().format("%Y%m%d_%H%M%S");
  let unique_id = Uuid::new_v4().simple();
  let extension = Path::new(original_name)
    .extension()
    .and_then(|ext| ext.to_str())
    .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    .map(|ext| format!(".{}", ext))
    .unwrap_or_default();

  format!("{}_{}{}", timestamp, unique_id, extension)
}

/// 由上传文件名得到结果文件名，编码器不支持的扩展名改存为 PNG
pub fn result_name(upload_name: &str) -> String {
  let path = Path::new(upload_name);
  let writable = ImageFormat::from_path(path)
    .map(|format| format.writing_enabled())
    .unwrap_or(false);

  if writable {
    format!("{}{}", RESULT_PREFIX, upload_name)
  } else {
    let stem = path
      .file_stem()
      .and_then(|stem| stem.to_str())
      .unwrap_or(upload_name);
    format!("{}{}.{}", RESULT_PREFIX, stem, FALLBACK_EXTENSION)
  }
}

/// 按扩展名推断 MIME 类型
pub fn content_type(name: &str) -> &'static str {
  ImageFormat::from_path(name)
    .map(|format| format.to_mime_type())
    .unwrap_or("application/octet-stream")
}

fn validate_name(name: &str) -> Result<(), StorageError> {
  if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
    return Err(StorageError::InvalidName(name.to_string()));
  }
  Ok(())
}
