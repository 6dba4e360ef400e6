// 该文件是 Luoshen （洛神） 项目的一部分。
// src/server/handlers.rs - 路由处理
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
  body::Bytes,
  extract::{Multipart, Path, State},
  http::header,
  response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use super::{ApiError, AppState, pages};
use crate::{
  input::ImageFileInput,
  model::WithLabel,
  output::SaveImageFileOutput,
  storage::{self, StorageError},
  task::{OneShotTask, Task},
};

const IMAGE_FIELD: &str = "image";

/// GET / - 上传页面
pub async fn index_handler() -> Html<&'static str> {
  Html(pages::index_page())
}

/// GET /results - 结果列表页面
pub async fn list_results_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
  let result_files = state.storage.list_results()?;
  debug!("结果文件数量: {}", result_files.len());
  Ok(Html(pages::results_page(&result_files)))
}

/// POST /detect - 上传图像并返回标注后的结果
///
/// 没有名为 `image` 的文件字段时返回 400 `No file uploaded`，
/// 文件名为空时返回 400 `No selected file`。
pub async fn detect_handler(
  State(state): State<AppState>,
  mut multipart: Multipart,
) -> Result<Response, ApiError> {
  let mut upload = None;
  while let Some(field) = multipart.next_field().await? {
    if field.name() != Some(IMAGE_FIELD) {
      continue;
    }
    // 不带 filename 的普通表单字段不算上传文件
    let Some(file_name) = field.file_name().map(str::to_string) else {
      continue;
    };
    let data = field.bytes().await?;
    upload = Some((file_name, data));
    break;
  }

  let (file_name, data) =
    upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
  if file_name.is_empty() {
    return Err(ApiError::BadRequest("No selected file".to_string()));
  }

  let (result_name, bytes) =
    tokio::task::spawn_blocking(move || process_upload(&state, &file_name, &data)).await??;

  Ok(image_response(&result_name, bytes))
}

/// 保存上传 → 推理 → 绘制 → 保存结果，返回结果文件名与内容
fn process_upload(
  state: &AppState,
  file_name: &str,
  data: &Bytes,
) -> Result<(String, Vec<u8>), ApiError> {
  let upload_name = state.storage.save_upload(file_name, data)?;
  let frame = ImageFileInput::open(state.storage.upload_path(&upload_name))?.into_image();

  let result_name = storage::result_name(&upload_name);
  let output = SaveImageFileOutput::new(
    state.storage.result_path(&result_name)?,
    state.draw.clone(),
  );
  let result = OneShotTask.run_task(&frame, state.model.as_ref(), &output)?;

  if result.is_empty() {
    info!("{} 未检测到目标", upload_name);
  } else {
    info!("{} 检测到 {} 个目标", upload_name, result.len());
  }
  for item in result.items.iter() {
    debug!(
      "  - {}: {:.2} at {:?}",
      item.kind.to_label_str(),
      item.score,
      item.bbox
    );
  }

  let bytes = state.storage.open_result(&result_name)?;
  Ok((result_name, bytes))
}

/// GET /result/{filename} - 读取单个结果图像
pub async fn get_result_handler(
  State(state): State<AppState>,
  Path(filename): Path<String>,
) -> Result<Response, ApiError> {
  let bytes = state.storage.open_result(&filename)?;
  Ok(image_response(&filename, bytes))
}

/// POST /delete/{filename} - 删除结果后跳转回列表
pub async fn delete_result_handler(
  State(state): State<AppState>,
  Path(filename): Path<String>,
) -> Result<Redirect, ApiError> {
  match state.storage.delete_result(&filename) {
    Ok(()) => Ok(Redirect::to("/results")),
    Err(StorageError::NotFound(_) | StorageError::InvalidName(_)) => Err(ApiError::NotFoundJson),
    Err(e) => Err(e.into()),
  }
}

fn image_response(name: &str, bytes: Vec<u8>) -> Response {
  ([(header::CONTENT_TYPE, storage::content_type(name))], bytes).into_response()
}
