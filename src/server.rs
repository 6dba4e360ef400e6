// 该文件是 Luoshen （洛神） 项目的一部分。
// src/server.rs - HTTP 服务
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

use std::{net::SocketAddr, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use image::RgbImage;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
  model::{DetectResult, Model, NudeLabel, NudeNetError},
  output::draw::Draw,
  storage::Storage,
};

mod error;
mod handlers;
mod pages;

pub use self::error::ApiError;

/// 默认上传大小上限 32 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub type SharedModel = Arc<
  dyn Model<Input = RgbImage, Output = DetectResult<NudeLabel>, Error = NudeNetError> + Send + Sync,
>;

#[derive(Clone)]
pub struct AppState {
  pub model: SharedModel,
  pub draw: Draw,
  pub storage: Arc<Storage>,
  pub max_upload_bytes: usize,
}

impl AppState {
  pub fn new(model: SharedModel, draw: Draw, storage: Storage) -> Self {
    AppState {
      model,
      draw,
      storage: Arc::new(storage),
      max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
    }
  }

  pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
    self.max_upload_bytes = max_upload_bytes;
    self
  }
}

pub fn create_app(state: AppState) -> Router {
  let max_upload_bytes = state.max_upload_bytes;

  Router::new()
    .route("/", get(handlers::index_handler))
    .route("/results", get(handlers::list_results_handler))
    .route("/detect", post(handlers::detect_handler))
    .route("/result/:filename", get(handlers::get_result_handler))
    .route("/delete/:filename", post(handlers::delete_result_handler))
    .layer(DefaultBodyLimit::max(max_upload_bytes))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
  let app = create_app(state);
  let listener = tokio::net::TcpListener::bind(addr).await?;

  info!("HTTP 服务监听于 {}", addr);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  info!("HTTP 服务已退出");
  Ok(())
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    info!("收到中断信号，准备退出...");
  }
}
