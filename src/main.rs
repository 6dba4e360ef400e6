// 该文件是 Luoshen （洛神） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use url::Url;

use luoshen::{
  FromUrl,
  model::NudeNetBuilder,
  output::draw::Draw,
  server::{AppState, serve},
  storage::Storage,
};

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("Luoshen 检测服务");
  info!("模型: {}", args.model);
  info!("上传目录: {}", args.upload_dir.display());
  info!("结果目录: {}", args.result_dir.display());
  info!("置信度阈值: {}", args.confidence);
  info!("NMS 阈值: {}", args.nms_threshold);

  // 带 nudenet 方案的按 URL 解析，否则视为文件路径
  let builder = match Url::parse(&args.model) {
    Ok(url) if url.scheme() == "nudenet" => NudeNetBuilder::from_url(&url)?,
    _ => NudeNetBuilder::new(&args.model),
  };
  let model = builder
    .confidence(args.confidence)
    .nms_threshold(args.nms_threshold)
    .build()
    .with_context(|| format!("无法加载模型: {}", args.model))?;

  let storage = Storage::open(&args.upload_dir, &args.result_dir)
    .context("无法创建上传或结果目录")?;
  let draw = Draw::with_font_file(&args.font);

  let state = AppState::new(Arc::new(model), draw, storage)
    .with_max_upload_bytes(args.max_upload_mb * 1024 * 1024);

  serve(state, args.bind).await
}
