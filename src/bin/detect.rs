// 该文件是 Luoshen （洛神） 项目的一部分。
// src/bin/detect.rs - 单张图像检测
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use luoshen::{
  FromUrl,
  input::ImageFileInput,
  model::{NudeNetBuilder, WithLabel},
  output::SaveImageFileOutput,
  task::{OneShotTask, Task},
};
use tracing::info;

/// 单张图像检测参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// NudeNet 模型，如 nudenet:///models/320n.onnx
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入图像，如 image:///tmp/in.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出图像，如 image:///tmp/out.jpg
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.25", value_name = "THRESHOLD")]
  pub confidence: f32,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let frame = ImageFileInput::from_url(&args.input)?.into_image();
  let model = NudeNetBuilder::from_url(&args.model)?
    .confidence(args.confidence)
    .build()?;
  let output = SaveImageFileOutput::from_url(&args.output)?;

  let result = OneShotTask.run_task(&frame, &model, &output)?;

  if result.is_empty() {
    println!("未检测到目标");
  } else {
    println!("检测到 {} 个目标", result.len());
  }
  for item in result.items.iter() {
    println!(
      "  - {}: {:.2}% at ({}, {}, {}x{})",
      item.kind.to_label_str(),
      item.score * 100.0,
      item.bbox[0],
      item.bbox[1],
      item.bbox[2],
      item.bbox[3]
    );
  }
  info!("结果已保存: {}", output.path().display());

  Ok(())
}
