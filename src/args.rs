// 该文件是 Luoshen （洛神） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Luoshen 服务参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 监听地址
  #[arg(long, env = "LUOSHEN_BIND", default_value = "127.0.0.1:5000", value_name = "ADDR")]
  pub bind: SocketAddr,

  /// NudeNet ONNX 模型，文件路径或 nudenet:///path/to/320n.onnx
  #[arg(long, env = "LUOSHEN_MODEL", value_name = "MODEL")]
  pub model: String,

  /// 上传文件目录
  #[arg(long, env = "LUOSHEN_UPLOAD_DIR", default_value = "uploads", value_name = "DIR")]
  pub upload_dir: PathBuf,

  /// 结果文件目录
  #[arg(long, env = "LUOSHEN_RESULT_DIR", default_value = "results", value_name = "DIR")]
  pub result_dir: PathBuf,

  /// 标注字体（TrueType），加载失败时使用内置字体
  #[arg(long, env = "LUOSHEN_FONT", default_value = "arial.ttf", value_name = "FILE")]
  pub font: PathBuf,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.25", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.45", value_name = "THRESHOLD")]
  pub nms_threshold: f32,

  /// 上传大小上限（MiB）
  #[arg(long, env = "LUOSHEN_MAX_UPLOAD_MB", default_value = "32", value_name = "MIB")]
  pub max_upload_mb: usize,
}
