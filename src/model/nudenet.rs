// 该文件是 Luoshen （洛神） 项目的一部分。
// src/model/nudenet.rs - NudeNet 检测模型
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

use std::path::PathBuf;

use image::{RgbImage, imageops};
use thiserror::Error;
use tracing::{debug, info};
use tract_onnx::prelude::*;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{DetectItem, DetectResult, Model, NudeLabel, WithLabel},
};

const NUDENET_INPUT_SIZE: usize = 320;
const NUDENET_BOX_CHANNELS: usize = 4;
const NUDENET_CONFIDENCE: f32 = 0.25;
const NUDENET_NMS_THRESHOLD: f32 = 0.45;

type NudeNetPlan = TypedRunnableModel<TypedModel>;

#[derive(Error, Debug)]
pub enum NudeNetError {
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("推理引擎错误: {0}")]
  TractError(TractError),
  #[error("模型输出形状无效: {0:?}")]
  OutputShape(Vec<usize>),
}

impl From<TractError> for NudeNetError {
  fn from(err: TractError) -> Self {
    NudeNetError::TractError(err)
  }
}

pub struct NudeNet {
  plan: NudeNetPlan,
  confidence: f32,
  nms_threshold: f32,
}

pub struct NudeNetBuilder {
  model_path: PathBuf,
  confidence: f32,
  nms_threshold: f32,
}

impl FromUrlWithScheme for NudeNetBuilder {
  const SCHEME: &'static str = "nudenet";
}

impl FromUrl for NudeNetBuilder {
  type Error = NudeNetError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(NudeNetError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    Ok(NudeNetBuilder::new(url.path()))
  }
}

impl NudeNetBuilder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    NudeNetBuilder {
      model_path: model_path.into(),
      confidence: NUDENET_CONFIDENCE,
      nms_threshold: NUDENET_NMS_THRESHOLD,
    }
  }

  pub fn confidence(mut self, confidence: f32) -> Self {
    self.confidence = confidence;
    self
  }

  pub fn nms_threshold(mut self, nms_threshold: f32) -> Self {
    self.nms_threshold = nms_threshold;
    self
  }

  pub fn build(self) -> Result<NudeNet, NudeNetError> {
    info!("加载模型文件: {}", self.model_path.display());
    let metadata = std::fs::metadata(&self.model_path).map_err(|e| {
      NudeNetError::ModelPathError(format!("{}: {}", self.model_path.display(), e))
    })?;
    debug!(
      "模型文件大小: {:.2} MB",
      metadata.len() as f64 / (1024.0 * 1024.0)
    );

    let size = NUDENET_INPUT_SIZE;
    let plan = tract_onnx::onnx()
      .model_for_path(&self.model_path)?
      .with_input_fact(0, f32::fact([1, 3, size, size]).into())?
      .into_optimized()?
      .into_runnable()?;
    info!(
      "模型加载完成，置信度阈值: {}, NMS 阈值: {}",
      self.confidence, self.nms_threshold
    );

    Ok(NudeNet {
      plan,
      confidence: self.confidence,
      nms_threshold: self.nms_threshold,
    })
  }
}

impl Model for NudeNet {
  type Input = RgbImage;
  type Output = DetectResult<NudeLabel>;
  type Error = NudeNetError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    if input.width() == 0 || input.height() == 0 {
      return Ok(Vec::new().into());
    }

    let letterbox = Letterbox::new(input.width(), input.height());
    debug!("预处理图像: {:?}", letterbox);
    let tensor = letterbox.to_tensor(input);

    debug!("执行模型推理");
    let outputs = self.plan.run(tvec!(tensor.into()))?;
    let output = outputs
      .first()
      .ok_or_else(|| NudeNetError::OutputShape(Vec::new()))?;

    let view = output.to_array_view::<f32>()?;
    let shape = view.shape().to_vec();
    if shape.len() != 3 || shape[1] <= NUDENET_BOX_CHANNELS {
      return Err(NudeNetError::OutputShape(shape));
    }
    let view = view
      .into_dimensionality::<tract_ndarray::Ix3>()
      .map_err(|_| NudeNetError::OutputShape(shape))?;

    let candidates = decode_output(view, &letterbox, self.confidence);
    debug!("候选框数量: {}", candidates.len());
    let items = nms(candidates, self.nms_threshold);
    debug!("检测结果: {:?}", items);

    Ok(items.into())
  }
}

/// 等比缩放并居中填充到 320x320 的几何参数
#[derive(Debug, Clone, Copy, PartialEq)]
struct Letterbox {
  width: u32,
  height: u32,
  pad_left: u32,
  pad_top: u32,
  resize_factor: f32,
}

impl Letterbox {
  fn new(image_width: u32, image_height: u32) -> Self {
    let size = NUDENET_INPUT_SIZE as u32;
    let aspect = image_width as f32 / image_height as f32;
    let (width, height) = if image_height > image_width {
      ((size as f32 * aspect).round() as u32, size)
    } else {
      (size, (size as f32 / aspect).round() as u32)
    };
    let (width, height) = (width.clamp(1, size), height.clamp(1, size));

    // 原图与缩放图对角线长度之比
    let (iw, ih) = (image_width as f32, image_height as f32);
    let (rw, rh) = (width as f32, height as f32);
    let resize_factor = ((iw * iw + ih * ih) / (rw * rw + rh * rh)).sqrt();

    Letterbox {
      width,
      height,
      pad_left: (size - width) / 2,
      pad_top: (size - height) / 2,
      resize_factor,
    }
  }

  fn to_tensor(&self, image: &RgbImage) -> Tensor {
    let size = NUDENET_INPUT_SIZE;
    let resized = imageops::resize(
      image,
      self.width,
      self.height,
      imageops::FilterType::Triangle,
    );
    let mut canvas = RgbImage::new(size as u32, size as u32);
    imageops::overlay(
      &mut canvas,
      &resized,
      self.pad_left as i64,
      self.pad_top as i64,
    );

    tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
      canvas.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    })
    .into()
  }

  /// 将模型坐标（中心点 + 宽高）还原为原图 [x, y, width, height]
  fn restore(&self, cx: f32, cy: f32, w: f32, h: f32) -> [i32; 4] {
    let f = self.resize_factor;
    [
      ((cx - w * 0.5 - self.pad_left as f32) * f).round() as i32,
      ((cy - h * 0.5 - self.pad_top as f32) * f).round() as i32,
      (w * f).round() as i32,
      (h * f).round() as i32,
    ]
  }
}

/// 解析 [1, 4 + 类别数, 锚点数] 的输出
fn decode_output(
  output: tract_ndarray::ArrayView3<f32>,
  letterbox: &Letterbox,
  confidence: f32,
) -> Vec<DetectItem<NudeLabel>> {
  let (channels, anchors) = (output.shape()[1], output.shape()[2]);
  let mut items = Vec::new();

  for anchor in 0..anchors {
    let mut score = f32::MIN;
    let mut class_id = 0usize;
    for c in NUDENET_BOX_CHANNELS..channels {
      let value = output[[0, c, anchor]];
      if value > score {
        score = value;
        class_id = c - NUDENET_BOX_CHANNELS;
      }
    }

    if score < confidence {
      continue;
    }

    let Some(kind) = NudeLabel::from_label_id(class_id as u32) else {
      debug!("忽略未知类别: {}", class_id);
      continue;
    };

    let bbox = letterbox.restore(
      output[[0, 0, anchor]],
      output[[0, 1, anchor]],
      output[[0, 2, anchor]],
      output[[0, 3, anchor]],
    );
    items.push(DetectItem { kind, score, bbox });
  }

  items
}

/// 非极大值抑制（不区分类别）
fn nms<T>(mut items: Vec<DetectItem<T>>, threshold: f32) -> Vec<DetectItem<T>> {
  // 按置信度降序排序
  items.sort_by(|a, b| b.score.total_cmp(&a.score));

  let mut result = Vec::new();
  while !items.is_empty() {
    let best = items.remove(0);
    items.retain(|item| iou(&best.bbox, &item.bbox) < threshold);
    result.push(best);
  }

  result
}

/// 计算两个 [x, y, width, height] 边界框的 IoU
fn iou(a: &[i32; 4], b: &[i32; 4]) -> f32 {
  let x1 = a[0].max(b[0]);
  let y1 = a[1].max(b[1]);
  let x2 = a[0].saturating_add(a[2]).min(b[0].saturating_add(b[2]));
  let y2 = a[1].saturating_add(a[3]).min(b[1].saturating_add(b[3]));

  let intersection =
    (x2.saturating_sub(x1).max(0) as f32) * (y2.saturating_sub(y1).max(0) as f32);
  let area_a = (a[2].max(0) as f32) * (a[3].max(0) as f32);
  let area_b = (b[2].max(0) as f32) * (b[3].max(0) as f32);
  let union = area_a + area_b - intersection;

  if union > 0.0 {
    intersection / union
  } else {
    0.0
  }
}
