// 该文件是 Luoshen （洛神） 项目的一部分。
// src/model.rs - 模型
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

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectItem<T> {
  pub kind: T,
  pub score: f32,
  pub bbox: [i32; 4], // [x, y, width, height]，原图像素坐标
}

impl<T> DetectItem<T> {
  pub fn right(&self) -> i32 {
    self.bbox[0].saturating_add(self.bbox[2])
  }

  pub fn bottom(&self) -> i32 {
    self.bbox[1].saturating_add(self.bbox[3])
  }
}

#[derive(Debug, Clone)]
pub struct DetectResult<T> {
  pub items: Box<[DetectItem<T>]>,
}

impl<T> DetectResult<T> {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }
}

impl<T> From<Vec<DetectItem<T>>> for DetectResult<T> {
  fn from(items: Vec<DetectItem<T>>) -> Self {
    Self {
      items: items.into_boxed_slice(),
    }
  }
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> &'static str;
  fn to_label_id(&self) -> u32;
  fn from_label_id(id: u32) -> Option<Self>;
}

mod label;
pub use self::label::NudeLabel;

mod nudenet;
pub use self::nudenet::{NudeNet, NudeNetBuilder, NudeNetError};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn box_edges_saturate() {
    let item = DetectItem {
      kind: NudeLabel::FaceMale,
      score: 0.5,
      bbox: [i32::MAX - 1, 10, 20, 30],
    };
    assert_eq!(item.right(), i32::MAX);
    assert_eq!(item.bottom(), 40);
  }

  #[test]
  fn empty_result() {
    let result: DetectResult<NudeLabel> = Vec::new().into();
    assert!(result.is_empty());
    assert_eq!(result.len(), 0);
  }
}
