// 该文件是 Luoshen （洛神） 项目的一部分。
// src/output/draw.rs - 检测结果可视化
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

use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_hollow_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use tracing::{debug, info, warn};

use crate::model::{DetectItem, DetectResult, WithLabel};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 40.0;
const LABEL_MARGIN: i32 = 10;
const BOX_THICKNESS: i32 = 3;

const PURPLE: [u8; 3] = [128, 0, 128];
const RED: [u8; 3] = [255, 0, 0];
const ORANGE: [u8; 3] = [255, 165, 0];
const PINK: [u8; 3] = [255, 192, 203];
const GREEN: [u8; 3] = [0, 128, 0];
const BROWN: [u8; 3] = [165, 42, 42];
const YELLOW: [u8; 3] = [255, 255, 0];
const GRAY: [u8; 3] = [128, 128, 128];
const BLUE: [u8; 3] = [0, 0, 255];

const LABEL_COLORS: [(&str, [u8; 3]); 18] = [
  ("FEMALE_GENITALIA_COVERED", PURPLE),
  ("FACE_FEMALE", RED),
  ("BUTTOCKS_EXPOSED", ORANGE),
  ("FEMALE_BREAST_EXPOSED", PINK),
  ("FEMALE_GENITALIA_EXPOSED", PURPLE),
  ("MALE_BREAST_EXPOSED", GREEN),
  ("ANUS_EXPOSED", BROWN),
  ("FEET_EXPOSED", YELLOW),
  ("BELLY_COVERED", PINK),
  ("FEET_COVERED", YELLOW),
  ("ARMPITS_COVERED", GRAY),
  ("ARMPITS_EXPOSED", GRAY),
  ("FACE_MALE", BLUE),
  ("BELLY_EXPOSED", PINK),
  ("MALE_GENITALIA_EXPOSED", PURPLE),
  ("ANUS_COVERED", BROWN),
  ("FEMALE_BREAST_COVERED", PINK),
  ("BUTTOCKS_COVERED", ORANGE),
];

/// 类别对应的绘制颜色，不在表中的类别不绘制
pub fn label_color(label: &str) -> Option<Rgb<u8>> {
  LABEL_COLORS
    .iter()
    .find(|(name, _)| *name == label)
    .map(|(_, color)| Rgb(*color))
}

/// 图像上一段文本占用的矩形区域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
  pub x: i32,
  pub y: i32,
  pub width: i32,
  pub height: i32,
}

impl TextBox {
  fn overlaps(&self, other: &TextBox) -> bool {
    other.x < self.x.saturating_add(self.width)
      && other.x.saturating_add(other.width) > self.x
      && other.y < self.y.saturating_add(self.height)
      && other.y.saturating_add(other.height) > self.y
  }
}

/// 发生重叠时的移动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
  Up,
  Down,
}

/// 贪心放置文本：与已放置的文本重叠时沿指定方向每次移动一个文本高度加间距
#[derive(Debug, Default)]
pub struct LabelPlacer {
  used: Vec<TextBox>,
}

impl LabelPlacer {
  pub fn place(&mut self, x: i32, y: i32, width: i32, height: i32, nudge: Nudge) -> TextBox {
    let step = height.max(0) + LABEL_MARGIN;
    let mut candidate = TextBox {
      x,
      y,
      width,
      height,
    };

    while self.used.iter().any(|used| candidate.overlaps(used)) {
      candidate.y += match nudge {
        Nudge::Up => -step,
        Nudge::Down => step,
      };
    }

    self.used.push(candidate);
    candidate
  }

  pub fn placed(&self) -> &[TextBox] {
    &self.used
  }
}

#[derive(Clone)]
pub struct Draw {
  font: FontArc,
  font_size: f32,
  label_margin: i32,
  box_thickness: i32,
}

impl Default for Draw {
  fn default() -> Self {
    let font_data: &'static [u8] = include_bytes!("../../assets/DejaVuSans.ttf");
    let font = FontArc::try_from_slice(font_data).expect("无法加载嵌入的字体文件");

    Self {
      font,
      font_size: LABEL_FONT_SIZE,
      label_margin: LABEL_MARGIN,
      box_thickness: BOX_THICKNESS,
    }
  }
}

impl Draw {
  /// 加载指定的 TrueType 字体，失败时退回内置字体
  pub fn with_font_file<P: AsRef<Path>>(path: P) -> Self {
    let path = path.as_ref();
    let font = std::fs::read(path)
      .map_err(|e| e.to_string())
      .and_then(|data| FontArc::try_from_vec(data).map_err(|e| e.to_string()));

    match font {
      Ok(font) => {
        info!("使用字体文件: {}", path.display());
        Self {
          font,
          ..Self::default()
        }
      }
      Err(e) => {
        warn!("无法加载字体 {}: {}，使用内置字体", path.display(), e);
        Self::default()
      }
    }
  }

  fn measure(&self, text: &str) -> (i32, i32) {
    let (width, height) = text_size(PxScale::from(self.font_size), &self.font, text);
    (width as i32, height as i32)
  }

  // 在图像上绘制矩形边框，边框向内加粗
  fn draw_box(&self, image: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    // 远在图像外的边不可见，先收拢到图像外一个线宽处
    let pad = self.box_thickness as i64;
    let clip = |v: i32, size: u32| (v as i64).clamp(-pad - 1, size as i64 + pad);
    let (x0, x1) = (clip(x0, image.width()), clip(x1, image.width()));
    let (y0, y1) = (clip(y0, image.height()), clip(y1, image.height()));

    for t in 0..pad {
      let width = x1 - x0 + 1 - 2 * t;
      let height = y1 - y0 + 1 - 2 * t;
      if width <= 0 || height <= 0 {
        break;
      }
      let rect = Rect::at((x0 + t) as i32, (y0 + t) as i32).of_size(width as u32, height as u32);
      draw_hollow_rect_mut(image, rect, color);
    }
  }

  fn draw_text(&self, image: &mut RgbImage, text_box: &TextBox, text: &str, color: Rgb<u8>) {
    let visible = TextBox {
      x: 0,
      y: 0,
      width: image.width() as i32,
      height: image.height() as i32,
    };
    if !text_box.overlaps(&visible) {
      return;
    }
    draw_text_mut(
      image,
      color,
      text_box.x,
      text_box.y,
      PxScale::from(self.font_size),
      &self.font,
      text,
    );
  }

  fn draw_item<T: WithLabel>(
    &self,
    image: &mut RgbImage,
    item: &DetectItem<T>,
    placer: &mut LabelPlacer,
  ) {
    let label = item.kind.to_label_str();
    let Some(color) = label_color(label) else {
      return;
    };

    let [x0, y0, w, _] = item.bbox;
    let (x1, y1) = (item.right(), item.bottom());
    self.draw_box(image, x0, y0, x1, y1, color);

    // 类别名称在边框上方居中
    let (tw, th) = self.measure(label);
    let left = x0.saturating_add(w.saturating_sub(tw).div_euclid(2));
    let label_box = placer.place(
      left,
      y0.saturating_sub(th + self.label_margin).max(0),
      tw,
      th,
      Nudge::Up,
    );
    self.draw_text(image, &label_box, label, color);

    // 置信度在边框下方居中
    let confidence = format!("{:.2}", item.score);
    let (tw, th) = self.measure(&confidence);
    let left = x0.saturating_add(w.saturating_sub(tw).div_euclid(2));
    let confidence_box = placer.place(
      left,
      y1.saturating_add(self.label_margin),
      tw,
      th,
      Nudge::Down,
    );
    self.draw_text(image, &confidence_box, &confidence, color);
  }

  pub fn draw_detections<T: WithLabel>(&self, image: &mut RgbImage, result: &DetectResult<T>) {
    let placer = self.annotate(image, result);
    debug!("绘制 {} 个目标，{} 段文本", result.len(), placer.placed().len());
  }

  fn annotate<T: WithLabel>(&self, image: &mut RgbImage, result: &DetectResult<T>) -> LabelPlacer {
    let mut placer = LabelPlacer::default();
    for item in result.items.iter() {
      self.draw_item(image, item, &mut placer);
    }
    placer
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::NudeLabel;

  #[test]
  fn every_label_has_a_color() {
    for label in NudeLabel::ALL {
      assert!(label_color(label.to_label_str()).is_some(), "{}", label);
    }
    assert_eq!(label_color("FACE_FEMALE"), Some(Rgb(RED)));
    assert_eq!(label_color("FACE_MALE"), Some(Rgb(BLUE)));
    assert_eq!(label_color("person"), None);
  }

  #[test]
  fn first_placement_is_kept() {
    let mut placer = LabelPlacer::default();
    let placed = placer.place(5, 100, 50, 20, Nudge::Up);
    assert_eq!(
      placed,
      TextBox {
        x: 5,
        y: 100,
        width: 50,
        height: 20
      }
    );
  }

  #[test]
  fn labels_move_up_on_collision() {
    let mut placer = LabelPlacer::default();
    placer.place(0, 100, 50, 20, Nudge::Up);
    assert_eq!(placer.place(10, 100, 50, 20, Nudge::Up).y, 70);
    assert_eq!(placer.place(20, 100, 50, 20, Nudge::Up).y, 40);
    assert_eq!(placer.placed().len(), 3);
  }

  #[test]
  fn scores_move_down_on_collision() {
    let mut placer = LabelPlacer::default();
    placer.place(0, 100, 50, 20, Nudge::Down);
    assert_eq!(placer.place(0, 105, 50, 20, Nudge::Down).y, 135);
  }

  #[test]
  fn touching_boxes_do_not_overlap() {
    let mut placer = LabelPlacer::default();
    placer.place(0, 0, 10, 10, Nudge::Up);
    assert_eq!(placer.place(10, 0, 10, 10, Nudge::Up).y, 0);
    assert_eq!(placer.place(0, 10, 10, 10, Nudge::Down).y, 10);
  }

  #[test]
  fn draws_three_pixel_outline() {
    let mut image = RgbImage::new(200, 200);
    let result: DetectResult<NudeLabel> = vec![DetectItem {
      kind: NudeLabel::FaceFemale,
      score: 0.87,
      bbox: [50, 80, 60, 40],
    }]
    .into();

    Draw::default().draw_detections(&mut image, &result);

    let red = Rgb(RED);
    assert_eq!(image.get_pixel(50, 100), &red);
    assert_eq!(image.get_pixel(52, 100), &red);
    assert_eq!(image.get_pixel(110, 100), &red);
    assert_eq!(image.get_pixel(80, 120), &red);
    assert_eq!(image.get_pixel(53, 100), &Rgb([0, 0, 0]));
    assert_eq!(image.get_pixel(80, 100), &Rgb([0, 0, 0]));
  }

  #[test]
  fn labels_sit_above_and_scores_below_boxes() {
    let draw = Draw::default();
    let mut image = RgbImage::new(300, 300);
    let result: DetectResult<NudeLabel> = vec![
      DetectItem {
        kind: NudeLabel::FaceFemale,
        score: 0.87,
        bbox: [50, 100, 60, 40],
      },
      DetectItem {
        kind: NudeLabel::FaceFemale,
        score: 0.87,
        bbox: [55, 100, 60, 40],
      },
    ]
    .into();

    let placed = draw.annotate(&mut image, &result).placed().to_vec();
    assert_eq!(placed.len(), 4);

    let (tw, th) = draw.measure("FACE_FEMALE");
    assert!(tw > 60);
    let label = placed[0];
    assert_eq!(label.x, 50 + (60 - tw).div_euclid(2));
    assert_eq!(label.y, (100 - th - LABEL_MARGIN).max(0));
    assert_eq!((label.width, label.height), (tw, th));

    let (sw, sh) = draw.measure("0.87");
    let score = placed[1];
    assert_eq!(score.x, 50 + (60 - sw).div_euclid(2));
    assert_eq!(score.y, 140 + LABEL_MARGIN);

    // 第二个目标的文本与第一个重叠，类别上移、置信度下移
    assert_eq!(placed[2].y, label.y - th - LABEL_MARGIN);
    assert_eq!(placed[3].y, score.y + sh + LABEL_MARGIN);
  }

  #[test]
  fn label_pinned_to_top_edge() {
    let draw = Draw::default();
    let mut image = RgbImage::new(100, 100);
    let result: DetectResult<NudeLabel> = vec![DetectItem {
      kind: NudeLabel::FaceMale,
      score: 0.5,
      bbox: [10, 5, 20, 20],
    }]
    .into();

    let placer = draw.annotate(&mut image, &result);
    assert_eq!(placer.placed()[0].y, 0);
  }

  #[test]
  fn extreme_boxes_are_clipped() {
    let mut image = RgbImage::new(64, 64);
    let result: DetectResult<NudeLabel> = vec![
      DetectItem {
        kind: NudeLabel::FeetExposed,
        score: 0.5,
        bbox: [i32::MAX - 5, i32::MAX - 5, i32::MAX, i32::MAX],
      },
      DetectItem {
        kind: NudeLabel::FeetExposed,
        score: 0.5,
        bbox: [-10, 20, i32::MAX, 10],
      },
    ]
    .into();

    Draw::default().draw_detections(&mut image, &result);

    let yellow = Rgb(YELLOW);
    assert_eq!(image.get_pixel(30, 20), &yellow);
    assert_eq!(image.get_pixel(30, 30), &yellow);
    assert_eq!(image.get_pixel(0, 25), &Rgb([0, 0, 0]));
  }

  #[test]
  fn missing_font_falls_back_to_builtin() {
    let draw = Draw::with_font_file("/nonexistent/arial.ttf");
    let (width, height) = draw.measure("FACE_MALE");
    assert!(width > 0);
    assert!(height > 0);
  }
}
