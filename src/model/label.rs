// 该文件是 Luoshen （洛神） 项目的一部分。
// src/model/label.rs - NudeNet 类别定义
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

use super::WithLabel;

/// NudeNet 检测器输出的 18 个类别，顺序与模型输出通道一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NudeLabel {
  FemaleGenitaliaCovered,
  FaceFemale,
  ButtocksExposed,
  FemaleBreastExposed,
  FemaleGenitaliaExposed,
  MaleBreastExposed,
  AnusExposed,
  FeetExposed,
  BellyCovered,
  FeetCovered,
  ArmpitsCovered,
  ArmpitsExposed,
  FaceMale,
  BellyExposed,
  MaleGenitaliaExposed,
  AnusCovered,
  FemaleBreastCovered,
  ButtocksCovered,
}

impl NudeLabel {
  pub const COUNT: usize = 18;

  pub const ALL: [NudeLabel; Self::COUNT] = [
    NudeLabel::FemaleGenitaliaCovered,
    NudeLabel::FaceFemale,
    NudeLabel::ButtocksExposed,
    NudeLabel::FemaleBreastExposed,
    NudeLabel::FemaleGenitaliaExposed,
    NudeLabel::MaleBreastExposed,
    NudeLabel::AnusExposed,
    NudeLabel::FeetExposed,
    NudeLabel::BellyCovered,
    NudeLabel::FeetCovered,
    NudeLabel::ArmpitsCovered,
    NudeLabel::ArmpitsExposed,
    NudeLabel::FaceMale,
    NudeLabel::BellyExposed,
    NudeLabel::MaleGenitaliaExposed,
    NudeLabel::AnusCovered,
    NudeLabel::FemaleBreastCovered,
    NudeLabel::ButtocksCovered,
  ];
}

impl WithLabel for NudeLabel {
  fn to_label_str(&self) -> &'static str {
    match self {
      NudeLabel::FemaleGenitaliaCovered => "FEMALE_GENITALIA_COVERED",
      NudeLabel::FaceFemale => "FACE_FEMALE",
      NudeLabel::ButtocksExposed => "BUTTOCKS_EXPOSED",
      NudeLabel::FemaleBreastExposed => "FEMALE_BREAST_EXPOSED",
      NudeLabel::FemaleGenitaliaExposed => "FEMALE_GENITALIA_EXPOSED",
      NudeLabel::MaleBreastExposed => "MALE_BREAST_EXPOSED",
      NudeLabel::AnusExposed => "ANUS_EXPOSED",
      NudeLabel::FeetExposed => "FEET_EXPOSED",
      NudeLabel::BellyCovered => "BELLY_COVERED",
      NudeLabel::FeetCovered => "FEET_COVERED",
      NudeLabel::ArmpitsCovered => "ARMPITS_COVERED",
      NudeLabel::ArmpitsExposed => "ARMPITS_EXPOSED",
      NudeLabel::FaceMale => "FACE_MALE",
      NudeLabel::BellyExposed => "BELLY_EXPOSED",
      NudeLabel::MaleGenitaliaExposed => "MALE_GENITALIA_EXPOSED",
      NudeLabel::AnusCovered => "ANUS_COVERED",
      NudeLabel::FemaleBreastCovered => "FEMALE_BREAST_COVERED",
      NudeLabel::ButtocksCovered => "BUTTOCKS_COVERED",
    }
  }

  fn to_label_id(&self) -> u32 {
    *self as u32
  }

  fn from_label_id(id: u32) -> Option<Self> {
    Self::ALL.get(id as usize).copied()
  }
}

impl std::fmt::Display for NudeLabel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.to_label_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn label_ids_follow_model_channels() {
    for (id, label) in NudeLabel::ALL.iter().enumerate() {
      assert_eq!(label.to_label_id(), id as u32);
      assert_eq!(NudeLabel::from_label_id(id as u32), Some(*label));
    }
    assert_eq!(
      NudeLabel::from_label_id(1).map(|l| l.to_label_str()),
      Some("FACE_FEMALE")
    );
    assert_eq!(
      NudeLabel::from_label_id(17).map(|l| l.to_label_str()),
      Some("BUTTOCKS_COVERED")
    );
  }

  #[test]
  fn unknown_label_id() {
    assert_eq!(NudeLabel::from_label_id(NudeLabel::COUNT as u32), None);
    assert_eq!(NudeLabel::from_label_id(u32::MAX), None);
  }
}
