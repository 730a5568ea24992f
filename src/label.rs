// 该文件是 Jianshi （检视） 项目的一部分。
// src/label.rs - 类别标签定义
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::sync::Arc;

/// COCO 数据集类别名称
pub const COCO_CLASSES: [&str; 80] = [
  "person",
  "bicycle",
  "car",
  "motorcycle",
  "airplane",
  "bus",
  "train",
  "truck",
  "boat",
  "traffic light",
  "fire hydrant",
  "stop sign",
  "parking meter",
  "bench",
  "bird",
  "cat",
  "dog",
  "horse",
  "sheep",
  "cow",
  "elephant",
  "bear",
  "zebra",
  "giraffe",
  "backpack",
  "umbrella",
  "handbag",
  "tie",
  "suitcase",
  "frisbee",
  "skis",
  "snowboard",
  "sports ball",
  "kite",
  "baseball bat",
  "baseball glove",
  "skateboard",
  "surfboard",
  "tennis racket",
  "bottle",
  "wine glass",
  "cup",
  "fork",
  "knife",
  "spoon",
  "bowl",
  "banana",
  "apple",
  "sandwich",
  "orange",
  "broccoli",
  "carrot",
  "hot dog",
  "pizza",
  "donut",
  "cake",
  "chair",
  "couch",
  "potted plant",
  "bed",
  "dining table",
  "toilet",
  "tv",
  "laptop",
  "mouse",
  "remote",
  "keyboard",
  "cell phone",
  "microwave",
  "oven",
  "toaster",
  "sink",
  "refrigerator",
  "book",
  "clock",
  "vase",
  "scissors",
  "teddy bear",
  "hair drier",
  "toothbrush",
];

/// 标签分组类别，默认为通用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum LabelKind {
  #[default]
  Generic,
}

/// 类别标签，构造后不可变；同一标签可被多条检测结果共享
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
  /// 类别编号，在同一张标签表内唯一
  pub id: u32,
  /// 人类可读名称，可能缺失
  pub name: Option<String>,
  /// 分组类别
  pub kind: LabelKind,
}

impl Label {
  pub fn new(id: u32, name: Option<String>) -> Self {
    Self {
      id,
      name,
      kind: LabelKind::Generic,
    }
  }
}

/// 标签表，按类别编号查询共享标签
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
  labels: Vec<Arc<Label>>,
}

impl LabelTable {
  /// 从名称列表构建标签表，编号按顺序分配
  pub fn from_names<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let labels = names
      .into_iter()
      .enumerate()
      .map(|(id, name)| Arc::new(Label::new(id as u32, Some(name.into()))))
      .collect();
    Self { labels }
  }

  /// COCO 数据集的 80 类标签表
  pub fn coco() -> Self {
    Self::from_names(COCO_CLASSES)
  }

  pub fn get(&self, id: u32) -> Option<Arc<Label>> {
    self.labels.get(id as usize).cloned()
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }
}
