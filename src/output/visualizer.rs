// 该文件是 Jianshi （检视） 项目的一部分。
// src/output/visualizer.rs - 检测结果可视化
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use thiserror::Error;
use tracing::warn;

use super::MISSING_LABEL_NAME;
use crate::geometry::clamp;
use crate::model::Detection;

const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([255, 255, 0]); // 黄色
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_TEXT_OFFSET: i32 = 20;

#[derive(Error, Debug)]
pub enum FontError {
  #[error("无法读取字体文件: {0}")]
  Io(#[from] std::io::Error),
  #[error("字体文件无效")]
  Invalid,
}

/// 标签缺失时的渲染策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingLabelPolicy {
  /// 用占位名称继续渲染
  #[default]
  Placeholder,
  /// 丢弃该条检测
  Skip,
}

/// 可视化工具：把裁剪后的检测框画到图像副本上
pub struct Visualizer {
  /// 标签文本字体，缺省不绘制文本
  font: Option<FontArc>,
  /// 字体大小
  font_scale: PxScale,
  /// 高亮颜色
  color: Rgb<u8>,
  /// 标签缺失策略
  missing_label: MissingLabelPolicy,
}

impl Default for Visualizer {
  fn default() -> Self {
    Self::new()
  }
}

impl Visualizer {
  pub fn new() -> Self {
    Self {
      font: None,
      font_scale: PxScale::from(LABEL_FONT_SIZE),
      color: HIGHLIGHT_COLOR,
      missing_label: MissingLabelPolicy::default(),
    }
  }

  /// 加载字体文件，启用框上方的标签文本
  pub fn with_font_path(mut self, path: &Path) -> Result<Self, FontError> {
    let data = std::fs::read(path)?;
    let font = FontArc::try_from_vec(data).map_err(|_| FontError::Invalid)?;
    self.font = Some(font);
    Ok(self)
  }

  pub fn with_color(mut self, color: Rgb<u8>) -> Self {
    self.color = color;
    self
  }

  pub fn with_missing_label_policy(mut self, policy: MissingLabelPolicy) -> Self {
    self.missing_label = policy;
    self
  }

  /// 在图像上按输入顺序绘制检测结果；重叠处后画的覆盖先画的。
  ///
  /// 图像尺寸为零或检测列表为空时不做任何修改。
  pub fn draw_detections(&self, image: &mut RgbImage, detections: &[Detection]) {
    if image.width() == 0 || image.height() == 0 || detections.is_empty() {
      return;
    }

    for detection in detections {
      let name = match detection.label_name() {
        Some(name) => name,
        None => match self.missing_label {
          MissingLabelPolicy::Placeholder => MISSING_LABEL_NAME.to_string(),
          MissingLabelPolicy::Skip => {
            warn!("检测缺少标签，按策略丢弃 (score={:.2})", detection.score);
            continue;
          }
        },
      };

      let boxed = clamp(&detection.rect, image.width(), image.height());
      if boxed.is_empty() {
        continue;
      }

      let x = boxed.x as i32;
      let y = boxed.y as i32;
      let rect = Rect::at(x, y).of_size(boxed.width, boxed.height);
      draw_hollow_rect_mut(image, rect, self.color);

      // 绘制第二个边框以加粗为 2 像素
      if boxed.width > 2 && boxed.height > 2 {
        let inner = Rect::at(x + 1, y + 1).of_size(boxed.width - 2, boxed.height - 2);
        draw_hollow_rect_mut(image, inner, self.color);
      }

      if let Some(font) = &self.font {
        let text = format!("{} [{:.2}]", name, detection.score);
        let text_y = (y - LABEL_TEXT_OFFSET).max(0);
        draw_text_mut(image, self.color, x, text_y, self.font_scale, font, &text);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::RectF;
  use crate::label::Label;
  use std::sync::Arc;

  fn detection(rect: RectF, label: Option<Arc<Label>>) -> Detection {
    Detection {
      label,
      rect,
      score: 0.9,
    }
  }

  fn cat() -> Option<Arc<Label>> {
    Some(Arc::new(Label::new(15, Some("cat".to_string()))))
  }

  #[test]
  fn empty_list_leaves_image_untouched() {
    let mut image = RgbImage::from_pixel(32, 32, Rgb([7, 7, 7]));
    let original = image.clone();

    Visualizer::new().draw_detections(&mut image, &[]);
    assert_eq!(image, original);
  }

  #[test]
  fn zero_sized_image_is_a_noop() {
    let mut image = RgbImage::new(0, 0);
    let dets = vec![detection(RectF::new(0.0, 0.0, 10.0, 10.0), cat())];
    Visualizer::new().draw_detections(&mut image, &dets);
  }

  #[test]
  fn box_outline_is_drawn_within_bounds() {
    let mut image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
    let dets = vec![detection(RectF::new(10.0, 10.0, 20.0, 20.0), cat())];

    Visualizer::new().draw_detections(&mut image, &dets);

    assert_eq!(*image.get_pixel(10, 10), HIGHLIGHT_COLOR);
    assert_eq!(*image.get_pixel(29, 29), HIGHLIGHT_COLOR);
    // 框内部不填充
    assert_eq!(*image.get_pixel(20, 20), Rgb([0, 0, 0]));
  }

  #[test]
  fn out_of_bounds_box_is_clamped_before_drawing() {
    let mut image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
    let dets = vec![detection(RectF::new(90.0, 90.0, 30.0, 30.0), cat())];

    // 不会越界崩溃，且在图像边缘留下笔迹
    Visualizer::new().draw_detections(&mut image, &dets);
    assert_eq!(*image.get_pixel(90, 90), HIGHLIGHT_COLOR);
  }

  #[test]
  fn missing_label_placeholder_still_draws_box() {
    let mut image = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
    let dets = vec![detection(RectF::new(4.0, 4.0, 16.0, 16.0), None)];

    Visualizer::new().draw_detections(&mut image, &dets);
    assert_eq!(*image.get_pixel(4, 4), HIGHLIGHT_COLOR);
  }

  #[test]
  fn missing_label_skip_rejects_detection() {
    let mut image = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
    let original = image.clone();
    let dets = vec![detection(RectF::new(4.0, 4.0, 16.0, 16.0), None)];

    Visualizer::new()
      .with_missing_label_policy(MissingLabelPolicy::Skip)
      .draw_detections(&mut image, &dets);
    assert_eq!(image, original);
  }
}
