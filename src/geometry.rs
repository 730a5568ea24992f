// 该文件是 Jianshi （检视） 项目的一部分。
// src/geometry.rs - 检测框几何与裁剪
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

/// 原始图像像素坐标系中的浮点矩形
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
  /// 左上角 x 坐标
  pub x: f32,
  /// 左上角 y 坐标
  pub y: f32,
  /// 宽度
  pub width: f32,
  /// 高度
  pub height: f32,
}

impl RectF {
  pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }
}

/// 裁剪后的整数像素框，保证完全落在图像范围内
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedBox {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}

impl ClampedBox {
  pub fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }

  pub fn to_rect(&self) -> RectF {
    RectF::new(
      self.x as f32,
      self.y as f32,
      self.width as f32,
      self.height as f32,
    )
  }
}

/// 将模型预测的矩形裁剪到图像范围内。
///
/// 模型输出缩放回原图后，框的原点可能为负、边界可能越界。
/// 两条边分别裁剪：原点被拉回 0 时保留远端边，
/// 完全越界的框会退化为宽度/高度为 0 的空框，不会出现负值。
pub fn clamp(rect: &RectF, image_width: u32, image_height: u32) -> ClampedBox {
  let (w, h) = (image_width as f32, image_height as f32);

  let x_min = rect.x.clamp(0.0, w).floor();
  let y_min = rect.y.clamp(0.0, h).floor();
  let x_max = (rect.x + rect.width).clamp(0.0, w).ceil().min(w);
  let y_max = (rect.y + rect.height).clamp(0.0, h).ceil().min(h);

  ClampedBox {
    x: x_min as u32,
    y: y_min as u32,
    width: (x_max - x_min).max(0.0) as u32,
    height: (y_max - y_min).max(0.0) as u32,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_origin_keeps_far_edge() {
    let rect = RectF::new(-5.0, 10.0, 50.0, 50.0);
    let boxed = clamp(&rect, 100, 100);
    assert_eq!(
      boxed,
      ClampedBox {
        x: 0,
        y: 10,
        width: 45,
        height: 50
      }
    );
  }

  #[test]
  fn overflow_is_cut_at_image_edge() {
    let rect = RectF::new(90.0, 90.0, 30.0, 30.0);
    let boxed = clamp(&rect, 100, 100);
    assert_eq!(
      boxed,
      ClampedBox {
        x: 90,
        y: 90,
        width: 10,
        height: 10
      }
    );
  }

  #[test]
  fn fully_outside_box_degenerates_to_empty() {
    let rect = RectF::new(200.0, 200.0, 30.0, 30.0);
    let boxed = clamp(&rect, 100, 100);
    assert!(boxed.is_empty());

    let rect = RectF::new(-60.0, -60.0, 30.0, 30.0);
    let boxed = clamp(&rect, 100, 100);
    assert!(boxed.is_empty());
  }

  #[test]
  fn negative_extent_is_guarded() {
    let rect = RectF::new(50.0, 50.0, -10.0, -10.0);
    let boxed = clamp(&rect, 100, 100);
    assert_eq!(boxed.width, 0);
    assert_eq!(boxed.height, 0);
  }

  #[test]
  fn result_always_within_bounds() {
    let cases = [
      RectF::new(-100.0, -100.0, 500.0, 500.0),
      RectF::new(12.3, 45.6, 78.9, 10.1),
      RectF::new(99.9, 0.0, 0.5, 200.0),
      RectF::new(0.0, 0.0, 100.0, 100.0),
      RectF::new(-1.0, 101.0, 3.0, 3.0),
    ];

    for rect in cases {
      let boxed = clamp(&rect, 100, 100);
      assert!(boxed.x + boxed.width <= 100, "{:?} -> {:?}", rect, boxed);
      assert!(boxed.y + boxed.height <= 100, "{:?} -> {:?}", rect, boxed);
    }
  }

  #[test]
  fn clamping_is_idempotent() {
    let cases = [
      RectF::new(-5.0, 10.0, 50.0, 50.0),
      RectF::new(90.0, 90.0, 30.0, 30.0),
      RectF::new(10.5, 20.5, 30.25, 40.75),
    ];

    for rect in cases {
      let once = clamp(&rect, 100, 100);
      let twice = clamp(&once.to_rect(), 100, 100);
      assert_eq!(once, twice);
    }
  }
}
