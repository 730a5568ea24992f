// 该文件是 Jianshi （检视） 项目的一部分。
// src/model/mod.rs - 检测模型接口与结果转换
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod recorded;

pub use recorded::{RecordedError, RecordedModel};

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::{frame::Frame, geometry::RectF, label::{Label, LabelTable}};

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("模型加载错误: {0}")]
  Load(Box<dyn std::error::Error + Send + Sync>),
  #[error("推理错误: {0}")]
  Inference(Box<dyn std::error::Error + Send + Sync>),
}

/// 模型原始输出中的一条检测，坐标位于模型输入坐标系
#[derive(Debug, Clone, Copy)]
pub struct RawDetection {
  /// 类别编号
  pub class_id: u32,
  /// 置信度
  pub score: f32,
  /// [x_min, y_min, x_max, y_max]
  pub bbox: [f32; 4],
}

/// 外部检测模型接口
///
/// 模型的权重加载、张量前后处理与 NMS 均由实现方负责，
/// 本库只消费其原始输出。
pub trait DetectModel {
  type Error: std::error::Error + Send + Sync + 'static;

  /// 模型输入尺寸 (宽, 高)，用于把框缩放回原图坐标系
  fn input_size(&self) -> (u32, u32);

  /// 对一帧图像运行推理，返回模型输入坐标系下的原始检测
  fn infer(&self, frame: &Frame) -> Result<Vec<RawDetection>, Self::Error>;
}

/// 检测结果，矩形位于原始图像像素坐标系；构造后只读
#[derive(Debug, Clone)]
pub struct Detection {
  /// 类别标签（共享引用，可能缺失）
  pub label: Option<Arc<Label>>,
  /// 原图坐标系中的边界框
  pub rect: RectF,
  /// 置信度 [0.0, 1.0]
  pub score: f32,
}

impl Detection {
  /// 标签显示名：优先人类可读名称，其次类别编号；标签缺失时为 None
  pub fn label_name(&self) -> Option<String> {
    self
      .label
      .as_ref()
      .map(|l| l.name.clone().unwrap_or_else(|| l.id.to_string()))
  }
}

/// 模型适配器：调用外部模型并把原始输出转换为检测结果。
///
/// 负责将框从模型输入坐标系缩放回原图坐标系、挂接标签引用，
/// 并过滤低于置信度阈值的检测。
pub struct Predictor<M> {
  model: M,
  labels: LabelTable,
  confidence: f32,
}

impl<M: DetectModel> Predictor<M> {
  pub fn new(model: M, labels: LabelTable) -> Self {
    Self {
      model,
      labels,
      confidence: 0.0,
    }
  }

  /// 设置置信度阈值 (0.0 - 1.0)
  pub fn with_confidence(mut self, confidence: f32) -> Self {
    self.confidence = confidence;
    self
  }

  pub fn predict(&self, frame: &Frame) -> Result<Vec<Detection>, ModelError> {
    let raw = self
      .model
      .infer(frame)
      .map_err(|e| ModelError::Inference(Box::new(e)))?;

    let (input_w, input_h) = self.model.input_size();
    let scale_x = frame.width() as f32 / input_w as f32;
    let scale_y = frame.height() as f32 / input_h as f32;

    let detections: Vec<Detection> = raw
      .into_iter()
      .filter(|r| r.score >= self.confidence)
      .map(|r| Detection {
        label: self.labels.get(r.class_id),
        rect: RectF::new(
          r.bbox[0] * scale_x,
          r.bbox[1] * scale_y,
          (r.bbox[2] - r.bbox[0]) * scale_x,
          (r.bbox[3] - r.bbox[1]) * scale_y,
        ),
        score: r.score,
      })
      .collect();

    debug!("{} 条检测通过阈值 {}", detections.len(), self.confidence);

    Ok(detections)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::RgbImage;
  use std::path::PathBuf;

  struct StubModel {
    raw: Vec<RawDetection>,
  }

  impl DetectModel for StubModel {
    type Error = std::convert::Infallible;

    fn input_size(&self) -> (u32, u32) {
      (100, 100)
    }

    fn infer(&self, _frame: &Frame) -> Result<Vec<RawDetection>, Self::Error> {
      Ok(self.raw.clone())
    }
  }

  fn frame(width: u32, height: u32) -> Frame {
    Frame {
      image: RgbImage::new(width, height),
      path: PathBuf::from("stub.png"),
    }
  }

  #[test]
  fn boxes_are_rescaled_to_original_image() {
    let model = StubModel {
      raw: vec![RawDetection {
        class_id: 15,
        score: 0.9,
        bbox: [10.0, 10.0, 30.0, 40.0],
      }],
    };
    let predictor = Predictor::new(model, LabelTable::coco());

    let detections = predictor.predict(&frame(200, 100)).unwrap();
    assert_eq!(detections.len(), 1);

    let det = &detections[0];
    assert_eq!(det.rect, RectF::new(20.0, 10.0, 40.0, 30.0));
    assert_eq!(det.label.as_ref().unwrap().name.as_deref(), Some("cat"));
    assert!((det.score - 0.9).abs() < f32::EPSILON);
  }

  #[test]
  fn low_confidence_is_filtered() {
    let model = StubModel {
      raw: vec![
        RawDetection {
          class_id: 0,
          score: 0.3,
          bbox: [0.0, 0.0, 10.0, 10.0],
        },
        RawDetection {
          class_id: 0,
          score: 0.8,
          bbox: [0.0, 0.0, 10.0, 10.0],
        },
      ],
    };
    let predictor = Predictor::new(model, LabelTable::coco()).with_confidence(0.5);

    let detections = predictor.predict(&frame(100, 100)).unwrap();
    assert_eq!(detections.len(), 1);
    assert!((detections[0].score - 0.8).abs() < f32::EPSILON);
  }

  #[test]
  fn unknown_class_id_leaves_label_absent() {
    let model = StubModel {
      raw: vec![RawDetection {
        class_id: 999,
        score: 0.9,
        bbox: [0.0, 0.0, 10.0, 10.0],
      }],
    };
    let predictor = Predictor::new(model, LabelTable::coco());

    let detections = predictor.predict(&frame(100, 100)).unwrap();
    assert!(detections[0].label.is_none());
  }
}
