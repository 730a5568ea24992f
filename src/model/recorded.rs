// 该文件是 Jianshi （检视） 项目的一部分。
// src/model/recorded.rs - 预测记录回放模型
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::{DetectModel, ModelError, RawDetection};
use crate::frame::Frame;

#[derive(Error, Debug)]
pub enum RecordedError {
  #[error("图片 {0} 没有预测记录")]
  NoRecord(String),
}

#[derive(Deserialize)]
struct SidecarEntry {
  class_id: u32,
  score: f32,
  /// [x_min, y_min, x_max, y_max]，模型输入坐标系
  bbox: [f32; 4],
}

#[derive(Deserialize)]
struct SidecarFile {
  input_width: u32,
  input_height: u32,
  images: HashMap<String, Vec<SidecarEntry>>,
}

/// 回放模型：从 JSON 记录文件按图片文件名查出预先计算好的检测。
///
/// 记录文件由外部推理工具生成，本查看器无需推理运行时即可工作。
#[derive(Debug)]
pub struct RecordedModel {
  input_size: (u32, u32),
  images: HashMap<String, Vec<RawDetection>>,
}

impl RecordedModel {
  /// 打开预测记录文件
  pub fn open(path: &Path) -> Result<Self, ModelError> {
    let data = std::fs::read(path).map_err(|e| ModelError::Load(Box::new(e)))?;
    let sidecar: SidecarFile =
      serde_json::from_slice(&data).map_err(|e| ModelError::Load(Box::new(e)))?;

    let images = sidecar
      .images
      .into_iter()
      .map(|(name, entries)| {
        let raw = entries
          .into_iter()
          .map(|e| RawDetection {
            class_id: e.class_id,
            score: e.score,
            bbox: e.bbox,
          })
          .collect();
        (name, raw)
      })
      .collect();

    info!(
      "已加载预测记录 {}: 输入尺寸 {}x{}",
      path.display(),
      sidecar.input_width,
      sidecar.input_height
    );

    Ok(Self {
      input_size: (sidecar.input_width, sidecar.input_height),
      images,
    })
  }
}

impl DetectModel for RecordedModel {
  type Error = RecordedError;

  fn input_size(&self) -> (u32, u32) {
    self.input_size
  }

  fn infer(&self, frame: &Frame) -> Result<Vec<RawDetection>, Self::Error> {
    let name = frame
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();

    self
      .images
      .get(&name)
      .cloned()
      .ok_or(RecordedError::NoRecord(name))
  }
}
