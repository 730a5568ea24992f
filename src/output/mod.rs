// 该文件是 Jianshi （检视） 项目的一部分。
// src/output/mod.rs - 输出模块
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod visualizer;

pub use visualizer::{FontError, MissingLabelPolicy, Visualizer};

/// 标签缺失时的占位名称，渲染与记录共用
pub const MISSING_LABEL_NAME: &str = "unknown";

use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::model::Detection;

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  Image(#[from] image::ImageError),
}

/// 标注结果的输出端
pub trait AnnotatedSink {
  /// 写出一张标注图及其检测结果
  fn write(&mut self, image: &RgbImage, detections: &[Detection]) -> Result<(), OutputError>;
}

/// 图片文件输出：保存到固定路径，重复写入时覆盖
pub struct ImageOutput {
  path: PathBuf,
}

impl ImageOutput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl AnnotatedSink for ImageOutput {
  fn write(&mut self, image: &RgbImage, _detections: &[Detection]) -> Result<(), OutputError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&self.path)?;
    info!("保存图像到文件: {}", self.path.display());

    Ok(())
  }
}

/// 目录输出：按日期分目录、按时间戳命名，可附带检测记录文本
pub struct DirectoryOutput {
  directory: PathBuf,
  record: bool,
  counter: u16,
}

impl DirectoryOutput {
  pub fn new(directory: impl Into<PathBuf>, record: bool) -> Self {
    Self {
      directory: directory.into(),
      record,
      counter: 0,
    }
  }

  fn next_path(&mut self) -> Result<PathBuf, std::io::Error> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    self.counter = self.counter.wrapping_add(1);
    Ok(directory.join(format!("{}-{:04X}.png", now.format("%H-%M-%S"), self.counter)))
  }
}

impl AnnotatedSink for DirectoryOutput {
  fn write(&mut self, image: &RgbImage, detections: &[Detection]) -> Result<(), OutputError> {
    let path = self.next_path()?;
    image.save(&path)?;
    info!("保存图像到文件: {}", path.display());

    if self.record {
      write_record(&path, detections)?;
    }

    Ok(())
  }
}

/// 写出检测记录文本，每行 "名称, 置信度, x, y, 宽, 高"
fn write_record(image_path: &Path, detections: &[Detection]) -> Result<(), std::io::Error> {
  let mut records = Vec::with_capacity(detections.len());
  for det in detections {
    let name = det
      .label_name()
      .unwrap_or_else(|| MISSING_LABEL_NAME.to_string());
    records.push(format!(
      "{}, {:.4}, {:.1}, {:.1}, {:.1}, {:.1}",
      name, det.score, det.rect.x, det.rect.y, det.rect.width, det.rect.height
    ));
  }
  std::fs::write(image_path.with_extension("txt"), records.join("\n"))
}
