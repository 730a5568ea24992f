// 该文件是 Jianshi （检视） 项目的一部分。
// src/session.rs - 浏览会话状态机
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

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
  frame::{Frame, LoadError},
  model::{DetectModel, Detection, ModelError, Predictor},
  output::Visualizer,
};

#[derive(Error, Debug)]
pub enum SessionError {
  #[error("会话没有可用的图片项")]
  NoItem,
  #[error("加载错误: {0}")]
  Load(#[from] LoadError),
  #[error("{0}")]
  Model(#[from] ModelError),
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  /// 未加载任何图片
  Empty,
  /// 当前项已加载，尚未处理
  Loaded,
  /// 当前项已处理，检测结果可用
  Processed,
}

/// 一次 `run` 的产物：标注图及其检测结果
#[derive(Debug)]
pub struct RunResult {
  pub image: RgbImage,
  pub detections: Vec<Detection>,
}

/// 浏览会话：跟踪图片序列中的当前项，驱动 加载 → 推理 → 渲染。
///
/// 序列非空时恒有 `0 <= current < items.len()`；
/// 越过两端的导航是空操作（截断，不回绕）。
pub struct Session<M> {
  items: Vec<PathBuf>,
  current: usize,
  auto_continue: bool,
  state: SessionState,
  frame: Option<Frame>,
  detections: Vec<Detection>,
  predictor: Predictor<M>,
  visualizer: Visualizer,
}

impl<M: DetectModel> Session<M> {
  pub fn new(predictor: Predictor<M>, visualizer: Visualizer) -> Self {
    Self {
      items: Vec::new(),
      current: 0,
      auto_continue: false,
      state: SessionState::Empty,
      frame: None,
      detections: Vec::new(),
      predictor,
      visualizer,
    }
  }

  /// 打开一个图片序列并加载第一项
  pub fn open(&mut self, items: Vec<PathBuf>) -> Result<(), SessionError> {
    if items.is_empty() {
      return Err(SessionError::NoItem);
    }
    self.items = items;
    self.current = 0;
    self.load()
  }

  /// 打开单个图片文件（长度为 1 的序列）
  pub fn open_single(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
    self.open(vec![path.into()])
  }

  /// 加载当前项。失败时会话保持原状态。
  pub fn load(&mut self) -> Result<(), SessionError> {
    let path = self.items.get(self.current).ok_or(SessionError::NoItem)?;
    let frame = Frame::open(path)?;

    info!(
      "已加载第 {}/{} 项: {}",
      self.current + 1,
      self.items.len(),
      path.display()
    );

    self.frame = Some(frame);
    self.detections.clear();
    self.state = SessionState::Loaded;
    Ok(())
  }

  /// 对当前项运行检测并渲染标注图。
  ///
  /// 成功后状态进入 `Processed`；推理失败时回到 `Loaded`。
  /// 自动续播开启且还有后续项时，随后前进并加载下一项（状态落在 `Loaded`）；
  /// 下一项加载失败只告警并停留在本项，不影响本项已产出的结果。
  pub fn run(&mut self) -> Result<RunResult, SessionError> {
    let frame = self.frame.as_ref().ok_or(SessionError::NoItem)?;

    let detections = self.predictor.predict(frame)?;

    let mut annotated = frame.image.clone();
    self.visualizer.draw_detections(&mut annotated, &detections);

    info!(
      "第 {}/{} 项处理完成: {} 条检测",
      self.current + 1,
      self.items.len(),
      detections.len()
    );

    self.detections = detections.clone();
    self.state = SessionState::Processed;

    if self.auto_continue && self.current + 1 < self.items.len() {
      self.current += 1;
      if let Err(e) = self.load() {
        // 下一项加载失败时退回；本项已处理成功，结果照常返回
        warn!("自动续播加载下一项失败: {}", e);
        self.current -= 1;
      }
    }

    Ok(RunResult {
      image: annotated,
      detections,
    })
  }

  /// 前进到下一项；已在末尾时为空操作，返回 false
  pub fn next(&mut self) -> bool {
    if self.current + 1 < self.items.len() {
      self.current += 1;
      true
    } else {
      false
    }
  }

  /// 退回到上一项；已在开头时为空操作，返回 false
  pub fn previous(&mut self) -> bool {
    if self.current > 0 {
      self.current -= 1;
      true
    } else {
      false
    }
  }

  pub fn set_auto_continue(&mut self, enabled: bool) {
    self.auto_continue = enabled;
  }

  pub fn auto_continue(&self) -> bool {
    self.auto_continue
  }

  pub fn state(&self) -> SessionState {
    self.state
  }

  pub fn current_index(&self) -> usize {
    self.current
  }

  pub fn item_count(&self) -> usize {
    self.items.len()
  }

  pub fn current_path(&self) -> Option<&Path> {
    self.items.get(self.current).map(PathBuf::as_path)
  }

  pub fn detections(&self) -> &[Detection] {
    &self.detections
  }
}
