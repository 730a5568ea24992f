// 该文件是 Jianshi （检视） 项目的一部分。
// src/frame.rs - 帧定义
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

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoadError {
  #[error("无法打开图片文件 {path}: {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("无法解码图片文件 {path}: {source}")]
  Decode {
    path: PathBuf,
    source: image::ImageError,
  },
}

/// 已解码的序列项，来源路径随像素数据一起传递
#[derive(Debug)]
pub struct Frame {
  /// RGB 图像数据
  pub image: RgbImage,
  /// 来源文件路径
  pub path: PathBuf,
}

impl Frame {
  /// 打开并解码一个图片文件
  pub fn open(path: &Path) -> Result<Self, LoadError> {
    let reader = ImageReader::open(path).map_err(|source| LoadError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let image = reader
      .decode()
      .map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
      })?
      .to_rgb8();

    debug!(
      "已加载图片 {}: {}x{}",
      path.display(),
      image.width(),
      image.height()
    );

    Ok(Self {
      image,
      path: path.to_path_buf(),
    })
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }
}
