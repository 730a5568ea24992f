// 该文件是 Jianshi （检视） 项目的一部分。
// src/bin/viewer.rs - 查看器主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use jianshi::{
  label::LabelTable,
  model::{Predictor, RecordedModel},
  output::{AnnotatedSink, DirectoryOutput, ImageOutput, Visualizer},
  session::{Session, SessionState},
};

/// Jianshi 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源（图片文件或图片目录）
  /// 支持格式: *.jpg, *.jpeg, *.png, *.bmp, *.gif, *.webp
  #[arg(long, value_name = "SOURCE")]
  pub input: PathBuf,

  /// 预测记录文件路径（JSON，由外部推理工具生成）
  #[arg(long, value_name = "FILE")]
  pub predictions: PathBuf,

  /// 输出目标（图片文件路径，或目录）
  #[arg(long, value_name = "OUTPUT")]
  pub output: PathBuf,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// 标签字体文件路径；提供后在检测框上方绘制标签文本
  #[arg(long, value_name = "FILE")]
  pub font: Option<PathBuf>,

  /// 自动连续处理整个序列
  #[arg(long)]
  pub auto: bool,

  /// 交互模式：从标准输入读取命令 n/p/r/a/q
  #[arg(long)]
  pub interactive: bool,

  /// 同时写出检测记录文本文件（仅目录输出有效）
  #[arg(long)]
  pub record: bool,
}

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// 收集输入项：目录则按文件名排序列出其中的图片，文件则为单项序列
fn collect_items(input: &Path) -> Result<Vec<PathBuf>> {
  if !input.is_dir() {
    return Ok(vec![input.to_path_buf()]);
  }

  let mut items = Vec::new();
  for entry in std::fs::read_dir(input).with_context(|| format!("无法读取目录: {}", input.display()))? {
    let path = entry?.path();
    let matched = path
      .extension()
      .and_then(|e| e.to_str())
      .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
      .unwrap_or(false);
    if matched {
      items.push(path);
    }
  }
  items.sort();
  Ok(items)
}

fn make_sink(output: &Path, record: bool) -> Box<dyn AnnotatedSink> {
  let is_image_file = output
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| matches!(e.to_lowercase().as_str(), "jpg" | "jpeg" | "png" | "bmp"))
    .unwrap_or(false);

  if is_image_file {
    Box::new(ImageOutput::new(output))
  } else {
    Box::new(DirectoryOutput::new(output, record))
  }
}

fn run_and_write(
  session: &mut Session<RecordedModel>,
  sink: &mut dyn AnnotatedSink,
) -> Result<()> {
  let result = session.run()?;
  sink.write(&result.image, &result.detections)?;
  Ok(())
}

/// 手动前进并加载下一项；无法加载的项记录错误后跳过。
/// 返回 false 表示序列已无可用的后续项。
fn advance(session: &mut Session<RecordedModel>) -> bool {
  while session.next() {
    match session.load() {
      Ok(()) => return true,
      Err(e) => error!("{}", e),
    }
  }
  false
}

/// 逐项处理到序列末尾；单项失败只记录错误，不中止整个序列
fn run_batch(
  session: &mut Session<RecordedModel>,
  sink: &mut dyn AnnotatedSink,
  interrupted: impl Fn() -> bool,
) {
  session.set_auto_continue(true);

  loop {
    let before = session.current_index();
    if let Err(e) = run_and_write(session, sink) {
      error!("{}", e);
    }

    // 自动前进成功后状态回到 Loaded 且索引已变化；否则手动跳过当前项
    let advanced = session.current_index() != before && session.state() == SessionState::Loaded;
    if !advanced && !advance(session) {
      info!("序列处理完成");
      break;
    }
    if interrupted() {
      warn!("中断信号接收，退出");
      break;
    }
  }
}

/// 自动续播：逐项处理到序列末尾，Ctrl-C 中断
fn run_auto(session: &mut Session<RecordedModel>, sink: &mut dyn AnnotatedSink) -> Result<()> {
  let (tx, rx) = std::sync::mpsc::channel();
  ctrlc::set_handler(move || {
    let _ = tx.send(());
  })
  .context("无法设置 Ctrl-C 处理器")?;

  run_batch(session, sink, move || rx.try_recv().is_ok());

  Ok(())
}

/// 交互模式：n 下一项 / p 上一项 / r 运行 / a 切换自动续播 / q 退出。
/// 单条命令的失败只提示，不中止会话。
fn run_interactive(
  session: &mut Session<RecordedModel>,
  sink: &mut dyn AnnotatedSink,
) -> Result<()> {
  println!("命令: n=下一项 p=上一项 r=运行 a=自动续播 q=退出");

  let stdin = std::io::stdin();
  for line in stdin.lock().lines() {
    let line = line?;
    match line.trim() {
      "n" => {
        if session.next() {
          if let Err(e) = session.load() {
            error!("{}", e);
          }
        } else {
          warn!("已经是最后一项");
        }
      }
      "p" => {
        if session.previous() {
          if let Err(e) = session.load() {
            error!("{}", e);
          }
        } else {
          warn!("已经是第一项");
        }
      }
      "r" => {
        if let Err(e) = run_and_write(session, sink) {
          error!("{}", e);
        }
      }
      "a" => {
        let enabled = !session.auto_continue();
        session.set_auto_continue(enabled);
        info!("自动续播: {}", if enabled { "开" } else { "关" });
      }
      "q" => break,
      "" => {}
      other => warn!("未知命令: {}", other),
    }

    info!(
      "当前第 {}/{} 项, 状态 {:?}",
      session.current_index() + 1,
      session.item_count(),
      session.state()
    );
  }

  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input.display());
  info!("预测记录: {}", args.predictions.display());
  info!("输出目标: {}", args.output.display());
  info!("置信度阈值: {}", args.confidence);

  let model = RecordedModel::open(&args.predictions)?;
  let predictor = Predictor::new(model, LabelTable::coco()).with_confidence(args.confidence);

  let mut visualizer = Visualizer::new();
  if let Some(font) = &args.font {
    visualizer = visualizer
      .with_font_path(font)
      .with_context(|| format!("无法加载字体: {}", font.display()))?;
  }

  let items = collect_items(&args.input)?;
  info!("共 {} 个输入项", items.len());

  let mut sink = make_sink(&args.output, args.record);
  let mut session = Session::new(predictor, visualizer);
  session.open(items)?;

  if args.interactive {
    run_interactive(&mut session, sink.as_mut())?;
  } else if args.auto {
    run_auto(&mut session, sink.as_mut())?;
  } else {
    run_and_write(&mut session, sink.as_mut())?;
  }

  Ok(())
}
