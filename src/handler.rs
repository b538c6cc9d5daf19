//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责图像与文本文件的 I/O、调用隐写核心以及向用户报告结果。

use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::constants::{RECOVERED_PREFIX, STEGO_EXTENSION, STEGO_PREFIX};
use crate::pixels::PixelBuffer;
use crate::steganography::{decode, encode, max_message_len, try_decode};
use anyhow::{Context, Result};
use colored::Colorize;
use image::{ColorType, ImageFormat, RgbImage};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本、调用核心编码函数，最后将结果写入目标图像文件。
/// 容量不足时不会写入任何文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文本文件。
/// * 目标文件已存在且未指定 `--force`，或目标格式不是无损格式。
/// * 图像没有足够的空间，或文本包含无法单字节表示的字符。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_stego_path(&args.image));
    let format = lossless_format(&dest)?;
    ensure_writable(&dest, args.force)?;

    let text = match (&args.message, &args.text) {
        (Some(message), _) => message.clone(),
        (None, Some(path)) => fs::read_to_string(path).with_context(|| {
            format!(
                "Unable to read text file: {}",
                path.to_string_lossy().red().bold()
            )
        })?,
        (None, None) => anyhow::bail!("Either --text or --message must be given."),
    };

    let cover = load_pixels(&args.image)?;
    let stego = encode(&cover, &text).with_context(|| {
        format!(
            "Unable to hide the text in {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    info!(
        "Hid {} characters in a {}x{} image",
        text.chars().count(),
        stego.width(),
        stego.height()
    );

    RgbImage::from(stego)
        .save_with_format(&dest, format)
        .with_context(|| {
            format!(
                "Unable to write to target image file: {}",
                dest.to_string_lossy().red().bold()
            )
        })?;

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像、调用核心解码函数，并将恢复的文本写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 指定了 `--strict` 且图像中没有完整的隐藏消息。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let dest = args
        .text
        .clone()
        .unwrap_or_else(|| default_recovered_path(&args.image));
    ensure_writable(&dest, args.force)?;

    let stego = load_pixels(&args.image)?;
    let text = if args.strict {
        try_decode(&stego).with_context(|| {
            format!(
                "Failed to recover a message from '{}'. \nThe image may not contain a hidden message or is corrupted.",
                args.image.to_string_lossy().red().bold()
            )
        })?
    } else {
        decode(&stego)
    };

    if text.is_empty() {
        warn!("No message was recovered from {}", args.image.display());
    }

    fs::write(&dest, &text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑。
///
/// # Errors
///
/// 无法读取输入的图像文件时返回错误。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let cover = load_pixels(&args.image)?;
    let layout = cover.layout();

    println!(
        "{}x{} image ({} x {}-bit channels): {} bits, up to {} characters",
        cover.width(),
        cover.height(),
        layout.channels,
        layout.bits_per_channel,
        cover.capacity_bits().to_string().green().bold(),
        max_message_len(&cover).to_string().green().bold()
    );
    Ok(())
}

/// 读取图像并转换为 RGB8 像素缓冲区。
fn load_pixels(path: &Path) -> Result<PixelBuffer> {
    let image = image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    let color = image.color();
    if color != ColorType::Rgb8 {
        warn!("Converting {:?} image to RGB8; other channels are discarded", color);
    }
    debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());

    Ok(PixelBuffer::from(image.to_rgb8()))
}

/// 根据扩展名确定输出格式，只允许能原样保留最低位的无损格式。
fn lossless_format(path: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path).with_context(|| {
        format!(
            "Unsupported output image format: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    anyhow::ensure!(
        matches!(
            format,
            ImageFormat::Bmp
                | ImageFormat::Png
                | ImageFormat::Tiff
                | ImageFormat::Qoi
                | ImageFormat::WebP
        ),
        "Output format {:?} would not preserve the hidden bits: {}",
        format,
        path.to_string_lossy().red().bold()
    );

    Ok(format)
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {} (use --force to overwrite)",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn default_stego_path(image: &Path) -> PathBuf {
    let stem = file_stem(image);
    image.with_file_name(format!("{STEGO_PREFIX}{stem}.{STEGO_EXTENSION}"))
}

fn default_recovered_path(image: &Path) -> PathBuf {
    let stem = file_stem(image);
    image.with_file_name(format!("{RECOVERED_PREFIX}{stem}.txt"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}
