//! HEIC → JPEG 変換
//!
//! libheif で主画像をRGBにデコードし、品質100のJPEGで書き出す。
//! HEIC内のEXIFブロックはJPEGのAPP1として引き継ぐ。
//! 設定で外部コマンドが指定されていればそちらに委譲する。

use super::exif::embed_exif_in_jpeg;
use crate::config::Config;
use crate::error::{OverlayError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use libheif_rs::{ColorSpace, HeifContext, ImageHandle, LibHeif, RgbChroma};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

const HEIC_JPEG_QUALITY: u8 = 100;

/// 変換先のパス（同じ場所・拡張子 .jpg）
pub fn jpeg_path_for(heic_path: &Path) -> PathBuf {
    heic_path.with_extension("jpg")
}

pub fn convert_heic_to_jpg(heic_path: &Path, config: &Config) -> Result<PathBuf> {
    let jpg_path = jpeg_path_for(heic_path);
    info!("HEIC変換: {} → {}", heic_path.display(), jpg_path.display());

    match config.heic_converter.as_deref() {
        Some(command) => run_external(command, &config.heic_converter_args, heic_path, &jpg_path)?,
        None => {
            let jpeg = decode_to_jpeg(heic_path)?;
            std::fs::write(&jpg_path, jpeg)?;
        }
    }

    debug!("HEIC変換完了: {}", jpg_path.display());
    Ok(jpg_path)
}

/// HEICを読み、EXIF付きのJPEGバイト列を返す
fn decode_to_jpeg(heic_path: &Path) -> Result<Vec<u8>> {
    let lib_heif = LibHeif::new();

    let path_str = heic_path.to_str().ok_or_else(|| {
        OverlayError::HeicConversion(format!("パスの文字コードが不正: {}", heic_path.display()))
    })?;
    let ctx = HeifContext::read_from_file(path_str).map_err(|e| {
        OverlayError::HeicConversion(format!("{}: 読み込み失敗: {}", heic_path.display(), e))
    })?;
    let handle = ctx.primary_image_handle().map_err(|e| {
        OverlayError::HeicConversion(format!("{}: 主画像がありません: {}", heic_path.display(), e))
    })?;

    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| {
            OverlayError::HeicConversion(format!("{}: デコード失敗: {}", heic_path.display(), e))
        })?;

    let planes = image.planes();
    let plane = planes.interleaved.ok_or_else(|| {
        OverlayError::HeicConversion(format!("{}: RGBプレーンがありません", heic_path.display()))
    })?;

    let width = handle.width();
    let height = handle.height();
    let rgb = packed_rows(plane.data, plane.stride, width, height).ok_or_else(|| {
        OverlayError::HeicConversion(format!("{}: 画素データが不足しています", heic_path.display()))
    })?;

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, HEIC_JPEG_QUALITY).encode(
        &rgb,
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;

    let Some(tiff) = exif_tiff_block(&handle) else {
        debug!("EXIFなし: {}", heic_path.display());
        return Ok(jpeg);
    };
    match embed_exif_in_jpeg(&jpeg, &tiff) {
        Some(with_exif) => Ok(with_exif),
        None => {
            warn!("EXIFをJPEGに埋め込めません（EXIFなしで保存）: {}", heic_path.display());
            Ok(jpeg)
        }
    }
}

/// 行末のパディングを除いたRGBバイト列
fn packed_rows(data: &[u8], stride: usize, width: u32, height: u32) -> Option<Vec<u8>> {
    let row_bytes = width as usize * 3;
    if stride == row_bytes {
        return data.get(..row_bytes * height as usize).map(<[u8]>::to_vec);
    }

    let mut rgb = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        rgb.extend_from_slice(data.get(start..start + row_bytes)?);
    }
    Some(rgb)
}

fn exif_tiff_block(handle: &ImageHandle) -> Option<Vec<u8>> {
    let mut ids = [0];
    let count = handle.metadata_block_ids(&mut ids, b"Exif");
    let id = ids[..count.min(ids.len())].first().copied()?;
    match handle.metadata(id) {
        Ok(block) => strip_exif_offset(&block).map(<[u8]>::to_vec),
        Err(e) => {
            warn!("HEICのEXIF読み込み失敗: {}", e);
            None
        }
    }
}

/// HEICのEXIFブロックは先頭4バイト（ビッグエンディアン）がTIFFヘッダまでのオフセット
fn strip_exif_offset(block: &[u8]) -> Option<&[u8]> {
    let prefix: [u8; 4] = block.get(..4)?.try_into().ok()?;
    let offset = u32::from_be_bytes(prefix) as usize;
    let tiff = block.get(4usize.checked_add(offset)?..)?;
    (!tiff.is_empty()).then_some(tiff)
}

/// 設定された外部コマンドに `<args> <in> <out>` で委譲
fn run_external(command: &str, args: &[String], heic_path: &Path, jpg_path: &Path) -> Result<()> {
    let output = Command::new(command)
        .args(args)
        .arg(heic_path)
        .arg(jpg_path)
        .output()
        .map_err(|e| OverlayError::HeicConversion(format!("{} の起動に失敗: {}", command, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OverlayError::HeicConversion(format!(
            "{}: {}",
            heic_path.display(),
            stderr.trim()
        )));
    }

    if !jpg_path.is_file() {
        return Err(OverlayError::HeicConversion(format!(
            "変換結果が見つかりません: {}",
            jpg_path.display()
        )));
    }
    Ok(())
}
