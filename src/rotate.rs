//! 回転コピーの作成
//!
//! `{stem}_rotated{ext}` にJPEGで書き出し、元のEXIFを引き継ぐ。

use crate::error::Result;
use crate::scanner::exif::{embed_exif_in_jpeg, read_exif};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType};
use photo_overlay_common::Rotation;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 回転コピーのパス
pub fn rotated_path(image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = match image_path.extension() {
        Some(ext) => format!("{}_rotated.{}", stem, ext.to_string_lossy()),
        None => format!("{}_rotated", stem),
    };
    image_path.with_file_name(file_name)
}

/// 反時計回りに回転（image crate の rotate は時計回り）
pub fn apply_rotation(image: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => image,
        Rotation::Ccw90 => image.rotate270(),
        Rotation::Ccw180 => image.rotate180(),
        Rotation::Ccw270 => image.rotate90(),
    }
}

pub fn copy_and_rotate(image_path: &Path, rotation: Rotation, quality: u8) -> Result<PathBuf> {
    let image = image::open(image_path)?;
    let rotated = apply_rotation(image, rotation).to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality).encode(
        rotated.as_raw(),
        rotated.width(),
        rotated.height(),
        ExtendedColorType::Rgb8,
    )?;

    let bytes = match read_exif(image_path) {
        Ok(Some(exif)) => embed_exif_in_jpeg(&jpeg, exif.buf()).unwrap_or_else(|| {
            warn!("EXIFを引き継げません（サイズ超過）: {}", image_path.display());
            jpeg
        }),
        Ok(None) => jpeg,
        Err(e) => {
            warn!("EXIF読み込み失敗、EXIFなしで保存: {}: {}", image_path.display(), e);
            jpeg
        }
    };

    let target = rotated_path(image_path);
    std::fs::write(&target, bytes)?;
    debug!("回転コピー ({}度): {}", rotation.degrees(), target.display());

    Ok(target)
}
