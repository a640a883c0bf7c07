//! EXIFコンテナの読み書き

use crate::error::{OverlayError, Result};
use exif::{Exif, In, Reader, Tag};
use photo_overlay_common::Rotation;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// JPEG SOI マーカー
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
/// APP1 マーカー
const JPEG_APP1: [u8; 2] = [0xFF, 0xE1];
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

/// EXIFを読む（EXIFが無ければ None）
pub fn read_exif(path: &Path) -> Result<Option<Exif>> {
    let file = File::open(path)?;
    let mut bufreader = BufReader::new(file);

    match Reader::new().read_from_container(&mut bufreader) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(exif::Error::Io(e)) => Err(OverlayError::Io(e)),
        Err(e) => Err(OverlayError::Exif(e)),
    }
}

/// Orientationタグから回転角を求める
pub fn read_rotation(path: &Path) -> Result<Rotation> {
    let Some(exif) = read_exif(path)? else {
        return Ok(Rotation::None);
    };

    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1);

    Ok(Rotation::from_exif_orientation(orientation))
}

/// JPEGバイト列の先頭（SOI直後）にEXIF(APP1)を差し込む
///
/// `tiff` は `Exif::buf()` が返すTIFF形式のブロック。
/// JPEGでない、またはセグメント長を超える場合は None。
pub fn embed_exif_in_jpeg(jpeg: &[u8], tiff: &[u8]) -> Option<Vec<u8>> {
    if jpeg.len() < 2 || jpeg[..2] != JPEG_SOI {
        return None;
    }

    // 長さフィールド自身の2バイトを含む
    let segment_len = 2 + EXIF_HEADER.len() + tiff.len();
    let segment_len = u16::try_from(segment_len).ok()?;

    let mut out = Vec::with_capacity(jpeg.len() + segment_len as usize + 2);
    out.extend_from_slice(&JPEG_SOI);
    out.extend_from_slice(&JPEG_APP1);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    Some(out)
}
