pub mod exif;
pub mod heic;

use crate::config::Config;
use crate::error::{OverlayError, Result};
use photo_overlay_common::Rotation;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScannedImage {
    pub path: PathBuf,
    pub file_name: String,
    /// EXIF Orientation から求めた回転
    pub rotation: Rotation,
    /// HEICから変換した場合の元ファイル
    pub converted_from: Option<PathBuf>,
}

const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
const HEIC_EXTENSIONS: &[&str] = &["heic", "heif"];

fn extension_lower(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Check if a file extension is a supported image format
fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    JPEG_EXTENSIONS.contains(&ext.as_str()) || HEIC_EXTENSIONS.contains(&ext.as_str())
}

/// フォルダ直下のJPEG/HEICを列挙（HEICはJPEGに変換）
pub fn scan_folder(folder: &Path, config: &Config) -> Result<Vec<ScannedImage>> {
    if !folder.is_dir() {
        return Err(OverlayError::FolderNotFound(folder.display().to_string()));
    }

    let mut candidates: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| extension_lower(p).is_some_and(|ext| is_image_extension(&ext)))
        .collect();
    candidates.sort();

    // 同じJPEGを二重に登録しないようパスで管理
    let mut images: BTreeMap<PathBuf, ScannedImage> = BTreeMap::new();

    for path in candidates {
        let is_heic = extension_lower(&path)
            .is_some_and(|ext| HEIC_EXTENSIONS.contains(&ext.as_str()));

        let (jpeg_path, converted_from) = if is_heic {
            let target = heic::jpeg_path_for(&path);
            if target.is_file() {
                debug!("変換済みJPEGあり、変換をスキップ: {}", target.display());
                (target, Some(path))
            } else {
                match heic::convert_heic_to_jpg(&path, config) {
                    Ok(jpg) => (jpg, Some(path)),
                    Err(e) => {
                        warn!("HEIC変換に失敗、スキップ: {}", e);
                        continue;
                    }
                }
            }
        } else {
            (path, None)
        };

        if let Some(existing) = images.get_mut(&jpeg_path) {
            if existing.converted_from.is_none() {
                existing.converted_from = converted_from;
            }
            continue;
        }

        let rotation = exif::read_rotation(&jpeg_path).unwrap_or_else(|e| {
            warn!("EXIF読み込み失敗（回転なし扱い）: {}: {}", jpeg_path.display(), e);
            Rotation::None
        });

        let file_name = jpeg_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        images.insert(
            jpeg_path.clone(),
            ScannedImage {
                path: jpeg_path,
                file_name,
                rotation,
                converted_from,
            },
        );
    }

    let mut images: Vec<ScannedImage> = images.into_values().collect();
    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}
