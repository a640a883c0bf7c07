//! スプレッドシート1枚分の一括処理
//!
//! 行ごとに 回転 → EXIF抽出 → （代替値） → 描画・保存 を行う。
//! 行単位の失敗はログに残して次の行へ進む。

use crate::config::Config;
use crate::error::{OverlayError, Result};
use crate::metadata::extract_geostamp;
use crate::render::{render_to_file, Typesetter};
use crate::rotate::copy_and_rotate;
use crate::sheet;
use indicatif::{ProgressBar, ProgressStyle};
use photo_overlay_common::{normalize_bearing, AnnotationRow, GeoStamp, ImageRecord, OverlayVariant};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 1行の結果
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Rendered(PathBuf),
    /// EXIFが無く代替値で描画
    RenderedWithFallback(PathBuf),
    /// EXIFが無く代替値も無効
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// 描画数（代替値を含む）
    pub rendered: usize,
    pub with_fallback: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outputs: Vec<PathBuf>,
}

impl BatchSummary {
    fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Rendered(path) => {
                self.rendered += 1;
                self.outputs.push(path);
            }
            RowOutcome::RenderedWithFallback(path) => {
                self.rendered += 1;
                self.with_fallback += 1;
                self.outputs.push(path);
            }
            RowOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.rendered + self.skipped + self.failed
    }
}

/// スプレッドシートを読んで全行を処理
///
/// 中断するのはスプレッドシート自体が読めない場合だけ。
pub fn process_sheet(
    sheet_path: &Path,
    output_dir: &Path,
    variant: OverlayVariant,
    config: &Config,
    typesetter: &dyn Typesetter,
) -> Result<BatchSummary> {
    let rows = sheet::read_rows(sheet_path)?;
    info!("{}行を処理: {}", rows.len(), sheet_path.display());
    process_rows(&rows, output_dir, variant, config, typesetter)
}

pub fn process_rows(
    rows: &[AnnotationRow],
    output_dir: &Path,
    variant: OverlayVariant,
    config: &Config,
    typesetter: &dyn Typesetter,
) -> Result<BatchSummary> {
    std::fs::create_dir_all(output_dir)?;

    let progress = ProgressBar::new(rows.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    let mut summary = BatchSummary::default();

    for row in rows {
        progress.set_message(file_label(&row.image_path));

        match process_row(row, output_dir, variant, config, typesetter) {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                error!("処理失敗: {}: {}", row.image_path.display(), e);
                summary.failed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(
        "描画 {} (代替値 {}), スキップ {}, 失敗 {}",
        summary.rendered, summary.with_fallback, summary.skipped, summary.failed
    );
    Ok(summary)
}

/// 1行分の処理
pub fn process_row(
    row: &AnnotationRow,
    output_dir: &Path,
    variant: OverlayVariant,
    config: &Config,
    typesetter: &dyn Typesetter,
) -> Result<RowOutcome> {
    if !row.image_path.is_file() {
        return Err(OverlayError::FileNotFound(row.image_path.display().to_string()));
    }

    let source = if row.rotation.is_none() {
        row.image_path.clone()
    } else {
        copy_and_rotate(&row.image_path, row.rotation, config.rotated_jpeg_quality)?
    };

    let stamp = match extract_geostamp(&source, config.bearing_reference.as_ref()) {
        Ok(stamp) => stamp,
        Err(e) => {
            warn!("EXIF抽出失敗: {}: {}", source.display(), e);
            None
        }
    };

    let (stamp, used_fallback) = match stamp {
        Some(stamp) => (stamp, false),
        None if config.fallback_enabled => {
            warn!("位置情報なし、代替値で描画: {}", source.display());
            (fallback_stamp(config), true)
        }
        None => {
            warn!("位置情報なし、スキップ: {}", source.display());
            return Ok(RowOutcome::Skipped);
        }
    };

    let record = ImageRecord::new(source, row, &stamp);
    let output = render_to_file(&record, variant, &config.labels, typesetter, output_dir)?;

    Ok(if used_fallback {
        RowOutcome::RenderedWithFallback(output)
    } else {
        RowOutcome::Rendered(output)
    })
}

/// 設定の代替値（方位は正規化）
pub fn fallback_stamp(config: &Config) -> GeoStamp {
    let fallback = &config.fallback;
    GeoStamp {
        latitude: fallback.latitude,
        longitude: fallback.longitude,
        date: fallback.date.clone(),
        time: fallback.time.clone(),
        bearing: normalize_bearing(fallback.bearing),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
