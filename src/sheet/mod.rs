//! 注記スプレッドシートの読み書き
//!
//! 読み込みは calamine（xlsx/xls/ods）、書き出しは rust_xlsxwriter。
//! 列は見出し名で対応付けるので順序は問わない。

use crate::error::{OverlayError, Result};
use crate::scanner::ScannedImage;
use calamine::{open_workbook_auto, Data, Reader};
use photo_overlay_common::{AnnotationRow, Rotation, SHEET_COLUMNS};
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 省略可能な列（無ければ回転なし）
const OPTIONAL_COLUMNS: &[&str] = &["rotation"];

/// 先頭シートを読み、画像パスのある行だけを返す
///
/// 相対パスはスプレッドシートのあるフォルダ基準で解決する。
pub fn read_rows(sheet_path: &Path) -> Result<Vec<AnnotationRow>> {
    if !sheet_path.is_file() {
        return Err(OverlayError::FileNotFound(sheet_path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(sheet_path)
        .map_err(|e| OverlayError::Spreadsheet(format!("{}: {}", sheet_path.display(), e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| OverlayError::Spreadsheet(format!("シートがありません: {}", sheet_path.display())))?
        .map_err(|e| OverlayError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| OverlayError::Spreadsheet(format!("見出し行がありません: {}", sheet_path.display())))?;
    let columns = ColumnMap::from_header(header)?;

    let base_dir = sheet_path.parent().unwrap_or_else(|| Path::new(""));
    let mut result = Vec::new();

    for (index, cells) in rows.enumerate() {
        // 見出しが1行目なのでデータは2行目から
        let line = index + 2;
        let image_path = columns.text(cells, "image_path");
        if image_path.is_empty() {
            debug!("{}行目: image_path が空のためスキップ", line);
            continue;
        }

        result.push(AnnotationRow {
            image_path: resolve_path(base_dir, &image_path),
            glocation: columns.text(cells, "glocation"),
            component: columns.text(cells, "component"),
            defect_line1: columns.text(cells, "defect_line1"),
            defect_line2: columns.text(cells, "defect_line2"),
            idd: columns.idd(cells, line),
            rotation: columns.rotation(cells, line),
        });
    }

    debug!("{}行読み込み: {}", result.len(), sheet_path.display());
    Ok(result)
}

fn resolve_path(base_dir: &Path, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// 列名 → 列番号
struct ColumnMap {
    index: HashMap<String, usize>,
}

impl ColumnMap {
    fn from_header(header: &[Data]) -> Result<Self> {
        let index: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, cell)| (cell_text(cell).to_lowercase(), i))
            .filter(|(name, _)| !name.is_empty())
            .collect();

        let missing: Vec<&str> = SHEET_COLUMNS
            .iter()
            .filter(|name| !OPTIONAL_COLUMNS.contains(*name))
            .filter(|name| !index.contains_key(**name))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(OverlayError::MissingColumn(missing.join(", ")));
        }

        Ok(Self { index })
    }

    fn cell<'a>(&self, cells: &'a [Data], name: &str) -> Option<&'a Data> {
        self.index.get(name).and_then(|&i| cells.get(i))
    }

    fn text(&self, cells: &[Data], name: &str) -> String {
        self.cell(cells, name).map(cell_text).unwrap_or_default()
    }

    fn idd(&self, cells: &[Data], line: usize) -> Option<i64> {
        let cell = self.cell(cells, "idd")?;
        let value = cell_integer(cell);
        if value.is_none() && !cell_text(cell).is_empty() {
            warn!("{}行目: idd が整数ではありません: {}", line, cell_text(cell));
        }
        value
    }

    fn rotation(&self, cells: &[Data], line: usize) -> Rotation {
        let Some(cell) = self.cell(cells, "rotation") else {
            return Rotation::None;
        };
        if cell_text(cell).is_empty() {
            return Rotation::None;
        }

        match cell_integer(cell).map(Rotation::from_degrees) {
            Some(Ok(rotation)) => rotation,
            Some(Err(e)) => {
                warn!("{}行目: {}（回転なし扱い）", line, e);
                Rotation::None
            }
            None => {
                warn!("{}行目: rotation が数値ではありません: {}（回転なし扱い）", line, cell_text(cell));
                Rotation::None
            }
        }
    }
}

/// セルを文字列に（整数値の小数は "3.0" でなく "3"）
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (*f as i64).to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_integer(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.fract() == 0.0 => Some(*f as i64),
        Data::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// 注記行をxlsxに書き出す
pub fn write_rows(rows: &[AnnotationRow], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, name) in SHEET_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }
    worksheet.set_column_width(0, 60)?;
    for col in 1..5u16 {
        worksheet.set_column_width(col, 20)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, row.image_path.to_string_lossy())?;
        worksheet.write_string(r, 1, &row.glocation)?;
        worksheet.write_string(r, 2, &row.component)?;
        worksheet.write_string(r, 3, &row.defect_line1)?;
        worksheet.write_string(r, 4, &row.defect_line2)?;
        if let Some(idd) = row.idd {
            worksheet.write_number(r, 5, idd as f64)?;
        }
        worksheet.write_number(r, 6, row.rotation.degrees() as f64)?;
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    workbook.save(path)?;
    debug!("{}行書き出し: {}", rows.len(), path.display());
    Ok(())
}

/// スキャン結果から注記用のテンプレートを作る
///
/// 画像パスは絶対パスにし、回転はEXIFから求めた値を入れる。
/// 注記欄は空のまま。
pub fn write_template(images: &[ScannedImage], path: &Path) -> Result<()> {
    let rows: Vec<AnnotationRow> = images
        .iter()
        .map(|image| AnnotationRow {
            image_path: std::fs::canonicalize(&image.path).unwrap_or_else(|_| image.path.clone()),
            rotation: image.rotation,
            ..Default::default()
        })
        .collect();
    write_rows(&rows, path)
}
