//! オーバーレイのレイアウト定義
//!
//! 画像サイズからボックス位置・文字サイズ・グラデーションを決める。
//! ラスタ処理は持たない（CLI側の render が描画する）。

use crate::geodesy::{format_latitude, format_longitude};
use crate::types::{ImageRecord, OverlayVariant};
use serde::{Deserialize, Serialize};

// ============================================
// 標準レイアウト（上下3枚ずつ）
// ============================================

/// 帯の高さ = 画像高さ / 12
pub const STRIP_HEIGHT_DIVISOR: u32 = 12;

/// 文字サイズ = 画像高さ × 0.027
pub const STANDARD_FONT_RATIO: f32 = 0.027;

/// 黒帯の不透明度
pub const STANDARD_ALPHA: u8 = 128;

/// 2行目だけ下げるピクセル数
pub const SECOND_LINE_OFFSET_PX: i32 = 20;

/// 1段あたりのボックス数
pub const BOXES_PER_STRIP: u32 = 3;

// ============================================
// 部分レイアウト（左下1枚）
// ============================================

/// 文字サイズ = 画像高さ × 0.035
pub const PARTIAL_FONT_RATIO: f32 = 0.035;

/// 高さ = H/12 - H/240
pub const PARTIAL_HEIGHT_TRIM_DIVISOR: f64 = 240.0;

/// 左下ボックスの最大不透明度
pub const PARTIAL_ALPHA: u8 = 200;

/// 不透明部分の幅（残りはフェード）
pub const PARTIAL_SOLID_FRACTION: f64 = 0.75;

/// 背景ぼかしの強さ（ガウス σ）
pub const PARTIAL_BLUR_SIGMA: f32 = 20.0;

// ============================================
// 固定ラベル
// ============================================

/// 帯に載せる固定文言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayLabels {
    /// 時刻の後ろに付けるUTCオフセット
    pub utc_offset: String,
    pub accuracy: String,
    pub datum: String,
}

impl Default for OverlayLabels {
    fn default() -> Self {
        Self {
            utc_offset: "+10:00".into(),
            accuracy: "ACCURACY 10 m".into(),
            datum: "DATUM WGS84".into(),
        }
    }
}

// ============================================
// ボックス
// ============================================

/// 塗りの種類
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxFill {
    /// 一様な黒
    Solid,
    /// 背景をぼかしてから横方向にフェード
    Gradient { solid_fraction: f64, blur_sigma: f32 },
}

/// 1枚のテキストボックス
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// 最大不透明度
    pub alpha: u8,
    pub lines: Vec<String>,
    pub fill: BoxFill,
    /// 2行目に加える縦方向のずれ
    pub second_line_offset: i32,
}

impl OverlayBox {
    /// 行 `index` の描画原点
    ///
    /// x = left + (width - text_width) / 2
    /// y = top + (height - text_height * 行数) / 2 + text_height * index
    pub fn text_origin(&self, index: usize, text_width: u32, text_height: u32) -> (i32, i32) {
        let line_count = self.lines.len() as i64;
        let tw = text_width as i64;
        let th = text_height as i64;

        let x = self.x as i64 + (self.width as i64 - tw).div_euclid(2);
        let mut y = self.y as i64 + (self.height as i64 - th * line_count).div_euclid(2) + th * index as i64;
        if index == 1 {
            y += self.second_line_offset as i64;
        }

        (x as i32, y as i32)
    }

    /// 列 `column`（ボックス左端からの相対位置）の不透明度
    pub fn alpha_at(&self, column: u32) -> u8 {
        match self.fill {
            BoxFill::Solid => self.alpha,
            BoxFill::Gradient { solid_fraction, .. } => {
                gradient_alpha(column, self.width, self.alpha, solid_fraction)
            }
        }
    }

    pub fn blur_sigma(&self) -> Option<f32> {
        match self.fill {
            BoxFill::Gradient { blur_sigma, .. } if blur_sigma > 0.0 => Some(blur_sigma),
            _ => None,
        }
    }
}

/// 横方向グラデーションの不透明度
///
/// 左 `solid_fraction` は max_alpha、残りを線形に 0 へ。
pub fn gradient_alpha(column: u32, width: u32, max_alpha: u8, solid_fraction: f64) -> u8 {
    let solid_end = (width as f64 * solid_fraction) as u32;
    let gradient_width = width.saturating_sub(solid_end).max(1);

    if column < solid_end {
        return max_alpha;
    }

    let t = (column - solid_end) as f64 / gradient_width as f64;
    let alpha = max_alpha as f64 * (1.0 - t);
    alpha.clamp(0.0, max_alpha as f64) as u8
}

/// 描画計画（文字サイズ + ボックス群）
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub font_px: f32,
    pub boxes: Vec<OverlayBox>,
}

/// 1段分のボックスを横に等分して並べる
fn strip_boxes(
    y: u32,
    image_width: u32,
    box_height: u32,
    contents: Vec<Vec<String>>,
) -> Vec<OverlayBox> {
    let box_width = image_width / contents.len().max(1) as u32;

    contents
        .into_iter()
        .enumerate()
        .map(|(i, lines)| OverlayBox {
            x: i as u32 * box_width,
            y,
            width: box_width,
            height: box_height,
            alpha: STANDARD_ALPHA,
            lines,
            fill: BoxFill::Solid,
            second_line_offset: SECOND_LINE_OFFSET_PX,
        })
        .collect()
}

/// 上段: 方位 / 座標 / 精度・測地系
pub fn top_strip_text(record: &ImageRecord, labels: &OverlayLabels) -> Vec<Vec<String>> {
    vec![
        vec!["DIRECTION".to_string(), format!("{:.1} deg(T)", record.bearing)],
        vec![format_latitude(record.latitude), format_longitude(record.longitude)],
        vec![labels.accuracy.clone(), labels.datum.clone()],
    ]
}

/// 下段: 場所・部材 / 不具合 / 日時
pub fn bottom_strip_text(record: &ImageRecord, labels: &OverlayLabels) -> Vec<Vec<String>> {
    vec![
        vec![record.location.clone(), record.component.clone()],
        vec![record.defect_line1.clone(), record.defect_line2.clone()],
        vec![record.date.clone(), format!("{}{}", record.time, labels.utc_offset)],
    ]
}

/// 標準レイアウト（上下の帯）
pub fn standardized_layout(
    width: u32,
    height: u32,
    record: &ImageRecord,
    labels: &OverlayLabels,
) -> OverlayLayout {
    let box_height = height / STRIP_HEIGHT_DIVISOR;
    let font_px = (height as f32 * STANDARD_FONT_RATIO).trunc();

    let mut boxes = strip_boxes(0, width, box_height, top_strip_text(record, labels));
    boxes.extend(strip_boxes(
        height - box_height,
        width,
        box_height,
        bottom_strip_text(record, labels),
    ));

    OverlayLayout { font_px, boxes }
}

/// 部分レイアウト（左下1枚）
pub fn partial_layout(width: u32, height: u32, record: &ImageRecord) -> OverlayLayout {
    let raw_height = (height / STRIP_HEIGHT_DIVISOR) as f64 - height as f64 / PARTIAL_HEIGHT_TRIM_DIVISOR;
    // 0.5 は偶数側に丸める（28.5 → 28）
    let box_height = (raw_height.round_ties_even().max(0.0) as u32).min(height);
    let font_px = (height as f32 * PARTIAL_FONT_RATIO).trunc();

    let overlay_box = OverlayBox {
        x: 0,
        y: height - box_height,
        width: width / BOXES_PER_STRIP,
        height: box_height,
        alpha: PARTIAL_ALPHA,
        lines: vec![record.location.clone(), record.component.clone()],
        fill: BoxFill::Gradient {
            solid_fraction: PARTIAL_SOLID_FRACTION,
            blur_sigma: PARTIAL_BLUR_SIGMA,
        },
        second_line_offset: 0,
    };

    OverlayLayout { font_px, boxes: vec![overlay_box] }
}

/// 種類に応じたレイアウト
pub fn layout_for(
    variant: OverlayVariant,
    width: u32,
    height: u32,
    record: &ImageRecord,
    labels: &OverlayLabels,
) -> OverlayLayout {
    match variant {
        OverlayVariant::Standardized => standardized_layout(width, height, record, labels),
        OverlayVariant::Partial => partial_layout(width, height, record),
    }
}
