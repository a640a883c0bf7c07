//! オーバーレイ描画
//!
//! レイアウト（common::layout）に従ってボックスを合成し、文字を載せる。
//! 入力画像と同じサイズのRGBA画像を返す。

pub mod font;

pub use font::{GlyphTypesetter, Typesetter};

use crate::error::Result;
use image::{imageops, DynamicImage, ImageFormat, Pixel, Rgba, RgbaImage};
use photo_overlay_common::{layout_for, record_file_name, ImageRecord, OverlayBox, OverlayLabels, OverlayVariant};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 文字色
pub const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub fn render_overlay(
    base: &DynamicImage,
    record: &ImageRecord,
    variant: OverlayVariant,
    labels: &OverlayLabels,
    typesetter: &dyn Typesetter,
) -> RgbaImage {
    let mut canvas = base.to_rgba8();
    let (width, height) = canvas.dimensions();
    let layout = layout_for(variant, width, height, record, labels);

    for overlay_box in &layout.boxes {
        if let Some(sigma) = overlay_box.blur_sigma() {
            blur_region(&mut canvas, overlay_box, sigma);
        }
        shade_box(&mut canvas, overlay_box);
        draw_box_text(&mut canvas, overlay_box, layout.font_px, typesetter);
    }

    canvas
}

/// ボックスの下地をぼかす（ボックス内の画素だけを使う）
fn blur_region(canvas: &mut RgbaImage, overlay_box: &OverlayBox, sigma: f32) {
    let Some((x, y, w, h)) = clip(canvas, overlay_box) else {
        return;
    };
    let region = imageops::crop_imm(&*canvas, x, y, w, h).to_image();
    let blurred = imageops::blur(&region, sigma);
    imageops::replace(canvas, &blurred, x as i64, y as i64);
}

/// 黒を列ごとの不透明度で重ねる
fn shade_box(canvas: &mut RgbaImage, overlay_box: &OverlayBox) {
    let Some((x0, y0, w, h)) = clip(canvas, overlay_box) else {
        return;
    };

    for dx in 0..w {
        let alpha = overlay_box.alpha_at(x0 - overlay_box.x + dx);
        if alpha == 0 {
            continue;
        }
        let shade = Rgba([0, 0, 0, alpha]);
        for dy in 0..h {
            canvas.get_pixel_mut(x0 + dx, y0 + dy).blend(&shade);
        }
    }
}

fn draw_box_text(canvas: &mut RgbaImage, overlay_box: &OverlayBox, font_px: f32, typesetter: &dyn Typesetter) {
    for (index, line) in overlay_box.lines.iter().enumerate() {
        let (text_width, text_height) = typesetter.measure(line, font_px);
        let (x, y) = overlay_box.text_origin(index, text_width, text_height);
        typesetter.draw(canvas, x, y, line, font_px, TEXT_COLOR);
    }
}

/// 画像内に収まる範囲 (x, y, w, h)
fn clip(canvas: &RgbaImage, overlay_box: &OverlayBox) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = canvas.dimensions();
    if overlay_box.x >= width || overlay_box.y >= height {
        return None;
    }
    let w = overlay_box.width.min(width - overlay_box.x);
    let h = overlay_box.height.min(height - overlay_box.y);
    if w == 0 || h == 0 {
        return None;
    }
    Some((overlay_box.x, overlay_box.y, w, h))
}

/// 描画してPNGで保存、保存先を返す
pub fn render_to_file(
    record: &ImageRecord,
    variant: OverlayVariant,
    labels: &OverlayLabels,
    typesetter: &dyn Typesetter,
    output_dir: &Path,
) -> Result<PathBuf> {
    let base = image::open(&record.path)?;
    let combined = render_overlay(&base, record, variant, labels, typesetter);

    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(record_file_name(record));
    combined.save_with_format(&output_path, ImageFormat::Png)?;

    debug!("保存: {}", output_path.display());
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_overlay_common::layout::{PARTIAL_ALPHA, STANDARD_ALPHA};
    use photo_overlay_common::Rotation;
    use std::cell::RefCell;

    /// 描画呼び出しを記録するだけ
    #[derive(Default)]
    struct RecordingTypesetter {
        calls: RefCell<Vec<(i32, i32, String)>>,
    }

    impl Typesetter for RecordingTypesetter {
        fn measure(&self, text: &str, size_px: f32) -> (u32, u32) {
            ((text.chars().count() as f32 * size_px * 0.5) as u32, size_px as u32)
        }

        fn draw(&self, _canvas: &mut RgbaImage, x: i32, y: i32, text: &str, _size_px: f32, _color: Rgba<u8>) {
            self.calls.borrow_mut().push((x, y, text.to_string()));
        }
    }

    fn record() -> ImageRecord {
        ImageRecord {
            path: PathBuf::from("unused.jpg"),
            latitude: -32.25315,
            longitude: 115.76708,
            date: "2024-06-12".into(),
            time: "09:15:00".into(),
            bearing: 0.0,
            location: "Loc".into(),
            component: "Comp".into(),
            defect_line1: "D1".into(),
            defect_line2: "D2".into(),
            idd: Some(1),
            rotation: Rotation::None,
        }
    }

    fn white(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn test_standardized_shading() {
        let ts = RecordingTypesetter::default();
        let out = render_overlay(&white(300, 240), &record(), OverlayVariant::Standardized, &OverlayLabels::default(), &ts);

        assert_eq!(out.dimensions(), (300, 240));
        let expected = 255 - STANDARD_ALPHA as u16;
        // 上段・下段は暗く、中央はそのまま
        let top = out.get_pixel(150, 5)[0] as u16;
        let bottom = out.get_pixel(150, 235)[0] as u16;
        assert!(top.abs_diff(expected) <= 1, "上段の値: {}", top);
        assert!(bottom.abs_diff(expected) <= 1, "下段の値: {}", bottom);
        assert_eq!(out.get_pixel(150, 120), &Rgba([255, 255, 255, 255]));

        // 6ボックス x 2行
        assert_eq!(ts.calls.borrow().len(), 12);
    }

    #[test]
    fn test_partial_gradient() {
        let ts = RecordingTypesetter::default();
        let out = render_overlay(&white(300, 240), &record(), OverlayVariant::Partial, &OverlayLabels::default(), &ts);

        assert_eq!(out.dimensions(), (300, 240));
        // 240/12 - 240/240 = 19
        let y = 240 - 19 + 5;
        let left = out.get_pixel(0, y)[0] as u16;
        let right = out.get_pixel(99, y)[0] as u16;
        let expected_left = 255 - PARTIAL_ALPHA as u16;
        assert!(left.abs_diff(expected_left) <= 1, "左端の値: {}", left);
        assert!(right >= 240, "右端がほぼ透明でない: {}", right);
        // ボックス外は変化なし
        assert_eq!(out.get_pixel(150, y), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(0, 100), &Rgba([255, 255, 255, 255]));

        let calls = ts.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].2, "Loc");
        assert_eq!(calls[1].2, "Comp");
    }

    #[test]
    fn test_second_line_offset_only_in_standardized() {
        let ts = RecordingTypesetter::default();
        render_overlay(&white(300, 240), &record(), OverlayVariant::Standardized, &OverlayLabels::default(), &ts);
        let calls = ts.calls.borrow();
        // 文字高さ = trunc(240*0.027) = 6, 行差 6 + 20
        assert_eq!(calls[1].1 - calls[0].1, 26);

        let ts = RecordingTypesetter::default();
        render_overlay(&white(300, 240), &record(), OverlayVariant::Partial, &OverlayLabels::default(), &ts);
        let calls = ts.calls.borrow();
        // trunc(240*0.035) = 8
        assert_eq!(calls[1].1 - calls[0].1, 8);
    }

    #[test]
    fn test_clip_outside_image() {
        let canvas = RgbaImage::new(10, 10);
        let overlay_box = OverlayBox {
            x: 20,
            y: 0,
            width: 5,
            height: 5,
            alpha: 128,
            lines: vec![],
            fill: photo_overlay_common::BoxFill::Solid,
            second_line_offset: 0,
        };
        assert!(clip(&canvas, &overlay_box).is_none());
    }
}
