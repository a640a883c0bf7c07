//! テスト用の写真・フォント代替
//!
//! JPEGは image で生成し、EXIFは kamadak-exif の Writer で組み立てて差し込む。

#![allow(dead_code)]

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use photo_overlay::render::Typesetter;
use photo_overlay::scanner::exif::embed_exif_in_jpeg;
use std::io::Cursor;
use std::path::Path;

/// 32°15'11.34"S
pub const LAT_DMS: [(u32, u32); 3] = [(32, 1), (15, 1), (1134, 100)];
/// 115°46'1.488"E
pub const LON_DMS: [(u32, u32); 3] = [(115, 1), (46, 1), (1488, 1000)];
pub const LATITUDE: f64 = -32.25315;
pub const LONGITUDE: f64 = 115.76708;
pub const DATETIME: &str = "2024:06:12 09:15:30";

/// 写真に埋め込むEXIF
#[derive(Clone, Default)]
pub struct PhotoExif {
    pub gps: bool,
    pub datetime: Option<&'static str>,
    pub orientation: Option<u16>,
}

impl PhotoExif {
    /// 位置情報と撮影日時あり
    pub fn geotagged() -> Self {
        Self {
            gps: true,
            datetime: Some(DATETIME),
            orientation: None,
        }
    }
}

fn rationals(parts: [(u32, u32); 3]) -> Value {
    Value::Rational(parts.iter().map(|&(n, d)| Rational::from((n, d))).collect())
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

fn field(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

/// TIFF形式のEXIFブロック
pub fn exif_block(photo: &PhotoExif) -> Vec<u8> {
    let mut fields = Vec::new();
    if photo.gps {
        fields.push(field(Tag::GPSLatitudeRef, ascii("S")));
        fields.push(field(Tag::GPSLatitude, rationals(LAT_DMS)));
        fields.push(field(Tag::GPSLongitudeRef, ascii("E")));
        fields.push(field(Tag::GPSLongitude, rationals(LON_DMS)));
    }
    if let Some(datetime) = photo.datetime {
        fields.push(field(Tag::DateTimeOriginal, ascii(datetime)));
    }
    if let Some(orientation) = photo.orientation {
        fields.push(field(Tag::Orientation, Value::Short(vec![orientation])));
    }
    // 空のIFDは書けないのでソフト名を入れておく
    fields.push(field(Tag::Software, ascii("photo-overlay-test")));

    let mut writer = Writer::new();
    for f in &fields {
        writer.push_field(f);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).expect("EXIF書き込み失敗");
    buf.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .encode(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .expect("JPEG生成失敗");
    out
}

/// JPEGを書き出す（EXIF指定があれば差し込む）
pub fn write_photo(path: &Path, width: u32, height: u32, exif: Option<&PhotoExif>) {
    let jpeg = jpeg_bytes(width, height, [40, 90, 140]);
    let bytes = match exif {
        Some(photo) => embed_exif_in_jpeg(&jpeg, &exif_block(photo)).expect("EXIF差し込み失敗"),
        None => jpeg,
    };
    std::fs::write(path, bytes).expect("写真の書き込み失敗");
}

/// 1文字を塗りつぶし矩形で描く（フォント不要）
pub struct BlockTypesetter;

impl BlockTypesetter {
    fn advance(size_px: f32) -> u32 {
        ((size_px * 0.6) as u32).max(1)
    }
}

impl Typesetter for BlockTypesetter {
    fn measure(&self, text: &str, size_px: f32) -> (u32, u32) {
        if size_px < 1.0 || text.is_empty() {
            return (0, 0);
        }
        (text.chars().count() as u32 * Self::advance(size_px), size_px as u32)
    }

    fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, size_px: f32, color: Rgba<u8>) {
        if size_px < 1.0 {
            return;
        }
        let advance = Self::advance(size_px);
        let glyph_width = advance.saturating_sub(1).max(1);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = x + (i as u32 * advance) as i32;
            draw_filled_rect_mut(canvas, Rect::at(left, y).of_size(glyph_width, size_px as u32), color);
        }
    }
}
