//! 描画テスト
//!
//! ブロック文字の Typesetter で描画し、サイズ・命名・上書きを検証

mod support;

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use photo_overlay::render::{render_overlay, render_to_file};
use photo_overlay_common::{ImageRecord, OverlayLabels, OverlayVariant, Rotation};
use std::path::Path;
use support::{write_photo, BlockTypesetter};
use tempfile::tempdir;

fn record(path: &Path) -> ImageRecord {
    ImageRecord {
        path: path.to_path_buf(),
        latitude: -32.25315,
        longitude: 115.76708,
        date: "2024-06-12".into(),
        time: "09:15:30".into(),
        bearing: 285.0,
        location: "Span 3".into(),
        component: "Girder".into(),
        defect_line1: "Crack".into(),
        defect_line2: "0.3mm".into(),
        idd: Some(42),
        rotation: Rotation::None,
    }
}

/// 出力サイズは入力と同じ
#[test]
fn test_output_keeps_dimensions() {
    let dir = tempdir().expect("Failed to create temp dir");
    let src = dir.path().join("src.jpg");
    write_photo(&src, 360, 240, None);
    let out_dir = dir.path().join("out");

    for variant in [OverlayVariant::Standardized, OverlayVariant::Partial] {
        let output = render_to_file(&record(&src), variant, &OverlayLabels::default(), &BlockTypesetter, &out_dir)
            .expect("描画失敗");
        let rendered = image::open(&output).expect("出力PNGが開けません");
        assert_eq!(rendered.dimensions(), (360, 240), "{}", variant);
    }
}

/// ファイル名は注記から決まる
#[test]
fn test_output_file_name() {
    let dir = tempdir().expect("Failed to create temp dir");
    let src = dir.path().join("IMG_1061.jpg");
    write_photo(&src, 120, 96, None);

    let output = render_to_file(
        &record(&src),
        OverlayVariant::Standardized,
        &OverlayLabels::default(),
        &BlockTypesetter,
        dir.path(),
    )
    .unwrap();

    assert_eq!(output, dir.path().join("Span 3_Girder_Crack_0.3mm_42.png"));
    assert!(output.is_file());
}

/// 同じ注記なら上書き
#[test]
fn test_same_annotation_overwrites() {
    let dir = tempdir().expect("Failed to create temp dir");
    let first = dir.path().join("a.jpg");
    let second = dir.path().join("b.jpg");
    write_photo(&first, 120, 96, None);
    write_photo(&second, 200, 100, None);
    let out_dir = dir.path().join("out");

    let labels = OverlayLabels::default();
    let a = render_to_file(&record(&first), OverlayVariant::Partial, &labels, &BlockTypesetter, &out_dir).unwrap();
    let b = render_to_file(&record(&second), OverlayVariant::Partial, &labels, &BlockTypesetter, &out_dir).unwrap();

    assert_eq!(a, b);
    assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 1);
    assert_eq!(image::open(&b).unwrap().dimensions(), (200, 100));
}

/// 上段の帯に文字が描かれる
#[test]
fn test_text_is_drawn_in_strip() {
    let base = DynamicImage::ImageRgba8(RgbaImage::from_pixel(600, 480, Rgba([0, 0, 0, 255])));
    let out = render_overlay(
        &base,
        &record(Path::new("unused.jpg")),
        OverlayVariant::Standardized,
        &OverlayLabels::default(),
        &BlockTypesetter,
    );

    // 上段 40px の帯に白い画素がある、中央にはない
    let strip_has_text = (0..40).any(|y| (0..600).any(|x| out.get_pixel(x, y)[0] == 255));
    let middle_has_text = (100..380).any(|y| (0..600).any(|x| out.get_pixel(x, y)[0] == 255));
    assert!(strip_has_text);
    assert!(!middle_has_text);
}

/// 存在しない画像はエラー
#[test]
fn test_missing_source_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = render_to_file(
        &record(&dir.path().join("missing.jpg")),
        OverlayVariant::Standardized,
        &OverlayLabels::default(),
        &BlockTypesetter,
        dir.path(),
    );
    assert!(result.is_err());
}
