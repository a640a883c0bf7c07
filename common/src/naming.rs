//! 出力ファイル名の生成
//!
//! `{glocation}_{component}_{defect_line1}_{defect_line2}_{idd}.png`
//! 同じ入力なら同じ名前になる（衝突時は上書き）。

use crate::types::ImageRecord;
use regex::Regex;

/// 出力画像の拡張子
pub const OUTPUT_EXTENSION: &str = "png";

/// ファイル名に使えない文字を `-` に置換
pub fn sanitize_component(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref UNSAFE_CHARS: Regex = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap();
    }
    UNSAFE_CHARS.replace_all(text, "-").into_owned()
}

/// 5つの値から出力ファイル名を作る
pub fn output_file_name(
    location: &str,
    component: &str,
    defect_line1: &str,
    defect_line2: &str,
    idd: &str,
) -> String {
    let stem = [location, component, defect_line1, defect_line2, idd]
        .iter()
        .map(|part| sanitize_component(part))
        .collect::<Vec<_>>()
        .join("_");
    format!("{}.{}", stem, OUTPUT_EXTENSION)
}

/// レコードから出力ファイル名を作る
pub fn record_file_name(record: &ImageRecord) -> String {
    output_file_name(
        &record.location,
        &record.component,
        &record.defect_line1,
        &record.defect_line2,
        &record.idd_text(),
    )
}
