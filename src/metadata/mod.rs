//! 位置情報・撮影日時の抽出
//!
//! GPSLatitude/GPSLongitude と DateTimeOriginal の両方が揃っている場合のみ
//! GeoStamp を返す。どちらかが無ければ None（「取得不可」）。

use crate::error::{OverlayError, Result};
use crate::scanner::exif::read_exif;
use chrono::NaiveDateTime;
use exif::{Exif, Field, In, Tag, Value};
use photo_overlay_common::geodesy::signed_coordinate;
use photo_overlay_common::{dms_to_decimal, DmsPart, GeoPoint, GeoStamp};
use std::path::Path;
use tracing::debug;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// 画像ファイルから GeoStamp を抽出
///
/// `reference` が None のとき、方位は撮影地点自身に対して計算する。
pub fn extract_geostamp(path: &Path, reference: Option<&GeoPoint>) -> Result<Option<GeoStamp>> {
    let Some(exif) = read_exif(path)? else {
        debug!("EXIFなし: {}", path.display());
        return Ok(None);
    };
    geostamp_from_exif(&exif, reference)
}

pub fn geostamp_from_exif(exif: &Exif, reference: Option<&GeoPoint>) -> Result<Option<GeoStamp>> {
    let lat_field = exif.get_field(Tag::GPSLatitude, In::PRIMARY);
    let lon_field = exif.get_field(Tag::GPSLongitude, In::PRIMARY);
    let datetime = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .and_then(ascii_value);

    let (Some(lat_field), Some(lon_field), Some(datetime)) = (lat_field, lon_field, datetime) else {
        debug!("GPSまたはDateTimeOriginalがありません");
        return Ok(None);
    };

    let latitude = signed_coordinate(
        decimal_degrees(lat_field)?,
        &hemisphere_ref(exif, Tag::GPSLatitudeRef),
    );
    let longitude = signed_coordinate(
        decimal_degrees(lon_field)?,
        &hemisphere_ref(exif, Tag::GPSLongitudeRef),
    );

    let (date, time) = split_timestamp(&datetime);

    let here = GeoPoint::new(latitude, longitude);
    let bearing = here.bearing_to(reference.unwrap_or(&here));

    Ok(Some(GeoStamp {
        latitude,
        longitude,
        date,
        time,
        bearing,
    }))
}

/// 度分秒フィールド → 10進度
fn decimal_degrees(field: &Field) -> Result<f64> {
    let parts = dms_parts(&field.value).ok_or_else(|| {
        OverlayError::MissingMetadata(format!("{} の形式が不正: {}", field.tag, field.display_value()))
    })?;
    Ok(dms_to_decimal(parts[0], parts[1], parts[2])?)
}

fn dms_parts(value: &Value) -> Option<[DmsPart; 3]> {
    match value {
        Value::Rational(v) if v.len() >= 3 => Some([
            DmsPart::from((v[0].num, v[0].denom)),
            DmsPart::from((v[1].num, v[1].denom)),
            DmsPart::from((v[2].num, v[2].denom)),
        ]),
        Value::Double(v) if v.len() >= 3 => Some([v[0].into(), v[1].into(), v[2].into()]),
        Value::Float(v) if v.len() >= 3 => Some([
            (v[0] as f64).into(),
            (v[1] as f64).into(),
            (v[2] as f64).into(),
        ]),
        _ => None,
    }
}

fn hemisphere_ref(exif: &Exif, tag: Tag) -> String {
    exif.get_field(tag, In::PRIMARY)
        .and_then(ascii_value)
        .unwrap_or_default()
}

fn ascii_value(field: &Field) -> Option<String> {
    match &field.value {
        Value::Ascii(values) => values
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches('\0').trim().to_string()),
        _ => None,
    }
}

/// "2025:11:24 10:23:45" → ("2025-11-24", "10:23:45")
pub fn split_timestamp(raw: &str) -> (String, String) {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, EXIF_DATETIME_FORMAT) {
        return (
            dt.format("%Y-%m-%d").to_string(),
            dt.format("%H:%M:%S").to_string(),
        );
    }

    // 形式が崩れていても日付と時刻の区切りだけで分ける
    let mut parts = raw.splitn(2, ' ');
    let date = parts.next().unwrap_or_default().replace(':', "-");
    let time = parts.next().unwrap_or_default().trim().to_string();
    (date, time)
}
