//! 測地計算モジュール
//!
//! - EXIFの度分秒（有理数 or 数値）→ 10進度
//! - 2点間の初期方位角（真北から時計回り）
//! - 座標ラベルの整形

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 10進度の丸め桁数
pub const DECIMAL_PLACES: i32 = 5;

/// 度分秒の1要素
///
/// EXIFのGPSLatitude等は有理数の3つ組だが、数値で渡されることもある。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DmsPart {
    Rational { num: u32, denom: u32 },
    Number(f64),
}

impl DmsPart {
    pub fn to_f64(self) -> Result<f64> {
        match self {
            DmsPart::Rational { num, denom } => {
                if denom == 0 {
                    return Err(Error::ZeroDenominator(num));
                }
                Ok(num as f64 / denom as f64)
            }
            DmsPart::Number(v) => Ok(v),
        }
    }
}

impl From<(u32, u32)> for DmsPart {
    fn from((num, denom): (u32, u32)) -> Self {
        DmsPart::Rational { num, denom }
    }
}

impl From<f64> for DmsPart {
    fn from(v: f64) -> Self {
        DmsPart::Number(v)
    }
}

impl From<u32> for DmsPart {
    fn from(v: u32) -> Self {
        DmsPart::Number(v as f64)
    }
}

/// 度分秒 → 10進度（小数5桁に丸め）
pub fn dms_to_decimal(
    degrees: impl Into<DmsPart>,
    minutes: impl Into<DmsPart>,
    seconds: impl Into<DmsPart>,
) -> Result<f64> {
    let d = degrees.into().to_f64()?;
    let m = minutes.into().to_f64()? / 60.0;
    let s = seconds.into().to_f64()? / 3600.0;
    Ok(round_to(d + m + s, DECIMAL_PLACES))
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// 半球参照（N/S/E/W）を符号に反映
pub fn signed_coordinate(decimal: f64, hemisphere_ref: &str) -> f64 {
    match hemisphere_ref.trim().chars().next() {
        Some('S') | Some('s') | Some('W') | Some('w') => -decimal.abs(),
        _ => decimal,
    }
}

/// 任意の角度を [0, 360) に正規化
pub fn normalize_bearing(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    // 負の極小値は丸めで 360.0 になる
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// 初期方位角（度）
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    normalize_bearing(x.atan2(y).to_degrees())
}

/// 地点（10進度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// 緯度ラベル（例: "31.12345°S"）
pub fn format_latitude(latitude: f64) -> String {
    let hemisphere = if latitude < 0.0 { 'S' } else { 'N' };
    format!("{:.5}°{}", latitude.abs(), hemisphere)
}

/// 経度ラベル（例: "115.12345°E"）
pub fn format_longitude(longitude: f64) -> String {
    let hemisphere = if longitude < 0.0 { 'W' } else { 'E' };
    format!("{:.5}°{}", longitude.abs(), hemisphere)
}
