//! レコード型の定義
//!
//! - AnnotationRow: スプレッドシート1行分の注記
//! - GeoStamp: EXIFから抽出した位置・日時・方位
//! - ImageRecord: 描画に渡す最終レコード（AnnotationRow + GeoStamp）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// スプレッドシートの列名（この順で書き出す）
pub const SHEET_COLUMNS: [&str; 7] = [
    "image_path",
    "glocation",
    "component",
    "defect_line1",
    "defect_line2",
    "idd",
    "rotation",
];

/// 反時計回りの回転（90度単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Ccw90,
    Ccw180,
    Ccw270,
}

impl Rotation {
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        match degrees {
            0 | 360 | -360 => Ok(Rotation::None),
            90 | -270 => Ok(Rotation::Ccw90),
            180 | -180 => Ok(Rotation::Ccw180),
            270 | -90 => Ok(Rotation::Ccw270),
            _ => Err(Error::InvalidRotation(degrees)),
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Ccw90 => 90,
            Rotation::Ccw180 => 180,
            Rotation::Ccw270 => 270,
        }
    }

    /// EXIF Orientation → 回転角
    ///
    /// 1: 正位置, 3: 上下逆, 6: 時計回り90度, 8: 反時計回り90度
    pub fn from_exif_orientation(orientation: u32) -> Self {
        match orientation {
            3 => Rotation::Ccw180,
            6 => Rotation::Ccw270,
            8 => Rotation::Ccw90,
            _ => Rotation::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Rotation::None)
    }
}

/// オーバーレイの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayVariant {
    /// 上下3枚ずつの帯
    #[default]
    Standardized,
    /// 左下1枚（ぼかし＋グラデーション）
    Partial,
}

impl std::str::FromStr for OverlayVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standardized" | "standard" | "full" => Ok(OverlayVariant::Standardized),
            "partial" | "compact" => Ok(OverlayVariant::Partial),
            _ => Err(format!("Unknown variant: {}. Use standardized or partial", s)),
        }
    }
}

impl std::fmt::Display for OverlayVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayVariant::Standardized => write!(f, "standardized"),
            OverlayVariant::Partial => write!(f, "partial"),
        }
    }
}

/// スプレッドシート1行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationRow {
    pub image_path: PathBuf,
    pub glocation: String,
    pub component: String,
    pub defect_line1: String,
    pub defect_line2: String,
    pub idd: Option<i64>,
    pub rotation: Rotation,
}

/// EXIFから得た位置・日時・方位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoStamp {
    /// 10進度（南緯は負）
    pub latitude: f64,
    /// 10進度（西経は負）
    pub longitude: f64,
    /// 撮影日（YYYY-MM-DD）
    pub date: String,
    /// 撮影時刻（HH:MM:SS）
    pub time: String,
    /// 方位角 [0, 360)
    pub bearing: f64,
}

/// 描画用レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub path: PathBuf,
    pub latitude: f64,
    pub longitude: f64,
    pub date: String,
    pub time: String,
    pub bearing: f64,
    pub location: String,
    pub component: String,
    pub defect_line1: String,
    pub defect_line2: String,
    pub idd: Option<i64>,
    pub rotation: Rotation,
}

impl ImageRecord {
    /// 行と位置情報を結合（pathは実際に描画するファイル）
    pub fn new(path: PathBuf, row: &AnnotationRow, stamp: &GeoStamp) -> Self {
        Self {
            path,
            latitude: stamp.latitude,
            longitude: stamp.longitude,
            date: stamp.date.clone(),
            time: stamp.time.clone(),
            bearing: stamp.bearing,
            location: row.glocation.clone(),
            component: row.component.clone(),
            defect_line1: row.defect_line1.clone(),
            defect_line2: row.defect_line2.clone(),
            idd: row.idd,
            rotation: row.rotation,
        }
    }

    pub fn idd_text(&self) -> String {
        self.idd.map(|id| id.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0).unwrap(), Rotation::None);
        assert_eq!(Rotation::from_degrees(90).unwrap(), Rotation::Ccw90);
        assert_eq!(Rotation::from_degrees(180).unwrap(), Rotation::Ccw180);
        assert_eq!(Rotation::from_degrees(270).unwrap(), Rotation::Ccw270);
        assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::Ccw270);
        assert_eq!(Rotation::from_degrees(45), Err(Error::InvalidRotation(45)));
        assert_eq!(Rotation::from_degrees(450), Err(Error::InvalidRotation(450)));
    }

    #[test]
    fn test_rotation_from_exif_orientation() {
        assert_eq!(Rotation::from_exif_orientation(1), Rotation::None);
        assert_eq!(Rotation::from_exif_orientation(3), Rotation::Ccw180);
        assert_eq!(Rotation::from_exif_orientation(6), Rotation::Ccw270);
        assert_eq!(Rotation::from_exif_orientation(8), Rotation::Ccw90);
        // 鏡像系は回転なし扱い
        assert_eq!(Rotation::from_exif_orientation(2), Rotation::None);
        assert_eq!(Rotation::from_exif_orientation(0), Rotation::None);
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("partial".parse::<OverlayVariant>().unwrap(), OverlayVariant::Partial);
        assert_eq!("Standardized".parse::<OverlayVariant>().unwrap(), OverlayVariant::Standardized);
        assert!("banner".parse::<OverlayVariant>().is_err());
    }

    #[test]
    fn test_image_record_new() {
        let row = AnnotationRow {
            image_path: PathBuf::from("IMG_1061.jpg"),
            glocation: "Microcell Building".into(),
            component: "Monorail 5024".into(),
            defect_line1: "Corrosion and".into(),
            defect_line2: "dmg in PC".into(),
            idd: Some(3),
            rotation: Rotation::Ccw90,
        };
        let stamp = GeoStamp {
            latitude: -32.25315,
            longitude: 115.76708,
            date: "2025-11-24".into(),
            time: "10:23:45".into(),
            bearing: 12.5,
        };

        let record = ImageRecord::new(PathBuf::from("IMG_1061_rotated.jpg"), &row, &stamp);
        assert_eq!(record.path, PathBuf::from("IMG_1061_rotated.jpg"));
        assert_eq!(record.location, "Microcell Building");
        assert_eq!(record.latitude, -32.25315);
        assert_eq!(record.idd_text(), "3");
        assert_eq!(record.rotation, Rotation::Ccw90);
    }

    #[test]
    fn test_geo_stamp_serialize() {
        let stamp = GeoStamp {
            latitude: -31.5,
            longitude: 115.0,
            date: "2024-06-12".into(),
            time: "09:00:00".into(),
            bearing: 0.0,
        };
        let json = serde_json::to_string(&stamp).expect("シリアライズ失敗");
        assert!(json.contains("\"latitude\":-31.5"));
        assert!(json.contains("\"date\":\"2024-06-12\""));
    }
}
