use crate::error::{OverlayError, Result};
use photo_overlay_common::{GeoPoint, OverlayLabels};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// EXIFが読めない行の代替値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackGeodata {
    pub latitude: f64,
    pub longitude: f64,
    pub date: String,
    pub time: String,
    /// 正規化前の値（-75 → 285）
    pub bearing: f64,
}

impl Default for FallbackGeodata {
    fn default() -> Self {
        Self {
            latitude: -32.25315,
            longitude: 115.76708,
            date: "2024:06:12".into(),
            time: "2024:06:12".into(),
            bearing: -75.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// TrueTypeフォント（未指定ならシステムフォントを探す）
    pub font_path: Option<PathBuf>,
    /// HEIC→JPEGの外部変換コマンド（未指定なら libheif で変換）
    pub heic_converter: Option<String>,
    /// 外部変換コマンドの追加引数（入力・出力パスの前に付く）
    pub heic_converter_args: Vec<String>,
    /// 回転コピーのJPEG品質
    pub rotated_jpeg_quality: u8,
    pub labels: OverlayLabels,
    /// 方位の基準点（未指定なら撮影地点自身）
    pub bearing_reference: Option<GeoPoint>,
    /// EXIFが無い行に代替値を使うか
    pub fallback_enabled: bool,
    pub fallback: FallbackGeodata,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| OverlayError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-overlay").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            font_path: None,
            heic_converter: None,
            heic_converter_args: Vec::new(),
            rotated_jpeg_quality: 95,
            labels: OverlayLabels::default(),
            bearing_reference: None,
            fallback_enabled: false,
            fallback: FallbackGeodata::default(),
        }
    }

    pub fn set_font_path(&mut self, path: PathBuf) -> Result<()> {
        if !path.is_file() {
            return Err(OverlayError::FileNotFound(path.display().to_string()));
        }
        self.font_path = Some(path);
        self.save()
    }

    pub fn set_fallback_enabled(&mut self, enabled: bool) -> Result<()> {
        self.fallback_enabled = enabled;
        self.save()
    }
}
