//! 文字の計測と描画
//!
//! 描画処理は `Typesetter` 越しに文字を扱う。本番は TrueType フォント
//! （ab_glyph + imageproc）、テストではフォント不要の実装を差し込める。

use crate::error::{OverlayError, Result};
use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 等幅フォントの探索候補
pub const FONT_CANDIDATES: &[&str] = &[
    r"C:\Windows\Fonts\consola.ttf",
    r"C:\Windows\Fonts\CONSOLA.TTF",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/Library/Fonts/Courier New.ttf",
];

pub trait Typesetter {
    /// 文字列の (幅, 高さ) ピクセル
    fn measure(&self, text: &str, size_px: f32) -> (u32, u32);

    /// (x, y) を左上として描画
    fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, size_px: f32, color: Rgba<u8>);
}

/// TrueTypeフォントによる描画
pub struct GlyphTypesetter {
    font: FontVec,
    source: PathBuf,
}

impl GlyphTypesetter {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(OverlayError::FileNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec(data)
            .map_err(|e| OverlayError::InvalidFont(format!("{}: {}", path.display(), e)))?;

        debug!("フォント読み込み: {}", path.display());
        Ok(Self {
            font,
            source: path.to_path_buf(),
        })
    }

    /// 指定フォント → 候補の順に探す
    pub fn locate(font_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = font_path {
            return Self::from_file(path);
        }

        FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .find(|p| p.is_file())
            .map(Self::from_file)
            .unwrap_or_else(|| Err(OverlayError::FontNotFound(FONT_CANDIDATES.join(", "))))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl Typesetter for GlyphTypesetter {
    fn measure(&self, text: &str, size_px: f32) -> (u32, u32) {
        if size_px <= 0.0 || text.is_empty() {
            return (0, 0);
        }
        text_size(PxScale::from(size_px), &self.font, text)
    }

    fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, size_px: f32, color: Rgba<u8>) {
        if size_px <= 0.0 || text.is_empty() {
            return;
        }
        draw_text_mut(canvas, color, x, y, PxScale::from(size_px), &self.font, text);
    }
}
