//! Photo Overlay Common Library
//!
//! 描画・I/Oを持たない純粋なロジック（測地計算・レコード型・レイアウト・命名）

pub mod error;
pub mod geodesy;
pub mod layout;
pub mod naming;
pub mod types;

pub use error::{Error, Result};
pub use geodesy::{bearing, dms_to_decimal, normalize_bearing, DmsPart, GeoPoint};
pub use layout::{
    gradient_alpha, layout_for, BoxFill, OverlayBox, OverlayLabels, OverlayLayout,
};
pub use naming::{output_file_name, record_file_name};
pub use types::{AnnotationRow, GeoStamp, ImageRecord, OverlayVariant, Rotation, SHEET_COLUMNS};
