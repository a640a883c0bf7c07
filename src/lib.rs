//! photo-overlay
//!
//! 位置情報付き写真に方位・座標・注記のオーバーレイを焼き込むバッチツール。

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod metadata;
pub mod render;
pub mod rotate;
pub mod scanner;
pub mod sheet;
