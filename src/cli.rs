use clap::{Parser, Subcommand};
use photo_overlay_common::OverlayVariant;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-overlay")]
#[command(about = "位置情報付き写真にオーバーレイを焼き込むツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真フォルダをスキャンして注記用スプレッドシートを作成
    Scan {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力スプレッドシート（デフォルト: 入力フォルダ/annotations.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// スプレッドシートの各行を描画
    Render {
        /// 注記スプレッドシート (xlsx/xls/ods)
        #[arg(required = true)]
        sheet: PathBuf,

        /// 出力フォルダ（デフォルト: スプレッドシートのフォルダ/overlay）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// オーバーレイの種類 (standardized/partial)
        #[arg(long, default_value = "standardized")]
        variant: OverlayVariant,

        /// 位置情報の無い行に代替値を使う
        #[arg(long)]
        fallback: bool,
    },

    /// 1枚の写真の位置情報・撮影日時を表示
    Inspect {
        /// 写真ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// フォントファイル（TrueType）を設定
        #[arg(long)]
        set_font: Option<PathBuf>,

        /// 代替値の使用 (on/off)
        #[arg(long)]
        fallback: Option<Toggle>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(&self) -> bool {
        matches!(self, Toggle::On)
    }
}

impl std::str::FromStr for Toggle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" | "true" | "yes" => Ok(Toggle::On),
            "off" | "false" | "no" => Ok(Toggle::Off),
            _ => Err(format!("Unknown value: {}. Use on or off", s)),
        }
    }
}
