use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像処理エラー: {0}")]
    Image(#[from] image::ImageError),

    #[error("EXIF読み込みエラー: {0}")]
    Exif(#[from] exif::Error),

    #[error("位置情報・撮影日時がありません: {0}")]
    MissingMetadata(String),

    #[error("スプレッドシート読み込みエラー: {0}")]
    Spreadsheet(String),

    #[error("スプレッドシート書き込みエラー: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("必須列がありません: {0}")]
    MissingColumn(String),

    #[error("フォントが見つかりません。`photo-overlay config --set-font <TTF>` で指定してください（探索: {0}）")]
    FontNotFound(String),

    #[error("フォントが不正です: {0}")]
    InvalidFont(String),

    #[error("HEIC変換エラー: {0}")]
    HeicConversion(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] photo_overlay_common::Error),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
