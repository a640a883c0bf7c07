use clap::Parser;
use photo_overlay::{batch, cli, config, error, metadata, render, scanner, sheet};
use cli::{Cli, Commands};
use config::Config;
use error::{OverlayError, Result};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Scan { folder, output } => {
            println!("📷 photo-overlay - スキャン\n");

            // 1. 画像スキャン（HEICは変換）
            println!("[1/2] 写真をスキャン中...");
            let images = scanner::scan_folder(&folder, &config)?;
            let converted = images.iter().filter(|i| i.converted_from.is_some()).count();
            println!("✔ {}枚の写真を検出（HEIC変換 {}枚）\n", images.len(), converted);

            // 2. テンプレート出力
            println!("[2/2] スプレッドシートを作成中...");
            let output = output.unwrap_or_else(|| folder.join("annotations.xlsx"));
            sheet::write_template(&images, &output)?;
            println!("✔ 保存: {}", output.display());

            println!("\n✅ スキャン完了（注記を記入して render を実行してください）");
        }

        Commands::Render { sheet, output, variant, fallback } => {
            println!("🖼  photo-overlay - 描画 ({})\n", variant);

            let mut config = config;
            if fallback {
                config.fallback_enabled = true;
            }

            let typesetter = render::GlyphTypesetter::locate(config.font_path.as_deref())?;
            println!("- フォント: {}", typesetter.source().display());

            let output_dir = output.unwrap_or_else(|| {
                sheet
                    .parent()
                    .map(|p| p.join("overlay"))
                    .unwrap_or_else(|| PathBuf::from("overlay"))
            });

            println!("[1/1] 描画中...");
            let summary = batch::process_sheet(&sheet, &output_dir, variant, &config, &typesetter)?;
            println!(
                "✔ {}行中 描画 {}枚（代替値 {}枚）, スキップ {}, 失敗 {}",
                summary.total(),
                summary.rendered,
                summary.with_fallback,
                summary.skipped,
                summary.failed
            );
            println!("✔ 出力先: {}", output_dir.display());

            println!("\n✅ 描画完了");
        }

        Commands::Inspect { image, json } => {
            if !image.is_file() {
                return Err(OverlayError::FileNotFound(image.display().to_string()));
            }

            let stamp = metadata::extract_geostamp(&image, config.bearing_reference.as_ref())?
                .ok_or_else(|| OverlayError::MissingMetadata(image.display().to_string()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stamp)?);
            } else {
                println!("{}:", image.display());
                println!("  緯度: {}", photo_overlay_common::geodesy::format_latitude(stamp.latitude));
                println!("  経度: {}", photo_overlay_common::geodesy::format_longitude(stamp.longitude));
                println!("  撮影日: {}", stamp.date);
                println!("  撮影時刻: {}", stamp.time);
                println!("  方位: {:.1}°", stamp.bearing);
            }
        }

        Commands::Config { show, set_font, fallback } => {
            let mut config = config;

            if let Some(path) = set_font {
                config.set_font_path(path)?;
                println!("✔ フォントを設定しました");
            }

            if let Some(toggle) = fallback {
                config.set_fallback_enabled(toggle.enabled())?;
                println!("✔ 代替値: {}", if toggle.enabled() { "有効" } else { "無効" });
            }

            if show {
                println!("設定: {}", Config::config_path()?.display());
                println!(
                    "  フォント: {}",
                    config
                        .font_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "自動検出".into())
                );
                match &config.heic_converter {
                    Some(command) => {
                        println!("  HEIC変換: {} {}", command, config.heic_converter_args.join(" "))
                    }
                    None => println!("  HEIC変換: libheif（内蔵）"),
                }
                println!("  回転JPEG品質: {}", config.rotated_jpeg_quality);
                println!("  UTCオフセット: {}", config.labels.utc_offset);
                match &config.bearing_reference {
                    Some(p) => println!("  方位基準点: {}, {}", p.latitude, p.longitude),
                    None => println!("  方位基準点: 撮影地点"),
                }
                println!("  代替値: {}", if config.fallback_enabled { "有効" } else { "無効" });
            }
        }
    }

    Ok(())
}
