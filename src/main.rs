use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use photo_sheet::cli::{self, Cli, Commands};
use photo_sheet::config::Config;
use photo_sheet::error::PhotoSheetError;
use photo_sheet::scanner;
use photo_sheet_common::{find_paper, find_photo, PAPER_PRESETS, PHOTO_PRESETS};
use rayon::prelude::*;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().context("設定の読み込みに失敗")?;
    config.validate()?;

    match cli.command {
        Commands::Compose { image, sheet, viewport, output, data_uri } => {
            println!("🖨 photo-sheet - シート生成\n");

            let request = cli::build_request(&config, &sheet, &viewport, &output)?;

            // 1. 画像読み込み
            println!("[1/3] 写真を読み込み中...");
            let path = image.clone();
            let source = tokio::task::spawn_blocking(move || scanner::load_image(&path)).await??;
            println!("✔ {}x{}px\n", source.width_px(), source.height_px());

            // 2. レイアウト
            println!("[2/3] レイアウト計算中...");
            let plan = request.plan()?;
            println!(
                "✔ {}列 x {}行, {}枚 ({:.1}x{:.1}mm)\n",
                plan.columns,
                plan.rows,
                plan.placed(),
                plan.tile_size.width_mm,
                plan.tile_size.height_mm
            );

            // 3. 合成・書き出し
            println!("[3/3] シートを生成中... ({})", request.format);
            let encoded =
                tokio::task::spawn_blocking(move || request.compose(&source)).await??;

            if data_uri {
                println!("{}", encoded.to_data_uri());
            } else {
                let out_path =
                    cli::output_path_for(&image, output.output.as_deref(), encoded.extension());
                write_output(&out_path, &encoded.bytes)?;
                println!("✔ 保存: {}", out_path.display());
            }

            println!("\n✅ 完了");
        }

        Commands::Layout { sheet } => {
            let mode = sheet.mode(&config)?;
            let plan = photo_sheet_common::plan_layout(
                sheet.paper(&config)?,
                &mode,
                sheet.gap_mm(&config),
            )?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }

        Commands::Batch { folder, sheet, viewport, output } => {
            println!("🚀 photo-sheet - 一括生成\n");

            let request = cli::build_request(&config, &sheet, &viewport, &output)?;
            request.plan()?;

            // 1. スキャン
            println!("[1/2] 写真をスキャン中...");
            let images = scanner::scan_folder(&folder)?;
            println!("✔ {}枚の写真を検出\n", images.len());

            if images.is_empty() {
                return Err(PhotoSheetError::NoImagesFound(folder.display().to_string()).into());
            }

            let out_dir = output.output.clone().unwrap_or_else(|| folder.join("sheets"));
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("出力フォルダを作成できません: {}", out_dir.display()))?;

            // 2. 生成
            println!("[2/2] シートを生成中... ({})", request.format);
            let progress = ProgressBar::new(images.len() as u64);
            progress.set_style(
                ProgressStyle::with_template(
                    "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("=> "),
            );

            let bar = progress.clone();
            let failures = tokio::task::spawn_blocking(move || {
                images
                    .par_iter()
                    .filter_map(|info| {
                        let result = scanner::load_image(&info.path)
                            .map_err(anyhow::Error::from)
                            .and_then(|source| Ok(request.compose(&source)?))
                            .and_then(|encoded| {
                                let out_path = cli::output_path_for(
                                    &info.path,
                                    Some(out_dir.as_path()),
                                    encoded.extension(),
                                );
                                write_output(&out_path, &encoded.bytes)
                            });
                        bar.inc(1);
                        result.err().map(|e| (info.file_name.clone(), e))
                    })
                    .collect::<Vec<_>>()
            })
            .await?;

            progress.finish_with_message("done");

            for (file_name, err) in &failures {
                println!("⚠ {}: {:#}", file_name, err);
            }
            if failures.is_empty() {
                println!("\n✅ 完了");
            } else {
                println!("\n⚠ {}件失敗", failures.len());
            }
        }

        Commands::Presets => {
            println!("用紙:");
            for preset in PAPER_PRESETS {
                println!(
                    "  {:<8} {:<10} {}x{}mm",
                    preset.key, preset.label, preset.size.width_mm, preset.size.height_mm
                );
            }
            println!("\n写真:");
            for preset in PHOTO_PRESETS {
                println!(
                    "  {:<12} {:<14} {}x{}mm",
                    preset.key, preset.label, preset.size.width_mm, preset.size.height_mm
                );
            }
        }

        Commands::Config { set_paper, set_photo, set_gap, show } => {
            let mut config = config;
            let changed = set_paper.is_some() || set_photo.is_some() || set_gap.is_some();

            if let Some(key) = set_paper {
                let preset = find_paper(&key).ok_or(PhotoSheetError::UnknownPreset(key))?;
                config.paper = preset.key.to_string();
                println!("✔ 用紙を設定しました: {}", preset.label);
            }
            if let Some(key) = set_photo {
                let preset = find_photo(&key).ok_or(PhotoSheetError::UnknownPreset(key))?;
                config.photo = preset.key.to_string();
                println!("✔ 写真サイズを設定しました: {}", preset.label);
            }
            if let Some(gap) = set_gap {
                config.gap_mm = gap;
                println!("✔ ギャップを設定しました: {}mm", gap);
            }

            if changed {
                config.validate()?;
                config.save()?;
            }

            if show || !changed {
                println!("設定: {}", Config::config_path()?.display());
                println!("  用紙: {}", config.paper);
                println!("  写真: {}", config.photo);
                println!("  ギャップ: {}mm", config.gap_mm);
                println!("  出力形式: {}", config.export_format());
                println!("  切り取り線: {}", if config.crop_marks { "あり" } else { "なし" });
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes).with_context(|| format!("書き込みに失敗: {}", path.display()))
}
