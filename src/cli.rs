use clap::{Args, Parser, Subcommand};
use photo_sheet_common::{
    find_paper, find_photo, CropViewport, PaperSize, PhysicalSize, SizingMode, MIN_ZOOM,
};
use std::path::{Path, PathBuf};

use crate::compose::SheetRequest;
use crate::config::Config;
use crate::error::{PhotoSheetError, Result};
use crate::export::ExportFormat;

/// 枚数指定で自動調整するときのデフォルト枚数
pub const DEFAULT_FIT_COPIES: u32 = 4;

/// プレビュー枠を指定しないときの枠幅（px）
pub const DEFAULT_PREVIEW_WIDTH: f64 = 350.0;

#[derive(Parser)]
#[command(name = "photo-sheet")]
#[command(about = "証明写真の印刷用シート生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真1枚から印刷用シートを生成
    Compose {
        /// 元画像
        #[arg(required = true)]
        image: PathBuf,

        #[command(flatten)]
        sheet: SheetArgs,

        #[command(flatten)]
        viewport: ViewportArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// 画像ファイルの代わりに data URI を標準出力に書く
        #[arg(long)]
        data_uri: bool,
    },

    /// レイアウトだけを計算してJSONで表示
    Layout {
        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// フォルダ内の全画像からシートを生成
    Batch {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        #[command(flatten)]
        sheet: SheetArgs,

        #[command(flatten)]
        viewport: ViewportArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// 用紙・写真サイズのプリセット一覧
    Presets,

    /// 設定を表示/編集
    Config {
        /// デフォルト用紙を設定
        #[arg(long)]
        set_paper: Option<String>,

        /// デフォルト写真サイズを設定
        #[arg(long)]
        set_photo: Option<String>,

        /// デフォルトギャップ（mm）を設定
        #[arg(long)]
        set_gap: Option<f64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 用紙・写真サイズ・枚数
#[derive(Args, Debug, Clone, Default)]
pub struct SheetArgs {
    /// 用紙プリセット (a4/a5/l/2l/4x6 ...)
    #[arg(short, long)]
    pub paper: Option<String>,

    /// 用紙を横向きで使う
    #[arg(long)]
    pub landscape: bool,

    /// 写真プリセット (passport/resume/license ...)
    #[arg(long)]
    pub photo: Option<String>,

    /// カスタム写真幅（mm）
    #[arg(long, requires = "height_mm")]
    pub width_mm: Option<f64>,

    /// カスタム写真高さ（mm）
    #[arg(long, requires = "width_mm")]
    pub height_mm: Option<f64>,

    /// 枚数を指定して写真サイズを最大化（35:45）
    #[arg(long)]
    pub fit_to_paper: bool,

    /// 枚数（省略時: 固定サイズなら用紙いっぱい）
    #[arg(short = 'n', long)]
    pub copies: Option<u32>,

    /// 写真間ギャップ（mm）
    #[arg(short, long)]
    pub gap: Option<f64>,

    /// 切り取り線を引く
    #[arg(long, conflicts_with = "no_crop_marks")]
    pub crop_marks: bool,

    /// 切り取り線を引かない
    #[arg(long)]
    pub no_crop_marks: bool,
}

/// プレビュー操作（ズーム・パン）
#[derive(Args, Debug, Clone)]
pub struct ViewportArgs {
    /// ズーム倍率 (1.0〜3.0)
    #[arg(short, long, default_value_t = MIN_ZOOM)]
    pub zoom: f64,

    /// 横方向パン（プレビュー枠px、右が正）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_x: f64,

    /// 縦方向パン（プレビュー枠px、下が正）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_y: f64,

    /// プレビュー枠の幅（px）
    #[arg(long)]
    pub preview_width: Option<f64>,

    /// プレビュー枠の高さ（px）
    #[arg(long)]
    pub preview_height: Option<f64>,
}

impl Default for ViewportArgs {
    fn default() -> Self {
        Self {
            zoom: MIN_ZOOM,
            pan_x: 0.0,
            pan_y: 0.0,
            preview_width: None,
            preview_height: None,
        }
    }
}

/// 出力先と形式
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// 出力ファイル/ディレクトリ
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 出力形式 (png/jpeg/tiff)
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// JPEG品質 (1-100)
    #[arg(short, long)]
    pub quality: Option<u8>,
}

impl SheetArgs {
    /// 用紙サイズ（プリセット + 向き）
    pub fn paper(&self, config: &Config) -> Result<PaperSize> {
        let key = self.paper.as_deref().unwrap_or(&config.paper);
        let preset = find_paper(key).ok_or_else(|| PhotoSheetError::UnknownPreset(key.into()))?;
        Ok(if self.landscape {
            preset.size.landscape()
        } else {
            preset.size
        })
    }

    /// サイズ決定モード
    pub fn mode(&self, config: &Config) -> Result<SizingMode> {
        if self.fit_to_paper {
            return Ok(SizingMode::FitToPaper {
                copies: self.copies.unwrap_or(DEFAULT_FIT_COPIES),
            });
        }

        let tile = match (self.width_mm, self.height_mm) {
            (Some(w), Some(h)) => PhysicalSize::new(w, h),
            _ => {
                let key = self.photo.as_deref().unwrap_or(&config.photo);
                find_photo(key)
                    .ok_or_else(|| PhotoSheetError::UnknownPreset(key.into()))?
                    .size
            }
        };

        // 省略時は入るだけ並べる
        let copies = self.copies.unwrap_or(u32::MAX);
        Ok(SizingMode::FixedTile { tile, copies })
    }

    pub fn gap_mm(&self, config: &Config) -> f64 {
        self.gap.unwrap_or(config.gap_mm)
    }

    pub fn crop_marks(&self, config: &Config) -> bool {
        if self.crop_marks {
            true
        } else if self.no_crop_marks {
            false
        } else {
            config.crop_marks
        }
    }
}

impl ViewportArgs {
    /// 枠サイズ省略時は写真比率で幅 `DEFAULT_PREVIEW_WIDTH` の枠とみなす
    pub fn viewport(&self, tile_aspect: f64) -> CropViewport {
        let width = self.preview_width.unwrap_or(DEFAULT_PREVIEW_WIDTH);
        let height = self.preview_height.unwrap_or(width / tile_aspect);
        CropViewport::centered(width, height)
            .with_zoom(self.zoom)
            .with_pan(self.pan_x, self.pan_y)
    }
}

impl OutputArgs {
    pub fn format(&self, config: &Config) -> ExportFormat {
        let format = self.format.unwrap_or(config.format);
        format.with_quality(self.quality.unwrap_or(config.jpeg_quality))
    }
}

/// CLI引数と設定から生成要求を組み立てる
pub fn build_request(
    config: &Config,
    sheet: &SheetArgs,
    viewport: &ViewportArgs,
    output: &OutputArgs,
) -> Result<SheetRequest> {
    let mode = sheet.mode(config)?;
    let request = SheetRequest::new(
        viewport.viewport(mode.tile_aspect()),
        mode,
        sheet.paper(config)?,
        sheet.gap_mm(config),
        output.format(config),
    );
    Ok(request.with_crop_marks(sheet.crop_marks(config)))
}

/// 出力パスを決める
///
/// 指定がディレクトリ（または拡張子なし）なら `<元画像名>_sheet.<拡張子>` をその中に作る。
pub fn output_path_for(input: &Path, output: Option<&Path>, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("photo");
    let file_name = format!("{}_sheet.{}", stem, extension);

    match output {
        Some(out) if out.is_dir() || out.extension().is_none() => out.join(file_name),
        Some(out) => out.to_path_buf(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(file_name),
    }
}
