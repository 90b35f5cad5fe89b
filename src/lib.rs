//! 証明写真の印刷用シート生成
//!
//! 元画像とプレビュー上のズーム・パンから、用紙1枚分の印刷用画像（300dpi）を作る。
//!
//! - [`compose`]: レイアウト計算 → 切り抜き → ラスタライズ → 合成 → エンコード
//! - [`render`]: 写真1枚の生成と用紙への配置
//! - [`export`]: PNG / JPEG / TIFF への書き出し
//! - [`scanner`]: 画像の列挙と読み込み
//!
//! 単位換算・レイアウト・切り抜き計算は `photo-sheet-common` にある。

pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod export;
pub mod render;
pub mod scanner;

pub use compose::{compose_sheet, SheetRequest};
pub use error::{CompositionError, PhotoSheetError, Result};
pub use export::{export_sheet, EncodedSheet, ExportFormat};
pub use render::{PrintSheet, RenderedTile, SourceImage};

pub use photo_sheet_common::{
    plan_layout, resolve_sample_rect, CropViewport, LayoutPlan, PaperSize, PhysicalSize,
    SampleRect, SizingMode, TileSize, PRINT_DPI,
};
