//! Photo Sheet Common Library
//!
//! 証明写真シートの幾何計算（CLIとプレビュー画面で共有）
//!
//! - [`units`]: mm ↔ px 変換（300dpi固定）
//! - [`layout`]: 用紙への写真配置（列数・行数・座標）
//! - [`crop`]: ズーム・パン操作から切り抜き矩形への変換
//! - [`presets`]: 用紙・写真サイズのプリセット

pub mod crop;
pub mod error;
pub mod layout;
pub mod presets;
pub mod units;

pub use crop::{resolve_sample_rect, CropViewport, SampleRect, SampleWindow, MAX_ZOOM, MIN_ZOOM};
pub use error::{Error, Result};
pub use layout::{
    plan_fit_to_paper, plan_fixed_tile, plan_layout, LayoutPlan, PaperSize, PhysicalSize,
    SizingMode, TileSize, PASSPORT_ASPECT,
};
pub use presets::{find_paper, find_photo, SizePreset, PAPER_PRESETS, PHOTO_PRESETS};
pub use units::{
    mm_to_px, mm_to_px_ceil, mm_to_px_round, px_to_mm, PixelSize, MAX_SIDE_PX, PRINT_DPI,
};
