//! ラスタライズ
//!
//! 1. [`tile`]: 切り抜き矩形から写真1枚分の画像を作る
//! 2. [`sheet`]: 同じ写真画像を用紙上の各位置に貼り付ける

pub mod sheet;
pub mod tile;

use image::{DynamicImage, GenericImageView, RgbaImage};
use photo_sheet_common::{PaperSize, PRINT_DPI};

pub use sheet::{compose_sheet_buffer, SheetOptions};
pub use tile::rasterize_tile;

/// デコード済みの元画像
///
/// デコードは呼び出し側の責務で、ここには完全に読み込まれた画像だけが入る。
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
}

impl SourceImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width_px(&self) -> u32 {
        self.image.width()
    }

    pub fn height_px(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

impl From<DynamicImage> for SourceImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}

/// 写真1枚分の画像（印刷解像度）
///
/// 1回の要求で1度だけ作り、全配置位置で同じバッファを使う。
#[derive(Debug, Clone)]
pub struct RenderedTile {
    buffer: RgbaImage,
}

impl RenderedTile {
    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }
}

/// 用紙サイズの合成結果
#[derive(Debug, Clone)]
pub struct PrintSheet {
    buffer: RgbaImage,
    paper: PaperSize,
}

impl PrintSheet {
    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn into_buffer(self) -> RgbaImage {
        self.buffer
    }

    pub fn paper(&self) -> PaperSize {
        self.paper
    }

    pub fn dpi(&self) -> f64 {
        PRINT_DPI
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }
}
