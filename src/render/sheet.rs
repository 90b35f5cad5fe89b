use image::{imageops, Rgba, RgbaImage};
use photo_sheet_common::{mm_to_px_round, LayoutPlan, PaperSize, PixelSize};

use super::{PrintSheet, RenderedTile};
use crate::error::CompositionError;

/// 用紙の背景色
pub const PAPER_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 切り取り線の色（#CCCCCC）
pub const CROP_MARK_GRAY: Rgba<u8> = Rgba([204, 204, 204, 255]);

/// 合成オプション
#[derive(Debug, Clone, Copy)]
pub struct SheetOptions {
    /// 各写真の外周に 1px の切り取り線を引く
    pub crop_marks: bool,
    pub background: Rgba<u8>,
    pub mark_color: Rgba<u8>,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            crop_marks: false,
            background: PAPER_WHITE,
            mark_color: CROP_MARK_GRAY,
        }
    }
}

/// 用紙サイズのバッファに写真を並べる
///
/// すべての位置に同じ `tile` を貼る。丸めで用紙からはみ出す分は切り捨てる。
/// 写真は切り上げたピクセルサイズで位置は四捨五入なので、ギャップ 0 では
/// 隣の写真と 1px 重なることがある。切り取り線は全写真を貼ったあとに引く。
pub fn compose_sheet_buffer(
    paper: PaperSize,
    tile: &RenderedTile,
    plan: &LayoutPlan,
    options: &SheetOptions,
) -> Result<PrintSheet, CompositionError> {
    let paper = paper.validate()?;
    let size = PixelSize::from_mm(paper.width_mm, paper.height_mm)?;
    let mut buffer = RgbaImage::from_pixel(size.width, size.height, options.background);

    let (tile_w, tile_h) = tile.dimensions();
    tracing::debug!(
        sheet_w = size.width,
        sheet_h = size.height,
        tile_w,
        tile_h,
        placements = plan.positions.len(),
        "compose sheet"
    );

    let origins = plan
        .positions
        .iter()
        .map(|&(x_mm, y_mm)| -> Result<(i64, i64), CompositionError> {
            Ok((mm_to_px_round(x_mm)?, mm_to_px_round(y_mm)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for &(x, y) in &origins {
        imageops::overlay(&mut buffer, tile.buffer(), x, y);
    }

    if options.crop_marks {
        for &(x, y) in &origins {
            stroke_border(&mut buffer, x, y, tile_w, tile_h, options.mark_color);
        }
    }

    Ok(PrintSheet { buffer, paper })
}

/// 矩形の外周 1px を塗る（バッファ外は無視）
fn stroke_border(buffer: &mut RgbaImage, x: i64, y: i64, w: u32, h: u32, color: Rgba<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    let right = x + w as i64 - 1;
    let bottom = y + h as i64 - 1;

    for px in x..=right {
        put_clipped(buffer, px, y, color);
        put_clipped(buffer, px, bottom, color);
    }
    for py in y..=bottom {
        put_clipped(buffer, x, py, color);
        put_clipped(buffer, right, py, color);
    }
}

fn put_clipped(buffer: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= buffer.width() as i64 || y >= buffer.height() as i64 {
        return;
    }
    buffer.put_pixel(x as u32, y as u32, color);
}
