use image::imageops::{self, FilterType};
use photo_sheet_common::{PixelSize, SampleRect};

use super::{RenderedTile, SourceImage};
use crate::error::CompositionError;

/// 切り抜き矩形を写真1枚分の印刷ピクセルサイズにリサンプルする
///
/// 矩形を含む整数範囲を切り出して Catmull-Rom で拡縮し、小数部分のずれを
/// 拡縮後に切り落とす。矩形と出力の縦横比は切り抜き計算側で揃えてある。
pub fn rasterize_tile(
    source: &SourceImage,
    rect: &SampleRect,
    size: PixelSize,
) -> Result<RenderedTile, CompositionError> {
    if size.width == 0 || size.height == 0 {
        return Err(CompositionError::InvalidDimension(format!(
            "tile output {}x{}px",
            size.width, size.height
        )));
    }

    let window = rect.sample_window(source.width_px(), source.height_px(), size.width, size.height)?;
    let (x, y, w, h) = window.crop;
    let (scaled_w, scaled_h) = window.scaled;
    tracing::debug!(x, y, w, h, scaled_w, scaled_h, out_w = size.width, out_h = size.height, "rasterize tile");

    let cropped = source.image().crop_imm(x, y, w, h).to_rgba8();
    let scaled = imageops::resize(&cropped, scaled_w, scaled_h, FilterType::CatmullRom);

    let buffer = if window.scaled == window.output {
        scaled
    } else {
        let (ox, oy) = window.offset;
        imageops::crop_imm(&scaled, ox, oy, size.width, size.height).to_image()
    };

    Ok(RenderedTile { buffer })
}
