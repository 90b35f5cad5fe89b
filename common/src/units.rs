//! 単位変換モジュール
//!
//! mm ↔ px の変換。印刷解像度は `PRINT_DPI` 固定で、
//! レイアウト（mm）とラスタライズ（px）の両方がこの値を使う。

use crate::error::{ensure_finite, ensure_positive, Error, Result};

// ============================================
// 変換係数
// ============================================

/// 1インチ = 25.4mm
pub const MM_PER_INCH: f64 = 25.4;

/// 印刷解像度（dpi）。パイプライン途中で変えてはいけない
pub const PRINT_DPI: f64 = 300.0;

/// ピクセル境界の丸め誤差許容値（px）
///
/// 101.6mm @300dpi が 1200.0000000000002 になるような誤差で
/// バッファが 1px 大きくならないようにする。
const PX_EPSILON: f64 = 1e-6;

/// バッファ1辺の上限（px）。JPEG が扱える最大の辺長
pub const MAX_SIDE_PX: u32 = 65_535;

// ============================================
// 変換関数
// ============================================

/// mm → px 変換
pub fn mm_to_px(mm: f64, dpi: f64) -> Result<f64> {
    let mm = ensure_finite(mm, "length_mm")?;
    let dpi = ensure_positive(dpi, "dpi")?;
    Ok(mm * dpi / MM_PER_INCH)
}

/// px → mm 変換
pub fn px_to_mm(px: f64, dpi: f64) -> Result<f64> {
    let px = ensure_finite(px, "length_px")?;
    let dpi = ensure_positive(dpi, "dpi")?;
    Ok(px * MM_PER_INCH / dpi)
}

/// バッファ確保用: `PRINT_DPI` で切り上げたピクセル数
pub fn mm_to_px_ceil(mm: f64) -> Result<u32> {
    let px = mm_to_px(ensure_positive(mm, "length_mm")?, PRINT_DPI)?;
    let px = (px - PX_EPSILON).ceil();
    if px > MAX_SIDE_PX as f64 {
        return Err(Error::InvalidDimension(format!(
            "{mm}mm is {px}px at {PRINT_DPI}dpi, limit {MAX_SIDE_PX}px"
        )));
    }
    Ok(px.max(1.0) as u32)
}

/// 配置座標用: `PRINT_DPI` で四捨五入したピクセル座標
pub fn mm_to_px_round(mm: f64) -> Result<i64> {
    Ok(mm_to_px(mm, PRINT_DPI)?.round() as i64)
}

/// ピクセルサイズ
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// mm寸法から印刷ピクセルサイズを計算
    ///
    /// RGBA バッファのバイト数が `usize` に収まらない場合も `InvalidDimension`。
    pub fn from_mm(width_mm: f64, height_mm: f64) -> Result<Self> {
        let size = Self {
            width: mm_to_px_ceil(width_mm)?,
            height: mm_to_px_ceil(height_mm)?,
        };
        size.rgba_len().ok_or_else(|| {
            Error::InvalidDimension(format!("{}x{}px buffer is too large", size.width, size.height))
        })?;
        Ok(size)
    }

    /// RGBA8 バッファのバイト数
    pub fn rgba_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(4)
    }
}
