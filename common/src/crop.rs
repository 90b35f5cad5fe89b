//! 切り抜き範囲計算モジュール
//!
//! プレビュー枠上のズーム・パン操作を、元画像ピクセル座標の
//! サンプリング矩形に変換する。
//!
//! 1. 元画像がプレビュー枠を覆う倍率（cover）を求め、ズーム倍率を掛ける
//! 2. 枠内の写真縦横比の領域を、その倍率で元画像座標に戻す
//! 3. パン量も同じ倍率で割って元画像座標に変換する
//! 4. はみ出した場合は平行移動で画像内に戻す（サイズは変えない）

use crate::error::{ensure_finite, ensure_positive, Error, Result};
use serde::{Deserialize, Serialize};

/// ズーム倍率の下限
pub const MIN_ZOOM: f64 = 1.0;
/// ズーム倍率の上限
pub const MAX_ZOOM: f64 = 3.0;

/// プレビュー操作の状態
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropViewport {
    /// ズーム倍率（1.0〜3.0）
    pub zoom: f64,
    /// パン量（プレビュー枠のピクセル、中心原点）
    pub pan_x_px: f64,
    pub pan_y_px: f64,
    /// プレビュー枠のサイズ（幅, 高さ）
    pub preview_box_px: (f64, f64),
}

impl CropViewport {
    /// ズーム・パンなしの初期状態
    pub fn centered(preview_w: f64, preview_h: f64) -> Self {
        Self {
            zoom: MIN_ZOOM,
            pan_x_px: 0.0,
            pan_y_px: 0.0,
            preview_box_px: (preview_w, preview_h),
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_pan(mut self, pan_x_px: f64, pan_y_px: f64) -> Self {
        self.pan_x_px = pan_x_px;
        self.pan_y_px = pan_y_px;
        self
    }
}

/// 元画像ピクセル座標のサンプリング矩形
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl SampleRect {
    pub fn aspect(&self) -> f64 {
        self.w / self.h
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// 矩形を含む最小の整数ピクセル範囲 `(x, y, width, height)`
    ///
    /// 幅か高さが元画像の 1px 未満なら `EmptySampleRect`。
    pub fn pixel_bounds(&self, image_w: u32, image_h: u32) -> Result<(u32, u32, u32, u32)> {
        if image_w == 0 || image_h == 0 || !(self.w >= 1.0 && self.h >= 1.0) {
            return Err(Error::EmptySampleRect);
        }
        let (left, width) = enclosing_span(self.x, self.w, image_w);
        let (top, height) = enclosing_span(self.y, self.h, image_h);
        Ok((left, top, width, height))
    }

    /// `out_w × out_h` の出力を作るための切り出し・拡縮・再切り出しの窓
    ///
    /// 整数範囲で切り出して拡縮したあと、小数部分のずれを出力ピクセル単位で
    /// 切り落とす。端を個別に丸めないので縦横比は出力1px以内で保たれる。
    pub fn sample_window(
        &self,
        image_w: u32,
        image_h: u32,
        out_w: u32,
        out_h: u32,
    ) -> Result<SampleWindow> {
        let crop = self.pixel_bounds(image_w, image_h)?;
        if out_w == 0 || out_h == 0 {
            return Err(Error::InvalidDimension(format!("output {out_w}x{out_h}px")));
        }
        let (scaled_w, offset_x) = scaled_axis(self.x, self.w, crop.0, crop.2, out_w);
        let (scaled_h, offset_y) = scaled_axis(self.y, self.h, crop.1, crop.3, out_h);

        Ok(SampleWindow {
            crop,
            scaled: (scaled_w, scaled_h),
            offset: (offset_x, offset_y),
            output: (out_w, out_h),
        })
    }
}

/// 整数範囲での切り出し → 拡縮 → 出力サイズでの切り出し
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    /// 元画像から切り出す範囲 `(x, y, width, height)`
    pub crop: (u32, u32, u32, u32),
    /// 切り出した範囲の拡縮後サイズ
    pub scaled: (u32, u32),
    /// 拡縮後の画像から出力を切り出す左上
    pub offset: (u32, u32),
    pub output: (u32, u32),
}

impl SampleWindow {
    /// 出力が実際に参照する元画像上の範囲
    pub fn effective_rect(&self) -> SampleRect {
        let scale_x = self.scaled.0 as f64 / self.crop.2 as f64;
        let scale_y = self.scaled.1 as f64 / self.crop.3 as f64;
        SampleRect {
            x: self.crop.0 as f64 + self.offset.0 as f64 / scale_x,
            y: self.crop.1 as f64 + self.offset.1 as f64 / scale_y,
            w: self.output.0 as f64 / scale_x,
            h: self.output.1 as f64 / scale_y,
        }
    }
}

/// `[start, start + len)` を含む整数範囲（画像内に収める）
fn enclosing_span(start: f64, len: f64, limit: u32) -> (u32, u32) {
    let lo = start.floor().clamp(0.0, (limit - 1) as f64) as u32;
    let hi = (start + len).ceil().clamp(lo as f64 + 1.0, limit as f64) as u32;
    (lo, hi - lo)
}

/// 1軸ぶんの拡縮後サイズと切り出し位置
fn scaled_axis(start: f64, len: f64, crop_start: u32, crop_len: u32, out: u32) -> (u32, u32) {
    let scale = out as f64 / len;
    let scaled = ((crop_len as f64 * scale).round() as u32).max(out);
    let offset = ((start - crop_start as f64).max(0.0) * scale).round() as u32;
    (scaled, offset.min(scaled - out))
}

/// ビューポート状態からサンプリング矩形を求める
///
/// `tile_aspect` は出力写真の縦横比（幅 / 高さ）。プレビュー枠と比率が
/// 違う場合は、枠の中央にある写真比率の最大領域を切り抜く。
pub fn resolve_sample_rect(
    image_w: u32,
    image_h: u32,
    viewport: &CropViewport,
    tile_aspect: f64,
) -> Result<SampleRect> {
    if image_w == 0 || image_h == 0 {
        return Err(Error::EmptySampleRect);
    }
    let (preview_w, preview_h) = viewport.preview_box_px;
    let preview_w = ensure_positive(preview_w, "preview_width_px")?;
    let preview_h = ensure_positive(preview_h, "preview_height_px")?;
    let zoom = ensure_finite(viewport.zoom, "zoom")?.clamp(MIN_ZOOM, MAX_ZOOM);
    let pan_x = ensure_finite(viewport.pan_x_px, "pan_x_px")?;
    let pan_y = ensure_finite(viewport.pan_y_px, "pan_y_px")?;
    let tile_aspect = ensure_positive(tile_aspect, "tile_aspect")?;

    let iw = image_w as f64;
    let ih = image_h as f64;

    let scale_cover = (preview_w / iw).max(preview_h / ih);
    let scale = scale_cover * zoom;

    let (frame_w, frame_h) = fit_aspect(preview_w, preview_h, tile_aspect);
    let mut w = frame_w / scale;
    let mut h = frame_h / scale;

    // zoom >= 1 なら起こらないが、念のため比率を保ったまま縮める
    let overflow = (w / iw).max(h / ih);
    if overflow > 1.0 {
        w /= overflow;
        h /= overflow;
    }

    // パンはプレビュー座標なので倍率で割って元画像座標にする
    let center_x = iw / 2.0 - pan_x / scale;
    let center_y = ih / 2.0 - pan_y / scale;

    let x = (center_x - w / 2.0).clamp(0.0, (iw - w).max(0.0));
    let y = (center_y - h / 2.0).clamp(0.0, (ih - h).max(0.0));

    if w <= 0.0 || h <= 0.0 {
        return Err(Error::EmptySampleRect);
    }

    Ok(SampleRect { x, y, w, h })
}

/// `w × h` の中に収まる縦横比 `aspect` の最大サイズ
fn fit_aspect(w: f64, h: f64, aspect: f64) -> (f64, f64) {
    if w / h > aspect {
        (h * aspect, h)
    } else {
        (w, w / aspect)
    }
}
