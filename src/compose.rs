//! シート合成パイプライン
//!
//! レイアウト計算と切り抜き計算は互いに依存しないので並行に走らせ、
//! 切り抜き → 写真1枚のラスタライズ → 用紙への配置 → エンコードの順に進める。
//! 要求ごとに純粋関数で、呼び出し間で状態は持たない。

use photo_sheet_common::{
    plan_layout, resolve_sample_rect, CropViewport, LayoutPlan, PaperSize, PixelSize, SizingMode,
};
use serde::{Deserialize, Serialize};

use crate::error::CompositionError;
use crate::export::{export_sheet, EncodedSheet, ExportFormat};
use crate::render::{compose_sheet_buffer, rasterize_tile, PrintSheet, SheetOptions, SourceImage};

/// 1回分のシート生成要求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRequest {
    pub viewport: CropViewport,
    pub mode: SizingMode,
    pub paper: PaperSize,
    pub gap_mm: f64,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub crop_marks: bool,
}

impl SheetRequest {
    pub fn new(
        viewport: CropViewport,
        mode: SizingMode,
        paper: PaperSize,
        gap_mm: f64,
        format: ExportFormat,
    ) -> Self {
        Self {
            viewport,
            mode,
            paper,
            gap_mm,
            format,
            crop_marks: false,
        }
    }

    pub fn with_crop_marks(mut self, crop_marks: bool) -> Self {
        self.crop_marks = crop_marks;
        self
    }

    /// レイアウトだけを計算する（レンダリングなし）
    pub fn plan(&self) -> Result<LayoutPlan, CompositionError> {
        Ok(plan_layout(self.paper, &self.mode, self.gap_mm)?)
    }

    /// エンコード前のシートを作る
    pub fn render(&self, source: &SourceImage) -> Result<PrintSheet, CompositionError> {
        let tile_aspect = self.mode.tile_aspect();
        let (plan, rect) = rayon::join(
            || plan_layout(self.paper, &self.mode, self.gap_mm),
            || {
                resolve_sample_rect(
                    source.width_px(),
                    source.height_px(),
                    &self.viewport,
                    tile_aspect,
                )
            },
        );
        let plan = plan?;
        let rect = rect?;

        tracing::debug!(
            columns = plan.columns,
            rows = plan.rows,
            tile_w_mm = plan.tile_size.width_mm,
            tile_h_mm = plan.tile_size.height_mm,
            placed = plan.placed(),
            "layout planned"
        );
        tracing::debug!(x = rect.x, y = rect.y, w = rect.w, h = rect.h, "sample rect resolved");

        let tile_px = PixelSize::from_mm(plan.tile_size.width_mm, plan.tile_size.height_mm)?;
        let tile = rasterize_tile(source, &rect, tile_px)?;

        let options = SheetOptions {
            crop_marks: self.crop_marks,
            ..SheetOptions::default()
        };
        compose_sheet_buffer(self.paper, &tile, &plan, &options)
    }

    /// シートを作ってエンコードする
    pub fn compose(&self, source: &SourceImage) -> Result<EncodedSheet, CompositionError> {
        let sheet = self.render(source)?;
        export_sheet(&sheet, self.format)
    }
}

/// 元画像とプレビュー操作から印刷用シートを生成する
pub fn compose_sheet(
    source: &SourceImage,
    viewport: &CropViewport,
    mode: &SizingMode,
    paper: PaperSize,
    gap_mm: f64,
    format: ExportFormat,
) -> Result<EncodedSheet, CompositionError> {
    SheetRequest::new(*viewport, *mode, paper, gap_mm, format).compose(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use photo_sheet_common::PhysicalSize;

    fn gradient_source(w: u32, h: u32) -> SourceImage {
        let img = RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 255 / w) as u8, (y * 255 / h) as u8, 128, 255])
        });
        SourceImage::new(DynamicImage::ImageRgba8(img))
    }

    fn passport_request(copies: u32) -> SheetRequest {
        SheetRequest::new(
            CropViewport::centered(350.0, 450.0),
            SizingMode::FixedTile {
                tile: PhysicalSize::new(35.0, 45.0),
                copies,
            },
            PhysicalSize::new(101.6, 152.4),
            2.0,
            ExportFormat::Png,
        )
    }

    #[test]
    fn test_render_sheet_dimensions() {
        let sheet = passport_request(4).render(&gradient_source(640, 480)).unwrap();
        assert_eq!(sheet.dimensions(), (1200, 1800));
    }

    #[test]
    fn test_plan_matches_render_input() {
        let request = passport_request(4);
        let plan = request.plan().unwrap();
        assert_eq!((plan.columns, plan.rows), (2, 3));
        assert_eq!(plan.placed(), 4);
    }

    #[test]
    fn test_errors_are_mapped() {
        let mut request = passport_request(1);
        request.gap_mm = f64::NAN;
        assert!(matches!(
            request.render(&gradient_source(10, 10)),
            Err(CompositionError::InvalidDimension(_))
        ));

        let mut request = passport_request(1);
        request.paper = PhysicalSize::new(20.0, 20.0);
        assert!(matches!(
            request.render(&gradient_source(10, 10)),
            Err(CompositionError::LayoutInfeasible(_))
        ));

        let request = passport_request(1);
        let empty = SourceImage::new(DynamicImage::new_rgba8(0, 0));
        assert!(matches!(request.render(&empty), Err(CompositionError::EmptySampleRect)));
    }

    #[test]
    fn test_request_serde() {
        let json = r#"{
            "viewport": {"zoom": 1.5, "pan_x_px": 10.0, "pan_y_px": -4.0, "preview_box_px": [350.0, 450.0]},
            "mode": {"mode": "fitToPaper", "copies": 6},
            "paper": {"width_mm": 210.0, "height_mm": 297.0},
            "gapMm": 3.0
        }"#;
        let request: SheetRequest = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(request.mode, SizingMode::FitToPaper { copies: 6 });
        assert_eq!(request.format, ExportFormat::Png);
        assert!(!request.crop_marks);
        assert_eq!(request.viewport.preview_box_px, (350.0, 450.0));
    }
}
