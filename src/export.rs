//! 出力エンコード
//!
//! 合成済みシートを PNG / JPEG / TIFF にする。アルファを持てない形式は
//! 白背景に合成してから書き出す。

use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::error::CompositionError;
use crate::render::PrintSheet;

/// JPEG品質のデフォルト
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// 出力形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportFormat {
    /// 可逆、アルファあり
    #[default]
    Png,
    /// 非可逆、白背景に合成（品質 1〜100）
    Jpeg { quality: u8 },
    /// 可逆、アルファあり
    Tiff,
}

impl ExportFormat {
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, ExportFormat::Jpeg { .. })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg { .. } => "jpg",
            ExportFormat::Tiff => "tiff",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
            ExportFormat::Tiff => "image/tiff",
        }
    }

    /// JPEG品質を差し替える（JPEG以外はそのまま）
    pub fn with_quality(self, quality: u8) -> Self {
        match self {
            ExportFormat::Jpeg { .. } => ExportFormat::Jpeg { quality },
            other => other,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            }),
            "tiff" | "tif" => Ok(ExportFormat::Tiff),
            _ => Err(format!("Unknown format: {}. Use png, jpeg, or tiff", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Png => write!(f, "png"),
            ExportFormat::Jpeg { quality } => write!(f, "jpeg (q={})", quality),
            ExportFormat::Tiff => write!(f, "tiff"),
        }
    }
}

/// エンコード済みシート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSheet {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
}

impl EncodedSheet {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// プレビュー表示用の data URI
    pub fn to_data_uri(&self) -> String {
        let encoded = general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime_type(), encoded)
    }
}

/// シートを指定形式にエンコードする
pub fn export_sheet(
    sheet: &PrintSheet,
    format: ExportFormat,
) -> Result<EncodedSheet, CompositionError> {
    let buffer = sheet.buffer();
    let (width, height) = buffer.dimensions();
    let mut bytes = Vec::new();

    match format {
        ExportFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(
                buffer.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
        ExportFormat::Jpeg { quality } => {
            if !(1..=100).contains(&quality) {
                return Err(CompositionError::Encoding(format!(
                    "JPEG quality must be 1-100: {}",
                    quality
                )));
            }
            let flattened = flatten_on_white(buffer);
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
            encoder.set_pixel_density(PixelDensity::dpi(sheet.dpi().round() as u16));
            encoder.encode_image(&flattened)?;
        }
        ExportFormat::Tiff => {
            TiffEncoder::new(Cursor::new(&mut bytes)).write_image(
                buffer.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?;
        }
    }

    tracing::debug!(%format, bytes = bytes.len(), "export sheet");
    Ok(EncodedSheet { bytes, format })
}

/// アルファを白背景に合成して RGB にする
pub fn flatten_on_white(buffer: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        let [r, g, b, a] = buffer.get_pixel(x, y).0;
        image::Rgb([blend_white(r, a), blend_white(g, a), blend_white(b, a)])
    })
}

fn blend_white(c: u8, a: u8) -> u8 {
    let (c, a) = (c as u32, a as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}
