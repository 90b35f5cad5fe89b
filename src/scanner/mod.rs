mod exif;

use crate::error::{PhotoSheetError, Result};
use crate::render::SourceImage;
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tif", "tiff", "bmp"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// フォルダ直下の画像を列挙（ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(PhotoSheetError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            if is_image_extension(&ext.to_string_lossy()) {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                images.push(ImageInfo {
                    path: path.to_path_buf(),
                    file_name,
                });
            }
        }
    }

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 画像をデコードし、EXIFの向きを反映する
///
/// 完全にデコードできた画像だけを返す。切り抜きは正立した画素に対して行う。
pub fn load_image(path: &Path) -> Result<SourceImage> {
    if !path.is_file() {
        return Err(PhotoSheetError::FileNotFound(path.display().to_string()));
    }

    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| PhotoSheetError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let image = match exif::read_orientation(path) {
        Some(orientation) => apply_orientation(image, orientation),
        None => image,
    };

    Ok(SourceImage::new(image))
}

/// EXIF Orientation に従って画像を正立させる
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
