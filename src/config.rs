use crate::error::{PhotoSheetError, Result};
use crate::export::{ExportFormat, DEFAULT_JPEG_QUALITY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 設定ファイルの場所を上書きする環境変数
pub const CONFIG_ENV: &str = "PHOTO_SHEET_CONFIG";

/// CLIのデフォルト値（解像度は固定なので持たない）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 用紙プリセット
    pub paper: String,
    /// 写真プリセット
    pub photo: String,
    /// 写真間ギャップ（mm）
    pub gap_mm: f64,
    pub format: ExportFormat,
    pub jpeg_quality: u8,
    pub crop_marks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paper: "l".into(),
            photo: "passport".into(),
            gap_mm: 2.0,
            format: ExportFormat::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            },
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            crop_marks: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| PhotoSheetError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-sheet").join("config.json"))
    }

    /// 設定値の妥当性チェック
    pub fn validate(&self) -> Result<()> {
        if !self.gap_mm.is_finite() || self.gap_mm < 0.0 {
            return Err(PhotoSheetError::Config(format!("gap_mm が不正です: {}", self.gap_mm)));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PhotoSheetError::Config(format!(
                "jpeg_quality は 1〜100: {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    /// JPEG品質を反映した出力形式
    pub fn export_format(&self) -> ExportFormat {
        self.format.with_quality(self.jpeg_quality)
    }
}
