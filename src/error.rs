use thiserror::Error;

/// シート合成のエラー
///
/// どれも1回のレンダリング要求に対する終端エラーで、内部での再試行はしない。
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("寸法が不正です: {0}")]
    InvalidDimension(String),

    #[error("用紙に写真を配置できません: {0}")]
    LayoutInfeasible(String),

    #[error("切り抜き範囲が空です（ズーム・パンを確認してください）")]
    EmptySampleRect,

    #[error("エンコードエラー: {0}")]
    Encoding(String),
}

impl From<photo_sheet_common::Error> for CompositionError {
    fn from(err: photo_sheet_common::Error) -> Self {
        use photo_sheet_common::Error as Geometry;
        match err {
            Geometry::InvalidDimension(msg) => CompositionError::InvalidDimension(msg),
            Geometry::LayoutInfeasible(msg) => CompositionError::LayoutInfeasible(msg),
            Geometry::EmptySampleRect => CompositionError::EmptySampleRect,
        }
    }
}

impl From<image::ImageError> for CompositionError {
    fn from(err: image::ImageError) -> Self {
        CompositionError::Encoding(err.to_string())
    }
}

/// アプリケーション全体のエラー
#[derive(Error, Debug)]
pub enum PhotoSheetError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("不明なプリセット: {0}（`photo-sheet presets` で一覧を表示）")]
    UnknownPreset(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Composition(#[from] CompositionError),
}

impl From<photo_sheet_common::Error> for PhotoSheetError {
    fn from(err: photo_sheet_common::Error) -> Self {
        PhotoSheetError::Composition(err.into())
    }
}

pub type Result<T> = std::result::Result<T, PhotoSheetError>;
