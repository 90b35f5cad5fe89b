//! エラー型定義

use thiserror::Error;

/// 幾何計算（単位変換・レイアウト・切り抜き）の共通エラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Layout infeasible: {0}")]
    LayoutInfeasible(String),

    #[error("Sample rect is empty")]
    EmptySampleRect,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// 有限値チェック（NaN / Infinity を拒否）
pub(crate) fn ensure_finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidDimension(format!("{what} is not finite: {value}")))
    }
}

/// 正の有限値チェック
pub(crate) fn ensure_positive(value: f64, what: &str) -> Result<f64> {
    let value = ensure_finite(value, what)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidDimension(format!("{what} must be positive: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_dimension() {
        let error = Error::InvalidDimension("width_mm is not finite: NaN".to_string());
        let display = format!("{}", error);
        assert!(display.contains("Invalid dimension"));
        assert!(display.contains("width_mm"));
    }

    #[test]
    fn test_error_display_layout_infeasible() {
        let error = Error::LayoutInfeasible("tile larger than paper".to_string());
        assert_eq!(format!("{}", error), "Layout infeasible: tile larger than paper");
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite(1.5, "x"), Ok(1.5));
        assert!(matches!(ensure_finite(f64::NAN, "x"), Err(Error::InvalidDimension(_))));
        assert!(matches!(ensure_finite(f64::INFINITY, "x"), Err(Error::InvalidDimension(_))));
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(0.1, "x").is_ok());
        assert!(matches!(ensure_positive(0.0, "x"), Err(Error::InvalidDimension(_))));
        assert!(matches!(ensure_positive(-3.0, "x"), Err(Error::InvalidDimension(_))));
    }
}
