//! 用紙・写真サイズのプリセット
//!
//! CLIやプレビュー画面の選択肢として使う定義済みサイズ。

use crate::layout::PhysicalSize;

/// 名前付きサイズ
#[derive(Debug, Clone, Copy)]
pub struct SizePreset {
    pub key: &'static str,
    pub label: &'static str,
    pub size: PhysicalSize,
}

const fn preset(key: &'static str, label: &'static str, w: f64, h: f64) -> SizePreset {
    SizePreset {
        key,
        label,
        size: PhysicalSize::new(w, h),
    }
}

/// 用紙サイズ（縦向き、mm）
pub const PAPER_PRESETS: &[SizePreset] = &[
    preset("a4", "A4", 210.0, 297.0),
    preset("a5", "A5", 148.0, 210.0),
    preset("a6", "A6", 105.0, 148.0),
    preset("b5", "B5 (JIS)", 182.0, 257.0),
    preset("letter", "Letter", 215.9, 279.4),
    preset("l", "L判", 89.0, 127.0),
    preset("2l", "2L判", 127.0, 178.0),
    preset("4x6", "4x6 inch (KG)", 101.6, 152.4),
    preset("5x7", "5x7 inch", 127.0, 177.8),
];

/// 写真サイズ（mm）
pub const PHOTO_PRESETS: &[SizePreset] = &[
    preset("passport", "パスポート・マイナンバー 35x45", 35.0, 45.0),
    preset("resume", "履歴書 30x40", 30.0, 40.0),
    preset("license", "運転免許 24x30", 24.0, 30.0),
    preset("us", "US Passport 2x2 inch", 50.8, 50.8),
    preset("visa", "ビザ 45x45", 45.0, 45.0),
    preset("china-visa", "中国ビザ 33x48", 33.0, 48.0),
    preset("40x50", "各種証明 40x50", 40.0, 50.0),
];

fn find(presets: &[SizePreset], key: &str) -> Option<SizePreset> {
    let key = key.trim().to_lowercase();
    presets.iter().find(|p| p.key == key).copied()
}

/// 用紙プリセットを検索（大文字小文字は区別しない）
pub fn find_paper(key: &str) -> Option<SizePreset> {
    find(PAPER_PRESETS, key)
}

/// 写真プリセットを検索
pub fn find_photo(key: &str) -> Option<SizePreset> {
    find(PHOTO_PRESETS, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_presets() {
        let a4 = find_paper("A4").expect("A4が見つからない");
        assert_eq!(a4.size, PhysicalSize::new(210.0, 297.0));
        assert_eq!(find_photo(" passport ").unwrap().size, PhysicalSize::new(35.0, 45.0));
        assert!(find_paper("a3").is_none());
    }

    #[test]
    fn test_presets_are_valid_and_unique() {
        for presets in [PAPER_PRESETS, PHOTO_PRESETS] {
            for (i, p) in presets.iter().enumerate() {
                assert!(p.size.validate().is_ok(), "{}", p.key);
                assert!(presets[i + 1..].iter().all(|q| q.key != p.key), "重複キー: {}", p.key);
                assert_eq!(p.key, p.key.to_lowercase());
            }
        }
    }

    #[test]
    fn test_papers_are_portrait() {
        for p in PAPER_PRESETS {
            assert_eq!(p.size.portrait(), p.size, "{}", p.key);
        }
    }
}
