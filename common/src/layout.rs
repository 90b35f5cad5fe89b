//! レイアウト計算モジュール
//!
//! 用紙に写真を何列×何行で並べるかを mm 基準で決める。
//! ピクセルへの丸めはバッファ確保時まで行わない。
//!
//! - `SizingMode::FixedTile`: 写真サイズ固定。入るだけ並べて `copies` 枚で打ち切る
//! - `SizingMode::FitToPaper`: 枚数固定。写真サイズが最大になる列数を探索する

use crate::error::{ensure_finite, ensure_positive, Error, Result};
use serde::{Deserialize, Serialize};

// ============================================
// 定数
// ============================================

/// パスポート写真の縦横比（幅 / 高さ = 35:45）
pub const PASSPORT_ASPECT: f64 = 35.0 / 45.0;

// ============================================
// 型定義
// ============================================

/// 物理サイズ（mm）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

/// 用紙サイズ
pub type PaperSize = PhysicalSize;

/// 写真1枚のサイズ
pub type TileSize = PhysicalSize;

impl PhysicalSize {
    pub const fn new(width_mm: f64, height_mm: f64) -> Self {
        Self { width_mm, height_mm }
    }

    /// 幅・高さがともに正の有限値であることを確認
    pub fn validate(&self) -> Result<Self> {
        ensure_positive(self.width_mm, "width_mm")?;
        ensure_positive(self.height_mm, "height_mm")?;
        Ok(*self)
    }

    /// 縦横比（幅 / 高さ）
    pub fn aspect(&self) -> f64 {
        self.width_mm / self.height_mm
    }

    /// 横長向きに揃える
    pub fn landscape(&self) -> Self {
        if self.width_mm >= self.height_mm {
            *self
        } else {
            Self::new(self.height_mm, self.width_mm)
        }
    }

    /// 縦長向きに揃える
    pub fn portrait(&self) -> Self {
        if self.width_mm <= self.height_mm {
            *self
        } else {
            Self::new(self.height_mm, self.width_mm)
        }
    }
}

/// サイズ決定モード
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SizingMode {
    /// 写真サイズ固定（標準・書類用・カスタム）
    FixedTile { tile: TileSize, copies: u32 },
    /// 指定枚数が用紙に収まる最大サイズ（縦横比は 35:45）
    FitToPaper { copies: u32 },
}

impl SizingMode {
    pub fn copies(&self) -> u32 {
        match *self {
            SizingMode::FixedTile { copies, .. } | SizingMode::FitToPaper { copies } => copies,
        }
    }

    /// 切り抜きに使う写真の縦横比（幅 / 高さ）
    ///
    /// レイアウト計算を待たずに決まるので、切り抜き計算と並行できる。
    pub fn tile_aspect(&self) -> f64 {
        match self {
            SizingMode::FixedTile { tile, .. } => tile.aspect(),
            SizingMode::FitToPaper { .. } => PASSPORT_ASPECT,
        }
    }
}

/// レイアウト計算結果（mm）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub tile_size: TileSize,
    pub columns: u32,
    pub rows: u32,
    /// 各写真の左上座標（用紙左上原点、mm）
    pub positions: Vec<(f64, f64)>,
    pub gap_mm: f64,
}

impl LayoutPlan {
    /// 実際に配置される枚数
    pub fn placed(&self) -> usize {
        self.positions.len()
    }

    /// グリッド全体（columns × rows）のブロックサイズ（mm）
    pub fn block_size(&self) -> PhysicalSize {
        block_size(self.tile_size, self.columns, self.rows, self.gap_mm)
    }
}

// ============================================
// レイアウト計算
// ============================================

/// サイズ決定モードに応じてレイアウトを計算
pub fn plan_layout(paper: PaperSize, mode: &SizingMode, gap_mm: f64) -> Result<LayoutPlan> {
    match *mode {
        SizingMode::FixedTile { tile, copies } => plan_fixed_tile(paper, tile, copies, gap_mm),
        SizingMode::FitToPaper { copies } => {
            plan_fit_to_paper(paper, PASSPORT_ASPECT, copies, gap_mm)
        }
    }
}

/// 写真サイズ固定のレイアウト
pub fn plan_fixed_tile(
    paper: PaperSize,
    tile: TileSize,
    copies: u32,
    gap_mm: f64,
) -> Result<LayoutPlan> {
    let paper = paper.validate()?;
    let tile = tile.validate()?;
    let gap = validate_gap(gap_mm)?;
    ensure_copies(copies)?;

    if tile.width_mm > paper.width_mm || tile.height_mm > paper.height_mm {
        return Err(Error::LayoutInfeasible(format!(
            "tile {}x{}mm does not fit paper {}x{}mm",
            tile.width_mm, tile.height_mm, paper.width_mm, paper.height_mm
        )));
    }

    // 1枚も入らない計算結果でも、写真自体が用紙に収まれば1列/1行は置ける
    let columns = fit_count(paper.width_mm, tile.width_mm, gap);
    let rows = fit_count(paper.height_mm, tile.height_mm, gap);

    Ok(build_plan(paper, tile, columns, rows, copies, gap))
}

/// 枚数固定で写真サイズを最大化するレイアウト
///
/// 列数 `c` を 1 から `copies` まで試し、写真幅が最大のものを採用する。
/// 同じ幅なら先に見つかった（列数の少ない）候補を残す。
pub fn plan_fit_to_paper(
    paper: PaperSize,
    aspect: f64,
    copies: u32,
    gap_mm: f64,
) -> Result<LayoutPlan> {
    let paper = paper.validate()?;
    let aspect = ensure_positive(aspect, "aspect")?;
    let gap = validate_gap(gap_mm)?;
    ensure_copies(copies)?;

    let mut best: Option<(u32, u32, TileSize)> = None;
    let mut best_width = 0.0;

    for c in 1..=copies {
        let r = copies.div_ceil(c);
        let tile = fit_cell(paper, aspect, c, r, gap);

        if tile.width_mm > best_width && tile.height_mm > 0.0 {
            best_width = tile.width_mm;
            best = Some((c, r, tile));
        }
    }

    let (columns, rows, tile) = best.ok_or_else(|| {
        Error::LayoutInfeasible(format!(
            "{copies} copies with {gap}mm gap leave no room on {}x{}mm paper",
            paper.width_mm, paper.height_mm
        ))
    })?;

    Ok(build_plan(paper, tile, columns, rows, copies, gap))
}

/// `c` 列 `r` 行のセルに収まる最大の写真サイズ
fn fit_cell(paper: PaperSize, aspect: f64, c: u32, r: u32, gap: f64) -> TileSize {
    let avail_w = (paper.width_mm - gap * (c as f64 + 1.0)) / c as f64;
    let avail_h = (paper.height_mm - gap * (r as f64 + 1.0)) / r as f64;

    let mut photo_w = avail_w;
    let mut photo_h = photo_w / aspect;
    if photo_h > avail_h {
        photo_h = avail_h;
        photo_w = photo_h * aspect;
    }

    PhysicalSize::new(photo_w, photo_h)
}

/// 1軸に並ぶ枚数（最低1）
fn fit_count(paper_mm: f64, tile_mm: f64, gap: f64) -> u32 {
    let n = ((paper_mm - gap) / (tile_mm + gap)).floor();
    if n < 1.0 {
        1
    } else {
        n as u32
    }
}

fn block_size(tile: TileSize, columns: u32, rows: u32, gap: f64) -> PhysicalSize {
    PhysicalSize::new(
        columns as f64 * tile.width_mm + (columns as f64 - 1.0) * gap,
        rows as f64 * tile.height_mm + (rows as f64 - 1.0) * gap,
    )
}

/// 行優先で配置し、グリッド全体を用紙中央に寄せる
fn build_plan(
    paper: PaperSize,
    tile: TileSize,
    columns: u32,
    rows: u32,
    copies: u32,
    gap: f64,
) -> LayoutPlan {
    let block = block_size(tile, columns, rows, gap);
    let offset_x = (paper.width_mm - block.width_mm) / 2.0;
    let offset_y = (paper.height_mm - block.height_mm) / 2.0;

    let capacity = columns as u64 * rows as u64;
    let placed = (copies as u64).min(capacity) as usize;

    let positions = (0..placed)
        .map(|i| {
            let col = (i as u64 % columns as u64) as f64;
            let row = (i as u64 / columns as u64) as f64;
            (
                offset_x + col * (tile.width_mm + gap),
                offset_y + row * (tile.height_mm + gap),
            )
        })
        .collect();

    LayoutPlan {
        tile_size: tile,
        columns,
        rows,
        positions,
        gap_mm: gap,
    }
}

fn validate_gap(gap_mm: f64) -> Result<f64> {
    let gap = ensure_finite(gap_mm, "gap_mm")?;
    if gap < 0.0 {
        return Err(Error::InvalidDimension(format!("gap_mm must not be negative: {gap}")));
    }
    Ok(gap)
}

fn ensure_copies(copies: u32) -> Result<()> {
    if copies == 0 {
        return Err(Error::LayoutInfeasible("copies must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: PaperSize = PhysicalSize::new(210.0, 297.0);
    const PASSPORT: TileSize = PhysicalSize::new(35.0, 45.0);
    const EPS: f64 = 1e-9;

    fn assert_within_paper(plan: &LayoutPlan, paper: PaperSize) {
        for &(x, y) in &plan.positions {
            assert!(x >= -EPS && y >= -EPS, "negative position ({x}, {y})");
            assert!(x + plan.tile_size.width_mm <= paper.width_mm + EPS);
            assert!(y + plan.tile_size.height_mm <= paper.height_mm + EPS);
        }
    }

    #[test]
    fn test_fixed_tile_a4_passport() {
        let mode = SizingMode::FixedTile { tile: PASSPORT, copies: 8 };
        let plan = plan_layout(A4, &mode, 3.0).unwrap();

        assert_eq!(plan.columns, 5);
        assert_eq!(plan.rows, 6);
        assert_eq!(plan.placed(), 8);
        assert_eq!(plan.tile_size, PASSPORT);

        // ブロック 5*35+4*3=187, 6*45+5*3=285 → オフセット (11.5, 6)
        let block = plan.block_size();
        assert!((block.width_mm - 187.0).abs() < EPS);
        assert!((block.height_mm - 285.0).abs() < EPS);
        assert!((plan.positions[0].0 - 11.5).abs() < EPS);
        assert!((plan.positions[0].1 - 6.0).abs() < EPS);

        // 行優先: 6枚目は2行目の先頭
        assert!((plan.positions[5].0 - 11.5).abs() < EPS);
        assert!((plan.positions[5].1 - 54.0).abs() < EPS);
        assert!((plan.positions[4].0 - (11.5 + 4.0 * 38.0)).abs() < EPS);

        assert_within_paper(&plan, A4);
    }

    #[test]
    fn test_fixed_tile_caps_at_capacity() {
        let mode = SizingMode::FixedTile { tile: PASSPORT, copies: 100 };
        let plan = plan_layout(A4, &mode, 3.0).unwrap();
        assert_eq!(plan.placed(), 30);
        assert_within_paper(&plan, A4);
    }

    #[test]
    fn test_fixed_tile_clamps_to_one() {
        // (36-3)/(35+3) = 0.87 → 1列に切り上げ
        let paper = PhysicalSize::new(36.0, 46.0);
        let mode = SizingMode::FixedTile { tile: PASSPORT, copies: 4 };
        let plan = plan_layout(paper, &mode, 3.0).unwrap();
        assert_eq!((plan.columns, plan.rows), (1, 1));
        assert_eq!(plan.placed(), 1);
        assert!((plan.positions[0].0 - 0.5).abs() < EPS);
        assert_within_paper(&plan, paper);
    }

    #[test]
    fn test_fixed_tile_larger_than_paper() {
        let paper = PhysicalSize::new(30.0, 297.0);
        let mode = SizingMode::FixedTile { tile: PASSPORT, copies: 1 };
        let err = plan_layout(paper, &mode, 0.0).unwrap_err();
        assert!(matches!(err, Error::LayoutInfeasible(_)));
    }

    #[test]
    fn test_fixed_tile_zero_gap() {
        let paper = PhysicalSize::new(70.0, 90.0);
        let mode = SizingMode::FixedTile { tile: PASSPORT, copies: 4 };
        let plan = plan_layout(paper, &mode, 0.0).unwrap();
        assert_eq!((plan.columns, plan.rows), (2, 2));
        assert_eq!(plan.positions, vec![(0.0, 0.0), (35.0, 0.0), (0.0, 45.0), (35.0, 45.0)]);
    }

    #[test]
    fn test_fit_to_paper_4x6_four_copies() {
        let paper = PhysicalSize::new(101.6, 152.4);
        let plan = plan_layout(paper, &SizingMode::FitToPaper { copies: 4 }, 2.0).unwrap();

        // c=1: 27.69, c=2: 47.8, c=3: 31.2, c=4: 22.9
        assert_eq!((plan.columns, plan.rows), (2, 2));
        assert!((plan.tile_size.width_mm - 47.8).abs() < 1e-9);
        assert!((plan.tile_size.height_mm - 47.8 / PASSPORT_ASPECT).abs() < 1e-9);
        assert_eq!(plan.placed(), 4);
        assert_within_paper(&plan, paper);
    }

    #[test]
    fn test_fit_to_paper_is_maximal() {
        let papers = [A4, PhysicalSize::new(101.6, 152.4), PhysicalSize::new(89.0, 127.0)];
        for paper in papers {
            for copies in 1..=24 {
                for gap in [0.0, 2.0, 5.0] {
                    let plan = plan_fit_to_paper(paper, PASSPORT_ASPECT, copies, gap).unwrap();
                    for c in 1..=copies {
                        let r = copies.div_ceil(c);
                        let candidate = fit_cell(paper, PASSPORT_ASPECT, c, r, gap);
                        assert!(
                            plan.tile_size.width_mm >= candidate.width_mm,
                            "copies={copies} c={c} beats chosen {}",
                            plan.columns
                        );
                    }
                    assert_eq!(plan.placed(), copies as usize);
                    assert!(plan.columns * plan.rows >= copies);
                    assert_within_paper(&plan, paper);
                }
            }
        }
    }

    #[test]
    fn test_fit_to_paper_tie_prefers_fewer_columns() {
        // c=2 と c=3 はどちらも r=2 で高さ律速 → 同じ幅 50*35/45
        let paper = PhysicalSize::new(130.0, 100.0);
        let two = fit_cell(paper, PASSPORT_ASPECT, 2, 2, 0.0);
        let three = fit_cell(paper, PASSPORT_ASPECT, 3, 2, 0.0);
        assert_eq!(two.width_mm, three.width_mm);

        let plan = plan_fit_to_paper(paper, PASSPORT_ASPECT, 4, 0.0).unwrap();
        assert_eq!(plan.columns, 2);
        assert_eq!(plan.rows, 2);
    }

    #[test]
    fn test_fit_to_paper_single_copy_fills_paper() {
        let plan = plan_layout(A4, &SizingMode::FitToPaper { copies: 1 }, 0.0).unwrap();
        assert_eq!((plan.columns, plan.rows), (1, 1));
        // 210/(35/45)=270 ≤ 297 なので幅律速
        assert!((plan.tile_size.width_mm - 210.0).abs() < EPS);
        assert!((plan.positions[0].1 - (297.0 - 270.0) / 2.0).abs() < EPS);
    }

    #[test]
    fn test_fit_to_paper_infeasible() {
        let paper = PhysicalSize::new(10.0, 10.0);
        let err = plan_layout(paper, &SizingMode::FitToPaper { copies: 3 }, 6.0).unwrap_err();
        assert!(matches!(err, Error::LayoutInfeasible(_)));
    }

    #[test]
    fn test_zero_copies_is_infeasible() {
        assert!(matches!(
            plan_layout(A4, &SizingMode::FitToPaper { copies: 0 }, 2.0),
            Err(Error::LayoutInfeasible(_))
        ));
        assert!(matches!(
            plan_layout(A4, &SizingMode::FixedTile { tile: PASSPORT, copies: 0 }, 2.0),
            Err(Error::LayoutInfeasible(_))
        ));
    }

    #[test]
    fn test_invalid_dimensions() {
        let mode = SizingMode::FixedTile { tile: PASSPORT, copies: 1 };
        assert!(matches!(
            plan_layout(PhysicalSize::new(f64::NAN, 297.0), &mode, 2.0),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(
            plan_layout(PhysicalSize::new(210.0, 0.0), &mode, 2.0),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(plan_layout(A4, &mode, -1.0), Err(Error::InvalidDimension(_))));
        assert!(matches!(
            plan_layout(A4, &mode, f64::INFINITY),
            Err(Error::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_orientation_helpers() {
        assert_eq!(A4.landscape(), PhysicalSize::new(297.0, 210.0));
        assert_eq!(A4.landscape().portrait(), A4);
        assert_eq!(A4.portrait(), A4);
    }

    #[test]
    fn test_sizing_mode_serde() {
        let mode = SizingMode::FixedTile { tile: PASSPORT, copies: 6 };
        let json = serde_json::to_string(&mode).expect("シリアライズ失敗");
        assert!(json.contains("\"mode\":\"fixedTile\""));

        let parsed: SizingMode =
            serde_json::from_str(r#"{"mode":"fitToPaper","copies":4}"#).expect("デシリアライズ失敗");
        assert_eq!(parsed, SizingMode::FitToPaper { copies: 4 });
        assert_eq!(parsed.copies(), 4);
        assert!((parsed.tile_aspect() - PASSPORT_ASPECT).abs() < EPS);
    }
}
