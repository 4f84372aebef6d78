//! Merged Cell Module
//!
//! 矩形範囲内の結合セルを索引化するモジュール。
//! 結合範囲内のどの座標からも、起点セル（左上）の値を引けるようにします。

use std::collections::HashMap;

use crate::sheet::Worksheet;
use crate::types::{CellCoord, CellValue, Rect};

/// 1つの結合範囲
#[derive(Debug, Clone, PartialEq)]
pub struct MergeSpan {
    /// 対象範囲に切り詰めた結合範囲
    pub rect: Rect,
    /// 宣言上の起点セル（対象範囲外の場合もある）
    pub origin: CellCoord,
    /// 起点セルの値
    pub value: CellValue,
}

/// 結合セルの索引
#[derive(Debug, Clone, Default)]
pub struct MergeIndex {
    spans: Vec<MergeSpan>,
    lookup: HashMap<CellCoord, usize>,
}

impl MergeIndex {
    /// シートの結合宣言から、指定範囲内の索引を構築する
    ///
    /// 範囲からはみ出した結合は範囲内に切り詰めます。単一セルの結合は無視し、
    /// 既に登録済みの結合と重なる宣言は後から来たものを無視します。
    ///
    /// # 引数
    ///
    /// * `sheet` - 対象シート
    /// * `area` - 索引化する範囲
    pub fn build(sheet: &Worksheet, area: Rect) -> Self {
        let mut index = MergeIndex::default();

        for declared in sheet.merges() {
            if declared.cell_count() < 2 {
                continue;
            }
            let Some(clipped) = declared.intersect(&area) else {
                continue;
            };
            if clipped.coords().any(|coord| index.lookup.contains_key(&coord)) {
                tracing::debug!(
                    sheet = sheet.name(),
                    merge = %declared.to_a1_notation(),
                    "Ignoring merge range overlapping an earlier declaration"
                );
                continue;
            }

            let origin = declared.origin();
            let span_id = index.spans.len();
            index.spans.push(MergeSpan {
                rect: clipped,
                origin,
                value: sheet.value(origin).clone(),
            });
            for coord in clipped.coords() {
                index.lookup.insert(coord, span_id);
            }
        }

        index
    }

    /// 座標を含む結合範囲
    pub fn span_at(&self, coord: CellCoord) -> Option<&MergeSpan> {
        self.lookup.get(&coord).map(|&id| &self.spans[id])
    }

    /// 座標の値を持つセルの座標（結合範囲内なら起点セル、それ以外はその座標自身）
    pub fn canonical_coord(&self, coord: CellCoord) -> CellCoord {
        self.span_at(coord).map_or(coord, |span| span.origin)
    }

    /// 座標の正規の値（結合範囲内なら起点セルの値）
    pub fn canonical_value<'a>(&'a self, sheet: &'a Worksheet, coord: CellCoord) -> &'a CellValue {
        match self.span_at(coord) {
            Some(span) => &span.value,
            None => sheet.value(coord),
        }
    }

    /// 登録済みの結合範囲
    pub fn spans(&self) -> &[MergeSpan] {
        &self.spans
    }

    /// 結合範囲が1つもないか
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged_sheet() -> Worksheet {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Header").set_value(1, 2, "ignored");
        sheet.add_merge(Rect::new(1, 1, 2, 3));
        sheet
    }

    #[test]
    fn test_members_resolve_to_origin_value() {
        let sheet = merged_sheet();
        let index = MergeIndex::build(&sheet, Rect::new(1, 1, 10, 10));

        for coord in Rect::new(1, 1, 2, 3).coords() {
            assert_eq!(
                index.canonical_value(&sheet, coord),
                &CellValue::String("Header".to_string())
            );
            assert_eq!(index.canonical_coord(coord), CellCoord::new(1, 1));
        }
        assert_eq!(index.span_at(CellCoord::new(3, 1)), None);
        assert_eq!(index.canonical_coord(CellCoord::new(3, 1)), CellCoord::new(3, 1));
    }

    #[test]
    fn test_merge_clipped_to_area() {
        let sheet = merged_sheet();
        let index = MergeIndex::build(&sheet, Rect::new(2, 2, 10, 10));

        let span = index.span_at(CellCoord::new(2, 2)).unwrap();
        assert_eq!(span.rect, Rect::new(2, 2, 2, 3));
        assert_eq!(span.origin, CellCoord::new(1, 1));
        assert_eq!(span.value, CellValue::String("Header".to_string()));
        assert_eq!(index.span_at(CellCoord::new(1, 1)), None);
    }

    #[test]
    fn test_merge_outside_area_ignored() {
        let sheet = merged_sheet();
        let index = MergeIndex::build(&sheet, Rect::new(5, 5, 10, 10));
        assert!(index.is_empty());
    }

    #[test]
    fn test_overlapping_declaration_ignored() {
        let mut sheet = merged_sheet();
        sheet.set_value(2, 3, "later");
        sheet.add_merge(Rect::new(2, 3, 4, 4));
        sheet.add_merge(Rect::new(2, 2, 2, 2));

        let index = MergeIndex::build(&sheet, Rect::new(1, 1, 10, 10));
        assert_eq!(index.spans().len(), 1);
        assert_eq!(index.span_at(CellCoord::new(4, 4)), None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_every_member_matches_origin(
                row in 1u32..20, col in 1u32..20, h in 0u32..5, w in 1u32..5,
                area_row in 1u32..10, area_col in 1u32..10,
            ) {
                let merge = Rect::new(row, col, row + h, col + w);
                let mut sheet = Worksheet::new("Sheet1");
                sheet.set_value(row, col, "origin");
                sheet.add_merge(merge);

                let area = Rect::new(area_row, area_col, 30, 30);
                let index = MergeIndex::build(&sheet, area);

                for coord in merge.coords().filter(|c| area.contains(*c)) {
                    prop_assert_eq!(
                        index.canonical_value(&sheet, coord),
                        &CellValue::String("origin".to_string())
                    );
                }
            }
        }
    }
}
