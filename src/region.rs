//! Region Module
//!
//! 印刷範囲の取得と、矩形集合の統合を行うモジュール。

use crate::api::NoPrintAreaMode;
use crate::sheet::Worksheet;
use crate::types::{spans_adjacent, spans_overlap, Rect};

/// 矩形の集合を、互いに重ならない矩形の集合に統合する
///
/// 行範囲が重なり列範囲が重なるか隣接する矩形（または列範囲が重なり行範囲が隣接する矩形）を
/// 両者を囲む矩形に置き換え、統合できる組がなくなるまで繰り返します。
/// 出力は (開始行, 開始列) の順に並びます。
///
/// # 引数
///
/// * `rects` - 統合対象の矩形（空・重複・離散のいずれも可）
///
/// # 戻り値
///
/// 互いに重ならない矩形のリスト。入力が空の場合は空のリスト
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::{union_rects, Rect};
///
/// let merged = union_rects(&[Rect::new(1, 1, 5, 3), Rect::new(2, 4, 6, 6)]);
/// assert_eq!(merged, vec![Rect::new(1, 1, 6, 6)]);
/// ```
pub fn union_rects(rects: &[Rect]) -> Vec<Rect> {
    let mut current: Vec<Rect> = rects.to_vec();
    current.sort();

    loop {
        let mut merged_any = false;
        let mut output: Vec<Rect> = Vec::with_capacity(current.len());

        for rect in current {
            match output.iter_mut().find(|existing| is_mergeable(existing, &rect)) {
                Some(existing) => {
                    *existing = existing.bounding(&rect);
                    merged_any = true;
                }
                None => output.push(rect),
            }
        }

        output.sort();
        if !merged_any {
            return output;
        }
        current = output;
    }
}

/// 2つの矩形を統合すべきかを判定（境界の接触も統合対象）
fn is_mergeable(a: &Rect, b: &Rect) -> bool {
    let rows_overlap = spans_overlap(a.row_start, a.row_end, b.row_start, b.row_end);
    let cols_overlap = spans_overlap(a.col_start, a.col_end, b.col_start, b.col_end);

    (rows_overlap && (cols_overlap || spans_adjacent(a.col_start, a.col_end, b.col_start, b.col_end)))
        || (cols_overlap && spans_adjacent(a.row_start, a.row_end, b.row_start, b.row_end))
}

/// シートの処理対象範囲を取得する
///
/// 宣言された印刷範囲は使用範囲に切り詰めて返します。印刷範囲が宣言されていない場合は、
/// `mode`に従って使用範囲全体を返すか、何も返しません。
///
/// # 引数
///
/// * `sheet` - 対象シート
/// * `mode` - 印刷範囲が宣言されていない場合の扱い
///
/// # 戻り値
///
/// 処理対象の矩形のリスト（未統合）。空の場合はシートに出力対象がない
pub fn print_areas(sheet: &Worksheet, mode: NoPrintAreaMode) -> Vec<Rect> {
    let used = match sheet.used_range() {
        Some(used) => used,
        None => return Vec::new(),
    };

    let declared = sheet.print_areas();
    if !declared.is_empty() {
        return declared
            .iter()
            .filter_map(|area| area.intersect(&used))
            .collect();
    }

    match mode {
        NoPrintAreaMode::UsedRange => vec![used],
        NoPrintAreaMode::Skip => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_empty() {
        assert!(union_rects(&[]).is_empty());
    }

    #[test]
    fn test_union_overlapping() {
        let result = union_rects(&[Rect::new(1, 1, 3, 3), Rect::new(2, 2, 5, 5)]);
        assert_eq!(result, vec![Rect::new(1, 1, 5, 5)]);
    }

    #[test]
    fn test_union_column_adjacent() {
        let result = union_rects(&[Rect::new(1, 1, 3, 2), Rect::new(1, 3, 3, 4)]);
        assert_eq!(result, vec![Rect::new(1, 1, 3, 4)]);
    }

    #[test]
    fn test_union_row_adjacent() {
        let result = union_rects(&[Rect::new(4, 1, 6, 3), Rect::new(1, 1, 3, 3)]);
        assert_eq!(result, vec![Rect::new(1, 1, 6, 3)]);
    }

    #[test]
    fn test_union_disjoint_kept() {
        let result = union_rects(&[Rect::new(10, 1, 12, 3), Rect::new(1, 1, 3, 3)]);
        assert_eq!(result, vec![Rect::new(1, 1, 3, 3), Rect::new(10, 1, 12, 3)]);
    }

    #[test]
    fn test_union_diagonal_not_merged() {
        // 角だけが接する矩形は統合しない
        let result = union_rects(&[Rect::new(1, 1, 2, 2), Rect::new(3, 3, 4, 4)]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_union_cascading_merge() {
        // 1回目の統合で生じた矩形が、さらに別の矩形と重なる
        let result = union_rects(&[
            Rect::new(1, 1, 2, 2),
            Rect::new(1, 5, 5, 6),
            Rect::new(2, 2, 4, 4),
        ]);
        assert_eq!(result, vec![Rect::new(1, 1, 5, 6)]);
    }

    #[test]
    fn test_union_duplicates() {
        let rect = Rect::new(2, 2, 4, 4);
        assert_eq!(union_rects(&[rect, rect, rect]), vec![rect]);
    }

    #[test]
    fn test_print_areas_declared_are_clipped() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "a").set_value(5, 3, "b");
        sheet.add_print_area(Rect::new(1, 1, 100, 10));
        sheet.add_print_area(Rect::new(50, 50, 60, 60));

        assert_eq!(
            print_areas(&sheet, NoPrintAreaMode::UsedRange),
            vec![Rect::new(1, 1, 5, 3)]
        );
    }

    #[test]
    fn test_print_areas_fallback() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(2, 2, "a").set_value(4, 3, "b");

        assert_eq!(
            print_areas(&sheet, NoPrintAreaMode::UsedRange),
            vec![Rect::new(2, 2, 4, 3)]
        );
        assert!(print_areas(&sheet, NoPrintAreaMode::Skip).is_empty());
    }

    #[test]
    fn test_print_areas_empty_sheet() {
        let sheet = Worksheet::new("Empty");
        assert!(print_areas(&sheet, NoPrintAreaMode::UsedRange).is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn rect_strategy() -> impl Strategy<Value = Rect> {
            (1u32..30, 1u32..30, 0u32..6, 0u32..6)
                .prop_map(|(row, col, h, w)| Rect::new(row, col, row + h, col + w))
        }

        proptest! {
            #[test]
            fn test_union_is_idempotent(rects in prop::collection::vec(rect_strategy(), 0..12)) {
                let once = union_rects(&rects);
                let twice = union_rects(&once);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn test_union_outputs_are_disjoint(rects in prop::collection::vec(rect_strategy(), 0..12)) {
                let result = union_rects(&rects);
                for (i, a) in result.iter().enumerate() {
                    for b in &result[i + 1..] {
                        prop_assert!(a.intersect(b).is_none());
                    }
                }
            }

            #[test]
            fn test_union_covers_inputs(rects in prop::collection::vec(rect_strategy(), 0..12)) {
                let result = union_rects(&rects);
                for rect in &rects {
                    prop_assert!(result.iter().any(|r| r.intersect(rect) == Some(*rect)));
                }
            }
        }
    }
}
