//! Table Segmentation Module
//!
//! 矩形範囲を、空白の行・列で区切られた論理テーブルに分割するモジュール。
//!
//! 分割は再帰的に行います。内容を持つセルの外接矩形を求め、空白行で行方向の帯に、
//! 空白列で列方向の帯に分け、それ以上分割できなくなった外接矩形を1つのテーブルとします。
//! 結合範囲は、起点セルの値が空白でなければ全メンバーが内容を持つものとして扱います。

use std::collections::BTreeSet;

use crate::api::HiddenPolicy;
use crate::config::ConversionConfig;
use crate::formatter::CellFormatter;
use crate::merge::MergeIndex;
use crate::sheet::Worksheet;
use crate::types::{CellCoord, Rect};

/// 論理テーブル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalTable {
    /// テーブル本体の範囲（タイトル行を含まない）
    pub rect: Rect,
    /// 推定されたタイトル
    pub title: Option<String>,
    /// 分割結果内での順序（0始まり）
    pub index: usize,
}

/// 矩形範囲を論理テーブルに分割する
///
/// # 引数
///
/// * `sheet` - 対象シート
/// * `area` - 分割する矩形範囲
/// * `merges` - `area`について構築した結合セルの索引
/// * `config` - 変換設定（非表示行・列の扱い、タイトルの書式化に使用）
///
/// # 戻り値
///
/// 上から下、左から右の順（開始行、開始列の順）に並んだ論理テーブル。内容がない場合は空のリスト
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::{segment_tables, ConversionConfig, MergeIndex, Rect, Worksheet};
///
/// let mut sheet = Worksheet::new("Sheet1");
/// sheet.set_value(1, 1, "a").set_value(2, 1, "b");
/// sheet.set_value(4, 1, "c").set_value(5, 1, "d");
///
/// let area = Rect::new(1, 1, 5, 1);
/// let merges = MergeIndex::build(&sheet, area);
/// let tables = segment_tables(&sheet, area, &merges, &ConversionConfig::default());
///
/// assert_eq!(tables.len(), 2);
/// assert_eq!(tables[0].rect, Rect::new(1, 1, 2, 1));
/// assert_eq!(tables[1].rect, Rect::new(4, 1, 5, 1));
/// ```
pub fn segment_tables(
    sheet: &Worksheet,
    area: Rect,
    merges: &MergeIndex,
    config: &ConversionConfig,
) -> Vec<LogicalTable> {
    let grid = ContentGrid::build(sheet, area, merges, config.hidden_policy);

    // 1. 再帰的に分割
    let mut blocks = Vec::new();
    grid.split(grid.points.clone(), &mut blocks);

    // 2. タイトル行の推定
    let formatter = CellFormatter::new(config, sheet.is_date1904());
    let mut tables: Vec<LogicalTable> = blocks
        .into_iter()
        .map(|block| grid.infer_title(merges, &formatter, block))
        .collect();

    // 3. 上から下、左から右の順に並べて番号付け
    tables.sort_by_key(|table| (table.rect.row_start, table.rect.col_start));
    for (index, table) in tables.iter_mut().enumerate() {
        table.index = index;
    }

    tracing::debug!(
        sheet = sheet.name(),
        area = %area.to_a1_notation(),
        tables = tables.len(),
        "Segmented area into tables"
    );
    tables
}

/// 内容を持つセルの集合
struct ContentGrid<'a> {
    sheet: &'a Worksheet,
    policy: HiddenPolicy,
    points: Vec<CellCoord>,
}

impl<'a> ContentGrid<'a> {
    fn build(sheet: &'a Worksheet, area: Rect, merges: &MergeIndex, policy: HiddenPolicy) -> Self {
        let hidden = |coord: &CellCoord| {
            policy != HiddenPolicy::Include
                && (sheet.is_row_hidden(coord.row) || sheet.is_col_hidden(coord.col))
        };

        let mut filled: BTreeSet<CellCoord> = sheet
            .cells()
            .filter(|(coord, cell)| {
                area.contains(*coord) && merges.span_at(*coord).is_none() && !cell.value.is_blank()
            })
            .map(|(coord, _)| coord)
            .collect();

        for span in merges.spans() {
            if !span.value.is_blank() {
                filled.extend(span.rect.coords());
            }
        }

        let points = filled.into_iter().filter(|coord| !hidden(coord)).collect();
        Self {
            sheet,
            policy,
            points,
        }
    }

    /// 非表示で、かつ分割の判定から除外される行か
    fn is_transparent_row(&self, row: u32) -> bool {
        self.policy == HiddenPolicy::Skip && self.sheet.is_row_hidden(row)
    }

    fn is_transparent_col(&self, col: u32) -> bool {
        self.policy == HiddenPolicy::Skip && self.sheet.is_col_hidden(col)
    }

    /// 内容のある行（列）の値を、間に空白の区切りがある箇所でグループに分ける
    fn bands(&self, mut lines: Vec<u32>, transparent: impl Fn(u32) -> bool) -> Vec<(u32, u32)> {
        lines.sort_unstable();
        lines.dedup();

        let mut bands: Vec<(u32, u32)> = Vec::new();
        for line in lines {
            match bands.last_mut() {
                Some((_, end)) if (*end + 1..line).all(&transparent) => {
                    *end = line;
                }
                _ => bands.push((line, line)),
            }
        }
        bands
    }

    fn split(&self, points: Vec<CellCoord>, out: &mut Vec<Rect>) {
        let Some(bbox) = bounding_box(&points) else {
            return;
        };

        // 1. 空白行で分割
        let row_bands = self.bands(
            points.iter().map(|p| p.row).collect(),
            |row| self.is_transparent_row(row),
        );
        if row_bands.len() > 1 {
            for (start, end) in row_bands {
                let band = points
                    .iter()
                    .filter(|p| p.row >= start && p.row <= end)
                    .copied()
                    .collect();
                self.split(band, out);
            }
            return;
        }

        // 2. 空白列で分割
        let col_bands = self.bands(
            points.iter().map(|p| p.col).collect(),
            |col| self.is_transparent_col(col),
        );
        if col_bands.len() > 1 {
            for (start, end) in col_bands {
                let band = points
                    .iter()
                    .filter(|p| p.col >= start && p.col <= end)
                    .copied()
                    .collect();
                self.split(band, out);
            }
            return;
        }

        out.push(bbox);
    }

    /// ブロックの先頭行が見出し（1つの値のみ）であればタイトルとして切り出す
    ///
    /// 見出しとみなすのは、2行2列以上のブロックで、先頭行の内容が先頭列から始まる
    /// 1つのセル、または先頭列から最終列まで横に結合された1つの範囲のみの場合です。
    fn infer_title(
        &self,
        merges: &MergeIndex,
        formatter: &CellFormatter<'_>,
        block: Rect,
    ) -> LogicalTable {
        let untitled = LogicalTable {
            rect: block,
            title: None,
            index: 0,
        };
        if block.height() < 2 || block.width() < 2 {
            return untitled;
        }

        let first_row: Vec<CellCoord> = self
            .points
            .iter()
            .filter(|p| p.row == block.row_start && block.contains(**p))
            .copied()
            .collect();
        let origin = block.origin();
        if !first_row.contains(&origin) {
            return untitled;
        }

        let single_cell = first_row.len() == 1 && merges.span_at(origin).is_none();
        let full_width_merge = merges.span_at(origin).is_some_and(|span| {
            span.rect.row_start == block.row_start
                && span.rect.row_end == block.row_start
                && span.rect.col_start == block.col_start
                && span.rect.col_end >= block.col_end
                && first_row.iter().all(|p| span.rect.contains(*p))
        });
        if !single_cell && !full_width_merge {
            return untitled;
        }

        let body: Vec<CellCoord> = self
            .points
            .iter()
            .filter(|p| p.row > block.row_start && block.contains(**p))
            .copied()
            .collect();
        let Some(body_rect) = bounding_box(&body) else {
            return untitled;
        };

        let canonical = merges.canonical_coord(origin);
        let title = formatter
            .format(
                merges.canonical_value(self.sheet, origin),
                self.sheet.cell(canonical),
            )
            .trim()
            .to_string();

        LogicalTable {
            rect: body_rect,
            title: (!title.is_empty()).then_some(title),
            index: 0,
        }
    }
}

fn bounding_box(points: &[CellCoord]) -> Option<Rect> {
    points
        .iter()
        .map(|p| Rect::cell(*p))
        .reduce(|acc, rect| acc.bounding(&rect))
}
