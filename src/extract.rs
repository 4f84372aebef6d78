//! Table Extraction Module
//!
//! 論理テーブルを文字列のグリッドに変換するモジュール。
//!
//! セルごとに結合範囲の解決、非表示行・列の扱い、値の書式化、ハイパーリンクの出力を行います。
//! 新しく割り当てた脚注は戻り値として返し、レジストリへの登録は呼び出し側が行います。

use std::collections::HashMap;

use crate::api::{HiddenPolicy, HyperlinkMode, MergePolicy};
use crate::config::ConversionConfig;
use crate::footnote::FootnoteRegistry;
use crate::formatter::CellFormatter;
use crate::merge::MergeIndex;
use crate::segment::LogicalTable;
use crate::sheet::Worksheet;
use crate::types::{CellCoord, CellValue};

/// 走査中に実体化されるセル
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// 座標
    pub coord: CellCoord,
    /// 元の値（結合範囲内なら起点セルの値）
    pub raw: CellValue,
    /// 書式化・エスケープ済みの表示文字列
    pub display: String,
    /// 非表示の行または列に属するか
    pub hidden: bool,
    /// 結合範囲のメンバーか
    pub merged_member: bool,
    /// 結合範囲の起点セル
    pub merge_origin: Option<CellCoord>,
}

/// 抽出結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTable {
    /// 行ごとの表示文字列
    pub rows: Vec<Vec<String>>,
    /// この抽出で新しく割り当てた脚注（番号, テキスト）
    pub note_refs: Vec<(usize, String)>,
    /// セル数の上限で打ち切られたか
    pub truncated: bool,
    /// テーブルのタイトル
    pub title: Option<String>,
}

impl ExtractedTable {
    /// 内容を持つセルが1つもないか
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|cell| cell.trim().is_empty())
    }

    /// 出力されたセル数
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// 論理テーブルを抽出する
///
/// # 引数
///
/// * `sheet` - 対象シート
/// * `table` - 抽出する論理テーブル
/// * `merges` - テーブルを含む範囲について構築した結合セルの索引
/// * `config` - 変換設定
/// * `registry` - 現在のスコープの脚注レジストリ（参照のみ）
///
/// # 戻り値
///
/// 抽出結果。`max_cells_per_table`を超える場合は、それまでに処理したセルのみを含み、
/// `truncated`が`true`になります
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::{
///     extract_table, segment_tables, ConversionConfig, FootnoteRegistry, MergeIndex, Rect,
///     Worksheet,
/// };
///
/// let mut sheet = Worksheet::new("Sheet1");
/// sheet.set_value(1, 1, "Name").set_value(1, 2, "Qty");
/// sheet.set_value(2, 1, "Widget").set_value(2, 2, 120.0);
///
/// let config = ConversionConfig::default();
/// let area = Rect::new(1, 1, 2, 2);
/// let merges = MergeIndex::build(&sheet, area);
/// let tables = segment_tables(&sheet, area, &merges, &config);
/// let extracted = extract_table(&sheet, &tables[0], &merges, &config, &FootnoteRegistry::new());
///
/// assert_eq!(extracted.rows, vec![vec!["Name", "Qty"], vec!["Widget", "120"]]);
/// ```
pub fn extract_table(
    sheet: &Worksheet,
    table: &LogicalTable,
    merges: &MergeIndex,
    config: &ConversionConfig,
    registry: &FootnoteRegistry,
) -> ExtractedTable {
    let mut extractor = Extractor {
        sheet,
        table,
        merges,
        config,
        registry,
        formatter: CellFormatter::new(config, sheet.is_date1904()),
        pending: HashMap::new(),
        note_refs: Vec::new(),
    };

    let cap = config.max_cells_per_table;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut emitted = 0usize;
    let mut truncated = false;

    'rows: for row in table.rect.row_start..=table.rect.row_end {
        if config.hidden_policy == HiddenPolicy::Skip && sheet.is_row_hidden(row) {
            continue;
        }

        let mut cells: Vec<String> = Vec::new();
        for col in table.rect.col_start..=table.rect.col_end {
            if config.hidden_policy == HiddenPolicy::Skip && sheet.is_col_hidden(col) {
                continue;
            }
            if cap.is_some_and(|cap| emitted >= cap) {
                truncated = true;
                if !cells.is_empty() {
                    rows.push(cells);
                }
                break 'rows;
            }

            let cell = extractor.materialize(CellCoord::new(row, col));
            cells.push(extractor.render(&cell));
            emitted += 1;
        }
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    if truncated {
        tracing::warn!(
            sheet = sheet.name(),
            table = %table.rect.to_a1_notation(),
            cells = emitted,
            "Table truncated at max_cells_per_table"
        );
    }

    ExtractedTable {
        rows,
        note_refs: extractor.note_refs,
        truncated,
        title: table.title.clone(),
    }
}

/// 1回の抽出の状態
struct Extractor<'a> {
    sheet: &'a Worksheet,
    table: &'a LogicalTable,
    merges: &'a MergeIndex,
    config: &'a ConversionConfig,
    registry: &'a FootnoteRegistry,
    formatter: CellFormatter<'a>,
    /// この抽出で割り当てた脚注（テキスト -> 番号）
    pending: HashMap<String, usize>,
    note_refs: Vec<(usize, String)>,
}

impl Extractor<'_> {
    fn materialize(&self, coord: CellCoord) -> Cell {
        let hidden = self.sheet.is_row_hidden(coord.row) || self.sheet.is_col_hidden(coord.col);
        let span = self.merges.span_at(coord);
        let canonical = self.merges.canonical_coord(coord);
        let raw = self.merges.canonical_value(self.sheet, coord).clone();

        // 1. 非表示セルの空欄化
        let blank_hidden = hidden && self.config.hidden_policy == HiddenPolicy::Blank;

        // 2. 結合範囲の非起点セル
        let suppressed = span.is_some_and(|span| {
            self.config.merge_policy == MergePolicy::TopLeftOnly
                && span
                    .rect
                    .intersect(&self.table.rect)
                    .is_some_and(|visible| visible.origin() != coord)
        });

        let display = if blank_hidden || suppressed {
            String::new()
        } else {
            self.formatter.format_text(&raw, self.sheet.cell(canonical))
        };

        Cell {
            coord,
            raw,
            display,
            hidden,
            merged_member: span.is_some(),
            merge_origin: span.map(|span| span.origin),
        }
    }

    /// 表示文字列にハイパーリンクを付与する
    fn render(&mut self, cell: &Cell) -> String {
        if cell.display.is_empty() {
            return String::new();
        }
        let sheet = self.sheet;
        let canonical = cell.merge_origin.unwrap_or(cell.coord);
        let Some(target) = sheet
            .cell(canonical)
            .and_then(|meta| meta.hyperlink.as_deref())
            .filter(|target| !target.trim().is_empty())
        else {
            return cell.display.clone();
        };

        let text = &cell.display;
        match self.config.hyperlink_mode {
            HyperlinkMode::Inline => format!("[{}]({})", text, target),
            HyperlinkMode::Footnote => {
                let index = self.footnote_index(target);
                format!("{}[^{}]", text, index)
            }
            HyperlinkMode::Both => {
                let index = self.footnote_index(target);
                format!("[{}]({})[^{}]", text, target, index)
            }
        }
    }

    fn footnote_index(&mut self, target: &str) -> usize {
        if let Some(index) = self.registry.lookup(target) {
            return index;
        }
        if let Some(&index) = self.pending.get(target) {
            return index;
        }
        let index = self.registry.next_index() + self.pending.len();
        self.pending.insert(target.to_string(), index);
        self.note_refs.push((index, target.to_string()));
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MarkdownEscapeLevel;
    use crate::types::Rect;

    fn table(rect: Rect) -> LogicalTable {
        LogicalTable {
            rect,
            title: None,
            index: 0,
        }
    }

    fn extract(sheet: &Worksheet, rect: Rect, config: &ConversionConfig) -> ExtractedTable {
        let merges = MergeIndex::build(sheet, rect);
        extract_table(sheet, &table(rect), &merges, config, &FootnoteRegistry::new())
    }

    fn grid(sheet: &mut Worksheet, rows: u32, cols: u32) {
        for row in 1..=rows {
            for col in 1..=cols {
                sheet.set_value(row, col, format!("r{}c{}", row, col));
            }
        }
    }

    #[test]
    fn test_extract_basic_values() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Name").set_value(1, 2, "Active");
        sheet.set_value(2, 1, "  Widget  ").set_value(2, 2, true);

        let extracted = extract(&sheet, Rect::new(1, 1, 2, 2), &ConversionConfig::default());
        assert_eq!(
            extracted.rows,
            vec![vec!["Name", "Active"], vec!["Widget", "TRUE"]]
        );
        assert!(!extracted.truncated);
        assert!(extracted.note_refs.is_empty());
    }

    #[test]
    fn test_merge_replicate_and_top_left_only() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Region").set_value(1, 3, "Total");
        sheet.add_merge(Rect::new(1, 1, 1, 2));
        let rect = Rect::new(1, 1, 1, 3);

        let extracted = extract(&sheet, rect, &ConversionConfig::default());
        assert_eq!(extracted.rows, vec![vec!["Region", "Region", "Total"]]);

        let config = ConversionConfig {
            merge_policy: MergePolicy::TopLeftOnly,
            ..Default::default()
        };
        let extracted = extract(&sheet, rect, &config);
        assert_eq!(extracted.rows, vec![vec!["Region", "", "Total"]]);
    }

    #[test]
    fn test_top_left_only_uses_visible_anchor() {
        // 結合範囲の起点がテーブル外にある場合、テーブル内の左上に値を出す
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Merged");
        sheet.add_merge(Rect::new(1, 1, 3, 1));
        let rect = Rect::new(2, 1, 3, 1);

        let config = ConversionConfig {
            merge_policy: MergePolicy::TopLeftOnly,
            ..Default::default()
        };
        let merges = MergeIndex::build(&sheet, Rect::new(1, 1, 3, 1));
        let extracted =
            extract_table(&sheet, &table(rect), &merges, &config, &FootnoteRegistry::new());
        assert_eq!(extracted.rows, vec![vec!["Merged"], vec![""]]);
    }

    #[test]
    fn test_hidden_policies() {
        let mut sheet = Worksheet::new("Sheet1");
        grid(&mut sheet, 3, 2);
        sheet.hide_row(2).hide_col(2);
        let rect = Rect::new(1, 1, 3, 2);

        let skipped = extract(&sheet, rect, &ConversionConfig::default());
        assert_eq!(skipped.rows, vec![vec!["r1c1"], vec!["r3c1"]]);

        let config = ConversionConfig {
            hidden_policy: HiddenPolicy::Blank,
            ..Default::default()
        };
        let blanked = extract(&sheet, rect, &config);
        assert_eq!(
            blanked.rows,
            vec![vec!["r1c1", ""], vec!["", ""], vec!["r3c1", ""]]
        );

        let config = ConversionConfig {
            hidden_policy: HiddenPolicy::Include,
            ..Default::default()
        };
        assert_eq!(extract(&sheet, rect, &config).cell_count(), 6);
    }

    #[test]
    fn test_truncation_keeps_emitted_cells() {
        let mut sheet = Worksheet::new("Sheet1");
        grid(&mut sheet, 2, 3);
        let rect = Rect::new(1, 1, 2, 3);

        let config = ConversionConfig {
            max_cells_per_table: Some(3),
            ..Default::default()
        };
        let extracted = extract(&sheet, rect, &config);
        assert!(extracted.truncated);
        assert_eq!(extracted.cell_count(), 3);
        assert_eq!(extracted.rows, vec![vec!["r1c1", "r1c2", "r1c3"]]);

        let config = ConversionConfig {
            max_cells_per_table: Some(4),
            ..Default::default()
        };
        let extracted = extract(&sheet, rect, &config);
        assert_eq!(extracted.rows[1], vec!["r2c1"]);

        let config = ConversionConfig {
            max_cells_per_table: Some(6),
            ..Default::default()
        };
        assert!(!extract(&sheet, rect, &config).truncated);
    }

    #[test]
    fn test_hyperlink_modes() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Docs").set_hyperlink(1, 1, "https://example.com/docs");
        sheet.set_value(1, 2, "Home").set_hyperlink(1, 2, "https://example.com");
        sheet.set_value(1, 3, "Again").set_hyperlink(1, 3, "https://example.com/docs");
        let rect = Rect::new(1, 1, 1, 3);

        let inline = extract(&sheet, rect, &ConversionConfig::default());
        assert_eq!(inline.rows[0][0], "[Docs](https://example.com/docs)");
        assert!(inline.note_refs.is_empty());

        let config = ConversionConfig {
            hyperlink_mode: HyperlinkMode::Footnote,
            ..Default::default()
        };
        let footnote = extract(&sheet, rect, &config);
        assert_eq!(footnote.rows[0], vec!["Docs[^1]", "Home[^2]", "Again[^1]"]);
        assert_eq!(
            footnote.note_refs,
            vec![
                (1, "https://example.com/docs".to_string()),
                (2, "https://example.com".to_string())
            ]
        );

        let config = ConversionConfig {
            hyperlink_mode: HyperlinkMode::Both,
            ..Default::default()
        };
        let both = extract(&sheet, rect, &config);
        assert_eq!(both.rows[0][1], "[Home](https://example.com)[^2]");
    }

    #[test]
    fn test_footnotes_continue_from_registry() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Old").set_hyperlink(1, 1, "https://old.example");
        sheet.set_value(1, 2, "New").set_hyperlink(1, 2, "https://new.example");
        let rect = Rect::new(1, 1, 1, 2);

        let mut registry = FootnoteRegistry::new();
        registry.extend(&[(1, "https://old.example".to_string())]);

        let config = ConversionConfig {
            hyperlink_mode: HyperlinkMode::Footnote,
            ..Default::default()
        };
        let merges = MergeIndex::build(&sheet, rect);
        let extracted = extract_table(&sheet, &table(rect), &merges, &config, &registry);
        assert_eq!(extracted.rows[0], vec!["Old[^1]", "New[^2]"]);
        assert_eq!(extracted.note_refs, vec![(2, "https://new.example".to_string())]);
    }

    #[test]
    fn test_escaping_and_whitespace() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "  a|b *c*  ");
        let rect = Rect::new(1, 1, 1, 1);

        let extracted = extract(&sheet, rect, &ConversionConfig::default());
        assert_eq!(extracted.rows[0][0], "a\\|b *c*");

        let config = ConversionConfig {
            markdown_escape_level: MarkdownEscapeLevel::Full,
            strip_whitespace: false,
            ..Default::default()
        };
        let extracted = extract(&sheet, rect, &config);
        assert_eq!(extracted.rows[0][0], "  a\\|b \\*c\\*  ");
    }

    #[test]
    fn test_materialized_cell_metadata() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Merged");
        sheet.add_merge(Rect::new(1, 1, 2, 1));
        sheet.hide_row(2);
        let rect = Rect::new(1, 1, 2, 1);

        let config = ConversionConfig::default();
        let merges = MergeIndex::build(&sheet, rect);
        let registry = FootnoteRegistry::new();
        let extractor = Extractor {
            sheet: &sheet,
            table: &table(rect),
            merges: &merges,
            config: &config,
            registry: &registry,
            formatter: CellFormatter::new(&config, false),
            pending: HashMap::new(),
            note_refs: Vec::new(),
        };

        let cell = extractor.materialize(CellCoord::new(2, 1));
        assert!(cell.hidden);
        assert!(cell.merged_member);
        assert_eq!(cell.merge_origin, Some(CellCoord::new(1, 1)));
        assert_eq!(cell.raw, CellValue::String("Merged".to_string()));
        assert_eq!(cell.display, "Merged");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_never_exceeds_cap(rows in 1u32..8, cols in 1u32..8, cap in 1usize..40) {
                let mut sheet = Worksheet::new("Sheet1");
                grid(&mut sheet, rows, cols);
                let rect = Rect::new(1, 1, rows, cols);
                let config = ConversionConfig {
                    max_cells_per_table: Some(cap),
                    ..Default::default()
                };

                let extracted = extract(&sheet, rect, &config);
                let total = (rows * cols) as usize;
                prop_assert!(extracted.cell_count() <= cap);
                prop_assert_eq!(extracted.truncated, total > cap);

                // 打ち切り前に出力したセルは変化しない
                let full = extract(&sheet, rect, &ConversionConfig::default());
                let flat: Vec<&String> = full.rows.iter().flatten().collect();
                let partial: Vec<&String> = extracted.rows.iter().flatten().collect();
                prop_assert_eq!(&flat[..partial.len()], &partial[..]);
            }
        }
    }
}
