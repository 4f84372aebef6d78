//! Markdown Table Renderer
//!
//! 文字列グリッドをMarkdownテーブルに変換します。
//! 列幅は表示幅（全角文字は2）で揃え、最小幅は3文字です。

use lazy_static::lazy_static;
use regex::Regex;
use unicode_width::UnicodeWidthStr;

lazy_static! {
    /// 数値として扱うセル（符号、通貨記号、桁区切り、小数、指数、パーセントを許容）
    static ref NUMERIC: Regex = Regex::new(
        r"^[+-]?[$€£¥]?(?:\d{1,3}(?:[,\s']\d{3})+|\d+)(?:\.\d+)?(?:[eE][+-]?\d+)?%?$"
    )
    .unwrap();
}

/// 列の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Left,
    Right,
}

/// 行グリッドをMarkdownテーブルとして出力する
///
/// 行の長さが揃っていない場合は、最大の列数まで空のセルで埋めます。
///
/// # 引数
///
/// * `rows` - 行ごとのセル文字列
/// * `header_detection` - 先頭行を見出しとして扱うか。`false`の場合は空の見出し行を出力する
/// * `align_detection` - 数値列の右揃えを行うか
/// * `numbers_right_threshold` - 空でないセルのうち数値の比率がこの値以上の列を右揃えにする
///
/// # 戻り値
///
/// 末尾に改行を含まないMarkdownテーブル。行が空の場合は空文字列
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::make_markdown_table;
///
/// let rows = vec![
///     vec!["Name".to_string(), "Qty".to_string()],
///     vec!["Widget".to_string(), "120".to_string()],
/// ];
/// let table = make_markdown_table(&rows, true, true, 0.5);
/// assert_eq!(table, "| Name   | Qty |\n|--------|----:|\n| Widget | 120 |");
/// ```
pub fn make_markdown_table(
    rows: &[Vec<String>],
    header_detection: bool,
    align_detection: bool,
    numbers_right_threshold: f64,
) -> String {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if rows.is_empty() || cols == 0 {
        return String::new();
    }

    // 1. セル内容の正規化と列数の統一
    let mut grid: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(|cell| sanitize_cell(cell)).collect();
            cells.resize(cols, String::new());
            cells
        })
        .collect();
    if !header_detection {
        grid.insert(0, vec![String::new(); cols]);
    }

    // 2. 列の配置（見出し行を除いて判定）
    let alignments: Vec<Alignment> = (0..cols)
        .map(|col| {
            if align_detection && is_numeric_column(&grid[1..], col, numbers_right_threshold) {
                Alignment::Right
            } else {
                Alignment::Left
            }
        })
        .collect();

    // 3. 列幅の計算
    let mut widths = vec![3; cols];
    for row in &grid {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(cell.width());
        }
    }

    // 4. 出力
    let mut lines = Vec::with_capacity(grid.len() + 1);
    for (row_idx, row) in grid.iter().enumerate() {
        lines.push(render_row(row, &widths, &alignments));
        if row_idx == 0 {
            lines.push(render_separator(&widths, &alignments));
        }
    }
    lines.join("\n")
}

fn render_row(row: &[String], widths: &[usize], alignments: &[Alignment]) -> String {
    let mut line = String::from("|");
    for ((cell, &width), alignment) in row.iter().zip(widths).zip(alignments) {
        let padding = " ".repeat(width.saturating_sub(cell.width()));
        line.push(' ');
        match alignment {
            Alignment::Left => {
                line.push_str(cell);
                line.push_str(&padding);
            }
            Alignment::Right => {
                line.push_str(&padding);
                line.push_str(cell);
            }
        }
        line.push_str(" |");
    }
    line
}

fn render_separator(widths: &[usize], alignments: &[Alignment]) -> String {
    let mut line = String::from("|");
    for (&width, alignment) in widths.iter().zip(alignments) {
        // セルの前後のスペース（各1文字）を含めた幅
        match alignment {
            Alignment::Left => line.push_str(&"-".repeat(width + 2)),
            Alignment::Right => {
                line.push_str(&"-".repeat(width + 1));
                line.push(':');
            }
        }
        line.push('|');
    }
    line
}

fn is_numeric_column(body: &[Vec<String>], col: usize, threshold: f64) -> bool {
    let values: Vec<&str> = body
        .iter()
        .map(|row| row[col].as_str())
        .filter(|cell| !cell.is_empty())
        .collect();
    if values.is_empty() {
        return false;
    }
    let numeric = values.iter().filter(|cell| NUMERIC.is_match(cell)).count();
    numeric as f64 / values.len() as f64 >= threshold
}

/// セル内容をテーブルの1セルとして安全な形にする
///
/// エスケープされていない`|`をエスケープし、改行を`<br>`に置き換えます。
fn sanitize_cell(cell: &str) -> String {
    let cell = cell.trim().replace("\r\n", "<br>").replace(['\n', '\r'], "<br>");

    let mut result = String::with_capacity(cell.len());
    let mut backslashes = 0usize;
    for ch in cell.chars() {
        if ch == '|' && backslashes % 2 == 0 {
            result.push('\\');
        }
        backslashes = if ch == '\\' { backslashes + 1 } else { 0 };
        result.push(ch);
    }
    result
}
