//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! 座標と矩形はすべて1始まり（Excelの行番号・列番号と同じ）で、境界を含む。

use chrono::{NaiveDate, NaiveDateTime};

/// セルの値を表す列挙型
///
/// 数式は評価済みの値として扱います。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 日付・時刻
    DateTime(NaiveDateTime),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    #[default]
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 値が表示上空白かどうかを判定
    ///
    /// 空セルに加えて、空白文字のみの文字列も空白として扱います。
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 値を文字列として取得（書式適用前）
    pub fn as_raw_string(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::DateTime(dt) => dt.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::DateTime(value.and_time(chrono::NaiveTime::MIN))
    }
}

/// セル座標（1始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (1, 1) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        format!("{}{}", col_index_to_letter(self.col), self.row)
    }

    /// A1形式の文字列をパース（例: "B3" -> (3, 2)）
    ///
    /// 絶対参照の`$`は無視します。列のみ・行のみの参照は`None`を返します。
    pub fn parse_a1(reference: &str) -> Option<Self> {
        let (col, row) = split_a1(reference)?;
        Some(Self::new(row?, col?))
    }
}

/// 列番号をExcel列名に変換（1 -> "A", 26 -> "Z", 27 -> "AA"）
pub(crate) fn col_index_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        let remainder = (n - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// A1形式の参照を列番号と行番号に分解する
///
/// `"$B$3"` -> `(Some(2), Some(3))`、`"C"` -> `(Some(3), None)`、`"7"` -> `(None, Some(7))`
pub(crate) fn split_a1(reference: &str) -> Option<(Option<u32>, Option<u32>)> {
    let reference = reference.trim();
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut has_col = false;
    let mut has_row = false;

    for ch in reference.chars() {
        match ch {
            '$' => {}
            'A'..='Z' | 'a'..='z' if !has_row => {
                has_col = true;
                let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
                col = col.checked_mul(26)?.checked_add(digit)?;
            }
            '0'..='9' => {
                has_row = true;
                row = row.checked_mul(10)?.checked_add(ch as u32 - '0' as u32)?;
            }
            _ => return None,
        }
    }

    if (!has_col && !has_row) || (has_row && row == 0) {
        return None;
    }

    Some((has_col.then_some(col), has_row.then_some(row)))
}

/// 矩形範囲（1始まり、境界を含む）
///
/// 常に `row_start <= row_end` かつ `col_start <= col_end` を満たします。
/// 派生した順序は (行の開始, 列の開始) の順に比較します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rect {
    pub row_start: u32,
    pub col_start: u32,
    pub row_end: u32,
    pub col_end: u32,
}

impl Rect {
    /// 新しい矩形を生成
    ///
    /// 開始と終了が逆転している場合は入れ替えて正規化します。
    pub fn new(row_start: u32, col_start: u32, row_end: u32, col_end: u32) -> Self {
        Self {
            row_start: row_start.min(row_end),
            col_start: col_start.min(col_end),
            row_end: row_start.max(row_end),
            col_end: col_start.max(col_end),
        }
    }

    /// 単一セルの矩形を生成
    pub fn cell(coord: CellCoord) -> Self {
        Self::new(coord.row, coord.col, coord.row, coord.col)
    }

    /// A1形式の範囲をパース（例: "A1:C5", "$A$1", "A:C", "2:4"）
    ///
    /// 列のみ・行のみの参照は、それぞれ`max_row`・`max_col`まで拡張します。
    pub fn parse_a1_range(reference: &str, max_row: u32, max_col: u32) -> Option<Self> {
        let mut parts = reference.split(':');
        let first = split_a1(parts.next()?)?;
        let second = match parts.next() {
            Some(part) => split_a1(part)?,
            None => first,
        };
        if parts.next().is_some() {
            return None;
        }

        let (col_start, col_end) = match (first.0, second.0) {
            (Some(a), Some(b)) => (a, b),
            (None, None) => (1, max_col),
            _ => return None,
        };
        let (row_start, row_end) = match (first.1, second.1) {
            (Some(a), Some(b)) => (a, b),
            (None, None) => (1, max_row),
            _ => return None,
        };

        Some(Self::new(row_start, col_start, row_end, col_end))
    }

    /// 左上の座標
    pub fn origin(&self) -> CellCoord {
        CellCoord::new(self.row_start, self.col_start)
    }

    /// 指定された座標が範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.row_start
            && coord.row <= self.row_end
            && coord.col >= self.col_start
            && coord.col <= self.col_end
    }

    /// 行数
    pub fn height(&self) -> u32 {
        self.row_end - self.row_start + 1
    }

    /// 列数
    pub fn width(&self) -> u32 {
        self.col_end - self.col_start + 1
    }

    /// セル数（行数 × 列数）
    pub fn cell_count(&self) -> u64 {
        self.height() as u64 * self.width() as u64
    }

    /// 2つの矩形の共通部分
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let row_start = self.row_start.max(other.row_start);
        let row_end = self.row_end.min(other.row_end);
        let col_start = self.col_start.max(other.col_start);
        let col_end = self.col_end.min(other.col_end);

        if row_start > row_end || col_start > col_end {
            return None;
        }
        Some(Rect {
            row_start,
            col_start,
            row_end,
            col_end,
        })
    }

    /// 2つの矩形を囲む最小の矩形
    pub fn bounding(&self, other: &Rect) -> Rect {
        Rect {
            row_start: self.row_start.min(other.row_start),
            col_start: self.col_start.min(other.col_start),
            row_end: self.row_end.max(other.row_end),
            col_end: self.col_end.max(other.col_end),
        }
    }

    /// 範囲内の座標を行優先で列挙
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.row_start..=self.row_end)
            .flat_map(move |row| (self.col_start..=self.col_end).map(move |col| CellCoord::new(row, col)))
    }

    /// A1形式の範囲文字列に変換（例: "A1:C5"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let start = self.origin().to_a1_notation();
        let end = CellCoord::new(self.row_end, self.col_end).to_a1_notation();
        if start == end {
            start
        } else {
            format!("{}:{}", start, end)
        }
    }
}

/// 区間 [a_start, a_end] と [b_start, b_end] が重なるかを判定
pub(crate) fn spans_overlap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// 区間が重ならずに隣接しているかを判定
pub(crate) fn spans_adjacent(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_end.checked_add(1) == Some(b_start) || b_end.checked_add(1) == Some(a_start)
}
