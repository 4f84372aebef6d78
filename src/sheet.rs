//! Sheet Model Module
//!
//! 読み込み済みのワークブックをメモリ上で表現するモジュール。
//! XLSXローダーが生成するほか、呼び出し側が直接構築して変換処理に渡すこともできます。
//!
//! ```rust
//! use xlsxmd::{Rect, Workbook, Worksheet};
//!
//! let mut sheet = Worksheet::new("Sales");
//! sheet.set_value(1, 1, "Name");
//! sheet.set_value(1, 2, "Qty");
//! sheet.set_value(2, 1, "Widget");
//! sheet.set_value(2, 2, 120.0);
//! sheet.add_merge(Rect::new(3, 1, 3, 2));
//!
//! let mut workbook = Workbook::new();
//! workbook.add_sheet(sheet);
//! assert_eq!(workbook.sheet_names(), vec!["Sales".to_string()]);
//! ```

use std::collections::{BTreeSet, HashMap};

use crate::types::{CellCoord, CellValue, Rect};

/// シート上の1セル分のデータ
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetCell {
    /// 評価済みの値
    pub value: CellValue,
    /// Excelが表示する文字列（書式適用後）
    pub display: Option<String>,
    /// 数値書式コード（例: `"#,##0.00"`）
    pub number_format: Option<String>,
    /// ハイパーリンクのリンク先
    pub hyperlink: Option<String>,
}

impl SheetCell {
    /// 値のみを持つセルを生成
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }
}

/// シート上の図形
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// テキストを持つ図形（ノード）
    Node {
        /// 図形ID（描画パート内で一意）
        id: String,
        /// 図形内のテキスト
        text: String,
    },
    /// 2つの図形を結ぶコネクタ（エッジ）
    Connector {
        /// 図形ID
        id: String,
        /// 始点側の図形ID
        from: Option<String>,
        /// 終点側の図形ID
        to: Option<String>,
        /// コネクタ上のテキスト
        label: Option<String>,
    },
}

/// 1シート分のデータ
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    name: String,
    cells: HashMap<CellCoord, SheetCell>,
    merges: Vec<Rect>,
    hidden_rows: BTreeSet<u32>,
    hidden_cols: BTreeSet<u32>,
    print_areas: Vec<Rect>,
    protected: bool,
    shapes: Vec<Shape>,
    date1904: bool,
}

impl Worksheet {
    /// 空のシートを生成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// シート名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// セルの値を設定（1始まりの行・列）
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> &mut Self {
        self.cells
            .entry(CellCoord::new(row, col))
            .or_default()
            .value = value.into();
        self
    }

    /// セル全体を設定
    pub fn set_cell(&mut self, row: u32, col: u32, cell: SheetCell) -> &mut Self {
        self.cells.insert(CellCoord::new(row, col), cell);
        self
    }

    /// Excelの表示文字列を設定
    pub fn set_display(&mut self, row: u32, col: u32, display: impl Into<String>) -> &mut Self {
        self.cells
            .entry(CellCoord::new(row, col))
            .or_default()
            .display = Some(display.into());
        self
    }

    /// 数値書式コードを設定
    pub fn set_number_format(&mut self, row: u32, col: u32, code: impl Into<String>) -> &mut Self {
        self.cells
            .entry(CellCoord::new(row, col))
            .or_default()
            .number_format = Some(code.into());
        self
    }

    /// ハイパーリンクを設定
    pub fn set_hyperlink(&mut self, row: u32, col: u32, target: impl Into<String>) -> &mut Self {
        self.cells
            .entry(CellCoord::new(row, col))
            .or_default()
            .hyperlink = Some(target.into());
        self
    }

    /// 結合範囲を追加
    pub fn add_merge(&mut self, rect: Rect) -> &mut Self {
        self.merges.push(rect);
        self
    }

    /// 行を非表示にする
    pub fn hide_row(&mut self, row: u32) -> &mut Self {
        self.hidden_rows.insert(row);
        self
    }

    /// 列を非表示にする
    pub fn hide_col(&mut self, col: u32) -> &mut Self {
        self.hidden_cols.insert(col);
        self
    }

    /// 印刷範囲を追加
    pub fn add_print_area(&mut self, rect: Rect) -> &mut Self {
        self.print_areas.push(rect);
        self
    }

    /// シート保護の有無を設定
    pub fn set_protected(&mut self, protected: bool) -> &mut Self {
        self.protected = protected;
        self
    }

    /// 1904年エポックを使用するかを設定
    pub fn set_date1904(&mut self, date1904: bool) -> &mut Self {
        self.date1904 = date1904;
        self
    }

    /// 図形を追加
    pub fn add_shape(&mut self, shape: Shape) -> &mut Self {
        self.shapes.push(shape);
        self
    }

    /// 指定座標のセル
    pub fn cell(&self, coord: CellCoord) -> Option<&SheetCell> {
        self.cells.get(&coord)
    }

    /// 指定座標の値（セルが存在しない場合は`Empty`）
    pub fn value(&self, coord: CellCoord) -> &CellValue {
        const EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&coord).map(|c| &c.value).unwrap_or(&EMPTY)
    }

    /// 値を持つセルの座標と内容を列挙（順序は不定）
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, &SheetCell)> {
        self.cells.iter().map(|(coord, cell)| (*coord, cell))
    }

    /// 結合範囲の宣言
    pub fn merges(&self) -> &[Rect] {
        &self.merges
    }

    /// 行が非表示かどうか
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.hidden_rows.contains(&row)
    }

    /// 列が非表示かどうか
    pub fn is_col_hidden(&self, col: u32) -> bool {
        self.hidden_cols.contains(&col)
    }

    /// 宣言された印刷範囲
    pub fn print_areas(&self) -> &[Rect] {
        &self.print_areas
    }

    /// シートが保護されているか
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// シート上の図形
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// シリアル値の解釈に1904年エポックを使用するか
    pub fn is_date1904(&self) -> bool {
        self.date1904
    }

    /// 使用範囲（空白でない値を持つセルと結合範囲を囲む最小の矩形）
    pub fn used_range(&self) -> Option<Rect> {
        let content = self
            .cells
            .iter()
            .filter(|(_, cell)| !cell.value.is_blank())
            .map(|(coord, _)| Rect::cell(*coord));

        content
            .chain(self.merges.iter().copied())
            .reduce(|acc, rect| acc.bounding(&rect))
    }
}

/// ワークブック（シートの順序付きリスト）
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    /// 空のワークブックを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// シートを末尾に追加
    pub fn add_sheet(&mut self, sheet: Worksheet) -> &mut Self {
        self.sheets.push(sheet);
        self
    }

    /// すべてのシート
    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// シート名の一覧
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}
