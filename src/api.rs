//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。
//! 各列挙型は設定ファイル（JSON）の値として`snake_case`でシリアライズされます。

use serde::{Deserialize, Serialize};

use crate::error::XlsxMdError;

/// 結合セルの非起点セルの出力方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MergePolicy {
    /// 結合範囲内のすべてのセルに起点セル（左上）の値を複製（デフォルト）
    ///
    /// # 出力例
    ///
    /// ```markdown
    /// | Header | Header | Header |
    /// | ------ | ------ | ------ |
    /// | Data1  | Data2  | Data3  |
    /// ```
    #[default]
    Replicate,

    /// 起点セルのみに値を出力し、それ以外のセルは空欄にする
    TopLeftOnly,
}

/// 非表示行・列の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum HiddenPolicy {
    /// 非表示行・列も通常どおり出力する
    Include,

    /// 非表示行・列を出力から除外する（デフォルト）
    ///
    /// テーブル分割の空白判定においても、非表示行・列は存在しないものとして扱います。
    #[default]
    Skip,

    /// 非表示行・列を常に空欄として扱う
    ///
    /// テーブル分割では空白の区切り行・列として扱われます。
    Blank,
}

/// ハイパーリンクの出力方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum HyperlinkMode {
    /// `[text](url)` 形式でセル内に出力（デフォルト）
    #[default]
    Inline,

    /// `text[^n]` 形式の脚注参照として出力し、URLは脚注定義に出力
    Footnote,

    /// インラインリンクと脚注参照の両方を出力
    Both,
}

impl HyperlinkMode {
    /// 脚注定義を出力するモードかどうか
    pub fn emits_footnotes(&self) -> bool {
        matches!(self, HyperlinkMode::Footnote | HyperlinkMode::Both)
    }
}

/// 脚注番号のスコープ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FootnoteScope {
    /// シートごとに番号を1から振り直す
    Sheet,

    /// ドキュメント全体で通し番号を振る（デフォルト）
    #[default]
    #[serde(alias = "book")]
    Document,
}

/// Markdownエスケープのレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MarkdownEscapeLevel {
    /// エスケープしない
    None,

    /// パイプ（`|`）のみエスケープ（デフォルト）
    #[default]
    PipesOnly,

    /// Markdownの特殊文字をすべてエスケープ
    Full,
}

/// パーセント値の出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PercentFormat {
    /// `25%` のように百分率と記号で出力（デフォルト）
    #[default]
    Percent,

    /// 記号なしの数値で出力
    ///
    /// `percent_divide_100` が有効な場合は `0.25`、無効な場合は `25` を出力します。
    Numeric,
}

/// 通貨記号の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum CurrencySymbol {
    /// 書式に従って記号を前置・後置する（デフォルト）
    #[default]
    Keep,

    /// 記号を除去して数値のみ出力する
    Strip,
}

/// 印刷範囲が定義されていないシートの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum NoPrintAreaMode {
    /// 使用範囲全体を対象にする（デフォルト）
    #[default]
    UsedRange,

    /// シートを出力対象外にする
    Skip,
}

/// Mermaid図の検出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MermaidDetectMode {
    /// シート上の図形（シェイプとコネクタ）から図を生成する
    Shapes,

    /// 設定された列見出し（From/To/Label...）に一致するテーブルを図にする（デフォルト）
    #[default]
    ColumnHeaders,

    /// 矢印を含む行の比率などからテーブルを図と判定する
    Heuristic,
}

/// Mermaid図の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MermaidDiagramType {
    /// `flowchart` 記法（デフォルト）
    #[default]
    Flowchart,

    /// 旧来の `graph` 記法
    Graph,
}

impl MermaidDiagramType {
    /// Mermaidのキーワード
    pub const fn as_str(self) -> &'static str {
        match self {
            MermaidDiagramType::Flowchart => "flowchart",
            MermaidDiagramType::Graph => "graph",
        }
    }
}

/// Mermaid図の方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[non_exhaustive]
pub enum MermaidDirection {
    /// 上から下（デフォルト）
    #[default]
    TD,
    /// 上から下（TDの別名）
    TB,
    /// 左から右
    LR,
    /// 右から左
    RL,
    /// 下から上
    BT,
}

impl MermaidDirection {
    /// Mermaidの方向キーワード
    pub const fn as_str(self) -> &'static str {
        match self {
            MermaidDirection::TD => "TD",
            MermaidDirection::TB => "TB",
            MermaidDirection::LR => "LR",
            MermaidDirection::RL => "RL",
            MermaidDirection::BT => "BT",
        }
    }
}

/// ノードIDの割り当て方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum NodeIdPolicy {
    /// ノードのテキストからIDを生成する（デフォルト）
    ///
    /// ASCII英数字以外は`_`に置換し、衝突した場合は連番の接尾辞を付けます。
    #[default]
    Auto,

    /// 出現順に `n1`, `n2`, ... を割り当てる
    Sequential,
}

/// グループ列の出力方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum GroupColumnBehavior {
    /// グループ値ごとに `subgraph` を出力する（デフォルト）
    #[default]
    Subgraph,

    /// グループ値をエッジラベルに含める
    EdgeLabel,
}

/// シート選択方式
///
/// 変換対象のシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートを変換（デフォルト）
    #[default]
    All,

    /// インデックス指定（0始まり）
    Index(usize),

    /// シート名指定
    Name(String),

    /// 複数のインデックス指定
    Indices(Vec<usize>),

    /// 複数のシート名指定
    Names(Vec<String>),
}

impl SheetSelector {
    /// シート名の一覧から、選択されたシートのインデックスを返す
    ///
    /// # 引数
    ///
    /// * `sheet_names` - ワークブック内のすべてのシート名（順序どおり）
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<usize>)` - 選択されたシートのインデックス
    /// * `Err(XlsxMdError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select(&self, sheet_names: &[String]) -> Result<Vec<usize>, XlsxMdError> {
        let by_index = |index: usize| {
            if index < sheet_names.len() {
                Ok(index)
            } else {
                Err(XlsxMdError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    sheet_names.len()
                )))
            }
        };
        let by_name = |name: &String| {
            sheet_names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| XlsxMdError::Config(format!("Sheet '{}' not found", name)))
        };

        match self {
            SheetSelector::All => Ok((0..sheet_names.len()).collect()),
            SheetSelector::Index(index) => Ok(vec![by_index(*index)?]),
            SheetSelector::Name(name) => Ok(vec![by_name(name)?]),
            SheetSelector::Indices(indices) => indices.iter().map(|&i| by_index(i)).collect(),
            SheetSelector::Names(names) => names.iter().map(by_name).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["Summary".to_string(), "Data".to_string(), "Flow".to_string()]
    }

    #[test]
    fn test_sheet_selector_all() {
        assert_eq!(SheetSelector::All.select(&names()).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_sheet_selector_by_name_and_index() {
        assert_eq!(
            SheetSelector::Name("Flow".to_string())
                .select(&names())
                .unwrap(),
            vec![2]
        );
        assert_eq!(SheetSelector::Index(1).select(&names()).unwrap(), vec![1]);
        assert_eq!(
            SheetSelector::Indices(vec![2, 0]).select(&names()).unwrap(),
            vec![2, 0]
        );
    }

    #[test]
    fn test_sheet_selector_errors() {
        match SheetSelector::Index(3).select(&names()) {
            Err(XlsxMdError::Config(msg)) => assert!(msg.contains("out of range")),
            _ => panic!("Expected Config error"),
        }
        match SheetSelector::Names(vec!["Missing".to_string()]).select(&names()) {
            Err(XlsxMdError::Config(msg)) => assert!(msg.contains("not found")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_enum_serde_names() {
        let policy: HiddenPolicy = serde_json::from_str("\"blank\"").unwrap();
        assert_eq!(policy, HiddenPolicy::Blank);

        let scope: FootnoteScope = serde_json::from_str("\"book\"").unwrap();
        assert_eq!(scope, FootnoteScope::Document);

        let direction: MermaidDirection = serde_json::from_str("\"LR\"").unwrap();
        assert_eq!(direction, MermaidDirection::LR);

        assert_eq!(
            serde_json::to_string(&MarkdownEscapeLevel::PipesOnly).unwrap(),
            "\"pipes_only\""
        );
    }

    #[test]
    fn test_hyperlink_mode_emits_footnotes() {
        assert!(!HyperlinkMode::Inline.emits_footnotes());
        assert!(HyperlinkMode::Footnote.emits_footnotes());
        assert!(HyperlinkMode::Both.emits_footnotes());
    }
}
