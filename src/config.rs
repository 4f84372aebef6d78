//! Configuration Module
//!
//! 変換処理の設定を型付きの構造体として定義するモジュール。
//! すべての項目にデフォルト値があり、JSONで一部の項目のみを上書きできます。
//!
//! ```rust
//! use xlsxmd::{ConversionConfig, HyperlinkMode};
//!
//! let config = ConversionConfig::from_json_str(r#"{
//!     "hyperlink_mode": "footnote",
//!     "mermaid": { "enabled": true, "columns": { "from": "Src", "to": "Dst" } }
//! }"#).unwrap();
//!
//! assert_eq!(config.hyperlink_mode, HyperlinkMode::Footnote);
//! assert_eq!(config.mermaid.columns.from, "Src");
//! assert_eq!(config.max_cells_per_table, Some(200_000));
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{
    CurrencySymbol, FootnoteScope, GroupColumnBehavior, HiddenPolicy, HyperlinkMode,
    MarkdownEscapeLevel, MergePolicy, MermaidDetectMode, MermaidDiagramType, MermaidDirection,
    NoPrintAreaMode, NodeIdPolicy, PercentFormat, SheetSelector,
};
use crate::error::XlsxMdError;

/// 変換処理の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// ドキュメント先頭に出力するタイトル（`None`の場合は出力しない）
    pub title: Option<String>,

    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 印刷範囲が定義されていないシートの扱い
    pub no_print_area_mode: NoPrintAreaMode,

    /// 結合セルの非起点セルの出力方法
    pub merge_policy: MergePolicy,

    /// 非表示行・列の扱い
    pub hidden_policy: HiddenPolicy,

    /// テーブルの先頭行を見出しとして扱うか
    pub header_detection: bool,

    /// 数値列の右揃え判定を行うか
    pub align_detection: bool,

    /// 数値として解釈できるセルの比率がこの値以上の列を右揃えにする（0.0〜1.0）
    pub numbers_right_threshold: f64,

    /// 日付の出力形式（chrono互換）。指定された場合は最優先で使用する
    pub date_format_override: Option<String>,

    /// 日付の既定の出力形式（chrono互換）
    pub date_default_format: String,

    /// Excelの表示文字列を優先するか
    pub prefer_excel_display: bool,

    /// 数値の千の位区切り文字（`None`の場合は区切らない）
    pub numeric_thousand_sep: Option<char>,

    /// パーセント値の出力形式
    pub percent_format: PercentFormat,

    /// パーセント値を記号なしで出力する場合に、100で割った値（元の小数）を出力するか
    pub percent_divide_100: bool,

    /// 通貨記号の扱い
    pub currency_symbol: CurrencySymbol,

    /// ハイパーリンクの出力方法
    pub hyperlink_mode: HyperlinkMode,

    /// 脚注番号のスコープ
    pub footnote_scope: FootnoteScope,

    /// Markdownエスケープのレベル
    pub markdown_escape_level: MarkdownEscapeLevel,

    /// セルの前後の空白を除去するか
    pub strip_whitespace: bool,

    /// 処理するシート数の上限（超過したシートはスキップ）
    pub max_sheet_count: Option<usize>,

    /// 1テーブルあたりのセル数の上限（超過した時点で打ち切り）
    pub max_cells_per_table: Option<usize>,

    /// 複数の印刷範囲をまたいで、テーブルを (開始行, 開始列) の順に並べ替えるか
    ///
    /// 1つの範囲内のテーブルは常にこの順で出力されます。
    pub sort_tables: bool,

    /// Mermaid図の検出・出力設定
    pub mermaid: MermaidConfig,

    /// 図の検出に失敗した場合、入れ子・コード判定を行わずにテーブル出力へ戻すか
    pub dispatch_skip_code_and_mermaid_on_fallback: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            title: None,
            sheet_selector: SheetSelector::All,
            no_print_area_mode: NoPrintAreaMode::UsedRange,
            merge_policy: MergePolicy::Replicate,
            hidden_policy: HiddenPolicy::Skip,
            header_detection: true,
            align_detection: true,
            numbers_right_threshold: 0.8,
            date_format_override: None,
            date_default_format: "%Y-%m-%d".to_string(),
            prefer_excel_display: false,
            numeric_thousand_sep: None,
            percent_format: PercentFormat::Percent,
            percent_divide_100: false,
            currency_symbol: CurrencySymbol::Keep,
            hyperlink_mode: HyperlinkMode::Inline,
            footnote_scope: FootnoteScope::Document,
            markdown_escape_level: MarkdownEscapeLevel::PipesOnly,
            strip_whitespace: true,
            max_sheet_count: None,
            max_cells_per_table: Some(200_000),
            sort_tables: false,
            mermaid: MermaidConfig::default(),
            dispatch_skip_code_and_mermaid_on_fallback: true,
        }
    }
}

impl ConversionConfig {
    /// JSON文字列から設定を読み込む
    ///
    /// 省略された項目はデフォルト値になります。読み込んだ設定は検証されます。
    pub fn from_json_str(json: &str) -> Result<Self, XlsxMdError> {
        let config: ConversionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定を検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 設定が有効な場合
    /// * `Err(XlsxMdError::Config)` - 設定が無効な場合
    pub fn validate(&self) -> Result<(), XlsxMdError> {
        // 1. 比率の範囲
        check_ratio("numbers_right_threshold", self.numbers_right_threshold)?;
        check_ratio(
            "mermaid.heuristic.arrow_ratio",
            self.mermaid.heuristic.arrow_ratio,
        )?;

        // 2. 上限値
        if self.max_cells_per_table == Some(0) {
            return Err(XlsxMdError::Config(
                "max_cells_per_table must be greater than 0".to_string(),
            ));
        }
        if self.max_sheet_count == Some(0) {
            return Err(XlsxMdError::Config(
                "max_sheet_count must be greater than 0".to_string(),
            ));
        }

        // 3. 日付形式
        check_date_format(&self.date_default_format)?;
        if let Some(ref format) = self.date_format_override {
            check_date_format(format)?;
        }

        // 4. Mermaid設定
        self.mermaid.validate()
    }
}

/// Mermaid図の検出・出力設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MermaidConfig {
    /// 図の検出を行うか
    pub enabled: bool,
    /// 検出方式
    pub detect_mode: MermaidDetectMode,
    /// 図の種類
    pub diagram_type: MermaidDiagramType,
    /// 図の方向
    pub direction: MermaidDirection,
    /// 図を出力した場合に元のテーブルも出力するか
    pub keep_source_table: bool,
    /// 同一の (From, To, Label) を持つエッジを1本にまとめるか
    pub dedupe_edges: bool,
    /// ノードIDの割り当て方式
    pub node_id_policy: NodeIdPolicy,
    /// グループ列の出力方法
    pub group_column_behavior: GroupColumnBehavior,
    /// 列見出しの対応付け
    pub columns: MermaidColumns,
    /// ヒューリスティック判定の閾値
    pub heuristic: HeuristicThresholds,
}

impl Default for MermaidConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            detect_mode: MermaidDetectMode::ColumnHeaders,
            diagram_type: MermaidDiagramType::Flowchart,
            direction: MermaidDirection::TD,
            keep_source_table: true,
            dedupe_edges: true,
            node_id_policy: NodeIdPolicy::Auto,
            group_column_behavior: GroupColumnBehavior::Subgraph,
            columns: MermaidColumns::default(),
            heuristic: HeuristicThresholds::default(),
        }
    }
}

impl MermaidConfig {
    fn validate(&self) -> Result<(), XlsxMdError> {
        let columns = &self.columns;
        if columns.from.trim().is_empty() || columns.to.trim().is_empty() {
            return Err(XlsxMdError::Config(
                "mermaid.columns.from and mermaid.columns.to must not be empty".to_string(),
            ));
        }
        if columns.from.trim().eq_ignore_ascii_case(columns.to.trim()) {
            return Err(XlsxMdError::Config(format!(
                "mermaid.columns.from and mermaid.columns.to must differ (both '{}')",
                columns.from
            )));
        }

        let heuristic = &self.heuristic;
        if heuristic.min_rows == 0 {
            return Err(XlsxMdError::Config(
                "mermaid.heuristic.min_rows must be at least 1".to_string(),
            ));
        }
        if !(heuristic.len_median_ratio_min >= 0.0
            && heuristic.len_median_ratio_min <= heuristic.len_median_ratio_max)
        {
            return Err(XlsxMdError::Config(format!(
                "Invalid length ratio band: min ({}) must be >= 0 and <= max ({})",
                heuristic.len_median_ratio_min, heuristic.len_median_ratio_max
            )));
        }
        Ok(())
    }
}

/// 図として扱うテーブルの列見出し名
///
/// 見出しの比較は前後の空白を除き、大文字・小文字を区別しません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MermaidColumns {
    pub from: String,
    pub to: String,
    pub label: String,
    pub group: Option<String>,
    pub note: Option<String>,
}

impl Default for MermaidColumns {
    fn default() -> Self {
        Self {
            from: "From".to_string(),
            to: "To".to_string(),
            label: "Label".to_string(),
            group: None,
            note: None,
        }
    }
}

impl MermaidColumns {
    /// `"From,To,Label[,Group[,Note]]"` 形式の文字列をパース
    ///
    /// 省略された From/To/Label は既定の見出し名になります。
    pub fn parse(headers: &str) -> Self {
        let defaults = Self::default();
        let mut parts = headers.split(',').map(str::trim);
        let mut next_or = |fallback: String| match parts.next() {
            Some(part) if !part.is_empty() => part.to_string(),
            _ => fallback,
        };

        let from = next_or(defaults.from);
        let to = next_or(defaults.to);
        let label = next_or(defaults.label);
        let group = Some(next_or(String::new())).filter(|s| !s.is_empty());
        let note = Some(next_or(String::new())).filter(|s| !s.is_empty());

        Self {
            from,
            to,
            label,
            group,
            note,
        }
    }
}

/// ヒューリスティック判定の閾値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicThresholds {
    /// 判定に必要な最小行数
    pub min_rows: usize,
    /// 矢印を含む行の比率の下限
    pub arrow_ratio: f64,
    /// 行の文字数の (最小値 / 中央値) の下限
    pub len_median_ratio_min: f64,
    /// 行の文字数の (最大値 / 中央値) の上限
    pub len_median_ratio_max: f64,
}

impl Default for HeuristicThresholds {
    fn default() -> Self {
        Self {
            min_rows: 3,
            arrow_ratio: 0.6,
            len_median_ratio_min: 0.3,
            len_median_ratio_max: 3.0,
        }
    }
}

fn check_ratio(name: &str, value: f64) -> Result<(), XlsxMdError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(XlsxMdError::Config(format!(
            "{} must be between 0.0 and 1.0 (got {})",
            name, value
        )))
    }
}

/// テスト用の日付でフォーマットを試行し、書式文字列を検証する
fn check_date_format(format_str: &str) -> Result<(), XlsxMdError> {
    use std::fmt::Write;

    let test_date = NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| XlsxMdError::Config("Failed to create test date".to_string()))?;

    // 不正な指定子はDisplay実装でエラーになる
    let mut formatted = String::new();
    let result = write!(formatted, "{}", test_date.format(format_str));
    if result.is_err() || formatted.is_empty() {
        return Err(XlsxMdError::Config(format!(
            "Invalid date format string: '{}'",
            format_str
        )));
    }
    Ok(())
}
