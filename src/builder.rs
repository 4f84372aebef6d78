//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。
//! `Converter`はシートごとに印刷範囲の取得、テーブル分割、抽出、出力形式の判定を行い、
//! 結果を`Document`として組み立てます。

use std::borrow::Cow;
use std::io::{BufWriter, Read, Seek, Write};

use crate::api::{
    CurrencySymbol, FootnoteScope, HiddenPolicy, HyperlinkMode, MarkdownEscapeLevel,
    MergePolicy, MermaidDetectMode, NoPrintAreaMode, PercentFormat, SheetSelector,
};
use crate::config::{ConversionConfig, MermaidConfig};
use crate::dispatch::{dispatch_table_output, RenderDecision};
use crate::error::XlsxMdError;
use crate::extract::extract_table;
use crate::footnote::FootnoteRegistry;
use crate::merge::MergeIndex;
use crate::mermaid::shapes_to_diagram;
use crate::parser::XlsxLoader;
use crate::region::{print_areas, union_rects};
use crate::segment::{segment_tables, LogicalTable};
use crate::sheet::{Workbook, Worksheet};

/// 範囲・シートの区切り
const SEPARATOR: &str = "---";

/// 出力対象がないシートの注記
const NO_TABLES_NOTE: &str = "_(no tables)_";

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::{ConverterBuilder, HyperlinkMode, SheetSelector};
///
/// # fn main() -> Result<(), xlsxmd::XlsxMdError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .with_hyperlink_mode(HyperlinkMode::Footnote)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: すべてのシート
    /// - 結合セル: 起点セルの値を複製
    /// - 非表示行・列: スキップ
    /// - 日付形式: `%Y-%m-%d`
    /// - ハイパーリンク: インライン
    /// - 1テーブルあたりのセル数の上限: 200,000
    /// - Mermaid図の検出: 無効
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の設定からビルダーを生成する
    pub fn from_config(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// JSON形式の設定からビルダーを生成する
    ///
    /// 省略された項目はデフォルト値になります。
    ///
    /// ```rust
    /// use xlsxmd::ConverterBuilder;
    ///
    /// let converter = ConverterBuilder::from_json_str(r#"{ "sort_tables": true }"#)
    ///     .unwrap()
    ///     .build()
    ///     .unwrap();
    /// assert!(converter.config().sort_tables);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, XlsxMdError> {
        Ok(Self::from_config(ConversionConfig::from_json_str(json)?))
    }

    /// ドキュメント先頭のタイトルを指定する
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// 変換対象のシートを選択する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxmd::{ConverterBuilder, SheetSelector};
    ///
    /// // 単一シートを名前で指定
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("Sheet1".to_string()));
    ///
    /// // 複数シートを指定
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Indices(vec![0, 2, 4]));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 印刷範囲が定義されていないシートの扱いを指定する
    pub fn with_no_print_area_mode(mut self, mode: NoPrintAreaMode) -> Self {
        self.config.no_print_area_mode = mode;
        self
    }

    /// 結合セルの出力方法を指定する
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.config.merge_policy = policy;
        self
    }

    /// 非表示行・列の扱いを指定する
    pub fn with_hidden_policy(mut self, policy: HiddenPolicy) -> Self {
        self.config.hidden_policy = policy;
        self
    }

    /// 先頭行を見出しとして扱うかを指定する
    pub fn with_header_detection(mut self, enabled: bool) -> Self {
        self.config.header_detection = enabled;
        self
    }

    /// 数値列の右揃え判定を行うかを指定する
    pub fn with_align_detection(mut self, enabled: bool) -> Self {
        self.config.align_detection = enabled;
        self
    }

    /// 数値列と判定する比率の閾値を指定する（0.0〜1.0）
    pub fn with_numbers_right_threshold(mut self, threshold: f64) -> Self {
        self.config.numbers_right_threshold = threshold;
        self
    }

    /// すべての日付に適用する出力形式を指定する（chrono互換）
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxmd::ConverterBuilder;
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_date_format_override("%Y年%m月%d日");
    /// ```
    pub fn with_date_format_override(mut self, format: impl Into<String>) -> Self {
        self.config.date_format_override = Some(format.into());
        self
    }

    /// 日付の既定の出力形式を指定する（chrono互換）
    pub fn with_date_default_format(mut self, format: impl Into<String>) -> Self {
        self.config.date_default_format = format.into();
        self
    }

    /// Excelの表示文字列を優先するかを指定する
    pub fn with_prefer_excel_display(mut self, enabled: bool) -> Self {
        self.config.prefer_excel_display = enabled;
        self
    }

    /// 数値の千の位区切り文字を指定する
    pub fn with_numeric_thousand_sep(mut self, separator: Option<char>) -> Self {
        self.config.numeric_thousand_sep = separator;
        self
    }

    /// パーセント値の出力形式を指定する
    pub fn with_percent_format(mut self, format: PercentFormat, divide_100: bool) -> Self {
        self.config.percent_format = format;
        self.config.percent_divide_100 = divide_100;
        self
    }

    /// 通貨記号の扱いを指定する
    pub fn with_currency_symbol(mut self, symbol: CurrencySymbol) -> Self {
        self.config.currency_symbol = symbol;
        self
    }

    /// ハイパーリンクの出力方法を指定する
    pub fn with_hyperlink_mode(mut self, mode: HyperlinkMode) -> Self {
        self.config.hyperlink_mode = mode;
        self
    }

    /// 脚注番号のスコープを指定する
    pub fn with_footnote_scope(mut self, scope: FootnoteScope) -> Self {
        self.config.footnote_scope = scope;
        self
    }

    /// Markdownエスケープのレベルを指定する
    pub fn with_markdown_escape_level(mut self, level: MarkdownEscapeLevel) -> Self {
        self.config.markdown_escape_level = level;
        self
    }

    /// セルの前後の空白を除去するかを指定する
    pub fn with_strip_whitespace(mut self, enabled: bool) -> Self {
        self.config.strip_whitespace = enabled;
        self
    }

    /// 処理するシート数の上限を指定する
    pub fn with_max_sheet_count(mut self, max: Option<usize>) -> Self {
        self.config.max_sheet_count = max;
        self
    }

    /// 1テーブルあたりのセル数の上限を指定する
    pub fn with_max_cells_per_table(mut self, max: Option<usize>) -> Self {
        self.config.max_cells_per_table = max;
        self
    }

    /// テーブルを位置順に並べ替えるかを指定する
    pub fn with_sort_tables(mut self, enabled: bool) -> Self {
        self.config.sort_tables = enabled;
        self
    }

    /// Mermaid図の検出・出力設定を指定する
    pub fn with_mermaid(mut self, mermaid: MermaidConfig) -> Self {
        self.config.mermaid = mermaid;
        self
    }

    /// 図の検出に失敗した場合に、直接テーブル出力へ戻すかを指定する
    pub fn with_dispatch_fallback(mut self, skip_code_and_nested: bool) -> Self {
        self.config.dispatch_skip_code_and_mermaid_on_fallback = skip_code_and_nested;
        self
    }

    /// 設定を検証し、`Converter`を構築する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)` - 設定が有効な場合
    /// * `Err(XlsxMdError::Config)` - 設定が無効な場合
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxmd::ConverterBuilder;
    ///
    /// assert!(ConverterBuilder::new().build().is_ok());
    /// assert!(ConverterBuilder::new().with_max_cells_per_table(Some(0)).build().is_err());
    /// ```
    pub fn build(self) -> Result<Converter, XlsxMdError> {
        self.config.validate()?;
        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// ExcelファイルをMarkdown形式に変換するためのメインエントリーポイントです。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxmd::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), xlsxmd::XlsxMdError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("example.xlsx")?;
/// let mut output = Vec::new();
/// converter.convert(input, &mut output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// 変換設定
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// ExcelファイルをMarkdown形式に変換
    ///
    /// # 引数
    ///
    /// * `input` - Excelファイルを読み込むためのリーダー
    /// * `output` - Markdown出力先のライター
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 変換に成功した場合（一部のシートの読み込みに失敗した場合を含む）
    /// * `Err(XlsxMdError)` - ファイルを開けない、またはシート選択が無効な場合
    ///
    /// # 処理フロー
    ///
    /// 1. XlsxLoaderの初期化
    /// 2. シート選択
    /// 3. 各シートについて処理（ループ）
    ///    - シートの読み込み（失敗した場合は注記を出力して次のシートへ）
    ///    - 印刷範囲の取得と統合
    ///    - テーブル分割、抽出、出力形式の判定
    /// 4. 出力バッファをフラッシュ
    pub fn convert<R: Read + Seek, W: Write>(&self, input: R, output: W) -> Result<(), XlsxMdError> {
        // 1. XlsxLoaderの初期化
        let mut loader = XlsxLoader::open(input)?;
        let sheet_names = loader.sheet_names();

        // 2-3. シートごとの変換
        let document = self.assemble(&sheet_names, |index| {
            loader.load_sheet(&sheet_names[index]).map(Cow::Owned)
        })?;

        // 4. 出力
        let mut writer = BufWriter::new(output);
        writer.write_all(document.to_markdown().as_bytes())?;
        writer.flush()?;

        Ok(())
    }

    /// ExcelファイルをMarkdown形式の文字列に変換
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use xlsxmd::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), xlsxmd::XlsxMdError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let input = File::open("example.xlsx")?;
    /// let markdown = converter.convert_to_string(input)?;
    /// println!("{}", markdown);
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert_to_string<R: Read + Seek>(&self, input: R) -> Result<String, XlsxMdError> {
        let mut buffer = Vec::new();
        self.convert(input, &mut buffer)?;

        let result = String::from_utf8(buffer).map_err(|e| {
            XlsxMdError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        Ok(result)
    }

    /// 読み込み済みのワークブックを変換する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Document)` - 変換結果
    /// * `Err(XlsxMdError::Config)` - シート選択が無効な場合
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxmd::{ConverterBuilder, Workbook, Worksheet};
    ///
    /// let mut sheet = Worksheet::new("Sales");
    /// sheet.set_value(1, 1, "Name").set_value(1, 2, "Qty");
    /// sheet.set_value(2, 1, "Widget").set_value(2, 2, 120.0);
    /// let mut workbook = Workbook::new();
    /// workbook.add_sheet(sheet);
    ///
    /// let converter = ConverterBuilder::new().build().unwrap();
    /// let document = converter.convert_workbook(&workbook).unwrap();
    /// assert!(document.to_markdown().contains("| Widget | 120 |"));
    /// ```
    pub fn convert_workbook(&self, workbook: &Workbook) -> Result<Document, XlsxMdError> {
        let sheets = workbook.sheets();
        self.assemble(&workbook.sheet_names(), |index| Ok(Cow::Borrowed(&sheets[index])))
    }

    /// 選択されたシートを順に変換し、ドキュメントを組み立てる
    fn assemble<'a, F>(&self, sheet_names: &[String], mut load: F) -> Result<Document, XlsxMdError>
    where
        F: FnMut(usize) -> Result<Cow<'a, Worksheet>, XlsxMdError>,
    {
        let selected = self.config.sheet_selector.select(sheet_names)?;
        let limit = self.config.max_sheet_count.unwrap_or(usize::MAX);
        let mut registry = FootnoteRegistry::new();
        let mut sections = Vec::with_capacity(selected.len());

        for (position, index) in selected.into_iter().enumerate() {
            let name = &sheet_names[index];

            // シート数の上限
            if position >= limit {
                tracing::warn!(sheet = %name, limit, "Sheet skipped: max_sheet_count reached");
                sections.push(SheetSection {
                    name: name.clone(),
                    blocks: vec![format!(
                        "_(skipped: sheet limit of {} reached)_",
                        limit
                    )],
                });
                continue;
            }

            // シート単位のエラーは注記にして次のシートへ進む
            let section = match load(index) {
                Ok(sheet) => self.render_sheet(&sheet, &mut registry),
                Err(e) => {
                    tracing::warn!(sheet = %name, error = %e, "Failed to convert sheet");
                    SheetSection {
                        name: name.clone(),
                        blocks: vec![format!("_(failed to load sheet: {})_", e)],
                    }
                }
            };
            sections.push(section);
        }

        let footnotes = (self.config.hyperlink_mode.emits_footnotes()
            && self.config.footnote_scope == FootnoteScope::Document
            && !registry.is_empty())
        .then(|| registry.render());

        Ok(Document {
            title: self.config.title.clone(),
            sheets: sections,
            footnotes,
        })
    }

    /// 1シートを変換する
    fn render_sheet(&self, sheet: &Worksheet, document_registry: &mut FootnoteRegistry) -> SheetSection {
        let config = &self.config;
        let mut blocks = Vec::new();

        if sheet.is_protected() {
            tracing::info!(
                "Sheet '{}' is protected (read-only); proceeding with read-only extraction.",
                sheet.name()
            );
        }

        // 脚注のスコープ（シート単位の場合はシートごとにレジストリを作り直す）
        let mut sheet_registry = FootnoteRegistry::new();
        let registry = match config.footnote_scope {
            FootnoteScope::Sheet => &mut sheet_registry,
            _ => document_registry,
        };

        // 1. 図形から生成した図
        if config.mermaid.enabled && config.mermaid.detect_mode == MermaidDetectMode::Shapes {
            if let Some(diagram) = shapes_to_diagram(sheet.shapes(), &config.mermaid) {
                blocks.push(diagram.to_mermaid());
                blocks.push(SEPARATOR.to_string());
            }
        }

        // 2. 印刷範囲
        let areas = union_rects(&print_areas(sheet, config.no_print_area_mode));
        if areas.is_empty() {
            blocks.push(NO_TABLES_NOTE.to_string());
        }

        // 3. 範囲ごとのテーブル
        let indexes: Vec<MergeIndex> = areas
            .iter()
            .map(|area| MergeIndex::build(sheet, *area))
            .collect();
        let mut groups: Vec<Vec<(usize, LogicalTable)>> = areas
            .iter()
            .zip(&indexes)
            .enumerate()
            .map(|(i, (area, merges))| {
                segment_tables(sheet, *area, merges, config)
                    .into_iter()
                    .map(|table| (i, table))
                    .collect()
            })
            .collect();
        if config.sort_tables && groups.len() > 1 {
            // 印刷範囲をまたいで位置順に並べる
            let mut all: Vec<(usize, LogicalTable)> = groups.into_iter().flatten().collect();
            all.sort_by_key(|(_, table)| (table.rect.row_start, table.rect.col_start));
            groups = vec![all];
        }

        let mut table_number = 0;
        for group in groups {
            for (area_index, table) in group {
                let merges = &indexes[area_index];
                let extracted = extract_table(sheet, &table, merges, config, registry);
                let decision = dispatch_table_output(&extracted, config);
                if decision == RenderDecision::Empty {
                    continue;
                }
                registry.extend(&extracted.note_refs);

                table_number += 1;
                let heading = match &extracted.title {
                    Some(title) => format!("### {}", title),
                    None => format!("### Table {}", table_number),
                };
                blocks.push(heading);
                blocks.extend(decision.fragments());

                if extracted.truncated && decision.has_table() {
                    blocks.push(format!(
                        "_(truncated: table exceeds {} cells)_",
                        config.max_cells_per_table.unwrap_or_default()
                    ));
                }
            }
            blocks.push(SEPARATOR.to_string());
        }

        // 4. シート単位の脚注
        if config.hyperlink_mode.emits_footnotes() && !sheet_registry.is_empty() {
            blocks.push(sheet_registry.render());
        }

        SheetSection {
            name: sheet.name().to_string(),
            blocks,
        }
    }
}

/// 1シート分の変換結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSection {
    /// シート名
    pub name: String,
    /// 出力する断片（見出し、テーブル、図、注記、区切り）
    pub blocks: Vec<String>,
}

/// 変換結果のドキュメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// ドキュメントのタイトル
    pub title: Option<String>,
    /// シートごとの変換結果（選択順）
    pub sheets: Vec<SheetSection>,
    /// ドキュメント単位の脚注定義
    pub footnotes: Option<String>,
}

impl Document {
    /// Markdownとして出力する
    ///
    /// タイトルがある場合は、その直後にシート数とシート名の一覧を出力します。
    pub fn to_markdown(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(title) = &self.title {
            parts.push(format!("# {}", title));
            let names: Vec<&str> = self.sheets.iter().map(|s| s.name.as_str()).collect();
            parts.push(format!(
                "- Sheets: {}\n- Sheet names: {}",
                names.len(),
                names.join(", ")
            ));
        }

        for section in &self.sheets {
            parts.push(format!("## {}", section.name));
            parts.extend(section.blocks.iter().cloned());
        }

        if let Some(footnotes) = &self.footnotes {
            parts.push(footnotes.clone());
        }

        let mut markdown = parts.join("\n\n");
        markdown.push('\n');
        markdown
    }
}
