//! Output Dispatch Module
//!
//! 抽出済みテーブルごとに出力形式（テーブル、入れ子のリスト、コードブロック、図）を決定するモジュール。

use crate::config::ConversionConfig;
use crate::extract::ExtractedTable;
use crate::mermaid::{detect_diagram, Detection, FlowDiagram};
use crate::output::{make_markdown_table, render_code, render_nested};

/// 出力形式の決定結果
#[derive(Debug, Clone, PartialEq)]
pub enum RenderDecision {
    /// 内容なし
    Empty,
    /// Markdownテーブル
    Table(String),
    /// 入れ子のリスト
    Nested(String),
    /// コードブロック
    Code(String),
    /// 図（`source_table`は元のテーブルを併せて出力する場合のMarkdownテーブル）
    Diagram {
        diagram: FlowDiagram,
        source_table: Option<String>,
    },
}

impl RenderDecision {
    /// 出力する断片（図と元のテーブルの両方がある場合は図が先）
    pub fn fragments(&self) -> Vec<String> {
        match self {
            RenderDecision::Empty => Vec::new(),
            RenderDecision::Table(text)
            | RenderDecision::Nested(text)
            | RenderDecision::Code(text) => vec![text.clone()],
            RenderDecision::Diagram {
                diagram,
                source_table,
            } => std::iter::once(diagram.to_mermaid())
                .chain(source_table.iter().cloned())
                .collect(),
        }
    }

    /// 断片を空行で連結したMarkdown
    pub fn to_markdown(&self) -> String {
        self.fragments().join("\n\n")
    }

    /// Markdownテーブルを出力に含むか
    pub fn has_table(&self) -> bool {
        matches!(
            self,
            RenderDecision::Table(_)
                | RenderDecision::Diagram {
                    source_table: Some(_),
                    ..
                }
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            RenderDecision::Empty => "empty",
            RenderDecision::Table(_) => "table",
            RenderDecision::Nested(_) => "nested",
            RenderDecision::Code(_) => "code",
            RenderDecision::Diagram { .. } => "diagram",
        }
    }
}

/// 抽出済みテーブルの出力形式を決定する
///
/// 判定の順序:
/// 1. 内容がなければ`Empty`
/// 2. 図の検出が有効で、図と判定されれば`Diagram`
/// 3. 入れ子構造を持てば`Nested`
/// 4. ソースコードらしければ`Code`
/// 5. それ以外は`Table`
///
/// 図の変換に失敗し、`dispatch_skip_code_and_mermaid_on_fallback`が有効な場合は、
/// 3と4を行わずに`Table`にします。
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::{dispatch_table_output, ConversionConfig, ExtractedTable, RenderDecision};
///
/// let table = ExtractedTable {
///     rows: vec![vec!["Name".to_string()], vec!["Widget".to_string()]],
///     ..Default::default()
/// };
/// let decision = dispatch_table_output(&table, &ConversionConfig::default());
/// assert!(matches!(decision, RenderDecision::Table(_)));
/// ```
pub fn dispatch_table_output(table: &ExtractedTable, config: &ConversionConfig) -> RenderDecision {
    let decision = decide(table, config);
    tracing::debug!(
        rows = table.rows.len(),
        decision = decision.kind(),
        "Selected table rendering"
    );
    decision
}

fn decide(table: &ExtractedTable, config: &ConversionConfig) -> RenderDecision {
    // 1. 空
    if table.is_empty() {
        return RenderDecision::Empty;
    }
    let render_table = || {
        make_markdown_table(
            &table.rows,
            config.header_detection,
            config.align_detection,
            config.numbers_right_threshold,
        )
    };

    // 2. 図
    if config.mermaid.enabled {
        match detect_diagram(&table.rows, &config.mermaid) {
            Detection::Diagram(diagram) => {
                return RenderDecision::Diagram {
                    diagram,
                    source_table: config.mermaid.keep_source_table.then(render_table),
                };
            }
            Detection::Failed(reason) => {
                tracing::warn!(reason = %reason, "Diagram detection failed; rendering as table");
                if config.dispatch_skip_code_and_mermaid_on_fallback {
                    return RenderDecision::Table(render_table());
                }
            }
            Detection::NotDiagram => {}
        }
    }

    // 3. 入れ子のリスト
    if let Some(nested) = render_nested(&table.rows) {
        return RenderDecision::Nested(nested);
    }

    // 4. コードブロック
    if let Some(code) = render_code(&table.rows) {
        return RenderDecision::Code(code);
    }

    // 5. テーブル
    RenderDecision::Table(render_table())
}
