//! Mermaid Diagram Module
//!
//! テーブルの行データ、またはシート上の図形からMermaidのフローチャートを生成するモジュール。
//!
//! # 検出方式
//!
//! - `column_headers`: 見出し行が設定された From/To 列を持つテーブルを図にする
//! - `heuristic`: 矢印（`->`, `=>`, `→` など）を含む行が十分多いテーブルを図にする
//! - `shapes`: テーブルではなく、シートの図形とコネクタから図を生成する

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::api::{GroupColumnBehavior, MermaidDetectMode, NodeIdPolicy};
use crate::config::{HeuristicThresholds, MermaidConfig};
use crate::formatter::unescape_markdown;
use crate::sheet::Shape;

lazy_static! {
    /// 矢印とみなす区切り
    static ref ARROW: Regex = Regex::new(r"-->|->|=>|→|⇒|⟶").unwrap();
}

/// 図のノード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
}

/// 図のエッジ（`from`/`to`はノードID）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub note: Option<String>,
}

/// サブグラフ（グループ列の値ごと）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    pub title: String,
    /// 所属するノードのID
    pub nodes: Vec<String>,
}

/// フローチャート
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDiagram {
    pub header: String,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub subgraphs: Vec<Subgraph>,
}

impl FlowDiagram {
    /// ```` ```mermaid ```` で囲んだ図のソースを出力する
    pub fn to_mermaid(&self) -> String {
        let mut lines = vec!["```mermaid".to_string(), self.header.clone()];

        let grouped: HashSet<&str> = self
            .subgraphs
            .iter()
            .flat_map(|sg| sg.nodes.iter().map(String::as_str))
            .collect();
        let labels: HashMap<&str, &str> = self
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.label.as_str()))
            .collect();

        // 1. どのサブグラフにも属さないノード
        for node in self.nodes.iter().filter(|n| !grouped.contains(n.id.as_str())) {
            lines.push(format!("    {}[\"{}\"]", node.id, escape_label(&node.label)));
        }

        // 2. サブグラフ
        for (i, subgraph) in self.subgraphs.iter().enumerate() {
            lines.push(format!(
                "    subgraph sg{}[\"{}\"]",
                i + 1,
                escape_label(&subgraph.title)
            ));
            for id in &subgraph.nodes {
                let label = labels.get(id.as_str()).copied().unwrap_or(id.as_str());
                lines.push(format!("        {}[\"{}\"]", id, escape_label(label)));
            }
            lines.push("    end".to_string());
        }

        // 3. エッジ
        for edge in &self.edges {
            if let Some(note) = &edge.note {
                lines.push(format!("    %% {}", note.replace('\n', " ")));
            }
            match &edge.label {
                Some(label) => lines.push(format!(
                    "    {} -->|{}| {}",
                    edge.from,
                    escape_edge_label(label),
                    edge.to
                )),
                None => lines.push(format!("    {} --> {}", edge.from, edge.to)),
            }
        }

        lines.push("```".to_string());
        lines.join("\n")
    }
}

/// テーブルに対する図の検出結果
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// 図ではない
    NotDiagram,
    /// 図として検出された
    Diagram(FlowDiagram),
    /// 図の形をしているが、変換できなかった（理由）
    Failed(String),
}

/// 抽出済みの行データが図であるかを判定し、図を生成する
///
/// # 引数
///
/// * `rows` - 抽出済みの行データ（先頭行は見出し）
/// * `config` - Mermaid設定
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::{detect_diagram, Detection, MermaidConfig};
///
/// let rows = vec![
///     vec!["From".to_string(), "To".to_string(), "Label".to_string()],
///     vec!["A".to_string(), "B".to_string(), "go".to_string()],
/// ];
/// let config = MermaidConfig { enabled: true, ..Default::default() };
///
/// match detect_diagram(&rows, &config) {
///     Detection::Diagram(diagram) => assert!(diagram.to_mermaid().contains("A -->|go| B")),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
pub fn detect_diagram(rows: &[Vec<String>], config: &MermaidConfig) -> Detection {
    match config.detect_mode {
        MermaidDetectMode::ColumnHeaders => detect_by_columns(rows, config),
        MermaidDetectMode::Heuristic => detect_by_heuristic(rows, config),
        MermaidDetectMode::Shapes => Detection::NotDiagram,
    }
}

/// 図形とコネクタから図を生成する
///
/// テキストを持つ図形をノード、両端が図形に接続されたコネクタをエッジとします。
/// ノードが1つもない場合は`None`を返します。
pub fn shapes_to_diagram(shapes: &[Shape], config: &MermaidConfig) -> Option<FlowDiagram> {
    let mut builder = DiagramBuilder::new(config);

    for shape in shapes {
        if let Shape::Node { id, text } = shape {
            let label = text.trim();
            let label = if label.is_empty() { id.as_str() } else { label };
            builder.node(id, label);
        }
    }
    if builder.nodes.is_empty() {
        return None;
    }

    for shape in shapes {
        let Shape::Connector {
            from: Some(from),
            to: Some(to),
            label,
            ..
        } = shape
        else {
            continue;
        };
        let (Some(from), Some(to)) = (builder.id_for(from), builder.id_for(to)) else {
            continue;
        };
        let label = label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        builder.push_edge(from, to, label, None);
    }

    Some(builder.finish())
}

fn detect_by_columns(rows: &[Vec<String>], config: &MermaidConfig) -> Detection {
    let Some(header) = rows.first() else {
        return Detection::NotDiagram;
    };
    let header: Vec<String> = header.iter().map(|cell| plain(cell).to_lowercase()).collect();
    let find = |name: &str| {
        let name = name.trim().to_lowercase();
        header.iter().position(|cell| *cell == name)
    };

    let columns = &config.columns;
    let (from_col, to_col) = match (find(&columns.from), find(&columns.to)) {
        (None, None) => return Detection::NotDiagram,
        (Some(from), Some(to)) => (from, to),
        _ => {
            return Detection::Failed(format!(
                "only one of the '{}' / '{}' columns is present",
                columns.from, columns.to
            ))
        }
    };
    let label_col = find(&columns.label);
    let group_col = columns.group.as_deref().and_then(find);
    let note_col = columns.note.as_deref().and_then(find);

    let mut builder = DiagramBuilder::new(config);
    for row in &rows[1..] {
        let cell = |col: Option<usize>| {
            col.and_then(|col| row.get(col))
                .map(|value| plain(value))
                .filter(|value| !value.is_empty())
        };
        let (Some(from), Some(to)) = (cell(Some(from_col)), cell(Some(to_col))) else {
            continue;
        };
        builder.add_edge(&from, &to, cell(label_col), cell(group_col), cell(note_col));
    }

    if builder.edges.is_empty() {
        return Detection::Failed("no rows with both endpoints".to_string());
    }
    Detection::Diagram(builder.finish())
}

fn detect_by_heuristic(rows: &[Vec<String>], config: &MermaidConfig) -> Detection {
    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| plain(cell))
                .filter(|cell| !cell.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect();

    if !looks_like_flow(&lines, &config.heuristic) {
        return Detection::NotDiagram;
    }

    let mut builder = DiagramBuilder::new(config);
    for line in lines.iter().filter(|line| ARROW.is_match(line)) {
        // "A -> B -> C: label"
        let (chain, label) = match line.rsplit_once(':') {
            Some((chain, label)) if ARROW.is_match(chain) && !ARROW.is_match(label) => {
                (chain, Some(label.trim().to_string()).filter(|l| !l.is_empty()))
            }
            _ => (line.as_str(), None),
        };
        let steps: Vec<&str> = ARROW
            .split(chain)
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .collect();
        for pair in steps.windows(2) {
            builder.add_edge(pair[0], pair[1], label.clone(), None, None);
        }
    }

    if builder.edges.is_empty() {
        return Detection::Failed("arrow rows contain no complete edge".to_string());
    }
    Detection::Diagram(builder.finish())
}

/// 行数、矢印を含む行の比率、行の長さの分布から図らしさを判定する
fn looks_like_flow(lines: &[String], thresholds: &HeuristicThresholds) -> bool {
    if lines.is_empty() || lines.len() < thresholds.min_rows {
        return false;
    }

    let arrows = lines.iter().filter(|line| ARROW.is_match(line)).count();
    if (arrows as f64 / lines.len() as f64) < thresholds.arrow_ratio {
        return false;
    }

    let mut lengths: Vec<usize> = lines.iter().map(|line| line.chars().count()).collect();
    lengths.sort_unstable();
    let mid = lengths.len() / 2;
    let median = if lengths.len() % 2 == 0 {
        (lengths[mid - 1] + lengths[mid]) as f64 / 2.0
    } else {
        lengths[mid] as f64
    };
    if median == 0.0 {
        return false;
    }

    let min_ratio = lengths[0] as f64 / median;
    let max_ratio = lengths[lengths.len() - 1] as f64 / median;
    min_ratio >= thresholds.len_median_ratio_min && max_ratio <= thresholds.len_median_ratio_max
}

/// 図の組み立て
struct DiagramBuilder<'a> {
    config: &'a MermaidConfig,
    nodes: Vec<FlowNode>,
    /// ノードのキー（テキストまたは図形ID）-> ノードID
    ids: HashMap<String, String>,
    used_ids: HashSet<String>,
    edges: Vec<FlowEdge>,
    edge_keys: HashSet<(String, String, Option<String>)>,
    subgraphs: Vec<Subgraph>,
    grouped: HashSet<String>,
}

impl<'a> DiagramBuilder<'a> {
    fn new(config: &'a MermaidConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            ids: HashMap::new(),
            used_ids: HashSet::new(),
            edges: Vec::new(),
            edge_keys: HashSet::new(),
            subgraphs: Vec::new(),
            grouped: HashSet::new(),
        }
    }

    fn id_for(&self, key: &str) -> Option<String> {
        self.ids.get(key).cloned()
    }

    /// ノードを登録し、IDを返す（登録済みのキーは既存のIDを返す）
    fn node(&mut self, key: &str, label: &str) -> String {
        if let Some(id) = self.ids.get(key) {
            return id.clone();
        }

        let id = match self.config.node_id_policy {
            NodeIdPolicy::Sequential => format!("n{}", self.nodes.len() + 1),
            NodeIdPolicy::Auto => {
                let base = slugify(label).unwrap_or_else(|| format!("n{}", self.nodes.len() + 1));
                let mut candidate = base.clone();
                let mut suffix = 2;
                while self.used_ids.contains(&candidate) {
                    candidate = format!("{}_{}", base, suffix);
                    suffix += 1;
                }
                candidate
            }
        };

        self.used_ids.insert(id.clone());
        self.ids.insert(key.to_string(), id.clone());
        self.nodes.push(FlowNode {
            id: id.clone(),
            label: label.to_string(),
        });
        id
    }

    /// テーブルの1行からエッジを追加する
    fn add_edge(
        &mut self,
        from: &str,
        to: &str,
        label: Option<String>,
        group: Option<String>,
        note: Option<String>,
    ) {
        let from = self.node(from, from);
        let to = self.node(to, to);

        let label = match (group, self.config.group_column_behavior) {
            (None, _) => label,
            (Some(group), GroupColumnBehavior::Subgraph) => {
                self.assign_group(&group, &from);
                self.assign_group(&group, &to);
                label
            }
            (Some(group), GroupColumnBehavior::EdgeLabel) => Some(match label {
                Some(label) => format!("{} ({})", label, group),
                None => group,
            }),
        };

        self.push_edge(from, to, label, note);
    }

    fn push_edge(&mut self, from: String, to: String, label: Option<String>, note: Option<String>) {
        if self.config.dedupe_edges
            && !self
                .edge_keys
                .insert((from.clone(), to.clone(), label.clone()))
        {
            return;
        }
        self.edges.push(FlowEdge {
            from,
            to,
            label,
            note,
        });
    }

    /// ノードを最初に現れたグループのサブグラフに所属させる
    fn assign_group(&mut self, group: &str, id: &str) {
        if !self.grouped.insert(id.to_string()) {
            return;
        }
        match self.subgraphs.iter_mut().find(|sg| sg.title == group) {
            Some(subgraph) => subgraph.nodes.push(id.to_string()),
            None => self.subgraphs.push(Subgraph {
                title: group.to_string(),
                nodes: vec![id.to_string()],
            }),
        }
    }

    fn finish(self) -> FlowDiagram {
        FlowDiagram {
            header: format!(
                "{} {}",
                self.config.diagram_type.as_str(),
                self.config.direction.as_str()
            ),
            nodes: self.nodes,
            edges: self.edges,
            subgraphs: self.subgraphs,
        }
    }
}

/// ノードのテキストからIDを生成する
///
/// ASCII英数字以外は`_`にまとめます。数字で始まる場合、Mermaidの予約語の場合、
/// サブグラフのID（`sg1`など）と同じ形の場合は`n`を前置します。
fn slugify(text: &str) -> Option<String> {
    let mut slug = String::new();
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        return None;
    }

    let starts_with_digit = slug.starts_with(|c: char| c.is_ascii_digit());
    let reserved = RESERVED_IDS.iter().any(|word| slug.eq_ignore_ascii_case(word));
    if starts_with_digit || reserved || is_subgraph_id(slug) {
        Some(format!("n{}", slug))
    } else {
        Some(slug.to_string())
    }
}

/// ノードIDとして使えないMermaidのキーワード
const RESERVED_IDS: &[&str] = &[
    "end",
    "graph",
    "flowchart",
    "subgraph",
    "style",
    "classDef",
    "class",
    "click",
    "linkStyle",
    "direction",
    "default",
    "call",
    "href",
];

/// `to_mermaid`が割り当てるサブグラフIDの形（`sg` + 数字）か
fn is_subgraph_id(slug: &str) -> bool {
    slug.len() > 2
        && slug[..2].eq_ignore_ascii_case("sg")
        && slug[2..].chars().all(|c| c.is_ascii_digit())
}

/// Markdownエスケープを外し、前後の空白を除いたセルのテキスト
fn plain(cell: &str) -> String {
    unescape_markdown(cell).trim().to_string()
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;")
}

fn escape_edge_label(label: &str) -> String {
    label.replace('"', "#quot;").replace('|', "#124;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MermaidDirection;
    use crate::config::MermaidColumns;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn config() -> MermaidConfig {
        MermaidConfig {
            enabled: true,
            ..Default::default()
        }
    }

    fn diagram(detection: Detection) -> FlowDiagram {
        match detection {
            Detection::Diagram(diagram) => diagram,
            other => panic!("expected a diagram, got {:?}", other),
        }
    }

    #[test]
    fn test_column_headers_with_dedupe() {
        let data = rows(&[&["From", "To", "Label"], &["A", "B", "go"], &["A", "B", "go"]]);

        let deduped = diagram(detect_diagram(&data, &config()));
        assert_eq!(deduped.edges.len(), 1);
        assert_eq!(deduped.edges[0].label.as_deref(), Some("go"));
        assert!(deduped.to_mermaid().contains("    A -->|go| B"));

        let config = MermaidConfig {
            dedupe_edges: false,
            ..config()
        };
        assert_eq!(diagram(detect_diagram(&data, &config)).edges.len(), 2);
    }

    #[test]
    fn test_column_headers_match_case_insensitively() {
        let data = rows(&[&[" from ", "TO"], &["Start", "End"]]);
        let diagram = diagram(detect_diagram(&data, &config()));
        assert_eq!(diagram.nodes[1].id, "nEnd");
        assert!(diagram.to_mermaid().contains("    Start --> nEnd"));
    }

    #[test]
    fn test_column_headers_failures() {
        let not_flow = rows(&[&["Name", "Qty"], &["Widget", "1"]]);
        assert_eq!(detect_diagram(&not_flow, &config()), Detection::NotDiagram);

        let partial = rows(&[&["From", "Target"], &["A", "B"]]);
        assert!(matches!(detect_diagram(&partial, &config()), Detection::Failed(_)));

        let empty = rows(&[&["From", "To"], &["A", ""]]);
        assert!(matches!(detect_diagram(&empty, &config()), Detection::Failed(_)));
    }

    #[test]
    fn test_custom_columns_with_group_subgraphs_and_notes() {
        let config = MermaidConfig {
            columns: MermaidColumns::parse("Src,Dst,Action,Team,Memo"),
            direction: MermaidDirection::LR,
            ..config()
        };
        let data = rows(&[
            &["Src", "Dst", "Action", "Team", "Memo"],
            &["Order", "Pay", "", "Sales", "check stock"],
            &["Pay", "Ship", "ok", "Ops", ""],
        ]);

        let diagram = diagram(detect_diagram(&data, &config));
        let source = diagram.to_mermaid();
        assert_eq!(
            source,
            [
                "```mermaid",
                "flowchart LR",
                "    subgraph sg1[\"Sales\"]",
                "        Order[\"Order\"]",
                "        Pay[\"Pay\"]",
                "    end",
                "    subgraph sg2[\"Ops\"]",
                "        Ship[\"Ship\"]",
                "    end",
                "    %% check stock",
                "    Order --> Pay",
                "    Pay -->|ok| Ship",
                "```",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_group_as_edge_label() {
        let config = MermaidConfig {
            columns: MermaidColumns::parse("From,To,Label,Group"),
            group_column_behavior: GroupColumnBehavior::EdgeLabel,
            ..config()
        };
        let data = rows(&[
            &["From", "To", "Label", "Group"],
            &["A", "B", "", "g1"],
            &["B", "C", "next", "g2"],
        ]);
        let diagram = diagram(detect_diagram(&data, &config));
        assert!(diagram.subgraphs.is_empty());
        assert_eq!(diagram.edges[0].label.as_deref(), Some("g1"));
        assert_eq!(diagram.edges[1].label.as_deref(), Some("next (g2)"));
    }

    #[test]
    fn test_node_id_policies() {
        let data = rows(&[
            &["From", "To"],
            &["Load data", "1st step"],
            &["Load-data", "!!!"],
        ]);
        let auto = diagram(detect_diagram(&data, &config()));
        let ids: Vec<&str> = auto.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["Load_data", "n1st_step", "Load_data_2", "n4"]);

        let config = MermaidConfig {
            node_id_policy: NodeIdPolicy::Sequential,
            ..config()
        };
        let sequential = diagram(detect_diagram(&data, &config));
        let ids: Vec<&str> = sequential.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2", "n3", "n4"]);
    }

    #[test]
    fn test_reserved_words_and_subgraph_ids_are_prefixed() {
        assert_eq!(slugify("end").as_deref(), Some("nend"));
        assert_eq!(slugify("Style").as_deref(), Some("nStyle"));
        assert_eq!(slugify("click").as_deref(), Some("nclick"));
        assert_eq!(slugify("subgraph").as_deref(), Some("nsubgraph"));
        assert_eq!(slugify("graph").as_deref(), Some("ngraph"));
        assert_eq!(slugify("sg1").as_deref(), Some("nsg1"));
        assert_eq!(slugify("sg").as_deref(), Some("sg"));
        assert_eq!(slugify("classic").as_deref(), Some("classic"));

        let config = MermaidConfig {
            columns: MermaidColumns::parse("From,To,Label,Group"),
            ..config()
        };
        let data = rows(&[
            &["From", "To", "Label", "Group"],
            &["sg1", "class", "", "Team"],
        ]);
        let source = diagram(detect_diagram(&data, &config)).to_mermaid();
        assert!(source.contains("subgraph sg1[\"Team\"]"));
        assert!(source.contains("nsg1[\"sg1\"]"));
        assert!(source.contains("    nsg1 --> nclass"));
    }

    #[test]
    fn test_label_escaping() {
        let data = rows(&[&["From", "To", "Label"], &["Say \"hi\"", "B", "a\\|b"]]);
        let source = diagram(detect_diagram(&data, &config())).to_mermaid();
        assert!(source.contains("Say_hi[\"Say #quot;hi#quot;\"]"));
        assert!(source.contains("-->|a#124;b|"));
    }

    #[test]
    fn test_heuristic_detection() {
        let config = MermaidConfig {
            detect_mode: MermaidDetectMode::Heuristic,
            ..config()
        };
        let data = rows(&[
            &["Start -> Validate"],
            &["Validate -> Save: ok"],
            &["Validate → Reject"],
        ]);
        let diagram = diagram(detect_diagram(&data, &config));
        assert_eq!(diagram.edges.len(), 3);
        assert_eq!(diagram.edges[1].label.as_deref(), Some("ok"));

        let chain = rows(&[&["A -> B -> C"], &["C => D"], &["D --> A"]]);
        let chain_diagram = match detect_diagram(&chain, &config) {
            Detection::Diagram(diagram) => diagram,
            other => panic!("expected a diagram, got {:?}", other),
        };
        assert_eq!(chain_diagram.edges.len(), 4);
    }

    #[test]
    fn test_heuristic_thresholds() {
        let config = MermaidConfig {
            detect_mode: MermaidDetectMode::Heuristic,
            ..config()
        };

        // 行数不足
        let short = rows(&[&["A -> B"], &["B -> C"]]);
        assert_eq!(detect_diagram(&short, &config), Detection::NotDiagram);

        // 矢印の比率不足
        let sparse = rows(&[&["A -> B"], &["plain"], &["text"], &["more"]]);
        assert_eq!(detect_diagram(&sparse, &config), Detection::NotDiagram);

        // 長さの分布が帯域外
        let skewed = rows(&[
            &["A -> B"],
            &["B -> C"],
            &["C -> D and then a very long explanation of what happens next in the flow"],
        ]);
        assert_eq!(detect_diagram(&skewed, &config), Detection::NotDiagram);
    }

    #[test]
    fn test_shapes_mode_ignores_tables() {
        let config = MermaidConfig {
            detect_mode: MermaidDetectMode::Shapes,
            ..config()
        };
        let data = rows(&[&["From", "To"], &["A", "B"]]);
        assert_eq!(detect_diagram(&data, &config), Detection::NotDiagram);
    }

    #[test]
    fn test_shapes_to_diagram() {
        let shapes = vec![
            Shape::Node {
                id: "2".to_string(),
                text: "Start".to_string(),
            },
            Shape::Node {
                id: "3".to_string(),
                text: "Start".to_string(),
            },
            Shape::Connector {
                id: "4".to_string(),
                from: Some("2".to_string()),
                to: Some("3".to_string()),
                label: Some(" retry ".to_string()),
            },
            Shape::Connector {
                id: "5".to_string(),
                from: Some("2".to_string()),
                to: None,
                label: None,
            },
        ];
        let diagram = shapes_to_diagram(&shapes, &config()).unwrap();
        assert_eq!(diagram.nodes.len(), 2);
        assert_eq!(diagram.nodes[1].id, "Start_2");
        assert_eq!(diagram.edges.len(), 1);
        assert!(diagram.to_mermaid().contains("    Start -->|retry| Start_2"));

        assert!(shapes_to_diagram(&[], &config()).is_none());
    }
}
