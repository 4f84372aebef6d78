//! Text Block Renderer
//!
//! テーブルとして出力するよりも自然な形を持つ行データを、
//! 入れ子のリスト、またはコードブロックとして出力します。

use lazy_static::lazy_static;
use regex::Regex;

use crate::formatter::unescape_markdown;

lazy_static! {
    /// 階層番号（`1.` / `1.2.3`）
    static ref NUMBERING: Regex = Regex::new(r"^(\d+(?:\.\d+)*)\.?\s+").unwrap();
    /// 行頭の箇条書き記号（エスケープ済みの`\*`を含む）
    static ref BULLET: Regex = Regex::new(r"^(?:[-•]|\\?\*)\s+").unwrap();
    /// ソースコードのキーワード（SQLは大文字の句のみ）
    static ref CODE_KEYWORD: Regex = Regex::new(
        r"^\s*(?:(?:fn|def|class|import|let|const|return|pub|use)\b|#include\b|(?:SELECT|FROM|WHERE|INSERT\s+INTO|UPDATE\s+\S+\s+SET|DELETE\s+FROM)\s)"
    )
    .unwrap();
}

/// 入れ子のリストとして出力する1行
#[derive(Debug, Clone, PartialEq, Eq)]
struct Item {
    level: usize,
    text: String,
}

/// 行データが入れ子構造（階段状の配置、字下げ、階層番号）を持つ場合にリストとして出力する
///
/// 各行の内容が1セル以下で、2行以上あり、階層が2種類以上ある場合に該当します。
/// コードらしい行が半数以上ある場合はコードブロックの判定に委ねます。
pub(crate) fn render_nested(rows: &[Vec<String>]) -> Option<String> {
    let mut items = Vec::new();
    let mut raws = Vec::new();

    for row in rows {
        let filled: Vec<(usize, &String)> = row
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.trim().is_empty())
            .collect();
        let (offset, cell) = match filled.as_slice() {
            [] => continue,
            [single] => *single,
            _ => return None,
        };

        raws.push(unescape_markdown(cell));
        items.push(item(offset, cell));
    }

    if items.len() < 2 || count_code_like(&raws) * 2 >= items.len() {
        return None;
    }
    let first = items.iter().map(|item| item.level).min().unwrap_or(0);
    if items.iter().all(|item| item.level == first) {
        return None;
    }

    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("{}- {}", "  ".repeat(item.level - first), item.text))
        .collect();
    Some(lines.join("\n"))
}

/// 1列の行データがソースコードらしい場合にコードブロックとして出力する
pub(crate) fn render_code(rows: &[Vec<String>]) -> Option<String> {
    let mut column = None;
    for row in rows {
        for (col, cell) in row.iter().enumerate() {
            if cell.trim().is_empty() {
                continue;
            }
            match column {
                None => column = Some(col),
                Some(existing) if existing != col => return None,
                Some(_) => {}
            }
        }
    }
    let column = column?;

    let lines: Vec<String> = rows
        .iter()
        .map(|row| row.get(column).map(|cell| unescape_markdown(cell)).unwrap_or_default())
        .collect();
    let filled: Vec<String> = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .cloned()
        .collect();
    if filled.len() < 2 || count_code_like(&filled) * 2 < filled.len() {
        return None;
    }

    Some(format!("```\n{}\n```", lines.join("\n")))
}

fn item(offset: usize, cell: &str) -> Item {
    // 1. 字下げ（空白2文字またはタブ1文字で1段）
    let mut indent = 0;
    let mut rest = cell;
    loop {
        if let Some(stripped) = rest.strip_prefix('\t') {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("  ") {
            rest = stripped;
        } else {
            break;
        }
        indent += 1;
    }
    let text = rest.trim();

    // 2. 階層番号
    let depth = NUMBERING
        .captures(text)
        .map(|caps| caps[1].split('.').count())
        .unwrap_or(1);

    // 3. 箇条書き記号の除去
    let text = BULLET.replace(text, "").into_owned();

    Item {
        level: offset + indent + depth - 1,
        text,
    }
}

/// コードらしい行の数（末尾の`:`は次の行が字下げされている場合のみ）
fn count_code_like(lines: &[String]) -> usize {
    lines
        .iter()
        .enumerate()
        .filter(|(i, line)| is_code_like(line, lines.get(i + 1).map(String::as_str)))
        .count()
}

fn is_indented(line: &str) -> bool {
    line.starts_with("  ") || line.starts_with('\t')
}

fn is_code_like(line: &str, next: Option<&str>) -> bool {
    let trimmed = line.trim_end();
    is_indented(line)
        || line.trim_start().starts_with("$ ")
        || trimmed.ends_with([';', '{', '}'])
        || (trimmed.ends_with(':') && next.is_some_and(is_indented))
        || CODE_KEYWORD.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_nested_from_staircase_layout() {
        let data = rows(&[
            &["Overview", "", ""],
            &["", "Goals", ""],
            &["", "", "Ship v1"],
            &["", "Risks", ""],
        ]);
        assert_eq!(
            render_nested(&data).unwrap(),
            "- Overview\n  - Goals\n    - Ship v1\n  - Risks"
        );
    }

    #[test]
    fn test_nested_from_numbering_and_indent() {
        let data = rows(&[&["1. Setup"], &["1.1 Install"], &["  - detail"], &["2. Usage"]]);
        assert_eq!(
            render_nested(&data).unwrap(),
            "- 1. Setup\n  - 1.1 Install\n  - detail\n- 2. Usage"
        );
    }

    #[test]
    fn test_nested_rejects_tables_and_flat_lists() {
        assert!(render_nested(&rows(&[&["a", "b"], &["c", "d"]])).is_none());
        assert!(render_nested(&rows(&[&["a"], &["b"], &["c"]])).is_none());
        assert!(render_nested(&rows(&[&["only"]])).is_none());
    }

    #[test]
    fn test_nested_leaves_indented_code_alone() {
        let data = rows(&[&["fn main() {"], &["    println!(\"hi\");"], &["}"]]);
        assert!(render_nested(&data).is_none());
        assert!(render_code(&data).is_some());
    }

    #[test]
    fn test_code_block() {
        let data = rows(&[&["SELECT id, name"], &["FROM users"], &["WHERE active = 1;"]]);
        assert_eq!(
            render_code(&data).unwrap(),
            "```\nSELECT id, name\nFROM users\nWHERE active = 1;\n```"
        );
    }

    #[test]
    fn test_code_block_unescapes_markdown() {
        let data = rows(&[&["$ ls \\| grep foo"], &["$ echo \\*"]]);
        assert_eq!(
            render_code(&data).unwrap(),
            "```\n$ ls | grep foo\n$ echo *\n```"
        );
    }

    #[test]
    fn test_code_rejects_prose_and_multi_column() {
        assert!(render_code(&rows(&[&["Apples"], &["Oranges"], &["Pears"]])).is_none());
        assert!(render_code(&rows(&[&["x = 1;", "y"], &["z = 2;", ""]])).is_none());
        assert!(render_code(&rows(&[&["return 1;"]])).is_none());
    }

    #[test]
    fn test_code_like_signals() {
        assert!(is_code_like("    indented", None));
        assert!(is_code_like("int x = 0;", None));
        assert!(is_code_like("if ready:", Some("    go()")));
        assert!(!is_code_like("if ready:", Some("go()")));
        assert!(!is_code_like("Phone:", None));
        assert!(is_code_like("$ cargo build", None));
        assert!(is_code_like("import os", None));
        assert!(is_code_like("#include <stdio.h>", None));
        assert!(is_code_like("SELECT * FROM t", None));
        assert!(is_code_like("UPDATE users SET active = 0", None));
        assert!(!is_code_like("Select a vendor", None));
        assert!(!is_code_like("Update the docs", None));
        assert!(!is_code_like("Quarterly results", None));
        assert!(!is_code_like("Selection criteria", None));
    }

    #[test]
    fn test_code_rejects_task_lists_and_labels() {
        let tasks = rows(&[
            &["Tasks"],
            &["Update the docs"],
            &["Delete old files"],
            &["Select a vendor"],
        ]);
        assert!(render_code(&tasks).is_none());

        let labels = rows(&[&["Name:"], &["Address:"], &["Phone:"]]);
        assert!(render_code(&labels).is_none());
    }

    #[test]
    fn test_code_block_with_colon_blocks() {
        let data = rows(&[&["def main():"], &["    run()"], &["if ready:"], &["    go()"]]);
        assert!(render_code(&data).is_some());
    }
}
