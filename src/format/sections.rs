//! FormatSection Module
//!
//! Excel Number Format Stringのセクション分割と選択を提供します。

use super::tokens::{tokenize, FormatToken};

/// フォーマットのセクション（正数、負数、ゼロ、テキスト）
///
/// Excel Number Format Stringは最大4つのセクションに分割されます:
/// 1. 正数
/// 2. 負数
/// 3. ゼロ
/// 4. テキスト
#[derive(Debug, Clone)]
pub(crate) struct FormatSection {
    /// フォーマットトークン
    pub tokens: Vec<FormatToken>,
}

impl FormatSection {
    /// セクション文字列をトークン化して生成
    pub fn parse(source: &str) -> Self {
        Self {
            tokens: tokenize(source),
        }
    }

    /// セクションが日付・時刻書式かどうかを判定
    pub fn is_datetime(&self) -> bool {
        self.tokens.iter().any(FormatToken::is_datetime)
    }

    /// セクションが数値書式かどうかを判定
    pub fn is_numeric(&self) -> bool {
        self.tokens.iter().any(FormatToken::is_numeric)
    }

    /// パーセント記号の数
    pub fn percent_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, FormatToken::Percent))
            .count()
    }
}

/// 書式文字列を`;`でセクションに分割する
///
/// 引用符とブラケットの内側の`;`、および`\`でエスケープされた`;`は区切りとして扱いません。
pub(crate) fn split_sections(code: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut escaped = false;

    for ch in code.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' if !in_quotes => {
                escaped = true;
                current.push(ch);
            }
            '"' if !in_brackets => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '[' if !in_quotes => {
                in_brackets = true;
                current.push(ch);
            }
            ']' if !in_quotes => {
                in_brackets = false;
                current.push(ch);
            }
            ';' if !in_quotes && !in_brackets => {
                sections.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    sections.push(current);

    sections.truncate(4);
    sections
}

/// 数値に適用するセクションを選択する
///
/// # 戻り値
///
/// 選択されたセクションと、値の先頭に`-`を付ける必要があるかどうか
pub(crate) fn select_section(sections: &[FormatSection], value: f64) -> Option<(&FormatSection, bool)> {
    let first = sections.first()?;
    if value < 0.0 {
        match sections.get(1) {
            Some(negative) => Some((negative, false)),
            None => Some((first, true)),
        }
    } else if value == 0.0 {
        Some((sections.get(2).unwrap_or(first), false))
    } else {
        Some((first, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sections() {
        let sections = split_sections("0;0;0;@");
        assert_eq!(sections, vec!["0", "0", "0", "@"]);

        let sections = split_sections("0.00");
        assert_eq!(sections, vec!["0.00"]);
    }

    #[test]
    fn test_split_sections_respects_quotes_and_brackets() {
        let sections = split_sections("\"a;b\"0;[Red]\\;0");
        assert_eq!(sections, vec!["\"a;b\"0", "[Red]\\;0"]);
    }

    #[test]
    fn test_select_section() {
        let sections: Vec<FormatSection> = ["0", "(0)", "\"zero\""]
            .iter()
            .map(|s| FormatSection::parse(s))
            .collect();

        let (positive, _) = select_section(&sections, 5.0).unwrap();
        assert!(std::ptr::eq(positive, &sections[0]));
        let (negative, needs_sign) = select_section(&sections, -5.0).unwrap();
        assert!(std::ptr::eq(negative, &sections[1]));
        assert!(!needs_sign);
        let (zero, _) = select_section(&sections, 0.0).unwrap();
        assert!(std::ptr::eq(zero, &sections[2]));

        let single = vec![FormatSection::parse("0")];
        let (section, needs_sign) = select_section(&single, -1.0).unwrap();
        assert!(std::ptr::eq(section, &single[0]));
        assert!(needs_sign);
        assert!(select_section(&[], 1.0).is_none());
    }

    #[test]
    fn test_section_classification() {
        let date = FormatSection::parse("yyyy/mm/dd");
        assert!(date.is_datetime());
        assert!(!date.is_numeric());

        let percent = FormatSection::parse("0.0%");
        assert!(percent.is_numeric());
        assert_eq!(percent.percent_count(), 1);
    }
}
