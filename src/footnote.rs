//! Footnote Registry Module
//!
//! ハイパーリンクの脚注番号を管理するモジュール。
//! 1つのレジストリが1つのスコープ（シートまたはドキュメント全体）に対応し、
//! スコープの切り替えはレジストリの作り直しで表現します。

use std::collections::{BTreeMap, HashMap};

/// 脚注レジストリ
///
/// 番号は1から単調に割り当てられ、同じスコープ内で再利用されません。
#[derive(Debug, Clone, Default)]
pub struct FootnoteRegistry {
    notes: BTreeMap<usize, String>,
    by_text: HashMap<String, usize>,
}

impl FootnoteRegistry {
    /// 空のレジストリを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 次に割り当てる番号
    pub fn next_index(&self) -> usize {
        self.notes.keys().next_back().map_or(1, |last| last + 1)
    }

    /// 登録済みの脚注の番号を検索
    pub fn lookup(&self, text: &str) -> Option<usize> {
        self.by_text.get(text).copied()
    }

    /// 抽出結果の脚注を登録する
    ///
    /// 既に登録済みの番号・テキストは無視します。
    pub fn extend<'a, I>(&mut self, notes: I)
    where
        I: IntoIterator<Item = &'a (usize, String)>,
    {
        for (index, text) in notes {
            if self.notes.contains_key(index) || self.by_text.contains_key(text) {
                continue;
            }
            self.notes.insert(*index, text.clone());
            self.by_text.insert(text.clone(), *index);
        }
    }

    /// 脚注が1つもないか
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// 番号順の脚注定義
    pub fn definitions(&self) -> impl Iterator<Item = (usize, &str)> {
        self.notes.iter().map(|(index, text)| (*index, text.as_str()))
    }

    /// 脚注定義をMarkdownとして出力（`[^n]: text` を1行ずつ）
    pub fn render(&self) -> String {
        self.definitions()
            .map(|(index, text)| format!("[^{}]: {}", index, text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_index_is_monotonic() {
        let mut registry = FootnoteRegistry::new();
        assert_eq!(registry.next_index(), 1);

        registry.extend(&[(1, "https://a.example".to_string())]);
        registry.extend(&[(2, "https://b.example".to_string())]);
        assert_eq!(registry.next_index(), 3);
        assert_eq!(registry.lookup("https://b.example"), Some(2));
    }

    #[test]
    fn test_extend_skips_duplicates() {
        let mut registry = FootnoteRegistry::new();
        registry.extend(&[
            (1, "https://a.example".to_string()),
            (1, "https://a.example".to_string()),
            (2, "https://a.example".to_string()),
        ]);
        assert_eq!(registry.definitions().count(), 1);
    }

    #[test]
    fn test_render_sorted() {
        let mut registry = FootnoteRegistry::new();
        registry.extend(&[
            (2, "https://b.example".to_string()),
            (1, "https://a.example".to_string()),
        ]);
        assert_eq!(
            registry.render(),
            "[^1]: https://a.example\n[^2]: https://b.example"
        );
    }
}
