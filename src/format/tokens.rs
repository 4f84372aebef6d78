//! FormatToken Module
//!
//! Excel Number Format Stringのトークン定義と字句解析を提供します。

/// 数字プレースホルダーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DigitKind {
    /// `0`: 桁がなければ0で埋める
    Zero,
    /// `#`: 桁がなければ何も出力しない
    Hash,
    /// `?`: 桁がなければ空白で埋める
    Question,
}

/// 日付・時刻の要素（値は記号の連続数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DatePart {
    Year(usize),
    Month(usize),
    Day(usize),
    Hour(usize),
    Minute(usize),
    Second(usize),
}

/// 経過時間の単位（`[h]`, `[mm]`, `[ss]`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElapsedUnit {
    Hours,
    Minutes,
    Seconds,
}

/// フォーマットトークン
///
/// Excel Number Format Stringを解析した際に生成されるトークンです。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FormatToken {
    /// 数字プレースホルダー
    Digit(DigitKind),

    /// 小数点
    DecimalPoint,

    /// カンマ（桁区切り、または末尾の場合は1000分の1へのスケーリング）
    Comma,

    /// パーセント記号
    Percent,

    /// 指数表記（`E+` / `E-`）。`true`の場合は正の指数にも符号を付ける
    Exponent(bool),

    /// リテラル文字列（引用符、`\x`、`_x`による空白を含む）
    Literal(String),

    /// テキストプレースホルダー（`@`）
    Text,

    /// `General`
    General,

    /// 通貨記号（`[$€-407]`または`$`などの記号）
    Currency(String),

    /// 日付・時刻の要素
    Date(DatePart),

    /// `AM/PM`（`A/P`を含む）
    AmPm,

    /// 経過時間
    Elapsed(ElapsedUnit),
}

impl FormatToken {
    /// トークンが日付・時刻関連かどうかを判定
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            FormatToken::Date(_) | FormatToken::AmPm | FormatToken::Elapsed(_)
        )
    }

    /// トークンが数値関連かどうかを判定
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FormatToken::Digit(_)
                | FormatToken::DecimalPoint
                | FormatToken::Comma
                | FormatToken::Percent
                | FormatToken::Exponent(_)
        )
    }
}

/// 通貨記号として扱う文字
const CURRENCY_CHARS: &[char] = &['$', '€', '£', '¥', '￥', '₩', '₹'];

/// 1セクション分の書式文字列をトークン列に分解する
///
/// 色指定（`[Red]`）と条件（`[>100]`）は無視します。`m`は直前に時、
/// または直後に秒がある場合に分として扱います。
pub(crate) fn tokenize(section: &str) -> Vec<FormatToken> {
    let chars: Vec<char> = section.chars().collect();
    let mut tokens: Vec<FormatToken> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '"' => {
                // 1. 引用符で囲まれたリテラル
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != '"' {
                    end += 1;
                }
                let literal: String = chars[start..end].iter().collect();
                push_literal(&mut tokens, &literal);
                i = end + 1;
            }
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    push_literal(&mut tokens, &next.to_string());
                }
                i += 2;
            }
            '_' => {
                // 2. 次の文字の幅の空白
                push_literal(&mut tokens, " ");
                i += 2;
            }
            '*' => {
                // 3. 繰り返し文字（セル幅に依存するため出力しない）
                i += 2;
            }
            '[' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != ']' {
                    end += 1;
                }
                let content: String = chars[start..end].iter().collect();
                if let Some(token) = bracket_token(&content) {
                    tokens.push(token);
                }
                i = end + 1;
            }
            '0' => {
                tokens.push(FormatToken::Digit(DigitKind::Zero));
                i += 1;
            }
            '#' => {
                tokens.push(FormatToken::Digit(DigitKind::Hash));
                i += 1;
            }
            '?' => {
                tokens.push(FormatToken::Digit(DigitKind::Question));
                i += 1;
            }
            '.' => {
                tokens.push(FormatToken::DecimalPoint);
                i += 1;
            }
            ',' => {
                tokens.push(FormatToken::Comma);
                i += 1;
            }
            '%' => {
                tokens.push(FormatToken::Percent);
                i += 1;
            }
            '@' => {
                tokens.push(FormatToken::Text);
                i += 1;
            }
            'E' | 'e' if matches!(chars.get(i + 1), Some('+') | Some('-')) => {
                tokens.push(FormatToken::Exponent(chars[i + 1] == '+'));
                i += 2;
            }
            'G' | 'g' if starts_with_ignore_case(&chars[i..], "general") => {
                tokens.push(FormatToken::General);
                i += "general".len();
            }
            'A' | 'a' if starts_with_ignore_case(&chars[i..], "am/pm") => {
                tokens.push(FormatToken::AmPm);
                i += "am/pm".len();
            }
            'A' | 'a' if starts_with_ignore_case(&chars[i..], "a/p") => {
                tokens.push(FormatToken::AmPm);
                i += "a/p".len();
            }
            'y' | 'Y' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' | 'm' | 'M' => {
                let lower = ch.to_ascii_lowercase();
                let count = run_length(&chars[i..], lower);
                let part = match lower {
                    'y' => DatePart::Year(count),
                    'd' => DatePart::Day(count),
                    'h' => DatePart::Hour(count),
                    's' => DatePart::Second(count),
                    _ => DatePart::Month(count),
                };
                tokens.push(FormatToken::Date(part));
                i += count;
            }
            c if CURRENCY_CHARS.contains(&c) => {
                tokens.push(FormatToken::Currency(c.to_string()));
                i += 1;
            }
            _ => {
                push_literal(&mut tokens, &ch.to_string());
                i += 1;
            }
        }
    }

    resolve_minutes(&mut tokens);
    tokens
}

/// 直前の時、または直後の秒に隣接する`m`を分に置き換える
fn resolve_minutes(tokens: &mut [FormatToken]) {
    let date_positions: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| matches!(t, FormatToken::Date(_) | FormatToken::Elapsed(_)))
        .map(|(i, _)| i)
        .collect();

    for (n, &pos) in date_positions.iter().enumerate() {
        let FormatToken::Date(DatePart::Month(count)) = tokens[pos] else {
            continue;
        };
        if count > 2 {
            continue;
        }
        let after_hour = n > 0
            && matches!(
                tokens[date_positions[n - 1]],
                FormatToken::Date(DatePart::Hour(_)) | FormatToken::Elapsed(ElapsedUnit::Hours)
            );
        let before_second = date_positions.get(n + 1).is_some_and(|&next| {
            matches!(
                tokens[next],
                FormatToken::Date(DatePart::Second(_)) | FormatToken::Elapsed(ElapsedUnit::Seconds)
            )
        });
        if after_hour || before_second {
            tokens[pos] = FormatToken::Date(DatePart::Minute(count));
        }
    }
}

/// ブラケット内の指定をトークンに変換
fn bracket_token(content: &str) -> Option<FormatToken> {
    if let Some(rest) = content.strip_prefix('$') {
        // [$€-407] / [$USD]
        let symbol = rest.split('-').next().unwrap_or_default();
        return (!symbol.is_empty()).then(|| FormatToken::Currency(symbol.to_string()));
    }

    let lower = content.to_ascii_lowercase();
    if !lower.is_empty() && lower.chars().all(|c| c == 'h') {
        Some(FormatToken::Elapsed(ElapsedUnit::Hours))
    } else if !lower.is_empty() && lower.chars().all(|c| c == 'm') {
        Some(FormatToken::Elapsed(ElapsedUnit::Minutes))
    } else if !lower.is_empty() && lower.chars().all(|c| c == 's') {
        Some(FormatToken::Elapsed(ElapsedUnit::Seconds))
    } else {
        // 色指定・条件・ロケール指定は無視
        None
    }
}

fn push_literal(tokens: &mut Vec<FormatToken>, text: &str) {
    if let Some(FormatToken::Literal(last)) = tokens.last_mut() {
        last.push_str(text);
    } else {
        tokens.push(FormatToken::Literal(text.to_string()));
    }
}

fn run_length(chars: &[char], lower: char) -> usize {
    chars
        .iter()
        .take_while(|c| c.to_ascii_lowercase() == lower)
        .count()
}

fn starts_with_ignore_case(chars: &[char], pattern: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    chars.len() >= pattern.len()
        && chars
            .iter()
            .zip(pattern.iter())
            .all(|(a, b)| a.to_ascii_lowercase() == *b)
}
