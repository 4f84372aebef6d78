//! Formatter Module
//!
//! セル値を表示文字列に変換するモジュール。
//! 日付・数値・パーセント・通貨の書式化と、Markdownエスケープを提供します。

use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};

use crate::api::{CurrencySymbol, MarkdownEscapeLevel, PercentFormat};
use crate::config::ConversionConfig;
use crate::format::{
    format_general, group_thousands, serial_to_datetime, CurrencyPosition, FormatKind,
    NumberFormat,
};
use crate::sheet::SheetCell;
use crate::types::CellValue;

/// 完全エスケープの対象となるMarkdown特殊文字
const MARKDOWN_SPECIALS: &[char] = &['\\', '`', '*', '_', '#', '[', ']', '<', '>', '|'];

/// 時刻のみの値を出力する形式
const TIME_ONLY_FORMAT: &str = "%H:%M:%S";

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
#[derive(Debug)]
pub(crate) struct CellFormatter<'a> {
    /// 日付フォーマッター
    date_formatter: DateFormatter<'a>,

    /// 数値フォーマッター
    number_formatter: NumberFormatter<'a>,

    config: &'a ConversionConfig,
}

impl<'a> CellFormatter<'a> {
    /// 新しいCellFormatterインスタンスを生成
    ///
    /// # 引数
    ///
    /// * `config` - 変換設定
    /// * `date1904` - シリアル値の解釈に1904年エポックを使用するか
    pub fn new(config: &'a ConversionConfig, date1904: bool) -> Self {
        Self {
            date_formatter: DateFormatter { config },
            number_formatter: NumberFormatter { config, date1904 },
            config,
        }
    }

    /// セル値を表示文字列に変換（エスケープ前）
    ///
    /// # 引数
    ///
    /// * `value` - 書式化する値（結合セルの場合は起点セルの値）
    /// * `meta` - 表示文字列・数値書式を持つセル（結合セルの場合は起点セル）
    pub fn format(&self, value: &CellValue, meta: Option<&SheetCell>) -> String {
        let display = meta.and_then(|cell| cell.display.as_deref());
        let number_format = meta.and_then(|cell| cell.number_format.as_deref());

        match value {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Error(e) => e.clone(),
            CellValue::DateTime(dt) => self.date_formatter.format(dt, display),
            CellValue::Number(n) => {
                if self.config.prefer_excel_display {
                    if let Some(display) = display {
                        return display.to_string();
                    }
                }
                self.number_formatter
                    .format(*n, number_format, &self.date_formatter)
            }
        }
    }

    /// セル値を書式化し、空白除去とMarkdownエスケープを適用する
    pub fn format_text(&self, value: &CellValue, meta: Option<&SheetCell>) -> String {
        let text = self.format(value, meta);
        let text = if self.config.strip_whitespace {
            text.trim().to_string()
        } else {
            text
        };
        escape_markdown(&text, self.config.markdown_escape_level)
    }
}

/// 日付フォーマッター
///
/// 出力形式の優先順位: `date_format_override` → Excelの表示文字列
/// （`prefer_excel_display`が有効な場合）→ `date_default_format`。
/// 日付部分を持たない時刻のみの値は`HH:MM:SS`で出力します。
#[derive(Debug)]
pub(crate) struct DateFormatter<'a> {
    config: &'a ConversionConfig,
}

impl DateFormatter<'_> {
    pub fn format(&self, datetime: &NaiveDateTime, display: Option<&str>) -> String {
        // 1. 上書き形式
        if let Some(ref format_str) = self.config.date_format_override {
            if let Some(formatted) = format_datetime(datetime, format_str) {
                return formatted;
            }
        }

        // 2. Excelの表示文字列
        if self.config.prefer_excel_display {
            if let Some(display) = display {
                return display.to_string();
            }
        }

        // 3. 時刻のみの値
        if is_time_only(datetime) {
            return datetime.format(TIME_ONLY_FORMAT).to_string();
        }

        // 4. 既定の形式
        format_datetime(datetime, &self.config.date_default_format)
            .unwrap_or_else(|| datetime.date().to_string())
    }
}

/// 数値フォーマッター
///
/// セルの数値書式の分類（日付・パーセント・通貨・数値）に従って書式化します。
#[derive(Debug)]
pub(crate) struct NumberFormatter<'a> {
    config: &'a ConversionConfig,
    date1904: bool,
}

impl NumberFormatter<'_> {
    pub fn format(
        &self,
        value: f64,
        number_format: Option<&str>,
        date_formatter: &DateFormatter<'_>,
    ) -> String {
        let Some(code) = number_format else {
            return self.group(&format_general(value));
        };
        let format = NumberFormat::parse(code);

        match format.kind() {
            FormatKind::Date => match serial_to_datetime(value, self.date1904) {
                Some(datetime) => date_formatter.format(&datetime, None),
                None => self.group(&format_general(value)),
            },
            FormatKind::Percent => self.format_percent(value, format.decimals()),
            FormatKind::Currency => self.format_currency(value, &format),
            FormatKind::Number => self.group(&format!("{:.*}", format.decimals(), value)),
            FormatKind::General | FormatKind::Text => self.group(&format_general(value)),
        }
    }

    /// パーセント値（`value`は1 = 100%の小数）
    fn format_percent(&self, value: f64, decimals: usize) -> String {
        match self.config.percent_format {
            PercentFormat::Percent => {
                format!("{}%", self.group(&format!("{:.*}", decimals, value * 100.0)))
            }
            PercentFormat::Numeric if self.config.percent_divide_100 => {
                trim_trailing_zeros(&format!("{:.*}", decimals + 2, value))
            }
            PercentFormat::Numeric => self.group(&format!("{:.*}", decimals, value * 100.0)),
        }
    }

    fn format_currency(&self, value: f64, format: &NumberFormat) -> String {
        let amount = self.group(&format!("{:.*}", format.decimals(), value.abs()));
        let sign = if value < 0.0 { "-" } else { "" };

        match (self.config.currency_symbol, format.currency()) {
            (CurrencySymbol::Keep, Some((symbol, CurrencyPosition::Prefix))) => {
                format!("{}{}{}", sign, symbol, amount)
            }
            (CurrencySymbol::Keep, Some((symbol, CurrencyPosition::Suffix))) => {
                format!("{}{}{}", sign, amount, symbol)
            }
            _ => format!("{}{}", sign, amount),
        }
    }

    /// 設定された桁区切り文字を整数部に挿入する
    fn group(&self, number: &str) -> String {
        let Some(separator) = self.config.numeric_thousand_sep else {
            return number.to_string();
        };
        // 指数表記はそのまま
        if number.contains('E') {
            return number.to_string();
        }

        let (sign, unsigned) = match number.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", number),
        };
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (unsigned, None),
        };

        let mut result = format!("{}{}", sign, group_thousands(integer, separator));
        if let Some(fraction) = fraction {
            result.push('.');
            result.push_str(fraction);
        }
        result
    }
}

/// chrono形式で日時を書式化する（不正な形式の場合は`None`）
fn format_datetime(datetime: &NaiveDateTime, format_str: &str) -> Option<String> {
    let mut formatted = String::new();
    write!(formatted, "{}", datetime.format(format_str)).ok()?;
    Some(formatted)
}

/// 1900年エポックの0日目以前（シリアル値1未満）を時刻のみの値とみなす
fn is_time_only(datetime: &NaiveDateTime) -> bool {
    NaiveDate::from_ymd_opt(1900, 1, 1).is_some_and(|first_day| datetime.date() < first_day)
}

fn trim_trailing_zeros(number: &str) -> String {
    if number.contains('.') {
        number
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        number.to_string()
    }
}

/// Markdownエスケープを適用する
///
/// # 引数
///
/// * `text` - エスケープする文字列
/// * `level` - エスケープのレベル
pub(crate) fn escape_markdown(text: &str, level: MarkdownEscapeLevel) -> String {
    match level {
        MarkdownEscapeLevel::None => text.to_string(),
        MarkdownEscapeLevel::PipesOnly => text.replace('|', "\\|"),
        MarkdownEscapeLevel::Full => {
            let mut escaped = String::with_capacity(text.len());
            for ch in text.chars() {
                if MARKDOWN_SPECIALS.contains(&ch) {
                    escaped.push('\\');
                }
                escaped.push(ch);
            }
            escaped
        }
    }
}

/// `escape_markdown`で付加したバックスラッシュを取り除く
pub(crate) fn unescape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if MARKDOWN_SPECIALS.contains(&next) {
                    result.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        result.push(ch);
    }
    result
}
