//! NumberFormat Module
//!
//! Excel Number Format Stringの解析結果と、数値への適用を提供します。

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use super::sections::{select_section, split_sections, FormatSection};
use super::tokens::{DatePart, DigitKind, ElapsedUnit, FormatToken};

/// Excelのシリアル値の上限（9999-12-31）
const MAX_SERIAL: f64 = 2_958_466.0;

/// 書式の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormatKind {
    General,
    Number,
    Percent,
    Currency,
    Date,
    Text,
}

/// 通貨記号の位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CurrencyPosition {
    Prefix,
    Suffix,
}

/// 解析済みのNumber Format String
#[derive(Debug, Clone)]
pub(crate) struct NumberFormat {
    sections: Vec<FormatSection>,
}

impl NumberFormat {
    /// 書式文字列を解析する
    ///
    /// 解析は失敗しません。解釈できない要素はリテラルとして扱います。
    pub fn parse(code: &str) -> Self {
        let sections = split_sections(code)
            .iter()
            .map(|source| FormatSection::parse(source))
            .collect();

        Self { sections }
    }

    fn primary(&self) -> Option<&FormatSection> {
        self.sections.first()
    }

    /// 正数セクションに基づく書式の分類
    pub fn kind(&self) -> FormatKind {
        let Some(section) = self.primary() else {
            return FormatKind::General;
        };

        if section.is_datetime() {
            FormatKind::Date
        } else if section.percent_count() > 0 {
            FormatKind::Percent
        } else if self.currency().is_some() && section.is_numeric() {
            FormatKind::Currency
        } else if section.is_numeric() {
            FormatKind::Number
        } else if section.tokens.iter().any(|t| matches!(t, FormatToken::Text)) {
            FormatKind::Text
        } else {
            FormatKind::General
        }
    }

    /// 小数部の桁数（正数セクション）
    pub fn decimals(&self) -> usize {
        self.primary()
            .map(|section| NumericLayout::from_tokens(&section.tokens).decimals())
            .unwrap_or(0)
    }

    /// 通貨記号と、数値に対する位置（正数セクション）
    pub fn currency(&self) -> Option<(String, CurrencyPosition)> {
        let section = self.primary()?;
        let mut seen_digit = false;
        for token in &section.tokens {
            match token {
                FormatToken::Digit(_) => seen_digit = true,
                FormatToken::Currency(symbol) => {
                    let position = if seen_digit {
                        CurrencyPosition::Suffix
                    } else {
                        CurrencyPosition::Prefix
                    };
                    return Some((symbol.clone(), position));
                }
                _ => {}
            }
        }
        None
    }

    /// 数値に書式を適用した表示文字列を生成する
    ///
    /// # 引数
    ///
    /// * `value` - セルの数値（日付書式の場合はシリアル値）
    /// * `date1904` - 1904年エポックを使用するか
    pub fn render(&self, value: f64, date1904: bool) -> String {
        let Some((section, needs_sign)) = select_section(&self.sections, value) else {
            return format_general(value);
        };

        // 1. 日付・時刻
        if section.is_datetime() {
            return render_datetime(&section.tokens, value, date1904)
                .unwrap_or_else(|| format_general(value));
        }

        // 2. 負数セクションは絶対値を書式化する
        let magnitude = if value < 0.0 { value.abs() } else { value };
        let sign = if needs_sign { "-" } else { "" };

        // 3. 数値
        if section.is_numeric() {
            return format!("{}{}", sign, render_numeric(&section.tokens, magnitude));
        }

        // 4. General、またはリテラルのみのセクション
        let mut result = String::from(sign);
        let mut emitted_value = false;
        for token in &section.tokens {
            match token {
                FormatToken::General => {
                    result.push_str(&format_general(magnitude));
                    emitted_value = true;
                }
                FormatToken::Literal(text) | FormatToken::Currency(text) => result.push_str(text),
                _ => {}
            }
        }
        if !emitted_value && section.tokens.is_empty() {
            result.push_str(&format_general(magnitude));
        }
        result
    }
}

/// 数値書式の構造（整数部・小数部の桁数、区切り、スケール）
#[derive(Debug, Default)]
struct NumericLayout {
    integer_min: usize,
    decimal_zero: usize,
    decimal_optional: usize,
    has_decimal_point: bool,
    grouping: bool,
    scale_thousands: i32,
    percent_count: i32,
    exponent: Option<(bool, usize)>,
}

impl NumericLayout {
    fn from_tokens(tokens: &[FormatToken]) -> Self {
        let mut layout = NumericLayout::default();
        let mut in_decimal = false;
        let mut in_exponent = false;
        let mut exponent_digits = 0;

        for (i, token) in tokens.iter().enumerate() {
            match token {
                FormatToken::Digit(kind) if in_exponent => {
                    if *kind == DigitKind::Zero {
                        exponent_digits += 1;
                    }
                }
                FormatToken::Digit(kind) if in_decimal => match kind {
                    DigitKind::Zero | DigitKind::Question => layout.decimal_zero += 1,
                    DigitKind::Hash => layout.decimal_optional += 1,
                },
                FormatToken::Digit(kind) => {
                    if *kind != DigitKind::Hash {
                        layout.integer_min += 1;
                    }
                }
                FormatToken::DecimalPoint if !in_exponent => {
                    in_decimal = true;
                    layout.has_decimal_point = true;
                }
                FormatToken::Comma if !in_decimal && !in_exponent => {
                    // 後続に整数部の桁があれば桁区切り、なければスケーリング
                    let digit_follows = tokens[i + 1..]
                        .iter()
                        .take_while(|t| !matches!(t, FormatToken::DecimalPoint))
                        .any(|t| matches!(t, FormatToken::Digit(_)));
                    if digit_follows {
                        layout.grouping = true;
                    } else {
                        layout.scale_thousands += 1;
                    }
                }
                FormatToken::Comma if in_decimal => layout.scale_thousands += 1,
                FormatToken::Percent => layout.percent_count += 1,
                FormatToken::Exponent(plus) => {
                    in_exponent = true;
                    layout.exponent = Some((*plus, 0));
                }
                _ => {}
            }
        }

        if let Some((plus, _)) = layout.exponent {
            layout.exponent = Some((plus, exponent_digits.max(1)));
        }
        layout
    }

    fn decimals(&self) -> usize {
        self.decimal_zero + self.decimal_optional
    }

    fn format(&self, value: f64) -> String {
        let mut scaled = value * 100f64.powi(self.percent_count);
        scaled /= 1000f64.powi(self.scale_thousands);

        match self.exponent {
            Some((plus, digits)) => self.format_scientific(scaled, plus, digits),
            None => self.format_fixed(scaled),
        }
    }

    fn format_fixed(&self, value: f64) -> String {
        let formatted = format!("{:.*}", self.decimals(), value.abs());
        let (integer, fraction) = match formatted.split_once('.') {
            Some((i, f)) => (i.to_string(), f.to_string()),
            None => (formatted, String::new()),
        };

        // 1. 整数部（最小桁数までゼロ埋め、`#`のみなら0を出力しない）
        let mut integer = if integer == "0" && self.integer_min == 0 {
            String::new()
        } else {
            integer
        };
        while integer.len() < self.integer_min {
            integer.insert(0, '0');
        }
        if self.grouping {
            integer = group_thousands(&integer, ',');
        }

        // 2. 小数部（任意桁の末尾の0を除去）
        let mut fraction = fraction;
        while fraction.len() > self.decimal_zero && fraction.ends_with('0') {
            fraction.pop();
        }

        if self.has_decimal_point && (!fraction.is_empty() || self.decimal_zero == 0) {
            if fraction.is_empty() {
                integer
            } else {
                format!("{}.{}", integer, fraction)
            }
        } else {
            integer
        }
    }

    fn format_scientific(&self, value: f64, plus: bool, digits: usize) -> String {
        let abs = value.abs();
        let mut exponent = if abs == 0.0 {
            0
        } else {
            abs.log10().floor() as i32
        };
        let mut mantissa = if abs == 0.0 {
            0.0
        } else {
            abs / 10f64.powi(exponent)
        };

        let factor = 10f64.powi(self.decimals() as i32);
        if (mantissa * factor).round() / factor >= 10.0 {
            mantissa /= 10.0;
            exponent += 1;
        }

        let fixed = NumericLayout {
            integer_min: self.integer_min.max(1),
            exponent: None,
            grouping: false,
            scale_thousands: 0,
            percent_count: 0,
            ..*self
        };
        let sign = if exponent < 0 {
            "-"
        } else if plus {
            "+"
        } else {
            ""
        };
        format!(
            "{}E{}{:0width$}",
            fixed.format_fixed(mantissa),
            sign,
            exponent.abs(),
            width = digits
        )
    }
}

/// 数値セクションを描画する（リテラルと記号は数値の前後に配置）
fn render_numeric(tokens: &[FormatToken], value: f64) -> String {
    let layout = NumericLayout::from_tokens(tokens);
    let number = layout.format(value);

    let mut result = String::new();
    let mut emitted = false;
    for token in tokens {
        match token {
            FormatToken::Digit(_)
            | FormatToken::DecimalPoint
            | FormatToken::Comma
            | FormatToken::Exponent(_) => {
                if !emitted {
                    result.push_str(&number);
                    emitted = true;
                }
            }
            FormatToken::Percent => result.push('%'),
            FormatToken::Literal(text) | FormatToken::Currency(text) => result.push_str(text),
            _ => {}
        }
    }
    result
}

/// 日付・時刻セクションを描画する
fn render_datetime(tokens: &[FormatToken], value: f64, date1904: bool) -> Option<String> {
    let datetime = serial_to_datetime(value, date1904)?;
    let twelve_hour = tokens.iter().any(|t| matches!(t, FormatToken::AmPm));

    let mut result = String::new();
    for token in tokens {
        match token {
            FormatToken::Date(part) => match *part {
                DatePart::Year(n) if n <= 2 => {
                    result.push_str(&format!("{:02}", datetime.year() % 100))
                }
                DatePart::Year(_) => result.push_str(&format!("{:04}", datetime.year())),
                DatePart::Month(n) => result.push_str(&month_text(datetime.month(), n)),
                DatePart::Day(n) => result.push_str(&day_text(&datetime, n)),
                DatePart::Hour(n) => {
                    let hour = if twelve_hour {
                        match datetime.hour() % 12 {
                            0 => 12,
                            h => h,
                        }
                    } else {
                        datetime.hour()
                    };
                    result.push_str(&pad(hour, n));
                }
                DatePart::Minute(n) => result.push_str(&pad(datetime.minute(), n)),
                DatePart::Second(n) => result.push_str(&pad(datetime.second(), n)),
            },
            FormatToken::AmPm => {
                result.push_str(if datetime.hour() < 12 { "AM" } else { "PM" });
            }
            FormatToken::Elapsed(unit) => {
                let total = match unit {
                    ElapsedUnit::Hours => value * 24.0,
                    ElapsedUnit::Minutes => value * 1_440.0,
                    ElapsedUnit::Seconds => value * 86_400.0,
                };
                result.push_str(&format!("{}", (total + 1e-9).floor() as i64));
            }
            FormatToken::Literal(text) | FormatToken::Currency(text) => result.push_str(text),
            FormatToken::Digit(DigitKind::Zero) => {
                // 秒の小数部（例: mm:ss.0）は切り捨てて表示
                result.push('0');
            }
            FormatToken::DecimalPoint => result.push('.'),
            _ => {}
        }
    }
    Some(result)
}

fn pad(value: u32, width: usize) -> String {
    if width >= 2 {
        format!("{:02}", value)
    } else {
        value.to_string()
    }
}

fn month_text(month: u32, width: usize) -> String {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    let name = NAMES[(month as usize - 1) % 12];
    match width {
        1 | 2 => pad(month, width),
        3 => name[..3].to_string(),
        5 => name[..1].to_string(),
        _ => name.to_string(),
    }
}

fn day_text(datetime: &NaiveDateTime, width: usize) -> String {
    const NAMES: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    let name = NAMES[datetime.weekday().num_days_from_monday() as usize];
    match width {
        1 | 2 => pad(datetime.day(), width),
        3 => name[..3].to_string(),
        _ => name.to_string(),
    }
}

/// 整数部の文字列に桁区切りを挿入する
pub(crate) fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.chars().count();
    let mut result = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(separator);
        }
        result.push(ch);
    }
    result
}

/// Excelの`General`書式に相当する数値表現
///
/// 整数は小数点なし、それ以外は有効数字15桁で末尾の0を除去します。
/// 極端に大きい・小さい値は指数表記になります。
pub(crate) fn format_general(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if abs.fract() == 0.0 && abs < 1e15 {
        return format!("{}", value as i64);
    }
    if !(1e-9..1e15).contains(&abs) {
        let formatted = format!("{:.5E}", value);
        return match formatted.split_once('E') {
            Some((mantissa, exponent)) => {
                let mantissa = trim_fraction(mantissa);
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ("-", digits),
                    None => ("+", exponent),
                };
                format!("{}E{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    let integer_digits = (abs.log10().floor() as i32 + 1).max(1);
    let decimals = (15 - integer_digits).clamp(0, 15) as usize;
    trim_fraction(&format!("{:.*}", decimals, value)).to_string()
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Excelのシリアル値を日時に変換する
///
/// 1900年エポックでは、存在しない1900-02-29（シリアル値60）を境に基準日がずれる点を考慮します。
///
/// # 戻り値
///
/// * `Some(NaiveDateTime)` - 変換できた場合（ミリ秒単位に丸める）
/// * `None` - 負の値、上限超過、または非有限値の場合
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_SERIAL).contains(&serial) {
        return None;
    }

    let base = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let millis = (serial * 86_400_000.0).round() as i64;
    base.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// ビルトイン書式ID（0-49）のマッピング
///
/// Excelの標準書式IDとフォーマット文字列の対応表です。
pub(crate) fn builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        5 => Some("$#,##0_);($#,##0)"),
        6 => Some("$#,##0_);[Red]($#,##0)"),
        7 => Some("$#,##0.00_);($#,##0.00)"),
        8 => Some("$#,##0.00_);[Red]($#,##0.00)"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0_);(#,##0)"),
        38 => Some("#,##0_);[Red](#,##0)"),
        39 => Some("#,##0.00_);(#,##0.00)"),
        40 => Some("#,##0.00_);[Red](#,##0.00)"),
        41 => Some("_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)"),
        42 => Some("_($* #,##0_);_($* (#,##0);_($* \"-\"_);_(@_)"),
        43 => Some("_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)"),
        44 => Some("_($* #,##0.00_);_($* (#,##0.00);_($* \"-\"??_);_(@_)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mm:ss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}
