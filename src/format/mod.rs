//! Format Module
//!
//! Excel Number Format Stringの構文解析と適用を提供します。

mod parser;
mod sections;
mod tokens;

pub use parser::serial_to_datetime;
pub(crate) use parser::{
    builtin_format, format_general, group_thousands, CurrencyPosition, FormatKind, NumberFormat,
};
