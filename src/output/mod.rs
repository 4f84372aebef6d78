//! Output Rendering Module
//!
//! 抽出した行データをMarkdownの各表現（テーブル、入れ子のリスト、コードブロック）に
//! 変換するモジュール。

mod blocks;
mod table;

pub(crate) use blocks::{render_code, render_nested};
pub use table::make_markdown_table;
