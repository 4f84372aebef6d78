//! Parser Module
//!
//! XLSXファイルを読み込み、シートモデル（`Worksheet`）を構築するモジュール。
//! セルの値と結合範囲はcalamineで取得し、calamineが扱わない情報
//! （数値書式、非表示行・列、印刷範囲、ハイパーリンク、図形）はXMLから直接取得します。

mod archive;
mod drawing;
mod metadata;
mod workbook;

pub(crate) use workbook::XlsxLoader;
