//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! テーブル分割・抽出・出力判定のコア処理はエラーを返さない。
//! 曖昧な入力は決定的なルールで解決され、打ち切りはフラグ、
//! 図の検出失敗はテーブル出力へのフォールバックとして表現される。
//! ここで定義するエラーは、ファイルの読み込みと設定の検証に由来するものに限られる。

use thiserror::Error;

/// xlsxmdクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse`: calamineによるExcelファイルの解析エラー
/// - `Xml` / `Zip`: XLSXアーカイブ内部の解析エラー
/// - `Config` / `ConfigJson`: 設定の検証・読み込みエラー
/// - `Sheet`: 特定のシートの読み込みに失敗したエラー
/// - `SecurityViolation`: アーカイブのサイズ制限やパス検証に違反したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxmd::XlsxMdError;
/// use std::fs::File;
///
/// fn read_excel_file(path: &str) -> Result<(), XlsxMdError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxMdError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLパートの解析エラー
    #[error("XML error in '{part}': {message}")]
    Xml {
        /// 解析対象のパート名（例: `xl/workbook.xml`）
        part: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// 数値の解析エラー
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsxmd::{ConverterBuilder, XlsxMdError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_numbers_right_threshold(1.5)  // 範囲外の閾値
    ///     .build();
    ///
    /// match result {
    ///     Err(XlsxMdError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON形式の設定の読み込みエラー
    #[error("Configuration JSON error: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// シート単位の読み込みエラー
    ///
    /// 変換処理ではこのエラーをシートごとに捕捉し、残りのシートの処理を継続します。
    #[error("Failed to load sheet '{sheet}': {message}")]
    Sheet {
        /// エラーが発生したシート名
        sheet: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、ファイルサイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl XlsxMdError {
    /// XMLパートの解析エラーを生成するヘルパー
    pub(crate) fn xml(part: &str, message: impl std::fmt::Display) -> Self {
        XlsxMdError::Xml {
            part: part.to_string(),
            message: message.to_string(),
        }
    }
}
