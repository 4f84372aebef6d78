//! Archive Module
//!
//! XLSX（ZIPアーカイブ）内のパートを安全に読み出すモジュール。
//! ZIP bomb、パストラバーサルへの対策として、エントリ数・サイズ・パスを検証します。

use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::XlsxMdError;

/// アーカイブの制限値
#[derive(Debug, Clone)]
pub(crate) struct ArchiveLimits {
    /// 入力ファイルの最大サイズ（バイト）。デフォルト: 2GB
    pub max_input_size: u64,
    /// エントリの最大数。デフォルト: 10000
    pub max_entries: usize,
    /// 単一エントリの展開後の最大サイズ（バイト）。デフォルト: 100MB
    pub max_entry_size: u64,
    /// 展開後の合計の最大サイズ（バイト）。デフォルト: 1GB
    pub max_total_size: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_input_size: 2_147_483_648,
            max_entries: 10_000,
            max_entry_size: 104_857_600,
            max_total_size: 1_073_741_824,
        }
    }
}

impl ArchiveLimits {
    /// 入力サイズを検証
    pub fn check_input_size(&self, size: u64) -> Result<(), XlsxMdError> {
        if size > self.max_input_size {
            return Err(XlsxMdError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                size, self.max_input_size
            )));
        }
        Ok(())
    }
}

/// パート名の検証
///
/// 空のパス、絶対パス、`..`、バックスラッシュを含むパスを拒否します。
pub(crate) fn validate_part_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }
    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive {
        return Err(format!("Absolute path is not allowed: {}", path));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }
    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }
    Ok(())
}

/// リレーションシップのターゲットをアーカイブ内のパート名に解決する
///
/// # 引数
///
/// * `base_dir` - 参照元パートのディレクトリ（例: `xl/worksheets`）
/// * `target` - `Target`属性の値（相対パス、または`/`始まりの絶対パス）
///
/// # 戻り値
///
/// 正規化したパート名。アーカイブのルートより上を指す場合は`None`
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> Option<String> {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if base_dir.is_empty() => target.to_string(),
        None => format!("{}/{}", base_dir, target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

/// パート名のディレクトリ部分（`xl/worksheets/sheet1.xml` -> `xl/worksheets`）
pub(crate) fn part_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// パートに対応するリレーションシップのパート名
/// （`xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`）
pub(crate) fn rels_path(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", path),
    }
}

/// 検証済みのXLSXアーカイブ
pub(crate) struct XlsxArchive {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    limits: ArchiveLimits,
}

impl XlsxArchive {
    /// アーカイブを開き、エントリを検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(XlsxArchive)` - すべてのエントリが制限内の場合
    /// * `Err(XlsxMdError::SecurityViolation)` - 制限を超えた、または危険なパスを含む場合
    /// * `Err(XlsxMdError::Zip)` - ZIPとして読み込めない場合
    pub fn open(bytes: Vec<u8>, limits: ArchiveLimits) -> Result<Self, XlsxMdError> {
        limits.check_input_size(bytes.len() as u64)?;

        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| XlsxMdError::Zip(format!("{}", e)))?;

        // 1. エントリ数
        if archive.len() > limits.max_entries {
            return Err(XlsxMdError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                limits.max_entries
            )));
        }

        // 2. パスとサイズ
        let mut total = 0u64;
        for i in 0..archive.len() {
            let file = archive
                .by_index(i)
                .map_err(|e| XlsxMdError::Zip(format!("{}", e)))?;
            let name = file.name();
            validate_part_path(name).map_err(|e| {
                XlsxMdError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            let size = file.size();
            if size > limits.max_entry_size {
                return Err(XlsxMdError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    name, size, limits.max_entry_size
                )));
            }
            total = total.checked_add(size).ok_or_else(|| {
                XlsxMdError::SecurityViolation(
                    "Total decompressed size calculation overflow".to_string(),
                )
            })?;
            if total > limits.max_total_size {
                return Err(XlsxMdError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total, limits.max_total_size
                )));
            }
        }

        Ok(Self { archive, limits })
    }

    /// パートの内容を読み出す（存在しない場合は`None`）
    pub fn read_part(&mut self, path: &str) -> Result<Option<Vec<u8>>, XlsxMdError> {
        validate_part_path(path)
            .map_err(|e| XlsxMdError::SecurityViolation(format!("Invalid ZIP path: {}", e)))?;

        let file = match self.archive.by_name(path) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(XlsxMdError::Zip(format!("{}", e))),
        };

        // 宣言されたサイズを超えて展開しない
        let mut content = Vec::new();
        file.take(self.limits.max_entry_size + 1)
            .read_to_end(&mut content)?;
        if content.len() as u64 > self.limits.max_entry_size {
            return Err(XlsxMdError::SecurityViolation(format!(
                "File '{}' exceeds maximum size when decompressed",
                path
            )));
        }
        Ok(Some(content))
    }
}
