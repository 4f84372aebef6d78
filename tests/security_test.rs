//! Security Tests
//!
//! 不正なアーカイブに対する防御を検証します。
//! ZIP bomb（エントリ数・展開サイズ）、パストラバーサル、不正なXMLを対象とします。

use std::io::{Cursor, Write};
use xlsxmd::{ConverterBuilder, XlsxMdError};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip_data = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_data));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }
    zip_data
}

fn convert(data: Vec<u8>) -> Result<String, XlsxMdError> {
    ConverterBuilder::new()
        .build()
        .unwrap()
        .convert_to_string(Cursor::new(data))
}

/// ZIP bomb攻撃のテスト: 大量のファイルを含むZIPアーカイブ
#[test]
fn test_zip_bomb_too_many_files() {
    // 10,001個のファイル（上限: 10,000）
    let names: Vec<String> = (0..10_001).map(|i| format!("xl/file{}.xml", i)).collect();
    let entries: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), &b"test"[..])).collect();

    match convert(build_zip(&entries)) {
        Err(XlsxMdError::SecurityViolation(msg)) => assert!(msg.contains("too many files")),
        other => panic!("Expected SecurityViolation, got {:?}", other),
    }
}

/// ZIP bomb攻撃のテスト: 展開後のサイズが大きすぎるエントリ
#[test]
#[ignore] // 100MBを超えるデータを生成するため、通常のテストではスキップ
fn test_zip_bomb_large_entry() {
    let large = vec![0u8; 104_857_601];
    match convert(build_zip(&[("xl/large.xml", &large)])) {
        Err(XlsxMdError::SecurityViolation(msg)) => assert!(msg.contains("exceeds maximum size")),
        other => panic!("Expected SecurityViolation, got {:?}", other),
    }
}

/// パストラバーサル攻撃のテスト: `..`を含むパス
#[test]
fn test_path_traversal_dotdot() {
    let data = build_zip(&[("../../etc/passwd", b"root:x:0:0")]);
    match convert(data) {
        Err(XlsxMdError::SecurityViolation(msg)) => assert!(msg.contains("Invalid ZIP path")),
        other => panic!("Expected SecurityViolation, got {:?}", other),
    }
}

/// パストラバーサル攻撃のテスト: 絶対パス
#[test]
fn test_path_traversal_absolute() {
    let data = build_zip(&[("/etc/passwd", b"root:x:0:0")]);
    assert!(matches!(
        convert(data),
        Err(XlsxMdError::SecurityViolation(_))
    ));
}

/// パストラバーサル攻撃のテスト: バックスラッシュ
#[test]
fn test_path_traversal_backslash() {
    let data = build_zip(&[("xl\\..\\..\\evil.xml", b"<x/>")]);
    assert!(matches!(
        convert(data),
        Err(XlsxMdError::SecurityViolation(_))
    ));
}

/// ZIPでない入力
#[test]
fn test_not_a_zip() {
    assert!(matches!(
        convert(b"definitely not a zip archive".to_vec()),
        Err(XlsxMdError::Zip(_))
    ));
}

/// XLSXの構造を持たないZIP
#[test]
fn test_zip_without_workbook() {
    let data = build_zip(&[("hello.txt", b"hello")]);
    assert!(convert(data).is_err());
}
