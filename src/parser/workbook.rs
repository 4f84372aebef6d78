//! Workbook Loader Module
//!
//! calamineとXMLメタデータを組み合わせて、シートモデルを構築するモジュール。

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets, Xlsx};
use chrono::NaiveDateTime;
use std::io::{Cursor, Read};

use crate::error::XlsxMdError;
use crate::format::{serial_to_datetime, NumberFormat};
use crate::parser::archive::{ArchiveLimits, XlsxArchive};
use crate::parser::drawing::parse_drawing_xml;
use crate::parser::metadata::{print_area_rects, SheetXmlInfo, WorkbookMetadata};
use crate::sheet::{SheetCell, Worksheet};
use crate::types::{CellCoord, CellValue, Rect};

/// Excelの最大行数
const MAX_ROWS: u32 = 1_048_576;
/// Excelの最大列数
const MAX_COLS: u32 = 16_384;

/// XLSXローダー
///
/// calamineのラッパーとして、シート単位で`Worksheet`を構築します。
pub(crate) struct XlsxLoader {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    /// アーカイブ（XMLメタデータの取得用）
    archive: XlsxArchive,
    /// ワークブック全体のメタデータ
    metadata: WorkbookMetadata,
}

impl XlsxLoader {
    /// ワークブックを開き、XMLメタデータを解析する
    ///
    /// # 引数
    ///
    /// * `reader` - Excelファイルを読み込むためのリーダー
    ///
    /// # 戻り値
    ///
    /// * `Ok(XlsxLoader)` - ワークブックの読み込みに成功した場合
    /// * `Err(XlsxMdError::SecurityViolation)` - アーカイブが制限を超えた場合
    /// * `Err(XlsxMdError::Parse)` - XLSXとして読み込めない場合
    pub fn open<R: Read>(mut reader: R) -> Result<Self, XlsxMdError> {
        let limits = ArchiveLimits::default();

        // 1. ファイル全体をメモリに読み込む（サイズ制限を適用）
        let mut buffer = Vec::new();
        reader
            .by_ref()
            .take(limits.max_input_size + 1)
            .read_to_end(&mut buffer)?;
        limits.check_input_size(buffer.len() as u64)?;

        // 2. アーカイブの検証（calamineに渡す前に行う）
        let mut archive = XlsxArchive::open(buffer.clone(), limits)?;

        // 3. calamineでワークブックを開く
        let sheets = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        let workbook = match sheets {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(XlsxMdError::Config(
                    "Only XLSX format is supported".to_string(),
                ))
            }
        };

        // 4. XMLメタデータ
        let metadata = WorkbookMetadata::parse(&mut archive)?;

        Ok(Self {
            workbook,
            archive,
            metadata,
        })
    }

    /// すべてのシート名を取得（ワークブック内の順序）
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シートを読み込み、`Worksheet`を構築する
    ///
    /// # 引数
    ///
    /// * `name` - シート名
    ///
    /// # 戻り値
    ///
    /// * `Ok(Worksheet)` - 読み込みに成功した場合
    /// * `Err(XlsxMdError::Sheet)` - シートが存在しない、または読み込めない場合
    pub fn load_sheet(&mut self, name: &str) -> Result<Worksheet, XlsxMdError> {
        let sheet_error = |message: String| XlsxMdError::Sheet {
            sheet: name.to_string(),
            message,
        };

        let date1904 = self.metadata.is_date1904();
        let mut sheet = Worksheet::new(name);
        sheet.set_date1904(date1904);

        // 1. XMLメタデータ（スタイル、非表示行・列、ハイパーリンク、保護、描画）
        let part = self.metadata.sheet(name).cloned();
        let info = match part.as_ref().and_then(|p| p.path.as_deref()) {
            Some(path) => SheetXmlInfo::parse(&mut self.archive, path)?,
            None => SheetXmlInfo::default(),
        };

        // 2. セルの値
        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| sheet_error(e.to_string()))?;
        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));

        for (row, col, data) in range.used_cells() {
            let coord = CellCoord::new(
                row_offset + row as u32 + 1,
                col_offset + col as u32 + 1,
            );
            let value = convert_data(data, date1904);
            if value.is_empty() {
                continue;
            }

            let number_format = info
                .styles
                .get(&coord)
                .and_then(|style| self.metadata.number_format(*style))
                .map(str::to_string);
            let display = display_string(data, number_format.as_deref(), date1904);

            sheet.set_cell(
                coord.row,
                coord.col,
                SheetCell {
                    value,
                    display,
                    number_format,
                    hyperlink: info.hyperlinks.get(&coord).cloned(),
                },
            );
        }

        // 値を持たないセルに付いたハイパーリンク
        for (coord, target) in &info.hyperlinks {
            if sheet.cell(*coord).is_none() {
                sheet.set_hyperlink(coord.row, coord.col, target.clone());
            }
        }

        // 3. 結合範囲
        self.workbook
            .load_merged_regions()
            .map_err(|e| sheet_error(e.to_string()))?;
        if let Some(Ok(regions)) = self.workbook.worksheet_merge_cells(name) {
            for dims in regions {
                sheet.add_merge(Rect::new(
                    dims.start.0 + 1,
                    dims.start.1 + 1,
                    dims.end.0 + 1,
                    dims.end.1 + 1,
                ));
            }
        }

        // 4. 非表示行・列、印刷範囲、保護
        for row in &info.hidden_rows {
            sheet.hide_row(*row);
        }
        for col in &info.hidden_cols {
            sheet.hide_col(*col);
        }
        if let Some(part) = &part {
            for rect in print_area_rects(&part.print_areas, MAX_ROWS, MAX_COLS) {
                sheet.add_print_area(rect);
            }
        }
        sheet.set_protected(info.protected);

        // 5. 図形
        if let Some(drawing) = &info.drawing {
            if let Some(xml) = self.archive.read_part(drawing)? {
                for shape in parse_drawing_xml(&xml, drawing)? {
                    sheet.add_shape(shape);
                }
            }
        }

        tracing::debug!(
            sheet = name,
            merges = sheet.merges().len(),
            print_areas = sheet.print_areas().len(),
            shapes = sheet.shapes().len(),
            "Loaded worksheet"
        );

        Ok(sheet)
    }
}

/// calamineのセル値を変換する
fn convert_data(data: &Data, date1904: bool) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match serial_to_datetime(dt.as_f64(), date1904) {
            Some(datetime) => CellValue::DateTime(datetime),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::String(s.clone())),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

/// ISO 8601形式の日時をパース（日付のみも可）
fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
}

/// 数値書式を適用した表示文字列（Excelの表示を再現したもの）
fn display_string(data: &Data, number_format: Option<&str>, date1904: bool) -> Option<String> {
    let code = number_format?;
    let serial = match data {
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        Data::DateTime(dt) => dt.as_f64(),
        _ => return None,
    };
    Some(NumberFormat::parse(code).render(serial, date1904))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_convert_data() {
        assert_eq!(convert_data(&Data::Int(3), false), CellValue::Number(3.0));
        assert_eq!(convert_data(&Data::Float(1.5), false), CellValue::Number(1.5));
        assert_eq!(
            convert_data(&Data::String("x".to_string()), false),
            CellValue::String("x".to_string())
        );
        assert_eq!(convert_data(&Data::Bool(true), false), CellValue::Bool(true));
        assert_eq!(
            convert_data(&Data::Error(CellErrorType::Div0), false),
            CellValue::Error("#DIV/0!".to_string())
        );
        assert_eq!(convert_data(&Data::Empty, false), CellValue::Empty);
    }

    #[test]
    fn test_parse_iso_datetime() {
        let dt = parse_iso_datetime("2024-03-15T10:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-03-15 10:30:00");
        let date = parse_iso_datetime("2024-03-15").unwrap();
        assert_eq!(date.to_string(), "2024-03-15 00:00:00");
        assert!(parse_iso_datetime("yesterday").is_none());
        assert_eq!(
            convert_data(&Data::DateTimeIso("soon".to_string()), false),
            CellValue::String("soon".to_string())
        );
    }

    #[test]
    fn test_display_string() {
        assert_eq!(
            display_string(&Data::Float(1234.5), Some("#,##0.00"), false).as_deref(),
            Some("1,234.50")
        );
        assert_eq!(display_string(&Data::Float(1.0), None, false), None);
        assert_eq!(
            display_string(&Data::String("a".to_string()), Some("0.00"), false),
            None
        );
    }
}
