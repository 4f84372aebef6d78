//! XML Metadata Parser Module
//!
//! XLSX内部のXMLから、calamineで取得できない情報を抽出するモジュール。
//!
//! - `xl/workbook.xml`: シートとパートの対応、印刷範囲、1904年エポック
//! - `xl/styles.xml`: スタイルIDからNumber Format Stringへの対応
//! - `xl/worksheets/*.xml`: 非表示行・列、セルのスタイルID、ハイパーリンク、シート保護、描画パート

use std::collections::{BTreeSet, HashMap};

use quick_xml::escape::unescape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::XlsxMdError;
use crate::format::builtin_format;
use crate::parser::archive::{part_dir, rels_path, resolve_target, XlsxArchive};
use crate::types::{CellCoord, Rect};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const STYLES_PART: &str = "xl/styles.xml";

/// ワークブック内の1シート
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetPart {
    /// シート名
    pub name: String,
    /// ワークシートのパート名（例: `xl/worksheets/sheet1.xml`）
    pub path: Option<String>,
    /// 印刷範囲の参照文字列（シート名と`$`を除いたもの。例: `A1:C10`）
    pub print_areas: Vec<String>,
}

/// ワークブック全体のメタデータ
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkbookMetadata {
    sheets: Vec<SheetPart>,
    date1904: bool,
    /// numFmtId -> formatCode（カスタム書式）
    num_formats: HashMap<u32, String>,
    /// スタイルID -> numFmtId
    cell_xfs: Vec<u32>,
}

impl WorkbookMetadata {
    /// ワークブックとスタイルのXMLを解析する
    pub fn parse(archive: &mut XlsxArchive) -> Result<Self, XlsxMdError> {
        let mut metadata = WorkbookMetadata::default();

        // 1. xl/workbook.xml
        let Some(workbook_xml) = archive.read_part(WORKBOOK_PART)? else {
            return Ok(metadata);
        };
        let (sheets, rel_ids, date1904) = parse_workbook_xml(&workbook_xml)?;

        // 2. xl/_rels/workbook.xml.rels
        let relationships = match archive.read_part(&rels_path(WORKBOOK_PART))? {
            Some(xml) => parse_relationships(&xml, &rels_path(WORKBOOK_PART))?,
            None => HashMap::new(),
        };
        metadata.sheets = sheets
            .into_iter()
            .zip(rel_ids)
            .map(|(mut sheet, rel_id)| {
                sheet.path = rel_id
                    .and_then(|id| relationships.get(&id))
                    .and_then(|target| resolve_target(part_dir(WORKBOOK_PART), target));
                sheet
            })
            .collect();
        metadata.date1904 = date1904;

        // 3. xl/styles.xml
        if let Some(styles_xml) = archive.read_part(STYLES_PART)? {
            let (num_formats, cell_xfs) = parse_styles_xml(&styles_xml)?;
            metadata.num_formats = num_formats;
            metadata.cell_xfs = cell_xfs;
        }

        Ok(metadata)
    }

    /// 名前でシートを検索
    pub fn sheet(&self, name: &str) -> Option<&SheetPart> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// 1904年エポックを使用するか
    pub fn is_date1904(&self) -> bool {
        self.date1904
    }

    /// スタイルIDからNumber Format Stringを取得（`General`の場合は`None`）
    pub fn number_format(&self, style_id: u32) -> Option<&str> {
        let num_fmt_id = *self.cell_xfs.get(style_id as usize)?;
        let code = match self.num_formats.get(&num_fmt_id) {
            Some(code) => code.as_str(),
            None => builtin_format(num_fmt_id)?,
        };
        (!code.eq_ignore_ascii_case("general")).then_some(code)
    }
}

/// ワークシートXMLから取得するシート単位の情報
#[derive(Debug, Clone, Default)]
pub(crate) struct SheetXmlInfo {
    /// 非表示行（1始まり）
    pub hidden_rows: BTreeSet<u32>,
    /// 非表示列（1始まり）
    pub hidden_cols: BTreeSet<u32>,
    /// セル座標 -> スタイルID
    pub styles: HashMap<CellCoord, u32>,
    /// セル座標 -> ハイパーリンクのターゲット
    pub hyperlinks: HashMap<CellCoord, String>,
    /// シートが保護されているか
    pub protected: bool,
    /// 描画パート名
    pub drawing: Option<String>,
}

impl SheetXmlInfo {
    /// ワークシートのパートと、そのリレーションシップを解析する
    pub fn parse(archive: &mut XlsxArchive, path: &str) -> Result<Self, XlsxMdError> {
        let Some(xml) = archive.read_part(path)? else {
            return Ok(Self::default());
        };
        let relationships = match archive.read_part(&rels_path(path))? {
            Some(rels) => parse_relationships(&rels, &rels_path(path))?,
            None => HashMap::new(),
        };
        parse_worksheet_xml(&xml, path, &relationships)
    }
}

/// 要素の属性を (キー, 値) の組で列挙する
fn attributes(e: &BytesStart<'_>, part: &str) -> Result<Vec<(Vec<u8>, String)>, XlsxMdError> {
    let mut result = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XlsxMdError::xml(part, format!("attribute error: {}", e)))?;
        let value = attribute_value(&attr, part)?;
        result.push((attr.key.as_ref().to_vec(), value));
    }
    Ok(result)
}

/// 属性値をUTF-8として読み、実体参照を展開する
pub(crate) fn attribute_value(attr: &Attribute<'_>, part: &str) -> Result<String, XlsxMdError> {
    let raw = std::str::from_utf8(&attr.value)?;
    let value = unescape(raw).map_err(|e| XlsxMdError::xml(part, e))?;
    Ok(value.into_owned())
}

fn is_true(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// xl/workbook.xml の解析
///
/// # 戻り値
///
/// (シート一覧, 各シートのリレーションシップID, 1904年エポック)
#[allow(clippy::type_complexity)]
fn parse_workbook_xml(
    xml: &[u8],
) -> Result<(Vec<SheetPart>, Vec<Option<String>>, bool), XlsxMdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    let mut rel_ids = Vec::new();
    let mut date1904 = false;
    // (localSheetId, 参照文字列)
    let mut print_area: Option<Option<usize>> = None;
    let mut print_areas: Vec<(usize, String)> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"sheet" => {
                    // <sheet name="Sheet1" sheetId="1" r:id="rId1"/>
                    let mut name = None;
                    let mut rel_id = None;
                    for (key, value) in attributes(&e, WORKBOOK_PART)? {
                        match key.as_slice() {
                            b"name" => name = Some(value),
                            b"r:id" => rel_id = Some(value),
                            _ => {}
                        }
                    }
                    if let Some(name) = name {
                        sheets.push(SheetPart {
                            name,
                            path: None,
                            print_areas: Vec::new(),
                        });
                        rel_ids.push(rel_id);
                    }
                }
                b"workbookPr" => {
                    // <workbookPr date1904="1"/>
                    for (key, value) in attributes(&e, WORKBOOK_PART)? {
                        if key == b"date1904" {
                            date1904 = is_true(&value);
                        }
                    }
                }
                b"definedName" => {
                    // <definedName name="_xlnm.Print_Area" localSheetId="0">Sheet1!$A$1:$C$10</definedName>
                    let mut is_print_area = false;
                    let mut local_sheet_id = None;
                    for (key, value) in attributes(&e, WORKBOOK_PART)? {
                        match key.as_slice() {
                            b"name" => is_print_area = value == "_xlnm.Print_Area",
                            b"localSheetId" => local_sheet_id = value.parse::<usize>().ok(),
                            _ => {}
                        }
                    }
                    if is_print_area {
                        print_area = Some(local_sheet_id);
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if let Some(local_sheet_id) = print_area {
                    let text = e.unescape().map_err(|e| XlsxMdError::xml(WORKBOOK_PART, e))?;
                    for (sheet_name, reference) in split_print_area(&text) {
                        // localSheetIdがなければ、参照に含まれるシート名から対応付ける
                        let index = local_sheet_id.or_else(|| {
                            sheet_name.and_then(|name| sheets.iter().position(|s| s.name == name))
                        });
                        if let Some(index) = index {
                            print_areas.push((index, reference));
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"definedName" {
                    print_area = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxMdError::xml(WORKBOOK_PART, e)),
            _ => {}
        }
        buf.clear();
    }

    for (index, reference) in print_areas {
        if let Some(sheet) = sheets.get_mut(index) {
            sheet.print_areas.push(reference);
        }
    }

    Ok((sheets, rel_ids, date1904))
}

/// 印刷範囲の定義を、(シート名, `$`を除いた参照) の組に分解する
///
/// 例: `'My Sheet'!$A$1:$C$5,'My Sheet'!$E$1:$F$2`
fn split_print_area(text: &str) -> Vec<(Option<String>, String)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in text.chars() {
        match ch {
            '\'' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .filter_map(|part| {
            let part = part.trim();
            let (sheet, reference) = match part.rsplit_once('!') {
                Some((sheet, reference)) => {
                    let sheet = sheet
                        .strip_prefix('\'')
                        .and_then(|s| s.strip_suffix('\''))
                        .map(|s| s.replace("''", "'"))
                        .unwrap_or_else(|| sheet.to_string());
                    (Some(sheet), reference)
                }
                None => (None, part),
            };
            let reference = reference.replace('$', "");
            (!reference.is_empty()).then_some((sheet, reference))
        })
        .collect()
}

/// リレーションシップ（`*.rels`）の解析
///
/// # 戻り値
///
/// リレーションシップID -> ターゲット
fn parse_relationships(xml: &[u8], part: &str) -> Result<HashMap<String, String>, XlsxMdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut relationships = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = None;
                    let mut target = None;
                    for (key, value) in attributes(&e, part)? {
                        match key.as_slice() {
                            b"Id" => id = Some(value),
                            b"Target" => target = Some(value),
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target)) = (id, target) {
                        relationships.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxMdError::xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// xl/styles.xml の解析
///
/// # 戻り値
///
/// (numFmtId -> formatCode, スタイルID -> numFmtId)
fn parse_styles_xml(xml: &[u8]) -> Result<(HashMap<u32, String>, Vec<u32>), XlsxMdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut num_formats = HashMap::new();
    let mut cell_xfs = Vec::new();
    let mut in_num_fmts = false;
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"numFmts" => in_num_fmts = true,
                b"cellXfs" => in_cell_xfs = true,
                b"numFmt" if in_num_fmts => {
                    // <numFmt numFmtId="165" formatCode="0.000"/>
                    let mut id = None;
                    let mut code = None;
                    for (key, value) in attributes(&e, STYLES_PART)? {
                        match key.as_slice() {
                            b"numFmtId" => id = Some(value.parse::<u32>()?),
                            b"formatCode" => code = Some(value),
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        num_formats.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => {
                    // <xf numFmtId="165" fontId="0" fillId="0" borderId="0"/>
                    let mut num_fmt_id = 0;
                    for (key, value) in attributes(&e, STYLES_PART)? {
                        if key == b"numFmtId" {
                            num_fmt_id = value.parse::<u32>()?;
                        }
                    }
                    cell_xfs.push(num_fmt_id);
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"numFmts" => in_num_fmts = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxMdError::xml(STYLES_PART, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok((num_formats, cell_xfs))
}

/// ワークシートXMLの解析
fn parse_worksheet_xml(
    xml: &[u8],
    part: &str,
    relationships: &HashMap<String, String>,
) -> Result<SheetXmlInfo, XlsxMdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut info = SheetXmlInfo::default();
    let mut in_cols = false;
    let mut in_hyperlinks = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"cols" => in_cols = true,
                b"col" if in_cols => {
                    // <col min="3" max="4" hidden="1"/>
                    let (mut min, mut max, mut hidden) = (None, None, false);
                    for (key, value) in attributes(&e, part)? {
                        match key.as_slice() {
                            b"min" => min = Some(value.parse::<u32>()?),
                            b"max" => max = Some(value.parse::<u32>()?),
                            b"hidden" => hidden = is_true(&value),
                            _ => {}
                        }
                    }
                    if let (true, Some(min)) = (hidden, min) {
                        info.hidden_cols.extend(min..=max.unwrap_or(min));
                    }
                }
                b"row" => {
                    // <row r="15" hidden="1">
                    let (mut row, mut hidden) = (None, false);
                    for (key, value) in attributes(&e, part)? {
                        match key.as_slice() {
                            b"r" => row = Some(value.parse::<u32>()?),
                            b"hidden" => hidden = is_true(&value),
                            _ => {}
                        }
                    }
                    if let (true, Some(row)) = (hidden, row) {
                        info.hidden_rows.insert(row);
                    }
                }
                b"c" => {
                    // <c r="B2" s="3" t="n">
                    let (mut coord, mut style) = (None, None);
                    for (key, value) in attributes(&e, part)? {
                        match key.as_slice() {
                            b"r" => coord = CellCoord::parse_a1(&value),
                            b"s" => style = Some(value.parse::<u32>()?),
                            _ => {}
                        }
                    }
                    if let (Some(coord), Some(style)) = (coord, style) {
                        info.styles.insert(coord, style);
                    }
                }
                b"sheetProtection" => {
                    // <sheetProtection sheet="1" objects="1"/>
                    for (key, value) in attributes(&e, part)? {
                        if key == b"sheet" {
                            info.protected = is_true(&value);
                        }
                    }
                }
                b"hyperlinks" => in_hyperlinks = true,
                b"hyperlink" if in_hyperlinks => {
                    // <hyperlink ref="A1" r:id="rId1"/> / <hyperlink ref="B2" location="Sheet2!A1"/>
                    let (mut reference, mut rel_id, mut location) = (None, None, None);
                    for (key, value) in attributes(&e, part)? {
                        match key.as_slice() {
                            b"ref" => reference = Some(value),
                            b"r:id" => rel_id = Some(value),
                            b"location" => location = Some(value),
                            _ => {}
                        }
                    }
                    let target = match (rel_id.and_then(|id| relationships.get(&id)), location) {
                        (Some(target), Some(location)) => Some(format!("{}#{}", target, location)),
                        (Some(target), None) => Some(target.clone()),
                        (None, Some(location)) => Some(format!("#{}", location)),
                        (None, None) => None,
                    };
                    let origin = reference
                        .as_deref()
                        .and_then(|r| r.split(':').next())
                        .and_then(CellCoord::parse_a1);
                    if let (Some(origin), Some(target)) = (origin, target) {
                        info.hyperlinks.insert(origin, target);
                    }
                }
                b"drawing" => {
                    // <drawing r:id="rId2"/>
                    for (key, value) in attributes(&e, part)? {
                        if key == b"r:id" {
                            info.drawing = relationships
                                .get(&value)
                                .and_then(|target| resolve_target(part_dir(part), target));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"cols" => in_cols = false,
                b"hyperlinks" => in_hyperlinks = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxMdError::xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(info)
}

/// 印刷範囲の参照文字列を矩形に変換する
///
/// 行全体（`1:5`）・列全体（`A:C`）の指定は`max_row`/`max_col`までの範囲になります。
pub(crate) fn print_area_rects(references: &[String], max_row: u32, max_col: u32) -> Vec<Rect> {
    references
        .iter()
        .filter_map(|reference| Rect::parse_a1_range(reference, max_row, max_col))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr date1904="1"/>
  <sheets>
    <sheet name="Summary" sheetId="1" r:id="rId1"/>
    <sheet name="My Data" sheetId="2" r:id="rId2"/>
  </sheets>
  <definedNames>
    <definedName name="_xlnm.Print_Area" localSheetId="1">'My Data'!$A$1:$C$5,'My Data'!$E$1:$F$2</definedName>
    <definedName name="Total">Summary!$B$2</definedName>
  </definedNames>
</workbook>"#;

    #[test]
    fn test_parse_workbook_xml() {
        let (sheets, rel_ids, date1904) = parse_workbook_xml(WORKBOOK_XML.as_bytes()).unwrap();
        assert!(date1904);
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[1].name, "My Data");
        assert_eq!(rel_ids, vec![Some("rId1".to_string()), Some("rId2".to_string())]);
        assert!(sheets[0].print_areas.is_empty());
        assert_eq!(sheets[1].print_areas, vec!["A1:C5", "E1:F2"]);
    }

    #[test]
    fn test_split_print_area() {
        assert_eq!(
            split_print_area("'It''s, here'!$A$1:$B$2,Other!$1:$3"),
            vec![
                (Some("It's, here".to_string()), "A1:B2".to_string()),
                (Some("Other".to_string()), "1:3".to_string()),
            ]
        );
        assert_eq!(split_print_area("$A:$C"), vec![(None, "A:C".to_string())]);
    }

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;
        let rels = parse_relationships(xml.as_bytes(), "test.rels").unwrap();
        assert_eq!(rels["rId1"], "worksheets/sheet1.xml");
        assert_eq!(rels["rId2"], "https://example.com/?a=1&b=2");
    }

    #[test]
    fn test_attribute_value_must_be_utf8() {
        let xml = b"<Relationships><Relationship Id=\"rId\xff\" Target=\"a.xml\"/></Relationships>";
        assert!(matches!(
            parse_relationships(xml, "test.rels"),
            Err(XlsxMdError::Utf8(_))
        ));
    }

    #[test]
    fn test_parse_styles_xml() {
        let xml = r#"<styleSheet>
  <numFmts count="1"><numFmt numFmtId="165" formatCode="0.000"/></numFmts>
  <cellStyleXfs count="1"><xf numFmtId="44"/></cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0"/>
    <xf numFmtId="165" fontId="0" applyNumberFormat="1"/>
    <xf numFmtId="10" fontId="0" applyNumberFormat="1"><alignment horizontal="right"/></xf>
  </cellXfs>
</styleSheet>"#;
        let (num_formats, cell_xfs) = parse_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(cell_xfs, vec![0, 165, 10]);

        let metadata = WorkbookMetadata {
            num_formats,
            cell_xfs,
            ..Default::default()
        };
        assert_eq!(metadata.number_format(0), None);
        assert_eq!(metadata.number_format(1), Some("0.000"));
        assert_eq!(metadata.number_format(2), Some("0.00%"));
        assert_eq!(metadata.number_format(9), None);
    }

    #[test]
    fn test_parse_worksheet_xml() {
        let xml = r#"<worksheet>
  <sheetPr/>
  <cols>
    <col min="2" max="3" width="0" hidden="1"/>
    <col min="5" max="5" width="12"/>
  </cols>
  <sheetData>
    <row r="1"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1"><v>2</v></c></row>
    <row r="4" hidden="1"><c r="A4" s="2"/></row>
  </sheetData>
  <sheetProtection sheet="1" objects="1"/>
  <hyperlinks>
    <hyperlink ref="A1" r:id="rId1"/>
    <hyperlink ref="C2:D3" location="Other!A1"/>
  </hyperlinks>
  <drawing r:id="rId2"/>
</worksheet>"#;
        let mut rels = HashMap::new();
        rels.insert("rId1".to_string(), "https://example.com".to_string());
        rels.insert("rId2".to_string(), "../drawings/drawing1.xml".to_string());

        let info = parse_worksheet_xml(xml.as_bytes(), "xl/worksheets/sheet1.xml", &rels).unwrap();
        assert_eq!(info.hidden_cols.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(info.hidden_rows.iter().copied().collect::<Vec<_>>(), vec![4]);
        assert_eq!(info.styles.get(&CellCoord::new(1, 1)), Some(&1));
        assert_eq!(info.styles.get(&CellCoord::new(4, 1)), Some(&2));
        assert!(!info.styles.contains_key(&CellCoord::new(1, 2)));
        assert!(info.protected);
        assert_eq!(
            info.hyperlinks.get(&CellCoord::new(1, 1)).map(String::as_str),
            Some("https://example.com")
        );
        assert_eq!(
            info.hyperlinks.get(&CellCoord::new(2, 3)).map(String::as_str),
            Some("#Other!A1")
        );
        assert_eq!(info.drawing.as_deref(), Some("xl/drawings/drawing1.xml"));
    }

    #[test]
    fn test_print_area_rects() {
        let refs = vec!["A1:C5".to_string(), "2:3".to_string(), "A1:B".to_string()];
        assert_eq!(
            print_area_rects(&refs, 100, 10),
            vec![Rect::new(1, 1, 5, 3), Rect::new(2, 1, 3, 10)]
        );
    }

    #[test]
    fn test_malformed_xml_is_reported() {
        let result = parse_styles_xml(b"<styleSheet><cellXfs><xf numFmtId=\"x\"/></cellXfs>");
        assert!(result.is_err());
    }
}
