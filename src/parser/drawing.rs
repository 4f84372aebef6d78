//! Drawing Parser Module
//!
//! 描画パート（`xl/drawings/*.xml`）から図形とコネクタを抽出するモジュール。
//! テキストを持つ図形（`sp`）はノード、コネクタ（`cxnSp`）は接続先の図形IDを持つエッジになります。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::XlsxMdError;
use crate::parser::metadata::attribute_value;
use crate::sheet::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeKind {
    Node,
    Connector,
}

/// 解析中の図形
#[derive(Debug)]
struct PendingShape {
    kind: ShapeKind,
    id: Option<String>,
    from: Option<String>,
    to: Option<String>,
    paragraphs: Vec<String>,
    current: String,
}

impl PendingShape {
    fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            id: None,
            from: None,
            to: None,
            paragraphs: Vec::new(),
            current: String::new(),
        }
    }

    fn finish_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.current);
        let paragraph = paragraph.trim();
        if !paragraph.is_empty() {
            self.paragraphs.push(paragraph.to_string());
        }
    }

    fn into_shape(mut self) -> Option<Shape> {
        self.finish_paragraph();
        let text = self.paragraphs.join(" ");
        let id = self.id?;
        match self.kind {
            // テキストのない図形はノードとして扱わない
            ShapeKind::Node => (!text.is_empty()).then_some(Shape::Node { id, text }),
            ShapeKind::Connector => Some(Shape::Connector {
                id,
                from: self.from,
                to: self.to,
                label: (!text.is_empty()).then_some(text),
            }),
        }
    }
}

fn attribute(e: &BytesStart<'_>, name: &[u8], part: &str) -> Result<Option<String>, XlsxMdError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XlsxMdError::xml(part, format!("attribute error: {}", e)))?;
        if attr.key.as_ref() == name {
            return attribute_value(&attr, part).map(Some);
        }
    }
    Ok(None)
}

/// 描画パートを解析し、図形を文書順に返す
///
/// # 引数
///
/// * `xml` - 描画パートの内容
/// * `part` - パート名（エラーメッセージ用）
pub(crate) fn parse_drawing_xml(xml: &[u8], part: &str) -> Result<Vec<Shape>, XlsxMdError> {
    let mut reader = Reader::from_reader(xml);
    // ラン間の空白を保持する
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut shapes = Vec::new();
    let mut pending: Option<PendingShape> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"sp" => pending = Some(PendingShape::new(ShapeKind::Node)),
                b"cxnSp" => pending = Some(PendingShape::new(ShapeKind::Connector)),
                b"cNvPr" => {
                    if let Some(shape) = pending.as_mut().filter(|s| s.id.is_none()) {
                        shape.id = attribute(&e, b"id", part)?;
                    }
                }
                b"stCxn" => {
                    if let Some(shape) = pending.as_mut() {
                        shape.from = attribute(&e, b"id", part)?;
                    }
                }
                b"endCxn" => {
                    if let Some(shape) = pending.as_mut() {
                        shape.to = attribute(&e, b"id", part)?;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    if let Some(shape) = pending.as_mut() {
                        let text = e.unescape().map_err(|e| XlsxMdError::xml(part, e))?;
                        shape.current.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(shape) = pending.as_mut() {
                        shape.finish_paragraph();
                    }
                }
                b"sp" | b"cxnSp" => {
                    if let Some(shape) = pending.take().and_then(PendingShape::into_shape) {
                        shapes.push(shape);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxMdError::xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(shapes)
}
