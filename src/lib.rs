//! xlsxmd - Pure-Rust Excel to Markdown converter with table segmentation
//!
//! This crate converts Excel workbooks (XLSX) into structured Markdown. Each sheet's
//! print areas are split into logical tables separated by blank rows and columns,
//! and every table is rendered as the representation that fits it best: a Markdown
//! table, a nested bullet list, a code block, or a Mermaid flowchart.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxmd::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a converter with default settings
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let input = File::open("example.xlsx")?;
//!     let output = File::create("output.md")?;
//!
//!     // Convert Excel to Markdown
//!     converter.convert(input, output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxmd::{ConverterBuilder, HyperlinkMode, MermaidConfig, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_sheet_selector(SheetSelector::Index(0))
//!         .with_hyperlink_mode(HyperlinkMode::Footnote)
//!         .with_mermaid(MermaidConfig {
//!             enabled: true,
//!             ..Default::default()
//!         })
//!         .build()?;
//!
//!     let markdown = converter.convert_to_string(File::open("example.xlsx")?)?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! # In-memory Workbooks
//!
//! The sheet model can be built directly, without an XLSX file:
//!
//! ```rust
//! use xlsxmd::{ConverterBuilder, Workbook, Worksheet};
//!
//! let mut sheet = Worksheet::new("Sheet1");
//! sheet.set_value(1, 1, "Step").set_value(2, 1, "Build");
//! let mut workbook = Workbook::new();
//! workbook.add_sheet(sheet);
//!
//! let converter = ConverterBuilder::new().build().unwrap();
//! let markdown = converter.convert_workbook(&workbook).unwrap().to_markdown();
//! assert!(markdown.starts_with("## Sheet1"));
//! ```
//!
//! # Logging
//!
//! Diagnostics are emitted through the `tracing` facade. The library never installs
//! a subscriber; applications choose one.

mod api;
mod builder;
mod config;
mod dispatch;
mod error;
mod extract;
mod footnote;
mod format;
mod formatter;
mod merge;
mod mermaid;
mod output;
mod parser;
mod region;
mod segment;
mod sheet;
mod types;

// 公開API
pub use api::{
    CurrencySymbol, FootnoteScope, GroupColumnBehavior, HiddenPolicy, HyperlinkMode,
    MarkdownEscapeLevel, MergePolicy, MermaidDetectMode, MermaidDiagramType, MermaidDirection,
    NoPrintAreaMode, NodeIdPolicy, PercentFormat, SheetSelector,
};
pub use builder::{Converter, ConverterBuilder, Document, SheetSection};
pub use config::{ConversionConfig, HeuristicThresholds, MermaidColumns, MermaidConfig};
pub use error::XlsxMdError;

// シートモデル
pub use sheet::{Shape, SheetCell, Workbook, Worksheet};
pub use types::{CellCoord, CellValue, Rect};

// コア処理
pub use dispatch::{dispatch_table_output, RenderDecision};
pub use extract::{extract_table, Cell, ExtractedTable};
pub use footnote::FootnoteRegistry;
pub use merge::{MergeIndex, MergeSpan};
pub use region::{print_areas, union_rects};
pub use segment::{segment_tables, LogicalTable};

// 出力
pub use format::serial_to_datetime;
pub use mermaid::{
    detect_diagram, shapes_to_diagram, Detection, FlowDiagram, FlowEdge, FlowNode, Subgraph,
};
pub use output::make_markdown_table;
