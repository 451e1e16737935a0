//! Spreadsheet reading and writing
//!
//! Uploaded files (.xlsx/.xls/.csv) are parsed into header-keyed string
//! records; exports are built as tabular rows and serialized to xlsx bytes.

pub mod parser;
pub mod writer;

pub use parser::{normalize_header, parse_upload};
pub use writer::rows_to_xlsx;
