//! mood-corpus 公共库
//!
//! 不做 I/O 的共享部分：表格模型、成功/失败标记、提示词、模型响应解析、
//! xlsx 缓冲区生成。

pub mod error;
pub mod export;
pub mod marker;
pub mod parser;
pub mod prompts;
pub mod table;
pub mod types;

pub use error::{Error, Result};
pub use export::{data_rows_from_range, DATA_RANGE_NAME};
pub use marker::{resume_index, truncate_chars, Markers, RowState, PLACEHOLDERS};
pub use parser::{extract_json, parse_case_record, parse_classification};
pub use prompts::{build_classify_input, CLASSIFY_INPUT_MAX_CHARS};
pub use table::{Cell, Row, Table};
pub use types::{CaseRecord, Classification};

#[cfg(feature = "excel")]
pub use export::excel_core::generate_table_buffer;
