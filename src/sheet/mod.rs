//! 表格文件读写
//!
//! - 读取: xlsx/xls/ods 走 calamine，csv/tsv 走 csv + 编码回退
//! - 写入: 一律 xlsx，先写临时文件再改名，中途崩溃不会留下半个文件

mod delimited;
mod xlsx;

pub use delimited::{decode_with_fallback, parse_delimited, read_delimited, FALLBACK_ENCODINGS};
pub use xlsx::read_workbook;

use crate::error::{CorpusError, Result};
use mood_corpus_common::{generate_table_buffer, Table};
use std::path::{Path, PathBuf};

/// 输入文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Delimited(u8),
}

impl SheetFormat {
    /// 按扩展名判断
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SheetFormat::Workbook),
            "csv" | "txt" => Ok(SheetFormat::Delimited(b',')),
            "tsv" => Ok(SheetFormat::Delimited(b'\t')),
            _ => Err(CorpusError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// 读取表格（首个工作表，首行为表头）
pub fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(CorpusError::FileNotFound(path.display().to_string()));
    }

    match SheetFormat::detect(path)? {
        SheetFormat::Workbook => read_workbook(path),
        SheetFormat::Delimited(delimiter) => read_delimited(path, delimiter),
    }
}

/// 写出 xlsx（临时文件 + 改名）
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let buffer = generate_table_buffer(table)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output.xlsx".into());
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    std::fs::write(&temp_path, buffer)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// 补上 .xlsx 扩展名，并去掉粘贴路径时常带的引号
pub fn with_xlsx_extension(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let cleaned = raw.trim().trim_matches('"');
    let cleaned = PathBuf::from(cleaned);
    let is_xlsx = cleaned
        .extension()
        .map(|e| e.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);
    if is_xlsx {
        cleaned
    } else {
        let mut name = cleaned.into_os_string();
        name.push(".xlsx");
        PathBuf::from(name)
    }
}

/// 同目录下的派生文件名：`<stem><suffix>.xlsx`
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".into());
    path.with_file_name(format!("{}{}.xlsx", stem, suffix))
}
