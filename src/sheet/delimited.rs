use crate::error::{CorpusError, Result};
use csv::ReaderBuilder;
use encoding_rs::{Encoding, UTF_8};
use mood_corpus_common::{Cell, Table};
use std::path::Path;
use tracing::debug;

/// 依次尝试的编码；latin1 能解码任意字节，排在最后兜底
pub const FALLBACK_ENCODINGS: &[&str] = &["utf-8", "gbk", "latin1", "iso-8859-1"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 按 FALLBACK_ENCODINGS 顺序解码，返回文本和命中的编码名
pub fn decode_with_fallback(bytes: &[u8]) -> Option<(String, &'static str)> {
    for &label in FALLBACK_ENCODINGS {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            continue;
        };
        let body = if encoding == UTF_8 {
            bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
        } else {
            bytes
        };
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(body) {
            return Some((text.into_owned(), label));
        }
    }
    None
}

pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let bytes = std::fs::read(path)?;
    let (text, encoding) = decode_with_fallback(&bytes).ok_or_else(|| CorpusError::Decode {
        path: path.display().to_string(),
        tried: FALLBACK_ENCODINGS.join(", "),
    })?;
    debug!(path = %path.display(), encoding, "解码成功");

    parse_delimited(&text, delimiter)
}

/// 解析分隔文本；字段数多于表头的行视为格式错误
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();
    let mut table = Table::new(headers);

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > width {
            return Err(CorpusError::Sheet(format!(
                "第{}行有{}个字段，超过表头的{}列",
                i + 2,
                record.len(),
                width
            )));
        }
        table.push_row(record.iter().map(Cell::infer).collect());
    }

    Ok(table)
}
