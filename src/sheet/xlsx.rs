use crate::error::{CorpusError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use mood_corpus_common::{data_rows_from_range, Cell, Table, DATA_RANGE_NAME};
use std::path::Path;

/// 读取工作簿的第一个工作表
///
/// 由本工具写出的文件带有数据区域定义，末尾的全空行按它补齐。
pub fn read_workbook(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| CorpusError::Sheet(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CorpusError::Sheet(format!("{}: 没有工作表", path.display())))?
        .map_err(|e| CorpusError::Sheet(format!("{}: {}", path.display(), e)))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|data| cell_from_data(data).as_text().into_owned())
            .collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }

    let recorded = workbook
        .defined_names()
        .iter()
        .find(|(name, _)| name == DATA_RANGE_NAME)
        .and_then(|(_, formula)| data_rows_from_range(formula));
    if let Some(recorded) = recorded {
        while table.len() < recorded {
            table.push_row(Vec::new());
        }
    }
    Ok(table)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
