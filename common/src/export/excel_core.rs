//! Excel生成（公共库）
//!
//! Table → xlsx 字节缓冲区。表头加粗并冻结首行，
//! 单元格按类型写入（文本/数值/布尔），空单元格不写。
//! 数据区域另存为定义名称，末尾的全空行读回时不会丢失。

use super::{data_range_formula, DATA_RANGE_NAME};
use crate::error::{Error, Result};
use crate::table::{Cell, Table};
use rust_xlsxwriter::*;

/// xlsx 单元格允许的最大字符数
pub const MAX_CELL_CHARS: usize = 32_767;

/// xlsx 工作表的最大行数（含表头）
pub const MAX_ROWS: usize = 1_048_576;

const MIN_COL_WIDTH: f64 = 8.0;
const MAX_COL_WIDTH: f64 = 60.0;

const SHEET_NAME: &str = "Sheet1";

/// Table 生成 xlsx 缓冲区
pub fn generate_table_buffer(table: &Table) -> Result<Vec<u8>> {
    if table.len() + 1 > MAX_ROWS {
        return Err(Error::Excel(format!(
            "行数超出上限: {} (最多 {} 行数据)",
            table.len(),
            MAX_ROWS - 1
        )));
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF2F2F2))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xBFBFBF));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| Error::Excel(format!("工作表命名错误: {}", e)))?;

    for (col, header) in table.headers().iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, header, &header_format)
            .map_err(|e| Error::Excel(format!("表头写入错误: {}", e)))?;
        worksheet
            .set_column_width(col, column_width(table, col as usize))
            .map_err(|e| Error::Excel(format!("列宽设置错误: {}", e)))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| Error::Excel(format!("冻结首行错误: {}", e)))?;

    for row in table.rows() {
        let xlsx_row = (row.index() + 1) as u32;
        for (col, cell) in row.cells().iter().enumerate() {
            let col = col as u16;
            let written = match cell {
                Cell::Empty => continue,
                Cell::Text(text) => {
                    worksheet.write_string(xlsx_row, col, clamp_text(text))
                }
                Cell::Number(value) => worksheet.write_number(xlsx_row, col, *value),
                Cell::Bool(value) => worksheet.write_boolean(xlsx_row, col, *value),
            };
            written.map_err(|e| {
                Error::Excel(format!("第{}行第{}列写入错误: {}", xlsx_row + 1, col + 1, e))
            })?;
        }
    }

    workbook
        .define_name(DATA_RANGE_NAME, &data_range_formula(SHEET_NAME, table.len()))
        .map_err(|e| Error::Excel(format!("数据区域定义错误: {}", e)))?;

    workbook
        .save_to_buffer()
        .map_err(|e| Error::Excel(format!("Excel保存错误: {}", e)))
}

/// 超长文本截断到 xlsx 上限
fn clamp_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// 列宽：按表头和前 100 行内容估算，中文按两个字符宽
fn column_width(table: &Table, col: usize) -> f64 {
    let display_width = |text: &str| -> usize {
        text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
    };
    let header = table.headers().get(col).map(|h| display_width(h)).unwrap_or(0);
    let widest = table
        .rows()
        .take(100)
        .map(|row| display_width(&row.text_at(col)))
        .max()
        .unwrap_or(0);
    (header.max(widest) as f64 + 2.0).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
}
