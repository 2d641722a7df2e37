//! 表格导出（xlsx 缓冲区生成）

#[cfg(feature = "excel")]
pub mod excel_core;

/// 写入 xlsx 时定义的名称，覆盖表头和全部数据行。
/// 全空的行不会写出任何单元格，读取时靠它补回末尾的空行。
pub const DATA_RANGE_NAME: &str = "MoodCorpusData";

/// 数据区域引用，如 `Sheet1!$A$1:$A$4`（3 行数据）
pub fn data_range_formula(sheet: &str, rows: usize) -> String {
    format!("={}!$A$1:$A${}", sheet, rows + 1)
}

/// 从数据区域引用取出数据行数（不含表头）
pub fn data_rows_from_range(formula: &str) -> Option<usize> {
    formula
        .rsplit('$')
        .next()?
        .trim()
        .parse::<usize>()
        .ok()?
        .checked_sub(1)
}
