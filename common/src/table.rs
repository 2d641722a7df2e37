//! 表格数据模型
//!
//! 表头一行 + 若干数据行，所有任务（转换、筛选、分类、生成、翻译）
//! 都在这个内存表上读写。
//!
//! - Cell: 单元格（空 / 文本 / 数值 / 布尔）
//! - Table: 有序表头 + 有序行，每行单元格数与表头数一致
//! - Row: 只读行视图

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// 超过这个位数的整数按文本保存，避免身份证号之类的长编号丢精度
const MAX_NUMERIC_DIGITS: usize = 15;

/// 单元格
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// 从分隔文本推断类型（整数/小数 → 数值，True/False → 布尔，空 → 空）
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }

        let digits = trimmed.trim_start_matches(['-', '+']).len();
        if digits <= MAX_NUMERIC_DIGITS {
            if let Ok(value) = trimmed.parse::<i64>() {
                return Cell::Number(value as f64);
            }
            if let Ok(value) = trimmed.parse::<f64>() {
                if value.is_finite() {
                    return Cell::Number(value);
                }
            }
        }

        match trimmed {
            "True" | "TRUE" | "true" => Cell::Bool(true),
            "False" | "FALSE" | "false" => Cell::Bool(false),
            _ => Cell::Text(raw.to_string()),
        }
    }

    /// 文本形式（空单元格为空串）
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Number(n) => Cow::Owned(format_number(*n)),
            Cell::Bool(true) => Cow::Borrowed("TRUE"),
            Cell::Bool(false) => Cow::Borrowed("FALSE"),
        }
    }

    /// 空或只含空白
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// 表格
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers: normalize_headers(headers),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 追加一行（不足补空，多余截断）
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.headers.len(), Cell::Empty);
        self.rows.push(cells);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 列必须存在，否则报错
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>> {
        names.iter().map(|name| self.require_column(name)).collect()
    }

    /// 在指定位置插入列；列已存在时不做改动，返回其位置
    pub fn insert_column(&mut self, position: usize, name: &str, fill: Cell) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        let position = position.min(self.headers.len());
        self.headers.insert(position, name.to_string());
        for row in &mut self.rows {
            row.insert(position, fill.clone());
        }
        position
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 按列名写入单元格
    pub fn set(&mut self, row: usize, column: &str, value: Cell) -> Result<()> {
        let column = self.require_column(column)?;
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(Error::RowOutOfRange(row))?;
        cells[column] = value;
        Ok(())
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            index,
            headers: &self.headers,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(|(index, cells)| Row {
            index,
            headers: &self.headers,
            cells,
        })
    }

    /// 保留满足条件的行，生成新表
    pub fn filtered<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(Row<'_>) -> bool,
    {
        let rows = self
            .rows()
            .filter(|row| keep(*row))
            .map(|row| row.cells.to_vec())
            .collect();
        Table {
            headers: self.headers.clone(),
            rows,
        }
    }
}

/// 只读行视图
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: usize,
    headers: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn headers(&self) -> &'a [String] {
        self.headers
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        let position = self.headers.iter().position(|h| h == column)?;
        self.cells.get(position)
    }

    /// 列值的文本形式；缺列或空值都返回空串
    pub fn text(&self, column: &str) -> String {
        self.get(column)
            .map(|cell| cell.as_text().into_owned())
            .unwrap_or_default()
    }

    pub fn text_at(&self, position: usize) -> String {
        self.cells
            .get(position)
            .map(|cell| cell.as_text().into_owned())
            .unwrap_or_default()
    }
}

/// 空表头命名为 `Unnamed: i`，重复表头追加 `.1`、`.2`
fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, header)| {
            let base = if header.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                header.trim().to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}
