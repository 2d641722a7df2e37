//! 成功/失败标记与续跑判定
//!
//! 工作列的内容本身就是处理状态：带成功前缀或失败前缀的行视为已完成，
//! 续跑时不再处理；失败前缀让人工复查时能一眼区分出来。

use crate::table::{Cell, Table};

/// 视为"未填写"的占位值（pandas 把缺失值转成字符串后会出现这些）
pub const PLACEHOLDERS: &[&str] = &["nan", "NaN", "None", "null"];

/// 行的处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Pending,
    Succeeded,
    Failed,
}

/// 工作列的成功/失败前缀
///
/// 成功前缀为空时，任何非占位内容都算完成（分类结果这类独立输出列）；
/// 成功前缀非空时，只有带前缀的内容才算完成（原地替换的翻译列，
/// 未处理前列里是原文）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    success: String,
    failure: String,
}

impl Markers {
    pub fn new(success: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            success: success.into(),
            failure: failure.into(),
        }
    }

    /// 仅失败前缀（独立输出列）
    pub fn failure_only(failure: impl Into<String>) -> Self {
        Self::new(String::new(), failure)
    }

    pub fn state(&self, cell: &Cell) -> RowState {
        let text = cell.as_text();
        let trimmed = text.trim();
        if trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed) {
            return RowState::Pending;
        }
        if !self.failure.is_empty() && text.starts_with(&self.failure) {
            return RowState::Failed;
        }
        if self.success.is_empty() || text.starts_with(&self.success) {
            return RowState::Succeeded;
        }
        RowState::Pending
    }

    /// 续跑判定：已完成的行不再处理
    pub fn is_done(&self, cell: &Cell) -> bool {
        self.state(cell) != RowState::Pending
    }

    pub fn mark_success(&self, value: &str) -> String {
        format!("{}{}", self.success, value)
    }

    pub fn mark_failure(&self, value: &str) -> String {
        format!("{}{}", self.failure, value)
    }
}

/// 续跑起点：最后一个已完成行的下一行；没有已完成行时为 0
pub fn resume_index(table: &Table, column: usize, markers: &Markers) -> usize {
    (0..table.len())
        .rev()
        .find(|&row| markers.is_done(table.cell(row, column)))
        .map(|row| row + 1)
        .unwrap_or(0)
}

/// 按字符截断（不会切断多字节字符）
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
