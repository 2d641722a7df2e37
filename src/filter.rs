//! 关键词筛选：任一列包含任一关键词的行保留

use crate::error::{CorpusError, Result};
use crate::sheet::{read_table, sibling_path, write_table};
use mood_corpus_common::Table;
use regex::Regex;
use std::path::PathBuf;

pub const DEFAULT_COLUMNS: &[&str] = &["question", "answer"];
pub const DEFAULT_KEYWORD: &str = "抑郁";

#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub input: PathBuf,
    /// 未指定时为 `<输入文件名>_filtered.xlsx`
    pub output: Option<PathBuf>,
    pub columns: Vec<String>,
    pub keywords: Vec<String>,
    /// 关键词按正则表达式匹配
    pub regex: bool,
}

impl FilterOptions {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling_path(&self.input, "_filtered"))
    }
}

/// 关键词匹配器
#[derive(Debug, Clone)]
pub enum Matcher {
    Plain(Vec<String>),
    Regex(Vec<Regex>),
}

impl Matcher {
    pub fn new(keywords: &[String], regex: bool) -> Result<Self> {
        if keywords.is_empty() {
            return Err(CorpusError::Config("至少需要一个关键词".into()));
        }
        if !regex {
            return Ok(Matcher::Plain(keywords.to_vec()));
        }
        keywords
            .iter()
            .map(|k| {
                Regex::new(k).map_err(|e| CorpusError::Config(format!("正则表达式无效 {}: {}", k, e)))
            })
            .collect::<Result<Vec<_>>>()
            .map(Matcher::Regex)
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Plain(keywords) => keywords.iter().any(|k| text.contains(k.as_str())),
            Matcher::Regex(patterns) => patterns.iter().any(|p| p.is_match(text)),
        }
    }
}

/// 只看指定列，空单元格按空串处理
pub fn filter_table(table: &Table, columns: &[String], matcher: &Matcher) -> Result<Table> {
    let names: Vec<&str> = columns.iter().map(String::as_str).collect();
    let indices = table.require_columns(&names)?;

    Ok(table.filtered(|row| {
        indices
            .iter()
            .any(|&index| matcher.is_match(&row.text_at(index)))
    }))
}

/// 返回（输出路径, 原行数, 保留行数）
pub fn run_filter(options: &FilterOptions) -> Result<(PathBuf, usize, usize)> {
    let matcher = Matcher::new(&options.keywords, options.regex)?;
    let table = read_table(&options.input)?;
    let filtered = filter_table(&table, &options.columns, &matcher)?;

    let output = options.output_path();
    write_table(&output, &filtered)?;
    Ok((output, table.len(), filtered.len()))
}
