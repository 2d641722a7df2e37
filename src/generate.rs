//! 案例生成
//!
//! 先建一张 `count` 行的空表，逐行让模型生成一条案例填进去。
//! `问题描述` 列为完成标记列；连续失败过多时停止，保留临时文件以便续跑。

use crate::error::{CorpusError, Result};
use crate::processor::{
    Pacing, Processor, ProcessorConfig, RetryPolicy, RowTransform, RowUpdate, RunReport,
    XlsxCheckpoint,
};
use crate::remote::ChatModel;
use crate::sheet::{sibling_path, with_xlsx_extension};
use mood_corpus_common::prompts::{GENERATE_SYSTEM_PROMPT, GENERATE_USER_PROMPT};
use mood_corpus_common::{parse_case_record, Cell, Markers, Row, Table};
use std::future::Future;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const COL_QUESTION: &str = "问题描述";
pub const COL_ANSWER: &str = "医生回复";
pub const COL_REASON: &str = "核心症状";

pub const FAILURE_PREFIX: &str = "【生成失败】";
pub const TEMPERATURE: f32 = 0.7;
pub const COUNT_RANGE: RangeInclusive<usize> = 1..=100;
pub const DEFAULT_COUNT: usize = 10;
pub const DEFAULT_FILE_NAME: &str = "抑郁数据.xlsx";

/// 默认：每行保存，间隔1秒，最多3次，连续失败5次停止
pub fn default_processor_config() -> ProcessorConfig {
    ProcessorConfig {
        save_interval: 1,
        retry: RetryPolicy::new(3),
        pacing: Pacing::from_millis(1000, 0),
        max_consecutive_failures: Some(5),
    }
}

/// 默认保存到桌面，没有桌面目录时用主目录
pub fn default_output_path() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_FILE_NAME)
}

/// 去掉引号、补全扩展名
pub fn normalize_output_path(raw: &Path) -> PathBuf {
    with_xlsx_extension(raw)
}

pub fn validate_count(count: usize) -> Result<usize> {
    if COUNT_RANGE.contains(&count) {
        Ok(count)
    } else {
        Err(CorpusError::Config(format!(
            "生成数量必须在{}-{}之间: {}",
            COUNT_RANGE.start(),
            COUNT_RANGE.end(),
            count
        )))
    }
}

/// `count` 行空表
pub fn blank_table(count: usize) -> Table {
    Table::from_rows(
        vec![COL_QUESTION.into(), COL_ANSWER.into(), COL_REASON.into()],
        vec![vec![Cell::Empty; 3]; count],
    )
}

pub struct GenerateTransform<M> {
    model: M,
    count: usize,
    markers: Markers,
}

impl<M: ChatModel> GenerateTransform<M> {
    pub fn new(model: M, count: usize) -> Self {
        Self {
            model,
            count,
            markers: Markers::failure_only(FAILURE_PREFIX),
        }
    }
}

impl<M: ChatModel> RowTransform for GenerateTransform<M> {
    fn name(&self) -> &str {
        "生成"
    }

    fn work_column(&self) -> &str {
        COL_QUESTION
    }

    fn markers(&self) -> &Markers {
        &self.markers
    }

    /// 表格不足 `count` 行时补齐
    fn prepare(&self, table: &mut Table) -> Result<()> {
        table.require_columns(&[COL_QUESTION, COL_ANSWER, COL_REASON])?;
        while table.len() < self.count {
            table.push_row(Vec::new());
        }
        Ok(())
    }

    async fn apply(&self, row: Row<'_>) -> Result<RowUpdate> {
        let response = self
            .model
            .complete_json(GENERATE_SYSTEM_PROMPT, GENERATE_USER_PROMPT, TEMPERATURE)
            .await?;
        let record = parse_case_record(&response)?;
        debug!(row = row.index() + 1, reason = %record.reason, "案例已生成");

        Ok(RowUpdate::Cells(vec![
            (COL_QUESTION.into(), Cell::Text(record.question)),
            (COL_ANSWER.into(), Cell::Text(record.answer)),
            (COL_REASON.into(), Cell::Text(record.reason)),
        ]))
    }

    fn failure(&self, _row: Row<'_>, error: &CorpusError) -> RowUpdate {
        RowUpdate::cell(COL_QUESTION, self.markers.mark_failure(error.short_cause()))
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub count: usize,
    pub output: PathBuf,
    /// 未指定时为 `<输出文件名>_temp.xlsx`
    pub backup: Option<PathBuf>,
    pub processor: ProcessorConfig,
}

pub async fn run_generate<M, Sd>(model: M, options: GenerateOptions, shutdown: Sd) -> Result<RunReport>
where
    M: ChatModel,
    Sd: Future<Output = ()>,
{
    let count = validate_count(options.count)?;
    let output = normalize_output_path(&options.output);
    let backup = options
        .backup
        .unwrap_or_else(|| sibling_path(&output, "_temp"));

    let transform = GenerateTransform::new(model, count);
    let store = XlsxCheckpoint::new(&output).with_backup(backup);
    let mut processor = Processor::new(options.processor, store);
    processor
        .run(&transform, || Ok(blank_table(count)), shutdown)
        .await
}
