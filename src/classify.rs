//! 青少年抑郁分类
//!
//! 每行把问题和医师回答拼起来发给模型，写回 `is_depression`、
//! `confidence`、`reason` 三列。`reason` 同时是完成标记列：
//! 非空即已分类，以【失败】开头表示调用或解析失败。

use crate::error::{CorpusError, Result};
use crate::processor::{
    Pacing, Processor, ProcessorConfig, RetryPolicy, RowTransform, RowUpdate, RunReport,
    XlsxCheckpoint,
};
use crate::remote::ChatModel;
use crate::sheet::read_table;
use mood_corpus_common::prompts::CLASSIFY_SYSTEM_PROMPT;
use mood_corpus_common::{
    build_classify_input, parse_classification, truncate_chars, Cell, Classification, Error,
    Markers, Row, Table,
};
use std::future::Future;
use std::path::PathBuf;
use tracing::debug;

pub const COL_IS_DEPRESSION: &str = "is_depression";
pub const COL_CONFIDENCE: &str = "confidence";
pub const COL_REASON: &str = "reason";

pub const FAILURE_PREFIX: &str = "【失败】";
pub const REASON_MAX_CHARS: usize = 20;
pub const TEMPERATURE: f32 = 0.3;

/// 默认：每3行保存，间隔0.5秒，最多3次
pub fn default_processor_config() -> ProcessorConfig {
    ProcessorConfig {
        save_interval: 3,
        retry: RetryPolicy::new(3),
        pacing: Pacing::from_millis(500, 0),
        max_consecutive_failures: None,
    }
}

/// 按列名或按位置取列
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Position(usize),
}

impl ColumnRef {
    fn from_option(name: Option<String>, position: usize) -> Self {
        name.map(ColumnRef::Name).unwrap_or(ColumnRef::Position(position))
    }

    fn validate(&self, table: &Table) -> Result<()> {
        match self {
            ColumnRef::Name(name) => {
                table.require_column(name)?;
            }
            ColumnRef::Position(position) if *position >= table.headers().len() => {
                return Err(Error::MissingColumn(format!("第{}列", position + 1)).into());
            }
            ColumnRef::Position(_) => {}
        }
        Ok(())
    }

    fn text(&self, row: Row<'_>) -> String {
        match self {
            ColumnRef::Name(name) => row.text(name),
            ColumnRef::Position(position) => row.text_at(*position),
        }
    }
}

pub struct ClassifyTransform<M> {
    model: M,
    question: ColumnRef,
    answer: ColumnRef,
    markers: Markers,
}

impl<M: ChatModel> ClassifyTransform<M> {
    /// 未指定列名时用前两列
    pub fn new(model: M, question_column: Option<String>, answer_column: Option<String>) -> Self {
        Self {
            model,
            question: ColumnRef::from_option(question_column, 0),
            answer: ColumnRef::from_option(answer_column, 1),
            markers: Markers::failure_only(FAILURE_PREFIX),
        }
    }
}

fn classification_update(result: &Classification) -> RowUpdate {
    let reason = truncate_chars(result.reason.trim(), REASON_MAX_CHARS);
    let reason = if reason.is_empty() { "-".to_string() } else { reason };
    RowUpdate::Cells(vec![
        (COL_IS_DEPRESSION.into(), Cell::Bool(result.is_depression)),
        (COL_CONFIDENCE.into(), Cell::Number(result.confidence)),
        (COL_REASON.into(), Cell::Text(reason)),
    ])
}

impl<M: ChatModel> RowTransform for ClassifyTransform<M> {
    fn name(&self) -> &str {
        "分类"
    }

    fn work_column(&self) -> &str {
        COL_REASON
    }

    fn markers(&self) -> &Markers {
        &self.markers
    }

    fn prepare(&self, table: &mut Table) -> Result<()> {
        self.question.validate(table)?;
        self.answer.validate(table)?;
        table.insert_column(2, COL_IS_DEPRESSION, Cell::Empty);
        table.insert_column(3, COL_CONFIDENCE, Cell::Empty);
        table.insert_column(4, COL_REASON, Cell::Empty);
        Ok(())
    }

    async fn apply(&self, row: Row<'_>) -> Result<RowUpdate> {
        let input = build_classify_input(&self.question.text(row), &self.answer.text(row));
        let response = self
            .model
            .complete_json(CLASSIFY_SYSTEM_PROMPT, &input, TEMPERATURE)
            .await?;
        let result = parse_classification(&response)?;
        debug!(
            row = row.index() + 1,
            is_depression = result.is_depression,
            confidence = result.confidence,
            "分类完成"
        );
        Ok(classification_update(&result))
    }

    fn failure(&self, _row: Row<'_>, error: &CorpusError) -> RowUpdate {
        let reason = truncate_chars(&self.markers.mark_failure(error.short_cause()), REASON_MAX_CHARS);
        RowUpdate::Cells(vec![
            (COL_IS_DEPRESSION.into(), Cell::Bool(false)),
            (COL_CONFIDENCE.into(), Cell::Number(0.0)),
            (COL_REASON.into(), Cell::Text(reason)),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub backup: Option<PathBuf>,
    pub question_column: Option<String>,
    pub answer_column: Option<String>,
    pub processor: ProcessorConfig,
}

pub async fn run_classify<M, Sd>(model: M, options: ClassifyOptions, shutdown: Sd) -> Result<RunReport>
where
    M: ChatModel,
    Sd: Future<Output = ()>,
{
    let transform = ClassifyTransform::new(model, options.question_column, options.answer_column);

    let mut store = XlsxCheckpoint::new(&options.output);
    if let Some(backup) = &options.backup {
        store = store.with_backup(backup);
    }

    let input = options.input;
    let mut processor = Processor::new(options.processor, store);
    processor
        .run(&transform, || read_table(&input), shutdown)
        .await
}
