//! 批量翻译
//!
//! 翻译成功写 `【翻译成功】译文`，失败写 `【翻译失败】原文`。
//! 默认原地替换源列；指定输出列时写到新列，源列保持不变。

use crate::error::{CorpusError, Result};
use crate::processor::{
    Pacing, Processor, ProcessorConfig, RetryPolicy, RowTransform, RowUpdate, RunReport,
    XlsxCheckpoint,
};
use crate::remote::Translator;
use crate::sheet::{read_table, sibling_path};
use mood_corpus_common::{Cell, Markers, Row, Table};
use std::future::Future;
use std::path::PathBuf;

pub const SUCCESS_PREFIX: &str = "【翻译成功】";
pub const FAILURE_PREFIX: &str = "【翻译失败】";
pub const DEFAULT_COLUMN: &str = "Comment";

/// 默认：每100行保存，间隔2秒加0-1秒随机抖动，最多5次
pub fn default_processor_config() -> ProcessorConfig {
    ProcessorConfig {
        save_interval: 100,
        retry: RetryPolicy::new(5),
        pacing: Pacing::from_millis(2000, 1000),
        max_consecutive_failures: None,
    }
}

pub struct TranslateTransform<T> {
    translator: T,
    source_column: String,
    output_column: Option<String>,
    markers: Markers,
}

impl<T: Translator> TranslateTransform<T> {
    pub fn new(translator: T, source_column: impl Into<String>, output_column: Option<String>) -> Self {
        let source_column = source_column.into();
        // 输出列与源列同名等同于原地替换
        let output_column = output_column.filter(|column| *column != source_column);
        Self {
            translator,
            source_column,
            output_column,
            markers: Markers::new(SUCCESS_PREFIX, FAILURE_PREFIX),
        }
    }
}

impl<T: Translator> RowTransform for TranslateTransform<T> {
    fn name(&self) -> &str {
        "翻译"
    }

    fn work_column(&self) -> &str {
        self.output_column.as_deref().unwrap_or(&self.source_column)
    }

    fn markers(&self) -> &Markers {
        &self.markers
    }

    fn prepare(&self, table: &mut Table) -> Result<()> {
        let source = table.require_column(&self.source_column)?;
        if let Some(output) = &self.output_column {
            table.insert_column(source + 1, output, Cell::Empty);
        }
        Ok(())
    }

    async fn apply(&self, row: Row<'_>) -> Result<RowUpdate> {
        let text = row.text(&self.source_column);
        if text.trim().is_empty() {
            return Ok(RowUpdate::Unchanged);
        }

        let translated = self.translator.translate(&text).await?;
        Ok(RowUpdate::cell(
            self.work_column(),
            self.markers.mark_success(&translated),
        ))
    }

    fn failure(&self, row: Row<'_>, _error: &CorpusError) -> RowUpdate {
        let original = row.text(&self.source_column);
        RowUpdate::cell(self.work_column(), self.markers.mark_failure(&original))
    }
}

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub input: PathBuf,
    /// 未指定时为 `<输入文件名>_translated.xlsx`
    pub output: Option<PathBuf>,
    /// 未指定时为 `<输出文件名>_backup.xlsx`
    pub backup: Option<PathBuf>,
    pub column: String,
    pub output_column: Option<String>,
    pub processor: ProcessorConfig,
}

impl TranslateOptions {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling_path(&self.input, "_translated"))
    }

    pub fn backup_path(&self) -> PathBuf {
        self.backup
            .clone()
            .unwrap_or_else(|| sibling_path(&self.output_path(), "_backup"))
    }
}

pub async fn run_translate<T, Sd>(translator: T, options: TranslateOptions, shutdown: Sd) -> Result<RunReport>
where
    T: Translator,
    Sd: Future<Output = ()>,
{
    let store = XlsxCheckpoint::new(options.output_path()).with_backup(options.backup_path());
    let transform = TranslateTransform::new(translator, options.column, options.output_column);

    let input = options.input;
    let mut processor = Processor::new(options.processor, store);
    processor
        .run(&transform, || read_table(&input), shutdown)
        .await
}
