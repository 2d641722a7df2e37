//! 带检查点的逐行处理器
//!
//! 分类、生成、翻译三个任务共用：
//! - 有备份时从备份续跑，从最后一个已完成行的下一行开始
//! - 已完成的行（工作列带成功/失败标记）直接跳过
//! - 单行出错只写失败标记，不中断整次运行
//! - 每 `save_interval` 行保存一次，结束时再保存一次
//! - Ctrl-C 时尽量保存后退出

mod checkpoint;
mod pacing;
mod retry;

pub use checkpoint::{CheckpointStore, XlsxCheckpoint};
pub use pacing::Pacing;
pub use retry::RetryPolicy;

use crate::error::{CorpusError, Result};
use crate::ui::progress_bar;
use mood_corpus_common::{resume_index, Cell, Markers, Row, Table};
use std::fmt;
use std::future::Future;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// 每处理多少行保存一次
    pub save_interval: usize,
    pub retry: RetryPolicy,
    pub pacing: Pacing,
    /// 连续失败达到该次数时停止（熔断）
    pub max_consecutive_failures: Option<usize>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            save_interval: 10,
            retry: RetryPolicy::default(),
            pacing: Pacing::none(),
            max_consecutive_failures: None,
        }
    }
}

/// 单行处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowUpdate {
    /// 无需处理（例如原文为空），不发请求也不等待
    Unchanged,
    /// 要写回的单元格（列名, 值）
    Cells(Vec<(String, Cell)>),
}

impl RowUpdate {
    pub fn cell(column: impl Into<String>, value: impl Into<Cell>) -> Self {
        RowUpdate::Cells(vec![(column.into(), value.into())])
    }
}

/// 逐行变换
#[allow(async_fn_in_trait)]
pub trait RowTransform {
    fn name(&self) -> &str;

    /// 判断是否已完成所看的列
    fn work_column(&self) -> &str;

    fn markers(&self) -> &Markers;

    /// 校验必需列、补上输出列；新开始和续跑都会调用
    fn prepare(&self, table: &mut Table) -> Result<()>;

    async fn apply(&self, row: Row<'_>) -> Result<RowUpdate>;

    /// 重试后仍失败时写入的内容
    fn failure(&self, row: Row<'_>, error: &CorpusError) -> RowUpdate;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub total: usize,
    pub resumed_from: usize,
    /// 续跑起点之前已完成的行 + 循环中跳过的已完成行
    pub already_done: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub unchanged: usize,
    pub saves: usize,
    /// 连续失败过多而提前停止
    pub halted: bool,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "共{}行：成功 {}，失败 {}，跳过 {}，无需处理 {}",
            self.total, self.succeeded, self.failed, self.already_done, self.unchanged
        )?;
        if self.resumed_from > 0 {
            write!(f, "（从第{}行续跑）", self.resumed_from + 1)?;
        }
        if self.halted {
            write!(f, "，连续失败过多已停止")?;
        }
        Ok(())
    }
}

pub struct Processor<S: CheckpointStore> {
    config: ProcessorConfig,
    store: S,
    table: Table,
    report: RunReport,
}

impl<S: CheckpointStore> Processor<S> {
    pub fn new(config: ProcessorConfig, store: S) -> Self {
        Self {
            config,
            store,
            table: Table::default(),
            report: RunReport::default(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 执行整次运行
    ///
    /// `source` 只在没有备份时调用；`shutdown` 完成即视为中断。
    pub async fn run<T, F, Sd>(&mut self, transform: &T, source: F, shutdown: Sd) -> Result<RunReport>
    where
        T: RowTransform,
        F: FnOnce() -> Result<Table>,
        Sd: Future<Output = ()>,
    {
        let start = self.load(transform, source)?;

        let outcome = tokio::select! {
            result = self.process_rows(transform, start) => result,
            _ = shutdown => {
                warn!(task = transform.name(), "收到中断信号");
                Err(CorpusError::Interrupted)
            }
        };

        match outcome {
            Ok(()) if self.report.halted => {
                self.store.save_abort(&self.table)?;
                self.report.saves += 1;
            }
            Ok(()) => {
                self.store.save_final(&self.table)?;
                self.report.saves += 1;
            }
            Err(run_error) => {
                match self.store.save_abort(&self.table) {
                    Ok(()) => self.report.saves += 1,
                    Err(save_error) => error!(error = %save_error, "中断时保存失败"),
                }
                return Err(run_error);
            }
        }

        info!(task = transform.name(), report = %self.report, "处理结束");
        Ok(self.report.clone())
    }

    fn load<T, F>(&mut self, transform: &T, source: F) -> Result<usize>
    where
        T: RowTransform,
        F: FnOnce() -> Result<Table>,
    {
        let (mut table, from_backup) = match self.store.load_backup()? {
            Some(table) => (table, true),
            None => (source()?, false),
        };

        transform.prepare(&mut table)?;
        let work = table.require_column(transform.work_column())?;
        let start = if from_backup {
            resume_index(&table, work, transform.markers())
        } else {
            0
        };
        if from_backup {
            info!(task = transform.name(), row = start + 1, "从备份续跑");
        }

        let done_before_start = (0..start)
            .filter(|&index| transform.markers().is_done(table.cell(index, work)))
            .count();

        self.report = RunReport {
            total: table.len(),
            resumed_from: start,
            already_done: done_before_start,
            ..Default::default()
        };
        self.table = table;
        Ok(start)
    }

    async fn process_rows<T: RowTransform>(&mut self, transform: &T, start: usize) -> Result<()> {
        let total = self.table.len();
        let work = self.table.require_column(transform.work_column())?;
        let save_interval = self.config.save_interval.max(1);
        let mut consecutive_failures = 0;

        let progress = progress_bar(total as u64, transform.name());
        progress.set_position(start as u64);

        for index in start..total {
            if transform.markers().is_done(self.table.cell(index, work)) {
                info!(row = index + 1, "已完成，跳过");
                self.report.already_done += 1;
                progress.inc(1);
                continue;
            }

            let row = self
                .table
                .row(index)
                .ok_or(mood_corpus_common::Error::RowOutOfRange(index))?;
            let (update, failed) = match self
                .config
                .retry
                .run(transform.name(), move || transform.apply(row))
                .await
            {
                Ok(update) => (update, false),
                Err(row_error) => {
                    warn!(row = index + 1, error = %row_error, "行处理失败");
                    (transform.failure(row, &row_error), true)
                }
            };

            let paced = !matches!(update, RowUpdate::Unchanged);
            if let RowUpdate::Cells(cells) = update {
                for (column, value) in cells {
                    self.table.set(index, &column, value)?;
                }
            }

            if failed {
                self.report.failed += 1;
                consecutive_failures += 1;
            } else if paced {
                self.report.succeeded += 1;
                consecutive_failures = 0;
            } else {
                self.report.unchanged += 1;
            }

            progress.inc(1);
            progress.set_message(format!(
                "成功 {} 失败 {}",
                self.report.succeeded, self.report.failed
            ));

            if (index + 1) % save_interval == 0 {
                self.store.save_progress(&self.table)?;
                self.report.saves += 1;
            }

            if let Some(limit) = self.config.max_consecutive_failures {
                if consecutive_failures >= limit {
                    error!(task = transform.name(), limit, "连续失败次数过多，停止处理");
                    self.report.halted = true;
                    progress.abandon();
                    return Ok(());
                }
            }

            if paced && index + 1 < total {
                self.config.pacing.wait().await;
            }
        }

        progress.finish();
        Ok(())
    }
}
