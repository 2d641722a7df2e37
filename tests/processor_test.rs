//! 逐行处理器测试
//!
//! 续跑、保存次数、重试耗尽、熔断、中断后续跑

use mood_corpus::error::{CorpusError, Result};
use mood_corpus::processor::{
    CheckpointStore, Pacing, Processor, ProcessorConfig, RetryPolicy, RowTransform, RowUpdate,
    XlsxCheckpoint,
};
use mood_corpus::sheet::read_table;
use mood_corpus_common::{Cell, Markers, Row, Table};
use std::cell::RefCell;
use std::future::pending;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::Notify;

const WORK: &str = "result";

#[derive(Clone, Copy)]
enum Mode {
    Succeed,
    Transient,
    Permanent,
}

struct Recorder {
    mode: Mode,
    markers: Markers,
    seen: RefCell<Vec<usize>>,
    /// 处理到该行时发出中断并挂起
    interrupt: Option<(Arc<Notify>, usize)>,
    fail_rows: Vec<usize>,
}

impl Recorder {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            markers: Markers::failure_only("【失败】"),
            seen: RefCell::new(Vec::new()),
            interrupt: None,
            fail_rows: Vec::new(),
        }
    }

    fn seen(&self) -> Vec<usize> {
        self.seen.borrow().clone()
    }
}

impl RowTransform for Recorder {
    fn name(&self) -> &str {
        "test"
    }

    fn work_column(&self) -> &str {
        WORK
    }

    fn markers(&self) -> &Markers {
        &self.markers
    }

    fn prepare(&self, table: &mut Table) -> Result<()> {
        table.require_column("text")?;
        let end = table.headers().len();
        table.insert_column(end, WORK, Cell::Empty);
        Ok(())
    }

    async fn apply(&self, row: Row<'_>) -> Result<RowUpdate> {
        self.seen.borrow_mut().push(row.index());

        if let Some((notify, at)) = &self.interrupt {
            if row.index() == *at {
                notify.notify_one();
                pending::<()>().await;
            }
        }
        if self.fail_rows.contains(&row.index()) {
            return Err(CorpusError::ApiCall("rejected".into()));
        }

        match self.mode {
            Mode::Succeed => Ok(RowUpdate::cell(WORK, format!("ok:{}", row.text("text")))),
            Mode::Transient => Err(CorpusError::Network("connection reset".into())),
            Mode::Permanent => Err(CorpusError::ApiCall("bad request".into())),
        }
    }

    fn failure(&self, _row: Row<'_>, error: &CorpusError) -> RowUpdate {
        RowUpdate::cell(WORK, self.markers.mark_failure(error.short_cause()))
    }
}

/// 记录保存事件的内存检查点
#[derive(Default)]
struct MemoryStore {
    backup: RefCell<Option<Table>>,
    events: RefCell<Vec<&'static str>>,
}

impl MemoryStore {
    fn with_backup(table: Table) -> Self {
        Self {
            backup: RefCell::new(Some(table)),
            ..Default::default()
        }
    }

    fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }
}

impl CheckpointStore for MemoryStore {
    fn load_backup(&self) -> Result<Option<Table>> {
        Ok(self.backup.borrow().clone())
    }

    fn save_progress(&self, table: &Table) -> Result<()> {
        self.events.borrow_mut().push("progress");
        *self.backup.borrow_mut() = Some(table.clone());
        Ok(())
    }

    fn save_final(&self, _table: &Table) -> Result<()> {
        self.events.borrow_mut().push("final");
        *self.backup.borrow_mut() = None;
        Ok(())
    }

    fn save_abort(&self, table: &Table) -> Result<()> {
        self.events.borrow_mut().push("abort");
        *self.backup.borrow_mut() = Some(table.clone());
        Ok(())
    }
}

fn config(save_interval: usize, max_attempts: u32) -> ProcessorConfig {
    ProcessorConfig {
        save_interval,
        retry: RetryPolicy::new(max_attempts)
            .with_delays(Duration::from_millis(1), Duration::from_millis(2)),
        pacing: Pacing::none(),
        max_consecutive_failures: None,
    }
}

fn input(rows: usize) -> Table {
    Table::from_rows(
        vec!["text".into()],
        (0..rows).map(|i| vec![Cell::Text(format!("row{}", i))]).collect(),
    )
}

/// `done` 行已有结果的表
fn partially_done(rows: usize, done: &[usize]) -> Table {
    let mut table = input(rows);
    table.insert_column(1, WORK, Cell::Empty);
    for &row in done {
        table.set(row, WORK, "ok:earlier".into()).unwrap();
    }
    table
}

#[tokio::test]
async fn test_save_count_with_done_rows() {
    let transform = Recorder::new(Mode::Succeed);
    let mut processor = Processor::new(config(3, 3), MemoryStore::default());

    let report = processor
        .run(&transform, || Ok(partially_done(7, &[0, 1])), pending())
        .await
        .unwrap();

    assert_eq!(transform.seen(), vec![2, 3, 4, 5, 6]);
    assert_eq!(processor.store().count("progress"), 2);
    assert_eq!(processor.store().count("final"), 1);
    assert_eq!(report.saves, 3);
    assert_eq!(report.already_done, 2);
    assert_eq!(report.succeeded, 5);
}

#[tokio::test]
async fn test_resume_from_backup_skips_done_rows() {
    let transform = Recorder::new(Mode::Succeed);
    let backup = partially_done(6, &[0, 1, 2, 3]);
    let mut processor = Processor::new(config(10, 3), MemoryStore::with_backup(backup));

    let report = processor
        .run(&transform, || panic!("input must not be read when a backup exists"), pending())
        .await
        .unwrap();

    assert_eq!(report.resumed_from, 4);
    assert_eq!(transform.seen(), vec![4, 5]);
    assert_eq!(processor.table().len(), 6);
    assert_eq!(processor.table().row(5).unwrap().text(WORK), "ok:row5");
}

#[tokio::test]
async fn test_every_row_marked_after_full_run() {
    let mut transform = Recorder::new(Mode::Succeed);
    transform.fail_rows = vec![1, 3];
    let mut processor = Processor::new(config(2, 2), MemoryStore::default());

    let report = processor
        .run(&transform, || Ok(input(5)), pending())
        .await
        .unwrap();

    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 2);
    let work = processor.table().require_column(WORK).unwrap();
    for row in 0..5 {
        assert!(transform.markers().is_done(processor.table().cell(row, work)));
    }
    assert_eq!(processor.table().row(1).unwrap().text(WORK), "【失败】API错误");
}

#[tokio::test]
async fn test_retry_exhaustion_marks_failure_and_continues() {
    let transform = Recorder::new(Mode::Transient);
    let mut processor = Processor::new(config(10, 3), MemoryStore::default());

    let report = processor
        .run(&transform, || Ok(input(2)), pending())
        .await
        .unwrap();

    assert_eq!(transform.seen(), vec![0, 0, 0, 1, 1, 1]);
    assert_eq!(report.failed, 2);
    assert!(!report.halted);
    assert_eq!(processor.table().row(0).unwrap().text(WORK), "【失败】重试耗尽");
}

#[tokio::test]
async fn test_consecutive_failures_halt() {
    let transform = Recorder::new(Mode::Permanent);
    let mut cfg = config(1, 3);
    cfg.max_consecutive_failures = Some(2);
    let mut processor = Processor::new(cfg, MemoryStore::default());

    let report = processor
        .run(&transform, || Ok(input(5)), pending())
        .await
        .unwrap();

    assert!(report.halted);
    assert_eq!(transform.seen(), vec![0, 1]);
    assert_eq!(processor.store().count("abort"), 1);
    assert_eq!(processor.store().count("final"), 0);
}

#[tokio::test]
async fn test_interrupt_then_resume() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.xlsx");
    let backup = dir.path().join("out_backup.xlsx");
    let store = || XlsxCheckpoint::new(&output).with_backup(&backup);

    let notify = Arc::new(Notify::new());
    let mut first = Recorder::new(Mode::Succeed);
    first.interrupt = Some((notify.clone(), 3));

    let mut processor = Processor::new(config(100, 3), store());
    let result = processor
        .run(&first, || Ok(input(6)), notify.notified())
        .await;

    assert!(matches!(result, Err(CorpusError::Interrupted)));
    assert!(backup.exists());
    assert_eq!(read_table(&backup).unwrap().len(), 6);

    let second = Recorder::new(Mode::Succeed);
    let mut processor = Processor::new(config(100, 3), store());
    let report = processor
        .run(&second, || Ok(input(6)), pending())
        .await
        .unwrap();

    assert_eq!(report.resumed_from, 3);
    assert_eq!(second.seen(), vec![3, 4, 5]);
    assert!(!backup.exists());

    let saved = read_table(&output).unwrap();
    assert_eq!(saved.len(), 6);
    assert_eq!(saved.row(0).unwrap().text(WORK), "ok:row0");
    assert_eq!(saved.row(5).unwrap().text(WORK), "ok:row5");
}

#[tokio::test]
async fn test_unchanged_rows_are_counted() {
    struct Skipper(Markers);

    impl RowTransform for Skipper {
        fn name(&self) -> &str {
            "skip"
        }
        fn work_column(&self) -> &str {
            "text"
        }
        fn markers(&self) -> &Markers {
            &self.0
        }
        fn prepare(&self, _table: &mut Table) -> Result<()> {
            Ok(())
        }
        async fn apply(&self, _row: Row<'_>) -> Result<RowUpdate> {
            Ok(RowUpdate::Unchanged)
        }
        fn failure(&self, _row: Row<'_>, _error: &CorpusError) -> RowUpdate {
            RowUpdate::Unchanged
        }
    }

    let table = Table::from_rows(vec!["text".into()], vec![vec![Cell::Empty], vec![Cell::Empty]]);
    let mut processor = Processor::new(config(10, 1), MemoryStore::default());
    let report = processor
        .run(&Skipper(Markers::new("【翻译成功】", "【翻译失败】")), || Ok(table), pending())
        .await
        .unwrap();

    assert_eq!(report.unchanged, 2);
    assert_eq!(report.succeeded, 0);
}

#[tokio::test]
async fn test_already_done_counts_only_done_rows() {
    let transform = Recorder::new(Mode::Succeed);
    let backup = partially_done(5, &[0, 2]);
    let mut processor = Processor::new(config(10, 3), MemoryStore::with_backup(backup));

    let report = processor
        .run(&transform, || panic!("input must not be read when a backup exists"), pending())
        .await
        .unwrap();

    assert_eq!(report.resumed_from, 3);
    assert_eq!(report.already_done, 2);
    assert_eq!(transform.seen(), vec![3, 4]);
}

/// 日志输出缓冲
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_skipped_rows_visible_at_info() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let transform = Recorder::new(Mode::Succeed);
    let mut processor = Processor::new(config(10, 3), MemoryStore::default());
    processor
        .run(&transform, || Ok(partially_done(4, &[1, 2])), pending())
        .await
        .unwrap();

    assert_eq!(transform.seen(), vec![0, 3]);
    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert_eq!(output.matches("已完成，跳过").count(), 2);
}
