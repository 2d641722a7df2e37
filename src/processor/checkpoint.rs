//! 检查点持久化
//!
//! 处理中途定期写备份和输出；正常结束只留输出并删掉备份；
//! 中断或熔断时保留备份，下次从备份续跑。

use crate::error::Result;
use crate::sheet::{read_table, write_table};
use mood_corpus_common::Table;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub trait CheckpointStore {
    /// 有备份时返回备份内容
    fn load_backup(&self) -> Result<Option<Table>>;
    fn save_progress(&self, table: &Table) -> Result<()>;
    fn save_final(&self, table: &Table) -> Result<()>;
    fn save_abort(&self, table: &Table) -> Result<()>;
}

/// xlsx 文件检查点
#[derive(Debug, Clone)]
pub struct XlsxCheckpoint {
    output: PathBuf,
    backup: Option<PathBuf>,
}

impl XlsxCheckpoint {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            backup: None,
        }
    }

    pub fn with_backup(mut self, backup: impl Into<PathBuf>) -> Self {
        self.backup = Some(backup.into());
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn backup(&self) -> Option<&Path> {
        self.backup.as_deref()
    }
}

impl CheckpointStore for XlsxCheckpoint {
    fn load_backup(&self) -> Result<Option<Table>> {
        match &self.backup {
            Some(path) if path.exists() => {
                info!(backup = %path.display(), "发现备份文件");
                read_table(path).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn save_progress(&self, table: &Table) -> Result<()> {
        if let Some(backup) = &self.backup {
            write_table(backup, table)?;
        }
        write_table(&self.output, table)?;
        debug!(output = %self.output.display(), rows = table.len(), "已保存进度");
        Ok(())
    }

    fn save_final(&self, table: &Table) -> Result<()> {
        write_table(&self.output, table)?;
        if let Some(backup) = &self.backup {
            match std::fs::remove_file(backup) {
                Ok(()) => debug!(backup = %backup.display(), "已删除备份"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn save_abort(&self, table: &Table) -> Result<()> {
        if let Some(backup) = &self.backup {
            write_table(backup, table)?;
        }
        write_table(&self.output, table)?;
        info!(output = %self.output.display(), "已保存中断时的进度");
        Ok(())
    }
}
