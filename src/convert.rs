//! CSV 批量转 Excel

use crate::error::{CorpusError, Result};
use crate::sheet::{read_delimited, write_table};
use crate::ui::progress_bar;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// 包含子文件夹，输出保持相对目录结构
    pub recursive: bool,
    /// 覆盖已存在的 xlsx
    pub overwrite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for ConvertSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "总文件数: {}，成功转换: {}，跳过已存在: {}，转换失败: {}",
            self.total, self.converted, self.skipped, self.failed
        )
    }
}

/// 一个待转换文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// 列出要转换的文件（按路径排序）
pub fn collect_jobs(options: &ConvertOptions) -> Result<Vec<CsvJob>> {
    if !options.input_dir.is_dir() {
        return Err(CorpusError::FolderNotFound(
            options.input_dir.display().to_string(),
        ));
    }

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let mut jobs: Vec<CsvJob> = WalkDir::new(&options.input_dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file() && is_csv(entry.path()))
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(&options.input_dir).ok()?;
            let output = options.output_dir.join(relative).with_extension("xlsx");
            Some(CsvJob {
                input: entry.path().to_path_buf(),
                output,
            })
        })
        .collect();

    jobs.sort_by(|a, b| a.input.cmp(&b.input));
    Ok(jobs)
}

pub fn convert_file(job: &CsvJob) -> Result<usize> {
    let table = read_delimited(&job.input, b',')?;
    write_table(&job.output, &table)?;
    Ok(table.len())
}

/// 单个文件失败只计数，不中断
pub fn convert_folder(options: &ConvertOptions) -> Result<ConvertSummary> {
    let jobs = collect_jobs(options)?;
    let mut summary = ConvertSummary {
        total: jobs.len(),
        ..Default::default()
    };
    if jobs.is_empty() {
        return Ok(summary);
    }

    let progress = progress_bar(jobs.len() as u64, "转换");
    for job in &jobs {
        let name = job
            .input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        progress.set_message(name);

        if job.output.exists() && !options.overwrite {
            debug!(output = %job.output.display(), "已存在，跳过");
            summary.skipped += 1;
        } else {
            match convert_file(job) {
                Ok(rows) => {
                    debug!(input = %job.input.display(), rows, "转换完成");
                    summary.converted += 1;
                }
                Err(e) => {
                    warn!(input = %job.input.display(), error = %e, "转换失败");
                    progress.println(format!("✗ {}: {}", job.input.display(), e));
                    summary.failed += 1;
                }
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(summary)
}
