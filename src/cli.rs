use crate::processor::ProcessorConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "mood-corpus")]
#[command(about = "抑郁相关文本数据处理工具：CSV转Excel、关键词筛选、模型分类、案例生成、批量翻译", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 输出详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 结束时不等待回车
    #[arg(long, global = true)]
    pub no_pause: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 批量把 CSV 转成 xlsx
    Convert {
        /// CSV 所在文件夹
        #[arg(required = true)]
        input_dir: PathBuf,

        /// 输出文件夹（默认: 输入文件夹/EXCEL转换结果）
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// 包含子文件夹
        #[arg(short, long)]
        recursive: bool,

        /// 覆盖已存在的 xlsx
        #[arg(long)]
        overwrite: bool,
    },

    /// 保留包含关键词的行
    Filter {
        /// 输入文件（xlsx/csv）
        #[arg(required = true)]
        input: PathBuf,

        /// 输出文件（默认: <输入文件名>_filtered.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 检查的列，逗号分隔
        #[arg(short, long, value_delimiter = ',', default_value = "question,answer")]
        columns: Vec<String>,

        /// 关键词，逗号分隔
        #[arg(short, long, value_delimiter = ',', default_value = "抑郁")]
        keywords: Vec<String>,

        /// 关键词按正则表达式匹配
        #[arg(long)]
        regex: bool,
    },

    /// 用模型判断是否属于青少年抑郁
    Classify {
        /// 输入文件（xlsx/csv）
        #[arg(required = true)]
        input: PathBuf,

        /// 输出文件（默认: <输入文件名>_classified.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 问题列（默认第1列）
        #[arg(long)]
        question_column: Option<String>,

        /// 回答列（默认第2列）
        #[arg(long)]
        answer_column: Option<String>,

        #[command(flatten)]
        process: ProcessArgs,
    },

    /// 用模型生成问诊案例
    Generate {
        /// 生成数量（1-100）
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// 输出文件（默认: 桌面/抑郁数据.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        process: ProcessArgs,
    },

    /// 用百度翻译批量翻译一列
    Translate {
        /// 输入文件（xlsx/csv）
        #[arg(required = true)]
        input: PathBuf,

        /// 输出文件（默认: <输入文件名>_translated.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 要翻译的列
        #[arg(short, long, default_value = "Comment")]
        column: String,

        /// 译文写到这一列（默认原地替换）
        #[arg(long)]
        output_column: Option<String>,

        /// 源语言（默认取配置，en）
        #[arg(long)]
        from: Option<String>,

        /// 目标语言（默认取配置，zh）
        #[arg(long)]
        to: Option<String>,

        #[command(flatten)]
        process: ProcessArgs,
    },

    /// 显示/修改配置
    Config {
        /// 保存 DeepSeek API 密钥
        #[arg(long)]
        set_deepseek_key: Option<String>,

        /// 保存百度翻译 APP ID
        #[arg(long)]
        set_baidu_app_id: Option<String>,

        /// 保存百度翻译 SECRET KEY
        #[arg(long)]
        set_baidu_secret: Option<String>,

        /// 显示配置
        #[arg(long)]
        show: bool,
    },
}

/// 逐行处理的公共参数，未指定时用各任务的默认值
#[derive(Args, Debug, Clone, Default)]
pub struct ProcessArgs {
    /// 每处理多少行保存一次
    #[arg(long)]
    pub save_interval: Option<usize>,

    /// 请求间隔（毫秒）
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// 请求间隔的随机抖动上限（毫秒）
    #[arg(long)]
    pub jitter_ms: Option<u64>,

    /// 单行最多请求次数
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// 进度备份文件
    #[arg(long)]
    pub backup: Option<PathBuf>,
}

impl ProcessArgs {
    pub fn apply(&self, mut config: ProcessorConfig) -> ProcessorConfig {
        if let Some(save_interval) = self.save_interval {
            config.save_interval = save_interval.max(1);
        }
        if let Some(interval_ms) = self.interval_ms {
            config.pacing.interval = Duration::from_millis(interval_ms);
        }
        if let Some(jitter_ms) = self.jitter_ms {
            config.pacing.jitter = Duration::from_millis(jitter_ms);
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_attempts = max_retries.max(1);
        }
        config
    }
}
