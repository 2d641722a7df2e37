use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    // 本地 I/O：整次运行失败，不重试
    #[error("配置错误: {0}")]
    Config(String),

    #[error("未提供{0}。可设置环境变量，或用 `mood-corpus config` 保存")]
    MissingCredential(String),

    #[error("交互输入失败: {0}")]
    Prompt(String),

    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件夹不存在: {0}")]
    FolderNotFound(String),

    #[error("不支持的文件格式: {0}")]
    UnsupportedFormat(String),

    #[error("无法解码文件（已尝试 {tried}）: {path}")]
    Decode { path: String, tried: String },

    #[error("表格读取错误: {0}")]
    Sheet(String),

    #[error("CSV解析错误: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析错误: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] mood_corpus_common::Error),

    // 瞬时网络错误：指数退避重试
    #[error("网络错误: {0}")]
    Network(String),

    #[error("请求超时（{0:?}）")]
    Timeout(Duration),

    #[error("服务端错误 [{status}]: {message}")]
    Server { status: u16, message: String },

    // 远端逻辑错误：不重试，直接记为失败行
    #[error("认证失败: {0}")]
    Auth(String),

    #[error("请求频率或额度受限: {0}")]
    RateLimited(String),

    #[error("API调用错误: {0}")]
    ApiCall(String),

    #[error("API响应解析失败: {0}")]
    ApiParse(String),

    #[error("翻译API错误 [{code}]: {cause}")]
    Translation { code: String, cause: String },

    // 运行级
    #[error("超过最大重试次数（{attempts}次）: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("用户中断")]
    Interrupted,
}

impl CorpusError {
    /// 是否值得重试（连接错误、超时、5xx、翻译服务的超时/系统错误）
    pub fn is_transient(&self) -> bool {
        match self {
            CorpusError::Network(_) | CorpusError::Timeout(_) | CorpusError::Server { .. } => true,
            CorpusError::Translation { code, .. } => {
                crate::remote::translate::is_transient_code(code)
            }
            _ => false,
        }
    }

    /// 写进失败标记后面的简短原因
    pub fn short_cause(&self) -> &'static str {
        match self {
            CorpusError::Network(_) | CorpusError::Timeout(_) | CorpusError::Server { .. } => "网络错误",
            CorpusError::RetriesExhausted { .. } => "重试耗尽",
            CorpusError::Auth(_) => "认证失败",
            CorpusError::RateLimited(_) => "额度受限",
            CorpusError::ApiParse(_) | CorpusError::JsonParse(_) | CorpusError::Common(_) => "解析错误",
            CorpusError::Translation { .. } => "翻译错误",
            _ => "API错误",
        }
    }
}

pub type Result<T> = std::result::Result<T, CorpusError>;
