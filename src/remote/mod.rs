//! 远端服务
//!
//! 任务只依赖 `ChatModel` / `Translator` 两个接口，测试时可换成本地实现。

pub mod chat;
pub mod translate;

pub use chat::ChatClient;
pub use translate::BaiduTranslator;

use crate::error::{CorpusError, Result};
use std::time::Duration;

/// 对话模型（JSON 输出模式）
#[allow(async_fn_in_trait)]
pub trait ChatModel {
    async fn complete_json(&self, system: &str, user: &str, temperature: f32) -> Result<String>;
}

/// 文本翻译
#[allow(async_fn_in_trait)]
pub trait Translator {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// 把 reqwest 的传输层错误归类为超时或网络错误
pub(crate) fn transport_error(error: reqwest::Error, timeout: Duration) -> CorpusError {
    if error.is_timeout() {
        CorpusError::Timeout(timeout)
    } else {
        CorpusError::Network(error.to_string())
    }
}
