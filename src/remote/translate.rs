//! 百度通用翻译 API
//!
//! 签名：`md5(appid + q + salt + secret)` 的十六进制小写

use super::{transport_error, Translator};
use crate::config::TranslateSettings;
use crate::error::{CorpusError, Result};
use md5::{Digest, Md5};
use mood_corpus_common::truncate_chars;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct BaiduResponse {
    #[serde(default)]
    error_code: Option<Value>,
    #[serde(default)]
    error_msg: Option<String>,
    #[serde(default)]
    trans_result: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    dst: String,
}

pub struct BaiduTranslator {
    client: reqwest::Client,
    endpoint: String,
    app_id: String,
    secret_key: String,
    from: String,
    to: String,
    max_chars: usize,
    timeout: Duration,
}

impl BaiduTranslator {
    pub fn new(app_id: String, secret_key: String, settings: &TranslateSettings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.timeout_seconds);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CorpusError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            app_id,
            secret_key,
            from: settings.from.clone(),
            to: settings.to.clone(),
            max_chars: settings.max_chars,
            timeout,
        })
    }

    /// 请求参数；超长文本先截断，签名按实际发送的 `q` 计算
    fn request_params(&self, text: &str, salt: &str) -> Vec<(&'static str, String)> {
        let query = truncate_chars(text, self.max_chars);
        let sign = sign(&self.app_id, &query, salt, &self.secret_key);
        vec![
            ("q", query),
            ("from", self.from.clone()),
            ("to", self.to.clone()),
            ("appid", self.app_id.clone()),
            ("salt", salt.to_string()),
            ("sign", sign),
        ]
    }
}

impl Translator for BaiduTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let salt = rand::thread_rng().gen_range(100_000..=999_999).to_string();
        let params = self.request_params(text, &salt);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        match status {
            200..=299 => parse_response(&body),
            500..=599 => Err(CorpusError::Server { status, message: body }),
            _ => Err(CorpusError::ApiCall(format!("[{}] {}", status, body.trim()))),
        }
    }
}

pub fn sign(app_id: &str, query: &str, salt: &str, secret_key: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(app_id.as_bytes());
    hasher.update(query.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(secret_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// 52001 请求超时、52002 系统错误，可以重试
pub fn is_transient_code(code: &str) -> bool {
    matches!(code, "52001" | "52002")
}

pub fn error_cause(code: &str) -> Option<&'static str> {
    let cause = match code {
        "52001" => "请求超时",
        "52002" => "系统错误",
        "52003" => "未授权用户，请检查APP ID或服务是否开通",
        "54000" => "必填参数为空",
        "54001" => "签名错误，请检查SECRET KEY",
        "54003" => "访问频率受限",
        "54004" => "账户余额不足",
        "54005" => "长文本请求过于频繁",
        "58000" => "客户端IP非法",
        "58001" => "不支持该语言方向",
        "58002" => "服务已关闭",
        "90107" => "认证未通过或未生效",
        _ => return None,
    };
    Some(cause)
}

/// 解析响应；多段译文用换行拼接
pub fn parse_response(body: &str) -> Result<String> {
    let response: BaiduResponse =
        serde_json::from_str(body).map_err(|e| CorpusError::ApiParse(e.to_string()))?;

    if let Some(code) = response.error_code {
        let code = match code {
            Value::String(s) => s,
            other => other.to_string(),
        };
        // 52000 表示成功
        if code != "52000" {
            let cause = error_cause(&code)
                .map(str::to_string)
                .or(response.error_msg)
                .unwrap_or_else(|| "未知错误".into());
            return Err(CorpusError::Translation { code, cause });
        }
    }

    if response.trans_result.is_empty() {
        return Err(CorpusError::ApiParse("响应中没有 trans_result".into()));
    }

    Ok(response
        .trans_result
        .into_iter()
        .map(|segment| segment.dst)
        .collect::<Vec<_>>()
        .join("\n"))
}
