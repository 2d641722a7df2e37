//! 模型响应解析
//!
//! 模型返回的文本里提取JSON，再检查所需字段是否齐全。
//! 字段缺失或类型不对都作为解析错误返回，由调用方记为失败行。

use crate::error::{Error, Result};
use crate::types::{CaseRecord, Classification};
use serde_json::{Map, Value};

/// 从响应中提取JSON部分
///
/// 提取优先顺序:
/// 1. ```json ... ``` 代码块
/// 2. 第一个 `{` 或 `[` 到对应的最后一个 `}` / `]`
///
/// # Examples
/// ```
/// use mood_corpus_common::extract_json;
///
/// let response = "结果如下：{\"reason\": \"年龄不符\"}";
/// assert_eq!(extract_json(response).unwrap(), "{\"reason\": \"年龄不符\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7;
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find(['{', '[']) {
        let close = if response[start..].starts_with('{') { '}' } else { ']' };
        if let Some(end) = response.rfind(close) {
            if end > start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("未找到JSON".into()))
}

fn parse_value(response: &str, what: &str) -> Result<Value> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("{}JSON解析错误: {}", what, e)))
}

/// 解析分类结果
///
/// `is_depression`、`confidence`、`reason` 三个字段必须存在；
/// 三项验证字段缺失时按 false 处理。置信度接受数值或数字字符串，限制在 0-100。
pub fn parse_classification(response: &str) -> Result<Classification> {
    let value = parse_value(response, "分类结果")?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::Parse("分类结果不是JSON对象".into()))?;

    for key in ["is_depression", "confidence", "reason"] {
        if !object.contains_key(key) {
            return Err(Error::Parse(format!("分类结果缺少字段: {}", key)));
        }
    }

    let is_depression = bool_field(object, "is_depression")
        .ok_or_else(|| Error::Parse("is_depression 不是布尔值".into()))?;
    let confidence = number_field(object, "confidence")
        .ok_or_else(|| Error::Parse("confidence 不是数值".into()))?;

    Ok(Classification {
        age_pass: bool_field(object, "age_pass").unwrap_or(false),
        symptom_match: bool_field(object, "symptom_match").unwrap_or(false),
        exclusion_pass: bool_field(object, "exclusion_pass").unwrap_or(false),
        is_depression,
        confidence: confidence.clamp(0.0, 100.0),
        reason: string_field(object, "reason"),
    })
}

/// 解析生成的案例
///
/// 接受三种形态：案例对象、案例数组（取第一条）、包着数组的对象（取第一条）。
/// `question`、`answer`、`reason` 必须是非空字符串。
pub fn parse_case_record(response: &str) -> Result<CaseRecord> {
    let value = parse_value(response, "案例")?;
    let object = case_object(&value)
        .ok_or_else(|| Error::Parse("响应中没有案例对象".into()))?;

    let field = |key: &str| -> Result<String> {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::Parse(format!("案例缺少字段: {}", key)))
    };

    Ok(CaseRecord {
        question: field("question")?,
        answer: field("answer")?,
        reason: field("reason")?,
    })
}

fn case_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(object) if object.contains_key("question") => Some(object),
        Value::Array(items) => items.first().and_then(Value::as_object),
        Value::Object(object) => object
            .values()
            .find_map(|v| v.as_array())
            .and_then(|items| items.first())
            .and_then(Value::as_object),
        _ => None,
    }
}

fn bool_field(object: &Map<String, Value>, key: &str) -> Option<bool> {
    match object.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn number_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    match object.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
