//! 错误类型测试
//!
//! 各类错误的显示、转换与是否可重试

use mood_corpus::error::CorpusError;
use mood_corpus::remote::translate::parse_response;
use std::time::Duration;

/// CorpusError 的 Display
#[test]
fn test_error_display() {
    let errors = vec![
        CorpusError::Config("测试配置错误".to_string()),
        CorpusError::FileNotFound("input.xlsx".to_string()),
        CorpusError::FolderNotFound("/path/to/folder".to_string()),
        CorpusError::ApiCall("API调用失败".to_string()),
        CorpusError::Decode {
            path: "a.csv".to_string(),
            tried: "utf-8, gbk".to_string(),
        },
        CorpusError::Timeout(Duration::from_secs(30)),
        CorpusError::Interrupted,
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "错误信息为空: {:?}", err);
    }
}

/// 缺少凭证时提示设置方法
#[test]
fn test_missing_credential_message() {
    let err = CorpusError::MissingCredential("DeepSeek API密钥".to_string());
    let display = format!("{}", err);

    assert!(display.contains("DeepSeek API密钥"));
    assert!(display.contains("mood-corpus config"));
}

/// 只有瞬时错误会重试
#[test]
fn test_transient_classification() {
    assert!(CorpusError::Network("reset".into()).is_transient());
    assert!(CorpusError::Timeout(Duration::from_secs(1)).is_transient());
    assert!(CorpusError::Server { status: 500, message: String::new() }.is_transient());

    assert!(!CorpusError::Auth("bad key".into()).is_transient());
    assert!(!CorpusError::RateLimited("429".into()).is_transient());
    assert!(!CorpusError::ApiParse("x".into()).is_transient());
    assert!(!CorpusError::Interrupted.is_transient());
}

/// 百度错误码 52001/52002 可重试，其余不重试
#[test]
fn test_translation_codes() {
    let timeout = parse_response(r#"{"error_code":"52001","error_msg":"TIMEOUT"}"#).unwrap_err();
    assert!(timeout.is_transient());

    let balance = parse_response(r#"{"error_code":"54004","error_msg":"No balance"}"#).unwrap_err();
    assert!(!balance.is_transient());
    assert!(format!("{}", balance).contains("54004"));
}

/// 失败标记里的简短原因
#[test]
fn test_short_cause() {
    assert_eq!(CorpusError::ApiCall("x".into()).short_cause(), "API错误");
    assert_eq!(
        CorpusError::RetriesExhausted { attempts: 3, last: "x".into() }.short_cause(),
        "重试耗尽"
    );
    let parse: CorpusError = mood_corpus_common::Error::Parse("缺少字段".into()).into();
    assert_eq!(parse.short_cause(), "解析错误");
}

/// IO错误转换
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: CorpusError = io_err.into();

    assert!(matches!(err, CorpusError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSON错误转换
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: CorpusError = json_err.into();

    assert!(matches!(err, CorpusError::JsonParse(_)));
}

/// common::Error 透明转换
#[test]
fn test_common_error_transparent() {
    let common_err = mood_corpus_common::Error::MissingColumn("Comment".to_string());
    let err: CorpusError = common_err.into();

    assert!(matches!(err, CorpusError::Common(_)));
    assert!(format!("{}", err).contains("Comment"));
}
