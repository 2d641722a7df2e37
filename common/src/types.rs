//! 模型输出的类型定义
//!
//! - Classification: 青少年抑郁分类结果
//! - CaseRecord: 生成的问诊案例

use serde::{Deserialize, Serialize};

/// 分类结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// 年龄验证是否通过
    pub age_pass: bool,
    /// 症状是否符合
    pub symptom_match: bool,
    /// 鉴别诊断是否通过
    pub exclusion_pass: bool,
    /// 最终结论
    pub is_depression: bool,
    /// 置信度 0-100
    pub confidence: f64,
    /// 判断依据简述
    pub reason: String,
}

/// 生成的案例
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// 家长口述
    pub question: String,
    /// 医师建议
    pub answer: String,
    /// 触发关键词 + 年龄阶段
    pub reason: String,
}
