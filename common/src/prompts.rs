//! 提示词
//!
//! - CLASSIFY_SYSTEM_PROMPT: 青少年抑郁三步判定
//! - GENERATE_SYSTEM_PROMPT / GENERATE_USER_PROMPT: 问诊案例生成
//! - build_classify_input: 分类请求的用户输入

use crate::marker::truncate_chars;

/// 分类输入的最大字符数
pub const CLASSIFY_INPUT_MAX_CHARS: usize = 2000;

pub const CLASSIFY_SYSTEM_PROMPT: &str = r#"你是一名心理分析专家，请判断下面的问诊记录是否属于青少年（6-18岁）抑郁问题，按三步验证：

## 第一步：年龄验证（必须明确满足）
至少满足一项即可确认处于6-18岁：
1. 直接出现年龄数字（如：12岁）
2. 明确的教育阶段（如：初一、高中生）
3. 学生特征词（学生/同学/老师/学校/家长会）
排除：出现"新生儿"、"幼儿园"、"大学生"等非适龄描述，或明显非青少年疾病。

## 第二步：核心症状（至少满足一类）
- 情绪症状：持续两周以上的抑郁心境、莫名哭泣、情绪麻木、兴趣丧失
- 行为症状：自残、自杀倾向、长期逃学、社交隔离、持续自罪感
- 生理症状：持续失眠、暴食或厌食、不明原因疼痛、极端疲惫
注意排除感冒等普通生理疾病引起的症状。

## 第三步：鉴别诊断（必须通过）
排除：已确诊的其他心理疾病（自闭症、多动症等）、药物或毒品引发的症状、正常发育阶段的短期情绪波动。

## 输出
只返回JSON对象：
{
  "age_pass": 布尔值,
  "symptom_match": 布尔值,
  "exclusion_pass": 布尔值,
  "is_depression": 布尔值,
  "confidence": 0-100的数值（三项全部通过时为80加症状严重度0-20，否则为0）,
  "reason": "判断依据简述，如：年龄不符/症状不足/确诊多动症"
}

## 示例
- 14岁女生连续两周逃学自残，诊断书记载"抑郁发作" → true
- 6岁儿童确诊自闭症出现的情绪异常 → false
- 大学生考研压力导致的失眠 → false"#;

pub const GENERATE_SYSTEM_PROMPT: &str = r#"请按以下规则生成一条校园青少年抑郁问诊数据，只输出JSON对象：
{"question": "...", "answer": "...", "reason": "..."}

## 字段
- question：家长口述，包含年龄性别、事件、症状，不超过25字。例："儿子14岁被家委会批评后绝食"
- answer：医师建议，包含类型提示、数据、方案，不超过40字。例："疑似反应性抑郁，35%重点校有此现象，建议设立家庭情绪角"
- reason：触发关键词与年龄阶段，用"|"分隔。例："家委会施压|离异家庭|青春期早期"

## 内容
- 年龄：12-14岁 / 15-16岁 / 17-18岁
- 背景：重点中学，家庭类型随机（高知/离异/留守/控制型）
- 症状组合：学业压力（成绩暴跌/作业拖延/逃学）、人际问题（被孤立/恋爱困扰/社交恐惧）、躯体症状（自残/暴食/失眠/疼痛）、家庭冲突（监控/冷战/财产纠纷）
- 医师数据基准：重点中学抑郁率24.8%、监控家庭41%、实验班焦虑率32%
- 干预方案：家庭（拆除监控/每日倾听20分钟/暂停课外班）、学校（心理教师介入/课业减压期/建立同伴支持）
- 关键词：学业触发（实验班淘汰/月考排名/家委会施压）、家庭触发（监控社交/遗产纠纷/留学争执）、年龄标签（青春期早期(12-14)/叛逆高峰期(15-16)/成年过渡期(17-18)）

## 示例
{"question":"女儿15岁发现房间摄像头后，用剪刀剪床单","answer":"典型控制型家庭抑郁，监控引发问题占41%，建议立即拆除并设立孩子决策日","reason":"监控社交|实验班淘汰|叛逆高峰期"}"#;

pub const GENERATE_USER_PROMPT: &str = "生成案例";

/// 分类请求的用户输入（超长截断）
pub fn build_classify_input(question: &str, answer: &str) -> String {
    let combined = format!("问题描述：{}\n医师回答：{}", question, answer);
    truncate_chars(&combined, CLASSIFY_INPUT_MAX_CHARS)
}
