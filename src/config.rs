use crate::error::{CorpusError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub deepseek_api_key: Option<String>,
    pub baidu_app_id: Option<String>,
    pub baidu_secret_key: Option<String>,
    pub chat: ChatSettings,
    pub translate: TranslateSettings,
}

/// 对话模型（OpenAI兼容接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

/// 百度翻译
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateSettings {
    pub endpoint: String,
    pub from: String,
    pub to: String,
    pub timeout_seconds: u64,
    /// 单次请求的最大字符数
    pub max_chars: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".into(),
            model: "deepseek-chat".into(),
            timeout_seconds: 30,
        }
    }
}

impl Default for TranslateSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://fanyi-api.baidu.com/api/trans/vip/translate".into(),
            from: "en".into(),
            to: "zh".into(),
            timeout_seconds: 50,
            max_chars: 5000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CorpusError::Config("找不到用户主目录".into()))?;
        Ok(home.join(".config").join("mood-corpus").join("config.json"))
    }
}
