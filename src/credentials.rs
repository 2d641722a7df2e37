//! 凭证获取
//!
//! 远端客户端只依赖 `CredentialProvider`，不关心凭证来自环境变量、
//! 配置文件还是交互输入。命令行默认的查找顺序：
//! 环境变量 → 配置文件 → 交互输入。

use crate::config::Config;
use crate::error::{CorpusError, Result};
use dialoguer::{Input, Password};

/// 需要的凭证种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    DeepseekApiKey,
    BaiduAppId,
    BaiduSecretKey,
}

impl Credential {
    pub fn env_var(&self) -> &'static str {
        match self {
            Credential::DeepseekApiKey => "DEEPSEEK_API_KEY",
            Credential::BaiduAppId => "BAIDU_APP_ID",
            Credential::BaiduSecretKey => "BAIDU_SECRET_KEY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Credential::DeepseekApiKey => "DeepSeek API密钥",
            Credential::BaiduAppId => "百度翻译 APP ID",
            Credential::BaiduSecretKey => "百度翻译 SECRET KEY",
        }
    }

    /// 输入时隐藏回显
    pub fn is_secret(&self) -> bool {
        !matches!(self, Credential::BaiduAppId)
    }
}

pub trait CredentialProvider {
    /// 取不到时返回 `Ok(None)`，交给下一个来源
    fn fetch(&self, credential: Credential) -> Result<Option<String>>;
}

/// 环境变量
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn fetch(&self, credential: Credential) -> Result<Option<String>> {
        Ok(std::env::var(credential.env_var())
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()))
    }
}

/// 配置文件中保存的凭证
pub struct ConfigCredentials {
    config: Config,
}

impl ConfigCredentials {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl CredentialProvider for ConfigCredentials {
    fn fetch(&self, credential: Credential) -> Result<Option<String>> {
        let value = match credential {
            Credential::DeepseekApiKey => &self.config.deepseek_api_key,
            Credential::BaiduAppId => &self.config.baidu_app_id,
            Credential::BaiduSecretKey => &self.config.baidu_secret_key,
        };
        Ok(value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }
}

/// 终端交互输入（不能为空）
pub struct PromptCredentials;

impl CredentialProvider for PromptCredentials {
    fn fetch(&self, credential: Credential) -> Result<Option<String>> {
        let prompt = format!("请输入{}", credential.label());
        loop {
            let input = if credential.is_secret() {
                Password::new().with_prompt(prompt.clone()).interact()
            } else {
                Input::<String>::new()
                    .with_prompt(prompt.clone())
                    .allow_empty(true)
                    .interact_text()
            };
            let value = input.map_err(|e| CorpusError::Prompt(e.to_string()))?;

            if !value.trim().is_empty() {
                return Ok(Some(value.trim().to_string()));
            }
            println!("{}不能为空！", credential.label());
        }
    }
}

/// 按顺序查找，第一个取到值的来源生效
#[derive(Default)]
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// 命令行默认顺序：环境变量 → 配置文件 → 交互输入
    pub fn standard(config: &Config, interactive: bool) -> Self {
        let chain = Self::new()
            .with(EnvCredentials)
            .with(ConfigCredentials::new(config.clone()));
        if interactive {
            chain.with(PromptCredentials)
        } else {
            chain
        }
    }

    pub fn require(&self, credential: Credential) -> Result<String> {
        for provider in &self.providers {
            if let Some(value) = provider.fetch(credential)? {
                return Ok(value);
            }
        }
        Err(CorpusError::MissingCredential(credential.label().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fixed(HashMap<&'static str, &'static str>);

    impl CredentialProvider for Fixed {
        fn fetch(&self, credential: Credential) -> Result<Option<String>> {
            Ok(self.0.get(credential.env_var()).map(|v| v.to_string()))
        }
    }

    #[test]
    fn test_chain_first_match_wins() {
        let chain = CredentialChain::new()
            .with(Fixed(HashMap::from([("BAIDU_APP_ID", "first")])))
            .with(Fixed(HashMap::from([
                ("BAIDU_APP_ID", "second"),
                ("BAIDU_SECRET_KEY", "secret"),
            ])));

        assert_eq!(chain.require(Credential::BaiduAppId).unwrap(), "first");
        assert_eq!(chain.require(Credential::BaiduSecretKey).unwrap(), "secret");
    }

    #[test]
    fn test_chain_missing() {
        let chain = CredentialChain::new().with(Fixed(HashMap::new()));
        let err = chain.require(Credential::DeepseekApiKey).unwrap_err();
        assert!(matches!(err, CorpusError::MissingCredential(_)));
        assert!(format!("{}", err).contains("DeepSeek"));
    }

    #[test]
    fn test_config_credentials_ignore_blank() {
        let config = Config {
            deepseek_api_key: Some("  ".into()),
            baidu_app_id: Some(" 2015 ".into()),
            ..Default::default()
        };
        let provider = ConfigCredentials::new(config);
        assert_eq!(provider.fetch(Credential::DeepseekApiKey).unwrap(), None);
        assert_eq!(
            provider.fetch(Credential::BaiduAppId).unwrap().as_deref(),
            Some("2015")
        );
    }
}
