//! 应用配置模型

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_API_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_PROMPT: &str = concat!(
    "You are a helpful assistant. Please generate a very short, encouraging reminder ",
    "for me to stay focused and drink water. Keep it under 20 words."
);

/// 定时模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    /// 每日固定时间 (HH:MM)
    Daily,
    /// 固定间隔 (分钟)
    Interval,
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleMode::Daily => f.write_str("daily"),
            ScheduleMode::Interval => f.write_str("interval"),
        }
    }
}

/// 界面语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Zh,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Zh,
            Language::Zh => Language::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => f.write_str("en"),
            Language::Zh => f.write_str("zh"),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub language: Language,
    pub api_url: String,
    pub api_key: String, // 为空表示不发送 Authorization
    pub model: String,
    pub prompt: String,
    pub mode: ScheduleMode,
    pub time_value: String, // HH:MM 或分钟数, 取决于 mode
    pub auto_start: bool,
    pub theme: String,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            language: Language::Zh,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            mode: ScheduleMode::Interval,
            time_value: "60".to_string(),
            auto_start: false,
            theme: "System".to_string(),
        }
    }

    /// 已配置的 Bearer token
    pub fn bearer_token(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_shape() {
        let value = serde_json::to_value(AppConfig::default()).unwrap();
        assert_eq!(value["language"], "zh");
        assert_eq!(value["api_url"], DEFAULT_API_URL);
        assert_eq!(value["api_key"], "");
        assert_eq!(value["mode"], "interval");
        assert_eq!(value["time_value"], "60");
        assert_eq!(value["auto_start"], false);
        assert_eq!(value["theme"], "System");
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"mode": "daily", "time_value": "08:30"}"#).unwrap();
        assert_eq!(config.mode, ScheduleMode::Daily);
        assert_eq!(config.time_value, "08:30");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn test_default_prompt_text() {
        assert_eq!(
            DEFAULT_PROMPT,
            "You are a helpful assistant. Please generate a very short, encouraging reminder for me \
             to stay focused and drink water. Keep it under 20 words."
        );
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let parsed = serde_json::from_str::<AppConfig>(r#"{"mode": "weekly"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_bearer_token_ignores_blank_key() {
        let mut config = AppConfig::default();
        assert_eq!(config.bearer_token(), None);
        config.api_key = "   ".into();
        assert_eq!(config.bearer_token(), None);
        config.api_key = "sk-test".into();
        assert_eq!(config.bearer_token(), Some("sk-test"));
    }
}
