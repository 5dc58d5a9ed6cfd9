//! 提醒生成服务
//! 调用模型接口生成一条简短提醒, 再交给通知器展示

use crate::core::models::AppConfig;
use crate::core::traits::Notifier;
use crate::error::{AppError, AppResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::{Host, Url};

/// 生成请求超时
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(30);
/// 模型列表请求超时
pub const MODELS_TIMEOUT: Duration = Duration::from_secs(2);

pub const NOTIFY_TITLE: &str = "AI Reminder";
pub const ERROR_TITLE: &str = "Error";
/// 模型返回空文本时的替代提醒
pub const FALLBACK_TEXT: &str = "Reminder";
pub const FALLBACK_MODELS: [&str; 3] = ["llama3", "mistral", "gemma"];

const CHAT_COMPLETIONS_MARKER: &str = "v1/chat/completions";

/// 从响应体中提取到的提醒文本, 按来源区分
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderText {
    /// Ollama 风格: `response`
    Direct(String),
    /// OpenAI 风格: `choices[0].message.content`
    Candidate(String),
    /// 无法识别的响应, 原样渲染
    Raw(String),
}

impl ReminderText {
    /// 依次尝试 `response` → `choices[0].message.content` → 整体字符串
    /// 只要存在 `response` 字段就以它为准, null 视为空文本
    pub fn extract(body: &Value) -> Self {
        match body.get("response") {
            Some(Value::String(text)) => return ReminderText::Direct(text.clone()),
            Some(Value::Null) => return ReminderText::Direct(String::new()),
            Some(other) => return ReminderText::Direct(other.to_string()),
            None => {}
        }

        if let Some(text) = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.pointer("/message/content"))
            .and_then(Value::as_str)
        {
            return ReminderText::Candidate(text.to_string());
        }

        match body {
            Value::String(s) => ReminderText::Raw(s.clone()),
            other => ReminderText::Raw(other.to_string()),
        }
    }

    /// 去除首尾空白; 为空时返回 "Reminder"
    pub fn into_message(self) -> String {
        let text = match self {
            ReminderText::Direct(s) | ReminderText::Candidate(s) | ReminderText::Raw(s) => s,
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            FALLBACK_TEXT.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// 构建请求体; URL 含 chat/completions 时使用 messages 格式
pub fn build_payload(config: &AppConfig) -> Value {
    let mut payload = json!({
        "model": config.model,
        "stream": false,
    });

    if config.api_url.contains(CHAT_COMPLETIONS_MARKER) {
        payload["messages"] = json!([{ "role": "user", "content": config.prompt }]);
    } else {
        payload["prompt"] = json!(config.prompt);
    }

    payload
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

/// 由生成接口推导模型列表接口; 仅本地部署返回 Some
pub fn models_url(api_url: &str) -> Option<String> {
    let derived = api_url
        .replace("/generate", "/tags")
        .replace("/chat/completions", "/models");
    let url = Url::parse(&derived).ok()?;

    let local = match url.host()? {
        Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(ip) => ip.is_loopback(),
        Host::Ipv6(ip) => ip.is_loopback(),
    };

    local.then_some(derived)
}

fn fallback_models() -> Vec<String> {
    FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
}

fn create_client(timeout: Duration) -> AppResult<reqwest::Client> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// 提醒生成器
/// 无状态: 每次调用独立创建 HTTP 客户端
pub struct ReminderGenerator<N: Notifier> {
    notifier: N,
    timeout: Duration,
    models_timeout: Duration,
}

impl<N: Notifier> ReminderGenerator<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            timeout: GENERATE_TIMEOUT,
            models_timeout: MODELS_TIMEOUT,
        }
    }

    pub fn with_timeouts(notifier: N, timeout: Duration, models_timeout: Duration) -> Self {
        Self {
            notifier,
            timeout,
            models_timeout,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// 生成一条提醒并通知; 所有失败都转为错误通知, 不向调用方返回
    pub async fn generate(&self, config: &AppConfig) {
        info!("Generating reminder with model {}", config.model);

        match self.fetch(config).await {
            Ok(message) => {
                debug!("Reminder text: {}", message);
                self.notifier.notify(NOTIFY_TITLE, &message);
            }
            Err(e) => {
                warn!("Reminder generation failed: {}", e);
                self.notifier.notify(ERROR_TITLE, &e.to_string());
            }
        }
    }

    /// 发送一次生成请求并提取文本
    pub async fn fetch(&self, config: &AppConfig) -> AppResult<String> {
        let client = create_client(self.timeout)?;
        let payload = build_payload(config);

        let mut request = client.post(&config.api_url).json(&payload);
        if let Some(key) = config.bearer_token() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AppError::Api(status.as_u16()));
        }

        let text = response.text().await?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        Ok(ReminderText::extract(&body).into_message())
    }

    /// 查询本地可用模型; 任何失败都返回内置列表
    pub async fn list_available_models(&self, config: &AppConfig) -> Vec<String> {
        let Some(url) = models_url(&config.api_url) else {
            debug!("Endpoint {} is not local, skipping model discovery", config.api_url);
            return fallback_models();
        };

        match self.fetch_models(&url).await {
            Ok(models) if !models.is_empty() => models,
            Ok(_) => {
                debug!("Model list at {} is empty", url);
                fallback_models()
            }
            Err(e) => {
                debug!("Model discovery at {} failed: {}", url, e);
                fallback_models()
            }
        }
    }

    async fn fetch_models(&self, url: &str) -> AppResult<Vec<String>> {
        let response = create_client(self.models_timeout)?.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AppError::Api(status.as_u16()));
        }

        let parsed: ModelsResponse = response.json().await?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}
