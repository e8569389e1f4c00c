//! 远程翻译客户端模块
//!
//! [`TranslationClient`] 是单次翻译调用的抽象：给定文本和目标语言，返回译文或失败。
//! 这里不做任何重试，重试逻辑见 [`crate::retry`]。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RemoteError;
use crate::types::LanguageTarget;

/// 单次翻译调用
#[async_trait]
pub trait TranslationClient: Send + Sync {
    async fn translate_once(
        &self,
        text: &str,
        language: &LanguageTarget,
    ) -> Result<String, RemoteError>;
}

/// OpenAI兼容的 chat completions 客户端配置
#[derive(Debug, Clone)]
pub struct ChatCompletionConfig {
    /// API根地址，如 `https://openrouter.ai/api/v1`
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    /// 原文语言名称，写入提示词
    pub source_language: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// 基于 reqwest 的 chat completions 客户端
pub struct ChatCompletionClient {
    client: Client,
    endpoint: String,
    config: ChatCompletionConfig,
}

impl ChatCompletionClient {
    /// 创建客户端，请求超时由 reqwest 负责
    pub fn new(config: ChatCompletionConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RemoteError::Network(format!("创建HTTP客户端失败: {}", e)))?;

        let endpoint = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 构建翻译提示词
    pub fn build_prompt(&self, text: &str, language: &LanguageTarget) -> String {
        format!(
            "Translate the following {} text to {}:\n\n{}",
            self.config.source_language, language, text
        )
    }
}

#[async_trait]
impl TranslationClient for ChatCompletionClient {
    async fn translate_once(
        &self,
        text: &str,
        language: &LanguageTarget,
    ) -> Result<String, RemoteError> {
        let prompt = self.build_prompt(text, language);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        debug!("翻译API响应 {} 字节", body.len());

        extract_content(&body)
    }
}

/// 从 chat completions 响应体中取出第一条回复
fn extract_content(body: &str) -> Result<String, RemoteError> {
    if body.trim().is_empty() {
        return Err(RemoteError::MalformedResponse("响应体为空".to_string()));
    }

    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| RemoteError::MalformedResponse(format!("无法解析JSON响应: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| RemoteError::MalformedResponse("响应中没有可用的choices".to_string()))
}
