use crate::sse::{LineBuffer, data_payload};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shenji_core::chat::entity::{ChatMessage, ChatRole};
use shenji_core::chat::error::ChatError;
use shenji_core::chat::port::{NarrativeProvider, TextStream};
use shenji_core::config::NarratorConfig;
use std::time::Duration;

/// # Summary
/// 基于 Gemini `streamGenerateContent` 接口的文本服务实现。
///
/// # Invariants
/// - 每次调用都携带完整上下文，自身不保存会话。
/// - `api_key` 为空时拒绝发起请求。
pub struct GeminiNarrator {
    /// 内部使用的 HTTP 客户端
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    system_prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// # Summary
/// 流式响应中的单个事件。
#[derive(Deserialize, Debug)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<UpstreamError>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct UpstreamError {
    message: String,
}

impl GeminiNarrator {
    /// # Summary
    /// 由配置创建实例。
    ///
    /// # Logic
    /// 1. 确保 rustls 加密后端已安装。
    /// 2. 连接超时 10 秒；生成本身可能持续较久，不设整体超时。
    ///
    /// # Returns
    /// HTTP 客户端构建失败时返回 `ChatError::Network`。
    pub fn new(config: &NarratorConfig) -> Result<Self, ChatError> {
        install_crypto_provider();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChatError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            system_prompt: config.system_prompt.clone(),
        })
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.endpoint, self.model
        )
    }
}

/// reqwest 以 `rustls-no-provider` 构建，进程内须先安装一个加密后端
fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none()
        && rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
    {
        tracing::debug!("crypto provider installed concurrently");
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

/// # Summary
/// 解析一个 `data:` 负载，取出其中的文本片段。
///
/// # Returns
/// 无文本的事件（例如仅含用量统计）返回空串；上游报错或 JSON 非法时返回 `ChatError::Protocol`。
fn chunk_text(payload: &str) -> Result<String, ChatError> {
    let chunk: StreamChunk =
        serde_json::from_str(payload).map_err(|e| ChatError::Protocol(e.to_string()))?;
    if let Some(err) = chunk.error {
        return Err(ChatError::Protocol(err.message));
    }
    Ok(chunk
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect())
}

#[async_trait]
impl NarrativeProvider for GeminiNarrator {
    /// # Summary
    /// 发起流式生成。
    ///
    /// # Logic
    /// 1. 以系统提示与完整历史组装请求体。
    /// 2. 非 2xx 响应读取正文后作为 `Protocol` 错误返回。
    /// 3. 按行解码 SSE，逐个 `data:` 事件产出文本片段。
    async fn open_stream(&self, history: &[ChatMessage]) -> Result<TextStream, ChatError> {
        if self.api_key.is_empty() {
            return Err(ChatError::Protocol("narrator api key is not configured".into()));
        }

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &self.system_prompt,
                }],
            },
            contents: history
                .iter()
                .map(|m| Content {
                    role: Some(role_name(m.role)),
                    parts: vec![Part { text: &m.text }],
                })
                .collect(),
        };

        let mut response = self
            .client
            .post(self.stream_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "narrator rejected request");
            return Err(ChatError::Protocol(format!("HTTP {}: {}", status, error_text)));
        }

        tracing::debug!(turns = history.len(), model = %self.model, "narrator stream opened");
        Ok(Box::pin(async_stream::stream! {
            let mut lines = LineBuffer::new();
            loop {
                let chunk = match response.chunk().await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(ChatError::Network(e.to_string()));
                        return;
                    }
                };
                for line in lines.push(&chunk) {
                    if let Some(payload) = data_payload(&line) {
                        match chunk_text(payload) {
                            Ok(text) if text.is_empty() => {}
                            Ok(text) => yield Ok(text),
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                }
            }
            if let Some(line) = lines.finish()
                && let Some(payload) = data_payload(&line)
            {
                match chunk_text(payload) {
                    Ok(text) if text.is_empty() => {}
                    other => yield other,
                }
            }
        }))
    }
}
