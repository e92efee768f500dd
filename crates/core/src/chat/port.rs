use crate::chat::entity::ChatMessage;
use crate::chat::error::ChatError;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// # Summary
/// 文本片段流别名，逐 token 产出上游生成的文字。
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// # Summary
/// 外部文本生成服务接口（命理解读由第三方模型完成，此处只消费其输出流）。
///
/// # Invariants
/// - 实现者不得在内部保存会话状态，完整上下文由调用方每次传入。
#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    /// # Summary
    /// 以给定对话上下文开启一次流式生成。
    ///
    /// # Logic
    /// 1. 将系统提示与历史消息组装为上游请求。
    /// 2. 建立流式连接，逐片段产出文本。
    ///
    /// # Arguments
    /// * `history`: 迄今为止的对话记录，最后一条为本轮用户输入。
    ///
    /// # Returns
    /// 成功返回文本片段流。
    async fn open_stream(&self, history: &[ChatMessage]) -> Result<TextStream, ChatError>;
}
