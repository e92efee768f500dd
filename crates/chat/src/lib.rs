//! # `shenji-chat` - 命理解读对话
//!
//! 外部文本服务适配器（Gemini 流式接口）与对话会话闸门。

pub mod gemini;
pub mod session;
pub mod sse;

pub use gemini::GeminiNarrator;
pub use session::ChatSessionManager;
