//! 测试替身：确定性的随机源与文本流。仅在 `test-utils` 特性下编译。

use crate::chat::entity::ChatMessage;
use crate::chat::error::ChatError;
use crate::chat::port::{NarrativeProvider, TextStream};
use crate::common::random::RandomSource;
use async_trait::async_trait;
use std::sync::Mutex;

pub use crate::common::time::FakeClockProvider;

/// # Summary
/// 始终返回同一个值的随机源。
pub struct ConstRandom(pub f64);

impl RandomSource for ConstRandom {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

/// # Summary
/// 按给定序列循环回放的随机源。
///
/// # Invariants
/// - 序列为空时退化为恒返回 0。
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// 迄今抽取的次数
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        let value = if self.values.is_empty() {
            0.0
        } else {
            self.values[self.cursor % self.values.len()]
        };
        self.cursor += 1;
        value
    }
}

/// # Summary
/// 回放固定片段的文本服务替身，并记录每次收到的上下文。
///
/// # Invariants
/// - 第 n 次调用回放第 n 组片段，组数用完后一直回放最后一组。
pub struct StaticNarrator {
    replies: Vec<Vec<String>>,
    fail: bool,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StaticNarrator {
    /// 每次调用都回放同一组片段
    pub fn new(chunks: &[&str]) -> Self {
        Self::sequence(&[chunks])
    }

    /// 按调用次序依次回放各组片段
    pub fn sequence(replies: &[&[&str]]) -> Self {
        Self {
            replies: replies
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 先产出全部片段，再以网络错误中断
    pub fn failing(chunks: &[&str]) -> Self {
        Self {
            fail: true,
            ..Self::new(chunks)
        }
    }

    /// 每次调用收到的对话上下文
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NarrativeProvider for StaticNarrator {
    async fn open_stream(&self, history: &[ChatMessage]) -> Result<TextStream, ChatError> {
        let nth = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(history.to_vec());
                calls.len() - 1
            }
            Err(_) => 0,
        };
        let chunks = self
            .replies
            .get(nth)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or_default();
        let fail = self.fail;
        Ok(Box::pin(async_stream::stream! {
            for chunk in chunks {
                yield Ok(chunk);
            }
            if fail {
                yield Err(ChatError::Network("connection reset".to_string()));
            }
        }))
    }
}
