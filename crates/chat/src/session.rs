use dashmap::DashMap;
use futures::StreamExt;
use shenji_core::chart::entity::{BaziChart, BirthInput};
use shenji_core::chat::entity::ChatMessage;
use shenji_core::chat::error::ChatError;
use shenji_core::chat::port::{NarrativeProvider, TextStream};
use shenji_core::common::random::RandomSource;
use shenji_core::fortune::entity::LifeDestinyResult;
use shenji_core::quota::entity::PaymentStatus;
use shenji_fortune::FortuneService;
use shenji_fortune::prompt::format_chart_for_prompt;
use shenji_quota::QuotaService;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 首轮解读超过该字数才计一次额度
const ANALYSIS_MIN_CHARS: usize = 100;
/// 追问回复超过该字数才算成功
const REPLY_MIN_CHARS: usize = 10;

/// 单个客户端进行中的解读会话
#[derive(Debug)]
struct ChatSession {
    chart_key: String,
    history: Vec<ChatMessage>,
    // 已成功的追问次数
    follow_ups: u32,
}

/// 首轮解读的完整结果
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub chart: BaziChart,
    pub destiny: LifeDestinyResult,
    pub analysis: String,
    pub status: PaymentStatus,
}

/// 一次追问的结果
#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    pub reply: String,
    pub status: PaymentStatus,
}

/// # Summary
/// 对话会话管理器：额度闸门、首问免费、付费资格与上下文累积。
///
/// # Invariants
/// - 每个客户端至多一个会话，新的解读会替换旧会话。
/// - 同一会话的追问串行执行。
/// - 失败或过短的回复不消耗额度与付费资格，且对话记录回滚到发送前。
pub struct ChatSessionManager {
    fortune: Arc<FortuneService>,
    quota: Arc<QuotaService>,
    narrator: Arc<dyn NarrativeProvider>,
    sessions: DashMap<String, Arc<Mutex<ChatSession>>>,
}

/// 收集整段文本；中途出错且已有内容时保留已收到的部分
async fn collect(mut stream: TextStream) -> Result<String, ChatError> {
    let mut text = String::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => text.push_str(&chunk),
            Err(e) if text.is_empty() => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, received = text.chars().count(), "narrator stream cut short");
                break;
            }
        }
    }
    Ok(text)
}

impl ChatSessionManager {
    pub fn new(
        fortune: Arc<FortuneService>,
        quota: Arc<QuotaService>,
        narrator: Arc<dyn NarrativeProvider>,
    ) -> Self {
        Self {
            fortune,
            quota,
            narrator,
            sessions: DashMap::new(),
        }
    }

    /// # Summary
    /// 开始一次命理解读。
    ///
    /// # Logic
    /// 1. 额度已满直接拒绝。
    /// 2. 排盘并生成人生 K 线，以命盘文本作为首轮输入开启流式生成。
    /// 3. 回复为空：清除会话并报错，不计额度。
    /// 4. 回复超过 100 字计一次额度。
    ///
    /// # Arguments
    /// * `client_id`: 客户端标识。
    /// * `input`: 出生信息。
    /// * `rng`: K 线合成所用的随机源。
    pub async fn start_analysis<R: RandomSource + Send>(
        &self,
        client_id: &str,
        input: &BirthInput,
        mut rng: R,
    ) -> Result<AnalysisOutcome, ChatError> {
        self.quota.ensure_available(client_id).await?;
        self.sessions.remove(client_id);

        let (chart, destiny) = self.fortune.generate(input, &mut rng)?;
        let history = vec![ChatMessage::user(format_chart_for_prompt(&chart))];
        let analysis = collect(self.narrator.open_stream(&history).await?).await?;

        if analysis.trim().is_empty() {
            tracing::warn!(client_id, "empty analysis, no quota consumed");
            return Err(ChatError::Incomplete("生成失败，本次未消耗次数".to_string()));
        }

        let length = analysis.chars().count();
        if length > ANALYSIS_MIN_CHARS {
            self.quota.record_use(client_id).await?;
        }

        let mut history = history;
        history.push(ChatMessage::model(analysis.clone()));
        self.sessions.insert(
            client_id.to_string(),
            Arc::new(Mutex::new(ChatSession {
                chart_key: input.chart_key(),
                history,
                follow_ups: 0,
            })),
        );
        tracing::info!(client_id, length, "analysis session started");

        Ok(AnalysisOutcome {
            chart,
            destiny,
            analysis,
            status: self.quota.status(client_id).await?,
        })
    }

    /// # Summary
    /// 在当前会话中追问。
    ///
    /// # Logic
    /// 1. 空白问题直接忽略，返回 `None`。
    /// 2. 额度已满拒绝；未付费时仅会话首问且该命盘免费资格未用才放行。
    /// 3. 回复超过 10 字视为成功：付费则消耗付费资格，否则登记免费资格已用，并计一次额度。
    /// 4. 失败或过短：对话记录回滚，返回错误。
    pub async fn send_message(
        &self,
        client_id: &str,
        text: &str,
    ) -> Result<Option<ReplyOutcome>, ChatError> {
        let question = text.trim();
        if question.is_empty() {
            return Ok(None);
        }
        let session = self
            .sessions
            .get(client_id)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| ChatError::NoSession(client_id.to_string()))?;
        let mut session = session.lock().await;

        let status = self.quota.ensure_available(client_id).await?;
        let paid = status.is_paid;
        let freebie = session.follow_ups == 0
            && self
                .quota
                .freebie_available(client_id, &session.chart_key)
                .await?;
        if !paid && !freebie {
            tracing::warn!(client_id, "follow-up requires payment");
            return Err(ChatError::PaymentRequired);
        }

        let checkpoint = session.history.len();
        session.history.push(ChatMessage::user(question));
        let reply = match self.exchange(&session.history).await {
            Ok(reply) if reply.chars().count() > REPLY_MIN_CHARS => reply,
            Ok(reply) => {
                session.history.truncate(checkpoint);
                return Err(ChatError::Incomplete(format!(
                    "回复过短（{} 字），本次未消耗次数",
                    reply.chars().count()
                )));
            }
            Err(e) => {
                session.history.truncate(checkpoint);
                return Err(e);
            }
        };

        session.history.push(ChatMessage::model(reply.clone()));
        session.follow_ups += 1;
        if paid {
            self.quota.consume_ticket(client_id).await?;
        } else {
            self.quota
                .mark_freebie_used(client_id, &session.chart_key)
                .await?;
        }
        self.quota.record_use(client_id).await?;
        tracing::info!(client_id, paid, turns = session.history.len(), "follow-up answered");

        Ok(Some(ReplyOutcome {
            reply,
            status: self.quota.status(client_id).await?,
        }))
    }

    async fn exchange(&self, history: &[ChatMessage]) -> Result<String, ChatError> {
        collect(self.narrator.open_stream(history).await?).await
    }

    /// 当前会话的对话记录
    pub async fn transcript(&self, client_id: &str) -> Option<Vec<ChatMessage>> {
        let session = self.sessions.get(client_id).map(|s| Arc::clone(s.value()))?;
        let session = session.lock().await;
        Some(session.history.clone())
    }

    /// 额度状态
    pub async fn status(&self, client_id: &str) -> Result<PaymentStatus, ChatError> {
        Ok(self.quota.status(client_id).await?)
    }
}
