//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use shenji_core::chart::entity::{BaziChart, BirthInput, DaYun, Pillar};
use shenji_core::common::Gender;
use shenji_core::fortune::entity::{
    DivinationResult, ElementProfile, LifeCandle, LifeDestinyResult,
};
use shenji_core::ganzhi::element::ElementSet;
use shenji_core::quota::entity::{OrderInfo, OrderStatus, PaymentStatus};

use crate::error::ApiError;

// ============================================================
//  排盘相关 DTO
// ============================================================

/// 出生信息请求体（公历）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BirthRequest {
    /// 出生年 (1900..=2100)
    #[schema(example = 1990)]
    pub year: i32,
    /// 出生月 (1..=12)
    #[schema(example = 6)]
    pub month: u32,
    /// 出生日
    #[schema(example = 15)]
    pub day: u32,
    /// 出生时 (0..=23)
    #[schema(example = 12)]
    pub hour: u32,
    /// 出生分 (0..=59)
    #[schema(example = 0)]
    pub minute: u32,
    /// 性别 ("男" / "女"，也接受 "male" / "female")
    #[schema(example = "男")]
    pub gender: String,
    /// 出生地 (仅用于展示)
    #[schema(example = "杭州")]
    pub birth_place: Option<String>,
}

impl TryFrom<BirthRequest> for BirthInput {
    type Error = ApiError;

    fn try_from(req: BirthRequest) -> Result<Self, Self::Error> {
        let gender: Gender = req.gender.parse().map_err(ApiError::BadRequest)?;
        Ok(BirthInput {
            year: req.year,
            month: req.month,
            day: req.day,
            hour: req.hour,
            minute: req.minute,
            gender,
            birth_place: req.birth_place.filter(|p| !p.trim().is_empty()),
        })
    }
}

/// 单柱 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PillarResponse {
    /// 干支
    #[schema(example = "庚午")]
    pub gan_zhi: String,
    /// 天干十神 (日柱为 "日主")
    #[schema(example = "七杀")]
    pub ten_god: String,
    /// 藏干
    pub hidden_stems: Vec<String>,
    /// 藏干十神，与藏干一一对应
    pub hidden_ten_gods: Vec<String>,
    /// 纳音
    #[schema(example = "路旁土")]
    pub na_yin: String,
}

/// 大运 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DaYunResponse {
    /// 干支，童限为 "童限"
    #[schema(example = "癸未")]
    pub label: String,
    /// 起运虚岁
    #[schema(example = 8)]
    pub start_age: u32,
    #[schema(example = 1997)]
    pub start_year: i32,
    #[schema(example = 2006)]
    pub end_year: i32,
}

/// 命盘 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartResponse {
    pub year: PillarResponse,
    pub month: PillarResponse,
    pub day: PillarResponse,
    pub hour: PillarResponse,
    pub da_yun: Vec<DaYunResponse>,
    /// 当前流年 (农历年)
    #[schema(example = 2026)]
    pub liu_nian_year: i32,
    /// 当前流年干支
    #[schema(example = "丙午")]
    pub liu_nian: String,
    #[schema(example = "1990-06-15 12:00:00 星期五")]
    pub solar_date: String,
    #[schema(example = "一九九〇年五月廿三")]
    pub lunar_date: String,
    #[schema(example = "男")]
    pub gender: String,
    pub birth_place: Option<String>,
    #[schema(example = 1990)]
    pub birth_year: i32,
}

// ============================================================
//  人生 K 线相关 DTO
// ============================================================

/// 单根人生 K 线 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandleResponse {
    /// 虚岁
    #[schema(example = 1)]
    pub age: u32,
    #[schema(example = 1990)]
    pub year: i32,
    /// 流年干支
    #[schema(example = "庚午")]
    pub gan_zhi: String,
    /// 所处大运
    #[schema(example = "童限")]
    pub da_yun: String,
    pub open: i32,
    pub close: i32,
    pub high: i32,
    pub low: i32,
    pub score: i32,
}

/// 梅花起卦 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DivinationResponse {
    #[schema(example = "艮坎卦")]
    pub gua_name: String,
    #[schema(example = "艮")]
    pub upper: String,
    #[schema(example = "坎")]
    pub lower: String,
    /// 动爻 1..=6
    #[schema(example = 2)]
    pub moving_line: u32,
    #[schema(example = "艮")]
    pub body: String,
    #[schema(example = "坎")]
    pub usage: String,
    /// 吉凶
    #[schema(example = "中吉")]
    pub luck: String,
    /// 对基准分的修正
    #[schema(example = 5)]
    pub score_offset: i32,
}

/// 喜忌 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    /// 日主五行
    #[schema(example = "木")]
    pub day_master: String,
    /// 是否身强
    pub strong: bool,
    /// 喜用五行
    pub favored: Vec<String>,
    /// 忌讳五行
    pub avoided: Vec<String>,
}

/// 人生 K 线结果 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LifeDestinyResponse {
    pub chart_points: Vec<CandleResponse>,
    pub meihua: DivinationResponse,
    pub profile: ProfileResponse,
}

/// 排盘 + 人生 K 线
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartBundleResponse {
    pub chart: ChartResponse,
    pub destiny: LifeDestinyResponse,
}

// ============================================================
//  对话与额度 DTO
// ============================================================

/// 额度状态 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsageResponse {
    /// 是否持有付费提问资格
    pub is_paid: bool,
    /// 今日已用次数
    #[schema(example = 3)]
    pub question_count: u32,
    /// 每日上限
    #[schema(example = 8)]
    pub daily_limit: u32,
    /// 今日剩余次数
    #[schema(example = 5)]
    pub remaining: u32,
}

/// 命理解读结果 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub chart: ChartResponse,
    pub destiny: LifeDestinyResponse,
    /// 解读全文
    pub analysis: String,
    pub usage: UsageResponse,
}

/// 追问请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageRequest {
    #[schema(example = "今年事业如何？")]
    pub text: String,
}

/// 追问结果 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// 回复全文；空白问题被忽略时为 null
    pub reply: Option<String>,
    pub usage: UsageResponse,
}

// ============================================================
//  支付 DTO
// ============================================================

/// 创建订单请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// 支付渠道 ("alipay" / "wechat")
    #[schema(example = "alipay")]
    pub method: String,
    /// 金额 (元)
    #[schema(example = 9.9)]
    pub amount: f64,
    /// 可选的自定义订单号
    pub order_id: Option<String>,
}

/// 订单 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    #[schema(example = "DEMO_1767225600000")]
    pub order_id: String,
    #[schema(example = "alipay")]
    pub method: String,
    #[schema(example = 9.9)]
    pub amount: f64,
    #[schema(example = "https://example.com/pay-mock?order=DEMO_1767225600000&method=alipay")]
    pub pay_url: String,
    /// pending / paid / expired
    #[schema(example = "pending")]
    pub status: String,
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 统一 API 响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// ============================================================
//  领域模型 → DTO 惯用转换 (impl From<T>)
// ============================================================

fn element_names(set: ElementSet) -> Vec<String> {
    set.iter().map(|e| e.to_string()).collect()
}

impl From<&Pillar> for PillarResponse {
    fn from(p: &Pillar) -> Self {
        Self {
            gan_zhi: p.gan_zhi.to_string(),
            ten_god: p.stem_label().to_string(),
            hidden_stems: p.hidden_stems.iter().map(ToString::to_string).collect(),
            hidden_ten_gods: p.hidden_ten_gods.iter().map(ToString::to_string).collect(),
            na_yin: p.na_yin.clone(),
        }
    }
}

impl From<&DaYun> for DaYunResponse {
    fn from(d: &DaYun) -> Self {
        Self {
            label: d.label.to_string(),
            start_age: d.start_age,
            start_year: d.start_year,
            end_year: d.end_year,
        }
    }
}

impl From<&BaziChart> for ChartResponse {
    fn from(c: &BaziChart) -> Self {
        Self {
            year: (&c.year).into(),
            month: (&c.month).into(),
            day: (&c.day).into(),
            hour: (&c.hour).into(),
            da_yun: c.da_yun.iter().map(Into::into).collect(),
            liu_nian_year: c.current_liu_nian.year,
            liu_nian: c.current_liu_nian.gan_zhi.to_string(),
            solar_date: c.solar_date.clone(),
            lunar_date: c.lunar_date.clone(),
            gender: c.gender.to_string(),
            birth_place: c.birth_place.clone(),
            birth_year: c.birth_year,
        }
    }
}

impl From<&LifeCandle> for CandleResponse {
    fn from(c: &LifeCandle) -> Self {
        Self {
            age: c.age,
            year: c.year,
            gan_zhi: c.gan_zhi.to_string(),
            da_yun: c.da_yun.to_string(),
            open: c.open,
            close: c.close,
            high: c.high,
            low: c.low,
            score: c.score,
        }
    }
}

impl From<&DivinationResult> for DivinationResponse {
    fn from(d: &DivinationResult) -> Self {
        Self {
            gua_name: d.gua_name.clone(),
            upper: d.upper.to_string(),
            lower: d.lower.to_string(),
            moving_line: d.moving_line,
            body: d.body.to_string(),
            usage: d.usage.to_string(),
            luck: d.luck.to_string(),
            score_offset: d.score_offset,
        }
    }
}

impl From<&ElementProfile> for ProfileResponse {
    fn from(p: &ElementProfile) -> Self {
        Self {
            day_master: p.day_master.to_string(),
            strong: p.strong,
            favored: element_names(p.favored),
            avoided: element_names(p.avoided),
        }
    }
}

impl From<&LifeDestinyResult> for LifeDestinyResponse {
    fn from(r: &LifeDestinyResult) -> Self {
        Self {
            chart_points: r.chart_points.iter().map(Into::into).collect(),
            meihua: (&r.meihua).into(),
            profile: (&r.profile).into(),
        }
    }
}

impl From<PaymentStatus> for UsageResponse {
    fn from(s: PaymentStatus) -> Self {
        Self {
            is_paid: s.is_paid,
            question_count: s.question_count,
            daily_limit: s.daily_limit,
            remaining: s.remaining(),
        }
    }
}

impl From<OrderInfo> for OrderResponse {
    fn from(o: OrderInfo) -> Self {
        let status = match o.status {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Expired => "expired",
        };
        Self {
            order_id: o.order_id,
            method: o.method.to_string(),
            amount: o.amount,
            pay_url: o.pay_url,
            status: status.to_string(),
        }
    }
}
