use chrono::{FixedOffset, TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};
use shenji_api::server::{AppState, build_router};
use shenji_api::types::{
    AnalysisResponse, ApiErrorResponse, ApiResponse, ChartBundleResponse, MessageResponse,
    OrderResponse, UsageResponse,
};
use shenji_calendar::AstroCalendar;
use shenji_chat::ChatSessionManager;
use shenji_core::testing::{FakeClockProvider, StaticNarrator};
use shenji_fortune::FortuneService;
use shenji_quota::{MemUsageStore, MockPaymentGateway, QuotaService};
use std::sync::Arc;
use tokio::net::TcpListener;

const ANSWER: &str = "这是一段足够长的追问回答内容";
const INDEX_HTML: &str = "<!doctype html><title>神机妙算</title>";

// 帮助函数：在随机端口启动测试服务器
async fn spawn_test_server() -> (String, tempfile::TempDir) {
    let _installed = rustls::crypto::ring::default_provider().install_default();

    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(tmp_dir.path().join("index.html"), INDEX_HTML).unwrap();
    std::fs::write(tmp_dir.path().join("app.js"), "console.log('ok');").unwrap();

    // 北京时间 2026-05-20 10:00
    let clock = Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2026, 5, 20, 2, 0, 0).unwrap(),
    ));
    let store = Arc::new(MemUsageStore::new());
    let fortune = Arc::new(FortuneService::new(
        Arc::new(AstroCalendar::default()),
        clock.clone(),
    ));
    let quota = Arc::new(QuotaService::new(
        store.clone(),
        clock.clone(),
        FixedOffset::east_opt(8 * 3600).unwrap(),
        8,
    ));
    let long = "命".repeat(150);
    let narrator = Arc::new(StaticNarrator::sequence(&[&[&long], &[ANSWER]]));
    let chat = Arc::new(ChatSessionManager::new(fortune.clone(), quota.clone(), narrator));
    let payment = Arc::new(MockPaymentGateway::new(store, clock));

    let state = AppState {
        fortune,
        chat,
        quota,
        payment,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let addr = format!("http://127.0.0.1:{}", port);
    let router = build_router(state, Some(tmp_dir.path()));

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, tmp_dir)
}

fn birth(month: u32) -> Value {
    json!({
        "year": 1990,
        "month": month,
        "day": 15,
        "hour": 12,
        "minute": 0,
        "gender": "男",
        "birth_place": "杭州"
    })
}

#[tokio::test]
async fn test_full_api_workflow() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .try_init()
        .ok();

    let (base_url, _tmp) = spawn_test_server().await;
    let client = reqwest::Client::new();
    let cid = "client-001";

    // ============================================
    // Case 1: 缺少客户端标识
    // ============================================
    let res = client
        .get(format!("{}/api/v1/usage", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: ApiErrorResponse = res.json().await.unwrap();
    assert!(!err.success);

    let res = client
        .get(format!("{}/api/v1/usage", base_url))
        .header("X-Client-Id", cid)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let usage: ApiResponse<UsageResponse> = res.json().await.unwrap();
    let usage = usage.data.unwrap();
    assert_eq!((usage.question_count, usage.daily_limit, usage.remaining), (0, 8, 8));

    // ============================================
    // Case 2: 排盘
    // ============================================
    let res = client
        .post(format!("{}/api/v1/chart", base_url))
        .json(&birth(6))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bundle: ApiResponse<ChartBundleResponse> = res.json().await.unwrap();
    let bundle = bundle.data.unwrap();
    assert_eq!(bundle.chart.year.gan_zhi, "庚午");
    assert_eq!(bundle.chart.day.ten_god, "日主");
    assert_eq!(bundle.chart.liu_nian, "丙午");
    assert_eq!(bundle.chart.birth_place.as_deref(), Some("杭州"));
    assert_eq!(bundle.destiny.chart_points.len(), 100);
    assert_eq!(bundle.destiny.chart_points[0].da_yun, "童限");

    let res = client
        .post(format!("{}/api/v1/chart", base_url))
        .json(&birth(13))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // ============================================
    // Case 3: 首轮解读计一次额度
    // ============================================
    let res = client
        .post(format!("{}/api/v1/chat/analysis", base_url))
        .header("X-Client-Id", cid)
        .json(&birth(6))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let analysis: ApiResponse<AnalysisResponse> = res.json().await.unwrap();
    let analysis = analysis.data.unwrap();
    assert_eq!(analysis.analysis.chars().count(), 150);
    assert_eq!(analysis.usage.question_count, 1);

    // ============================================
    // Case 4: 首问免费，第二问需付费
    // ============================================
    let res = client
        .post(format!("{}/api/v1/chat/message", base_url))
        .header("X-Client-Id", cid)
        .json(&json!({ "text": "今年事业如何？" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let msg: ApiResponse<MessageResponse> = res.json().await.unwrap();
    let msg = msg.data.unwrap();
    assert_eq!(msg.reply.as_deref(), Some(ANSWER));
    assert_eq!(msg.usage.question_count, 2);

    let res = client
        .post(format!("{}/api/v1/chat/message", base_url))
        .header("X-Client-Id", cid)
        .json(&json!({ "text": "那明年呢？" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);

    // 空白问题被忽略
    let res = client
        .post(format!("{}/api/v1/chat/message", base_url))
        .header("X-Client-Id", cid)
        .json(&json!({ "text": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let msg: ApiResponse<MessageResponse> = res.json().await.unwrap();
    assert!(msg.data.unwrap().reply.is_none());

    // ============================================
    // Case 5: 演示支付后可继续追问
    // ============================================
    let res = client
        .post(format!("{}/api/payment/create", base_url))
        .header("X-Client-Id", cid)
        .json(&json!({ "method": "alipay", "amount": 9.9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let order: ApiResponse<OrderResponse> = res.json().await.unwrap();
    let order = order.data.unwrap();
    assert!(order.order_id.starts_with("DEMO_"));
    assert_eq!(order.status, "pending");
    assert!(order.pay_url.ends_with("&method=alipay"));

    let res = client
        .get(format!("{}/api/payment/status/{}", base_url, order.order_id))
        .send()
        .await
        .unwrap();
    let polled: ApiResponse<OrderResponse> = res.json().await.unwrap();
    assert_eq!(polled.data.unwrap().status, "paid");

    let res = client
        .post(format!("{}/api/v1/chat/message", base_url))
        .header("X-Client-Id", cid)
        .json(&json!({ "text": "那明年呢？" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let msg: ApiResponse<MessageResponse> = res.json().await.unwrap();
    let usage = msg.data.unwrap().usage;
    assert!(!usage.is_paid);
    assert_eq!(usage.question_count, 3);

    // ============================================
    // Case 6: 支付异常路径
    // ============================================
    let res = client
        .post(format!("{}/api/payment/create", base_url))
        .header("X-Client-Id", cid)
        .json(&json!({ "method": "bitcoin", "amount": 9.9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/api/payment/status/NOPE", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!("{}/api/payment/notify", base_url))
        .body("trade_status=TRADE_SUCCESS")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "success");
}

#[tokio::test]
async fn test_session_required_for_message() {
    let (base_url, _tmp) = spawn_test_server().await;
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/v1/chat/message", base_url))
        .header("X-Client-Id", "fresh-client")
        .json(&json!({ "text": "你好" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_docs_and_static_hosting() {
    let (base_url, _tmp) = spawn_test_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api-docs/openapi.json", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let doc: Value = res.json().await.unwrap();
    assert!(doc["paths"].get("/api/v1/chart").is_some());
    assert!(doc["paths"].get("/api/payment/status/{order_id}").is_some());

    let res = client.get(format!("{}/app.js", base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "console.log('ok');");

    // 前端路由回落到 index.html
    let res = client
        .get(format!("{}/report/123", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), INDEX_HTML);
}
