//! # 客户端标识提取
//!
//! 前端在本地生成一个不透明的客户端标识，随每个请求放在 `X-Client-Id` 头中。
//! 该标识只用于区分额度与会话，不承担任何鉴权职责。

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// 客户端标识请求头
pub const CLIENT_ID_HEADER: &str = "x-client-id";

const MAX_CLIENT_ID_LEN: usize = 128;

/// 在 Handler 中获取当前客户端标识的提取器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .ok_or_else(|| ApiError::BadRequest("Missing X-Client-Id header".into()))?
            .to_str()
            .map_err(|_| ApiError::BadRequest("Invalid X-Client-Id header".into()))?
            .trim();

        if raw.is_empty() || raw.len() > MAX_CLIENT_ID_LEN {
            tracing::warn!(len = raw.len(), "rejected client id");
            return Err(ApiError::BadRequest("Invalid X-Client-Id header".into()));
        }
        Ok(ClientId(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(value: Option<&str>) -> Result<ClientId, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(CLIENT_ID_HEADER, v);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        ClientId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_client_id_header() {
        assert_eq!(extract(Some(" abc-123 ")).await.unwrap(), ClientId("abc-123".into()));
        assert!(matches!(extract(None).await, Err(ApiError::BadRequest(_))));
        assert!(matches!(extract(Some("  ")).await, Err(ApiError::BadRequest(_))));
        let long = "x".repeat(MAX_CLIENT_ID_LEN + 1);
        assert!(matches!(extract(Some(&long)).await, Err(ApiError::BadRequest(_))));
    }
}
