//! 厂商 API 客户端契约：错误分类、响应信封检查，以及内存/文件实现。
//!
//! 真实的 HTTP 登录流程不在此实现；所有实现对外暴露同一个 `DabPumpsApi` trait。

pub mod fixture;
pub mod in_memory;

use async_trait::async_trait;
use serde_json::Value;

pub use fixture::FixtureApi;
pub use in_memory::InMemoryApi;

/// API 调用错误。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// 鉴权失败（禁止访问或登录失败），需要上游重新认证。
    #[error("authentication failed: {0}")]
    Auth(String),
    /// 其余非 OK 响应，可由调用方按策略重试。
    #[error("api error: {0}")]
    Api(String),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// 厂商 API 抽象。
///
/// 返回的 JSON 为去掉传输层后的响应体；带模拟后缀的 ID 由实现负责还原。
#[async_trait]
pub trait DabPumpsApi: Send + Sync {
    async fn login(&self) -> Result<(), ApiError>;

    /// 结束会话；失败时只记录日志。
    async fn logout(&self);

    async fn fetch_install_list(&self) -> Result<Value, ApiError>;

    async fn fetch_install_details(&self, install_id: &str) -> Result<Value, ApiError>;

    async fn fetch_device_config(&self, config_id: &str) -> Result<Value, ApiError>;

    async fn fetch_device_status(&self, serial: &str) -> Result<Value, ApiError>;

    async fn fetch_strings(&self, language: &str) -> Result<Value, ApiError>;

    async fn change_device_status(&self, serial: &str, key: &str, value: &str)
    -> Result<(), ApiError>;
}

/// 检查响应信封 `{res, code, msg}`。
///
/// 没有 `res` 字段视为成功；`res` 非 `OK` 时，`FORBIDDEN` 归为鉴权错误，其余归为 API 错误。
pub fn check_envelope(payload: &Value) -> Result<(), ApiError> {
    let Some(res) = payload.get("res").and_then(Value::as_str) else {
        return Ok(());
    };
    if res == "OK" {
        return Ok(());
    }
    let code = payload.get("code").and_then(Value::as_str).unwrap_or_default();
    let msg = payload.get("msg").and_then(Value::as_str).unwrap_or_default();
    if code == "FORBIDDEN" {
        Err(ApiError::Auth(format!("{res} {code} {msg}").trim_end().to_string()))
    } else {
        Err(ApiError::Api(format!("{res} {code} {msg}").trim_end().to_string()))
    }
}
