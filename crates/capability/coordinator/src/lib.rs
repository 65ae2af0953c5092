//! 轮询编排：按周期刷新厂商数据、替换快照，并按安装 ID 管理协调器。

mod coordinator;
mod registry;

pub use coordinator::Coordinator;
pub use registry::CoordinatorRegistry;

use dab_assemble::AssembleError;
use dab_client::ApiError;
use std::time::Duration;

/// 轮询周期的失败结果。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinatorError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("data error: {0}")]
    Data(String),
}

impl CoordinatorError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<ApiError> for CoordinatorError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(msg) => Self::Auth(msg),
            ApiError::Api(msg) => Self::Api(msg),
        }
    }
}

impl From<AssembleError> for CoordinatorError {
    fn from(err: AssembleError) -> Self {
        Self::Data(err.to_string())
    }
}

/// 协调器选项。
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub install_id: String,
    pub install_name: String,
    pub language: String,
    /// 每个周期的尝试次数（至少 1）。
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    /// 设备、配置、字符串与安装列表的刷新周期。
    pub metadata_ttl: Duration,
    pub simulate_multi_install: bool,
}

impl CoordinatorOptions {
    pub fn new(install_id: impl Into<String>) -> Self {
        let install_id = install_id.into();
        Self {
            install_name: install_id.clone(),
            install_id,
            language: "en".to_string(),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(5),
            metadata_ttl: Duration::from_secs(86_400),
            simulate_multi_install: false,
        }
    }
}
