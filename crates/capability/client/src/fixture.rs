//! 文件夹具 API 实现
//!
//! 从目录读取厂商响应 JSON，文件命名：
//! - `install_list.json`
//! - `install_<installation_id>.json`
//! - `config_<configuration_id>.json`
//! - `status_<serial>.json`
//! - `strings_<language>.json`
//!
//! 写入的状态值保存在内存覆盖层中，随后的状态读取会带上这些修改。

use crate::{ApiError, DabPumpsApi, check_envelope};
use async_trait::async_trait;
use domain::strip_simulate_suffix;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub struct FixtureApi {
    dir: PathBuf,
    /// serial → (key → value)
    overrides: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl FixtureApi {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overrides: RwLock::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read(&self, file_name: &str) -> Result<Value, ApiError> {
        let path = self.dir.join(file_name);
        debug!("read fixture {}", path.display());
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| ApiError::Api(format!("cannot read {}: {}", path.display(), err)))?;
        let payload: Value = serde_json::from_str(&content)
            .map_err(|err| ApiError::Api(format!("invalid json in {}: {}", path.display(), err)))?;
        check_envelope(&payload)?;
        Ok(payload)
    }
}

/// 将覆盖值写回 JSON 编码的 `status` 字段。
fn apply_overrides(payload: &mut Value, overrides: &HashMap<String, String>) -> Result<(), ApiError> {
    let encoded = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("{}");
    let mut status: Map<String, Value> = serde_json::from_str(encoded)
        .map_err(|err| ApiError::Api(format!("invalid status json: {err}")))?;
    for (key, value) in overrides {
        status.insert(key.clone(), Value::String(value.clone()));
    }
    let encoded = serde_json::to_string(&status)
        .map_err(|err| ApiError::Api(format!("invalid status json: {err}")))?;
    if let Some(object) = payload.as_object_mut() {
        object.insert("status".to_string(), Value::String(encoded));
    }
    Ok(())
}

#[async_trait]
impl DabPumpsApi for FixtureApi {
    async fn login(&self) -> Result<(), ApiError> {
        if tokio::fs::metadata(&self.dir).await.is_err() {
            return Err(ApiError::Auth(format!(
                "fixture directory {} is not accessible",
                self.dir.display()
            )));
        }
        Ok(())
    }

    async fn logout(&self) {}

    async fn fetch_install_list(&self) -> Result<Value, ApiError> {
        self.read("install_list.json").await
    }

    async fn fetch_install_details(&self, install_id: &str) -> Result<Value, ApiError> {
        self.read(&format!("install_{}.json", strip_simulate_suffix(install_id)))
            .await
    }

    async fn fetch_device_config(&self, config_id: &str) -> Result<Value, ApiError> {
        self.read(&format!("config_{config_id}.json")).await
    }

    async fn fetch_device_status(&self, serial: &str) -> Result<Value, ApiError> {
        let serial = strip_simulate_suffix(serial);
        let mut payload = self.read(&format!("status_{serial}.json")).await?;
        let overrides = self.overrides.read().await;
        if let Some(values) = overrides.get(serial) {
            apply_overrides(&mut payload, values)?;
        }
        Ok(payload)
    }

    async fn fetch_strings(&self, language: &str) -> Result<Value, ApiError> {
        self.read(&format!("strings_{language}.json")).await
    }

    async fn change_device_status(
        &self,
        serial: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ApiError> {
        let serial = strip_simulate_suffix(serial);
        info!("set {} of device {} to '{}'", key, serial, value);
        self.overrides
            .write()
            .await
            .entry(serial.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
