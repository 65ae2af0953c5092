use crate::{Coordinator, CoordinatorOptions};
use dab_client::DabPumpsApi;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// 按安装 ID 共享协调器，同一安装只轮询一次。
#[derive(Default)]
pub struct CoordinatorRegistry {
    coordinators: RwLock<HashMap<String, Coordinator>>,
}

impl CoordinatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回已存在的协调器；不存在时用给定选项与 API 创建。
    pub async fn get_or_create(
        &self,
        options: CoordinatorOptions,
        api: Arc<dyn DabPumpsApi>,
    ) -> Coordinator {
        let mut coordinators = self.coordinators.write().await;
        coordinators
            .entry(options.install_id.clone())
            .or_insert_with(|| {
                info!("create coordinator for installation {}", options.install_id);
                Coordinator::new(api, options)
            })
            .clone()
    }

    pub async fn get(&self, install_id: &str) -> Option<Coordinator> {
        self.coordinators.read().await.get(install_id).cloned()
    }

    pub async fn remove(&self, install_id: &str) -> Option<Coordinator> {
        self.coordinators.write().await.remove(install_id)
    }

    pub async fn len(&self) -> usize {
        self.coordinators.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.coordinators.read().await.is_empty()
    }
}
