//! 轮询运行器：按周期刷新安装数据，并以 JSON 行输出各平台实体。

use dab_client::{DabPumpsApi, FixtureApi};
use dab_config::AppConfig;
use dab_coordinator::{Coordinator, CoordinatorOptions, CoordinatorRegistry};
use dab_telemetry::{init_tracing, metrics};
use entity_contract::Platform;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在）
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let api: Arc<dyn DabPumpsApi> = Arc::new(FixtureApi::new(&config.fixture_dir));
    let registry = CoordinatorRegistry::new();
    let coordinator = registry.get_or_create(options_from(&config), api).await;

    match coordinator.fetch_installations().await {
        Ok(installs) => {
            for install in installs.values() {
                info!(
                    "installation {} '{}' with {} devices (role {})",
                    install.id, install.name, install.device_count, install.role
                );
            }
        }
        Err(err) => warn!("cannot list installations: {}", err),
    }

    if config.oneshot {
        poll_once(&coordinator).await?;
        println!("{}", coordinator.diagnostics().await);
        return Ok(());
    }

    let mut poll_interval = interval(Duration::from_secs(config.polling_interval_seconds));
    loop {
        poll_interval.tick().await;
        if let Err(err) = poll_once(&coordinator).await {
            warn!("poll cycle failed: {}", err);
        }
    }
}

fn options_from(config: &AppConfig) -> CoordinatorOptions {
    let mut options = CoordinatorOptions::new(config.install_id.clone());
    options.install_name = config.install_name.clone();
    options.language = config.language.clone();
    options.retry_attempts = config.retry_attempts;
    options.retry_delay = Duration::from_millis(config.retry_delay_ms);
    options.metadata_ttl = Duration::from_secs(config.metadata_ttl_seconds);
    options.simulate_multi_install = config.simulate_multi_install;
    options
}

/// 刷新一次并输出全部平台的实体。
async fn poll_once(coordinator: &Coordinator) -> Result<(), Box<dyn std::error::Error>> {
    coordinator.refresh().await?;
    let mut total = 0;
    for platform in Platform::ALL {
        for record in coordinator.entities(platform).await {
            println!("{}", serde_json::to_string(&record)?);
            total += 1;
        }
    }
    info!("published {} entities; metrics {:?}", total, metrics().snapshot());
    Ok(())
}
