//! 追踪初始化与轮询计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt};

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub statuses_seen: u64,
    pub entities_built: u64,
    pub skipped_hidden: u64,
    pub skipped_unmapped: u64,
    pub build_failures: u64,
    pub unknown_units: u64,
    pub poll_success: u64,
    pub poll_failure: u64,
    pub poll_retries: u64,
}

/// 基础指标。
pub struct TelemetryMetrics {
    statuses_seen: AtomicU64,
    entities_built: AtomicU64,
    skipped_hidden: AtomicU64,
    skipped_unmapped: AtomicU64,
    build_failures: AtomicU64,
    unknown_units: AtomicU64,
    poll_success: AtomicU64,
    poll_failure: AtomicU64,
    poll_retries: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            statuses_seen: AtomicU64::new(0),
            entities_built: AtomicU64::new(0),
            skipped_hidden: AtomicU64::new(0),
            skipped_unmapped: AtomicU64::new(0),
            build_failures: AtomicU64::new(0),
            unknown_units: AtomicU64::new(0),
            poll_success: AtomicU64::new(0),
            poll_failure: AtomicU64::new(0),
            poll_retries: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            statuses_seen: self.statuses_seen.load(Ordering::Relaxed),
            entities_built: self.entities_built.load(Ordering::Relaxed),
            skipped_hidden: self.skipped_hidden.load(Ordering::Relaxed),
            skipped_unmapped: self.skipped_unmapped.load(Ordering::Relaxed),
            build_failures: self.build_failures.load(Ordering::Relaxed),
            unknown_units: self.unknown_units.load(Ordering::Relaxed),
            poll_success: self.poll_success.load(Ordering::Relaxed),
            poll_failure: self.poll_failure.load(Ordering::Relaxed),
            poll_retries: self.poll_retries.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的轮询周期 ID。
pub fn new_cycle_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 单个轮询周期的 span。
pub fn poll_cycle_span(install_id: &str, cycle_id: &str) -> Span {
    tracing::info_span!("poll_cycle", install_id = %install_id, cycle_id = %cycle_id)
}

/// 记录参与构建的状态数。
pub fn record_status_seen() {
    metrics().statuses_seen.fetch_add(1, Ordering::Relaxed);
}

/// 记录成功构建的实体数。
pub fn record_entity_built() {
    metrics().entities_built.fetch_add(1, Ordering::Relaxed);
}

/// 记录因可见性规则跳过的参数。
pub fn record_skipped_hidden() {
    metrics().skipped_hidden.fetch_add(1, Ordering::Relaxed);
}

/// 记录缺少元数据而跳过的状态。
pub fn record_skipped_unmapped() {
    metrics().skipped_unmapped.fetch_add(1, Ordering::Relaxed);
}

/// 记录实体构建失败。
pub fn record_build_failure() {
    metrics().build_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录未知单位。
pub fn record_unknown_unit() {
    metrics().unknown_units.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询成功。
pub fn record_poll_success() {
    metrics().poll_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询失败（所有尝试均失败）。
pub fn record_poll_failure() {
    metrics().poll_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录轮询重试。
pub fn record_poll_retry() {
    metrics().poll_retries.fetch_add(1, Ordering::Relaxed);
}
