use dab_config::{AppConfig, ConfigError};

// 环境变量为进程级共享状态，所有场景放在同一个测试中顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var/remove_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::remove_var("DAB_INSTALL_ID");
    }
    let err = AppConfig::from_env().expect_err("install id is required");
    assert!(matches!(err, ConfigError::Missing(key) if key == "DAB_INSTALL_ID"));

    unsafe {
        std::env::set_var("DAB_INSTALL_ID", "ins-42");
        std::env::remove_var("DAB_INSTALL_NAME");
        std::env::set_var("DAB_RETRY_ATTEMPTS", "0");
        std::env::set_var("DAB_SIMULATE_MULTI_INSTALL", "TRUE");
        std::env::set_var("DAB_POLLING_INTERVAL_SECONDS", "30");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.install_id, "ins-42");
    assert_eq!(config.install_name, "ins-42");
    assert_eq!(config.retry_attempts, 1);
    assert_eq!(config.polling_interval_seconds, 30);
    assert!(config.simulate_multi_install);

    unsafe {
        std::env::set_var("DAB_RETRY_DELAY_MS", "soon");
    }
    let err = AppConfig::from_env().expect_err("invalid number");
    assert!(matches!(err, ConfigError::Invalid(key, value) if key == "DAB_RETRY_DELAY_MS" && value == "soon"));

    unsafe {
        std::env::remove_var("DAB_RETRY_DELAY_MS");
        std::env::set_var("DAB_POLLING_INTERVAL_SECONDS", "0");
    }
    assert!(AppConfig::from_env().is_err());
}
