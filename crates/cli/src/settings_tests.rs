use super::*;

fn base_settings() -> Settings {
    Settings {
        database_url: "sqlite://clawbowl.db".to_string(),
        jwt_secret: "secret".to_string(),
        jwt_expire_minutes: 60,
        zenmux_api_key: "zk-test".to_string(),
        zenmux_base_url: "https://api.zenmux.ai".to_string(),
        openclaw_image: "openclaw:latest".to_string(),
        openclaw_port_range_start: 20000,
        openclaw_port_range_end: 21000,
        openclaw_data_dir: PathBuf::from("/var/lib/clawbowl"),
        openclaw_container_memory: 1024,
        openclaw_container_cpus: 1.0,
        openclaw_node_max_old_space: 512,
        openclaw_idle_timeout_minutes: 30,
        openclaw_host_modules: None,
        openclaw_host_bin: None,
        apns_key_id: None,
        apns_team_id: None,
        apns_private_key_path: None,
        tavily_api_key: None,
    }
}

#[test]
fn a_well_formed_settings_struct_validates() {
    assert!(base_settings().validate().is_ok());
}

#[test]
fn an_empty_database_url_is_rejected() {
    let mut settings = base_settings();
    settings.database_url = String::new();
    assert!(matches!(settings.validate(), Err(SettingsError::Missing { field: "database_url" })));
}

#[test]
fn an_inverted_port_range_is_rejected() {
    let mut settings = base_settings();
    settings.openclaw_port_range_start = 22000;
    settings.openclaw_port_range_end = 21000;
    assert!(matches!(settings.validate(), Err(SettingsError::InvalidPortRange { .. })));
}

#[test]
fn port_range_helper_builds_an_inclusive_range() {
    let settings = base_settings();
    assert_eq!(settings.port_range(), 20000..=21000);
}

#[test]
fn idle_timeout_converts_minutes_to_a_duration() {
    let settings = base_settings();
    assert_eq!(settings.idle_timeout(), Duration::from_secs(1800));
}
