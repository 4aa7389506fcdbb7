//! Settings loading from files and the environment

use serial_test::serial;
use std::io::Write;
use TourDesk::Settings;

#[test]
#[serial]
fn test_file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tourdesk.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[server]
port = 9191

[messaging]
sms_cost = 18

[roster]
pickup_locations = ["서울역", "김포공항"]
"#
    )
    .unwrap();

    let settings = Settings::from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(settings.server.port, 9191);
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.messaging.sms_cost, 18);
    assert_eq!(settings.messaging.lms_cost, 50);
    assert_eq!(settings.roster.pickup_locations, vec!["서울역", "김포공항"]);
    assert!(settings.validate().is_ok());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing");

    std::env::set_var("TOURDESK__GATEWAY__API_KEY", "from-env");
    std::env::set_var("TOURDESK__SERVER__ALLOWED_ORIGINS", "https://a.example.com,https://b.example.com");
    let settings = Settings::from_file(path.to_str().unwrap());
    std::env::remove_var("TOURDESK__GATEWAY__API_KEY");
    std::env::remove_var("TOURDESK__SERVER__ALLOWED_ORIGINS");

    let settings = settings.unwrap();
    assert_eq!(settings.gateway.api_key, "from-env");
    assert_eq!(settings.server.allowed_origins.len(), 2);
}

#[test]
#[serial]
fn test_zero_port_fails_validation() {
    let mut settings = Settings::default();
    settings.server.port = 0;
    assert!(settings.validate().is_err());
}
