use commons_config::{load_config_from, DEFAULT_FCM_URL, DEFAULT_MAX_UPLOAD_MEMORY};
use std::fs;

fn run_env() -> String {
    std::env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string())
}

#[test]
fn missing_files_yield_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(dir.path()).unwrap();

    assert_eq!(config.http.max_upload_memory, DEFAULT_MAX_UPLOAD_MEMORY);
    assert!(config.fcm.is_none());
    assert!(config.twilio.is_none());
}

#[test]
fn environment_file_overrides_default_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[http]
max_upload_memory = 1024

[fcm]
api_key = "default-key"

[twilio]
account_sid = "AC1"
auth_token = "token"
phone_number = "+15550001"
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(format!("{}.toml", run_env())),
        r#"
[fcm]
api_key = "env-key"
"#,
    )
    .unwrap();

    let config = load_config_from(dir.path()).unwrap();
    assert_eq!(config.http.max_upload_memory, 1024);

    let fcm = config.fcm.unwrap();
    assert_eq!(fcm.api_key, "env-key");
    assert_eq!(fcm.base_url, DEFAULT_FCM_URL);

    let twilio = config.twilio.unwrap();
    assert_eq!(twilio.basic_auth(), ("AC1", "token"));
    assert_eq!(twilio.api_key_sid, None);
}

#[test]
fn invalid_values_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        "[http]\nmax_upload_memory = \"lots\"\n",
    )
    .unwrap();

    assert!(load_config_from(dir.path()).is_err());
}
