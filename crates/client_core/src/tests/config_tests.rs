use super::{load_settings_from, normalize_backend_url, ClientSettings};

use std::{
    collections::HashMap,
    env, fs,
    path::Path,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_match_the_game_contract() {
    let settings = ClientSettings::default();
    assert_eq!(settings.backend_url, "http://127.0.0.1:5000");
    assert_eq!(settings.pacing_delay(), Duration::from_millis(500));
    assert_eq!(settings.total_questions, 20);
}

#[test]
fn missing_file_yields_defaults() {
    let settings = load_settings_from(Path::new("/nonexistent/genie.toml"), no_env);
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn file_values_then_env_overrides() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("song_genie_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("genie.toml");
    fs::write(
        &path,
        "backend_url = \"http://file-host:7000\"\npacing_delay_ms = 250\ntotal_questions = 15\n",
    )
    .expect("write settings");

    let from_file = load_settings_from(&path, no_env);
    assert_eq!(from_file.backend_url, "http://file-host:7000");
    assert_eq!(from_file.pacing_delay_ms, 250);
    assert_eq!(from_file.total_questions, 15);
    assert_eq!(from_file.request_timeout_secs, 10);

    let env_vars: HashMap<&str, &str> = HashMap::from([
        ("APP__BACKEND_URL", "http://env-host:9000"),
        ("APP__PACING_DELAY_MS", "100"),
        ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
    ]);
    let overridden = load_settings_from(&path, |key| env_vars.get(key).map(|v| v.to_string()));
    assert_eq!(overridden.backend_url, "http://env-host:9000");
    assert_eq!(overridden.pacing_delay_ms, 100);
    assert_eq!(overridden.request_timeout_secs, 10);
    assert_eq!(overridden.total_questions, 15);

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn mistyped_file_is_ignored_as_a_whole() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("song_genie_bad_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("genie.toml");
    fs::write(
        &path,
        "backend_url = \"http://file-host:7000\"\npacing_delay_ms = -5\n",
    )
    .expect("write settings");

    assert_eq!(load_settings_from(&path, no_env), ClientSettings::default());

    fs::write(&path, "total_questions = 12\nunknown_key = true\n").expect("write settings");
    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.total_questions, 12);
    assert_eq!(settings.backend_url, ClientSettings::default().backend_url);

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let settings = load_settings_from(Path::new("/nonexistent/genie.toml"), |key| match key {
        "GENIE_BACKEND_URL" => Some("http://plain:1".into()),
        "APP__BACKEND_URL" => Some("http://prefixed:2".into()),
        _ => None,
    });
    assert_eq!(settings.backend_url, "http://prefixed:2");
}

#[test]
fn normalizes_backend_urls() {
    assert_eq!(
        normalize_backend_url("  127.0.0.1:5000/ ").expect("normalize"),
        "http://127.0.0.1:5000"
    );
    assert_eq!(
        normalize_backend_url("https://genie.example.com/api//").expect("normalize"),
        "https://genie.example.com/api"
    );
    assert_eq!(
        normalize_backend_url("").expect("normalize"),
        "http://127.0.0.1:5000"
    );
}

#[test]
fn rejects_unsupported_schemes() {
    let err = normalize_backend_url("ftp://files.example.com").expect_err("ftp is not http");
    assert!(err.to_string().contains("unsupported scheme"));
}
