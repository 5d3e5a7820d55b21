// tests/ingest_config.rs
use civic_feed::config::ai::AiConfig;
use civic_feed::ingest::config::{load_sources_default, load_sources_from, ProviderKind};
use std::{env, fs};

#[test]
fn sources_load_from_toml_and_json_files() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("sources.toml");
    fs::write(
        &p_toml,
        r#"
[[sources]]
provider = "court_listener"
court = "scotus"

[[sources]]
provider = "outlet_rss"
name = "Capitol Wire"
endpoint = "https://capitolwire.example.org/rss"
"#,
    )
    .unwrap();
    let v = load_sources_from(&p_toml).unwrap();
    assert_eq!(v.len(), 2);
    assert_eq!(v[0].provider, ProviderKind::CourtListener);
    assert_eq!(v[0].court.as_deref(), Some("scotus"));
    assert_eq!(v[1].display_name(), "Capitol Wire");

    let p_json = dir.path().join("sources.json");
    fs::write(&p_json, r#"{"sources": [{"provider": "news_api", "page_size": 5}]}"#).unwrap();
    let vj = load_sources_from(&p_json).unwrap();
    assert_eq!(vj[0].page_size_or(20), 5);
}

#[test]
fn unknown_provider_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("sources.toml");
    fs::write(&p, "[[sources]]\nprovider = \"carrier_pigeon\"\n").unwrap();
    assert!(load_sources_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var("FEED_SOURCES_PATH");

    // 1) Nothing on disk: built-in four sources
    let v = load_sources_default().unwrap();
    assert_eq!(v.len(), 4);

    // 2) ./config/sources.toml
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("sources.toml"),
        "[[sources]]\nprovider = \"federal_register\"\n",
    )
    .unwrap();
    let vt = load_sources_default().unwrap();
    assert_eq!(vt.len(), 1);

    // 3) Env path wins
    let p_env = tmp.path().join("custom.json");
    fs::write(&p_env, r#"[{"provider": "legiscan"}, {"provider": "news_api"}]"#).unwrap();
    env::set_var("FEED_SOURCES_PATH", p_env.display().to_string());
    let ve = load_sources_default().unwrap();
    assert_eq!(ve[0].provider, ProviderKind::Legiscan);
    assert_eq!(ve.len(), 2);

    // 4) Env pointing nowhere is an error
    env::set_var("FEED_SOURCES_PATH", tmp.path().join("missing.toml"));
    assert!(load_sources_default().is_err());

    env::remove_var("FEED_SOURCES_PATH");
    env::set_current_dir(old).unwrap();
}

#[serial_test::serial]
#[test]
fn ai_config_defaults_without_files() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var("FEED_AI_CONFIG_PATH");
    env::remove_var("OPENAI_API_KEY");
    env::set_var("FEED_TIMEOUT_SECS", "3");

    let cfg = AiConfig::load_default().unwrap();
    assert_eq!(cfg.provider, "openai");
    assert_eq!(cfg.max_concurrency, 4);
    assert_eq!(cfg.timeout_secs, 3);
    assert!(!cfg.has_credential());

    env::remove_var("FEED_TIMEOUT_SECS");
    env::set_current_dir(old).unwrap();
}
