//! Scenario: unused config keys warn or fail
//!
//! # Invariants under test
//!
//! 1. A config containing only consumed keys produces a clean report.
//! 2. Unknown keys are listed (sorted) under `Warn` and the call succeeds.
//! 3. Unknown keys abort under `Fail` with `CONFIG_UNUSED_KEYS`.
//! 4. Segment boundaries are respected ("/api/base_urlx" is not consumed).

use trk_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

const CLEAN: &str = r#"
api:
  base_url: "http://127.0.0.1:5000"
  tracking_path: "/api/orders/track"
  fetch_timeout_secs: 10
push:
  url: "ws://127.0.0.1:5000/ws"
display:
  ansi_colors: false
"#;

const WITH_EXTRAS: &str = r#"
api:
  base_url_x: "typo"
sitemap:
  enabled: true
"#;

#[test]
fn consumed_keys_only_is_clean() {
    let loaded = load_layered_yaml_from_strings(&[CLEAN]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean(), "{:?}", report.unused_leaf_pointers);
}

#[test]
fn warn_policy_lists_unused_keys() {
    let loaded = load_layered_yaml_from_strings(&[CLEAN, WITH_EXTRAS]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/api/base_url_x".to_string(), "/sitemap/enabled".to_string()]
    );
}

#[test]
fn fail_policy_errors_on_unused_keys() {
    let loaded = load_layered_yaml_from_strings(&[CLEAN, WITH_EXTRAS]).unwrap();
    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail)
        .unwrap_err()
        .to_string();
    assert!(err.contains("CONFIG_UNUSED_KEYS"), "{err}");
    assert!(err.contains("2 unused"), "{err}");
}
