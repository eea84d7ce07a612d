//! Unit tests for desired state validation and diffing

use super::*;
use crate::test_utils::*;

#[test]
fn test_validate_accepts_boundaries() {
    let mut spec = create_test_desired("prod-nginx", &["uk-web-01"], 0.0);
    assert!(spec.validate().is_ok());

    spec.operational_zone = 100.0;
    assert!(spec.validate().is_ok());
}

#[test]
fn test_validate_rejects_out_of_range_zone() {
    for zone in [150.0, -0.5, f64::NAN, f64::INFINITY] {
        let spec = create_test_desired("prod-nginx", &["uk-web-01"], zone);
        assert!(
            matches!(spec.validate(), Err(ReconcileError::Validation(_))),
            "zone {} should be rejected",
            zone
        );
    }
}

#[test]
fn test_validate_rejects_empty_fields() {
    let no_hosts = create_test_desired("prod-nginx", &[], 50.0);
    assert!(matches!(no_hosts.validate(), Err(ReconcileError::Validation(_))));

    let blank_host = create_test_desired("prod-nginx", &["uk-web-01", " "], 50.0);
    match blank_host.validate() {
        Err(ReconcileError::Validation(message)) => assert!(message.contains("hosts[1]")),
        other => panic!("expected validation error, got {:?}", other),
    }

    let mut no_template = create_test_desired("prod-nginx", &["uk-web-01"], 50.0);
    no_template.host_template = String::new();
    assert!(matches!(no_template.validate(), Err(ReconcileError::Validation(_))));

    let no_name = create_test_desired("  ", &["uk-web-01"], 50.0);
    assert!(matches!(no_name.validate(), Err(ReconcileError::Validation(_))));
}

#[test]
fn test_diff_treats_hosts_as_set() {
    let spec = create_test_desired("prod-nginx", &["uk-web-01", "uk-web-02"], 50.0);
    let remote = create_test_component(1, "prod-nginx", &["uk-web-02", "uk-web-01"], TEST_TEMPLATE, 50.0);

    assert!(spec.diff(&remote).is_empty());
}

#[test]
fn test_diff_ignores_duplicate_desired_hosts() {
    let spec = create_test_desired("prod-nginx", &["uk-web-01", "uk-web-02", "uk-web-01"], 50.0);
    let remote = create_test_component(1, "prod-nginx", &["uk-web-01", "uk-web-02"], TEST_TEMPLATE, 50.0);

    assert!(spec.diff(&remote).is_empty());
}

#[test]
fn test_diff_only_operational_zone() {
    let spec = create_test_desired("prod-nginx", &["uk-web-01", "uk-web-02"], 75.0);
    let remote = create_test_component(1, "prod-nginx", &["uk-web-01", "uk-web-02"], TEST_TEMPLATE, 50.0);

    let patch = spec.diff(&remote);
    assert_eq!(patch.changed_fields(), vec!["operational_zone"]);
    assert_eq!(patch.operational_zone, Some(75.0));

    let wire = serde_json::to_value(patch.to_request()).unwrap();
    assert_eq!(wire, serde_json::json!({"quorum_pct": "75.00"}));
}

#[test]
fn test_diff_detects_every_field() {
    let spec = create_test_desired("prod-nginx-v2", &["uk-web-03"], 25.0);
    let remote = create_test_component(1, "prod-nginx", &["uk-web-01"], "Network - Base", 50.0);

    let patch = spec.diff(&remote);
    assert_eq!(patch.changed_fields(), vec!["name", "hosts", "host_template", "operational_zone"]);
    assert_eq!(patch.hosts, Some(vec!["uk-web-03".to_string()]));
    assert_eq!(patch.host_template.as_deref(), Some(TEST_TEMPLATE));
}

#[test]
fn test_diff_missing_remote_template() {
    let spec = create_test_desired("prod-nginx", &["uk-web-01"], 50.0);
    let mut remote = create_test_component(1, "prod-nginx", &["uk-web-01"], TEST_TEMPLATE, 50.0);
    remote.host_template = None;

    assert_eq!(spec.diff(&remote).changed_fields(), vec!["host_template"]);
}

#[test]
fn test_operational_zone_compared_at_stored_precision() {
    assert!(operational_zone_matches(50.0, 50.0));
    assert!(operational_zone_matches(66.666, 66.67));
    assert!(operational_zone_matches(33.333_333, 33.33));
    assert!(!operational_zone_matches(50.0, 50.01));
    assert!(!operational_zone_matches(75.0, 50.0));
}

#[test]
fn test_operational_zone_compared_against_submitted_value() {
    // Half-way values where formatting and naive rounding disagree
    for (zone, sent) in [(0.125, "0.12"), (1.115, "1.11")] {
        assert_eq!(format_quorum_pct(zone), sent);
        let remote: f64 = sent.parse().unwrap();
        assert!(operational_zone_matches(zone, remote), "zone {} should match stored {}", zone, sent);
        assert!((stored_operational_zone(zone) - remote).abs() < 1e-12);
    }
}

#[test]
fn test_to_request_formats_quorum_and_dedups_hosts() {
    let spec = create_test_desired("prod-nginx", &["uk-web-02", "uk-web-01", "uk-web-02"], 50.0);
    let request = spec.to_request();

    assert_eq!(request.quorum_pct, "50.00");
    assert_eq!(
        request.hosts.iter().map(|h| h.name.as_str()).collect::<Vec<_>>(),
        vec!["uk-web-02", "uk-web-01"]
    );
    assert_eq!(request.host_template.name, TEST_TEMPLATE);
}

#[test]
fn test_state_intent_defaults_to_updated() {
    assert_eq!(StateIntent::default(), StateIntent::Updated);
    let intent: StateIntent = serde_json::from_str("\"absent\"").unwrap();
    assert_eq!(intent, StateIntent::Absent);
}
