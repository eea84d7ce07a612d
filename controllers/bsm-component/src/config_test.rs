//! Unit tests for manifest parsing and connection settings

use super::*;
use std::io::Write;

#[test]
fn test_parse_camel_case_manifest() {
    let params = ComponentParams::from_yaml(
        r#"
state: present
objectId: 42
name: prod-nginx
hosts:
  - uk-web-01
  - uk-web-02
hostTemplate: Application - NGINX
operationalZone: 66.5
"#,
    )
    .unwrap();

    assert_eq!(params.state, StateIntent::Present);
    assert_eq!(params.object_id, Some(42));
    assert_eq!(params.hosts, vec!["uk-web-01", "uk-web-02"]);
    assert_eq!(params.host_template, "Application - NGINX");
    assert!((params.operational_zone - 66.5).abs() < 1e-9);
}

#[test]
fn test_parse_json_manifest_with_snake_case_and_defaults() {
    let params = ComponentParams::from_yaml(
        r#"{"name": "prod-nginx", "hosts": ["uk-web-01"], "host_template": "Application - NGINX", "operational_zone": "50.00", "object_id": "7"}"#,
    )
    .unwrap();

    assert_eq!(params.state, StateIntent::Updated);
    assert_eq!(params.object_id, Some(7));
    assert!((params.operational_zone - 50.0).abs() < 1e-9);
}

#[test]
fn test_operational_zone_accepts_percent_sign() {
    let params = ComponentParams::from_yaml(
        "name: a\nhosts: [h]\nhostTemplate: t\noperationalZone: \"25%\"\n",
    )
    .unwrap();

    assert!((params.operational_zone - 25.0).abs() < 1e-9);
}

#[test]
fn test_out_of_range_zone_parses_but_fails_validation() {
    let params = ComponentParams::from_yaml(
        "name: a\nhosts: [h]\nhostTemplate: t\noperationalZone: 150\n",
    )
    .unwrap();

    let (desired, _) = params.into_desired();
    assert!(desired.validate().is_err());
}

#[test]
fn test_rejects_unknown_and_missing_fields() {
    let unknown = ComponentParams::from_yaml(
        "name: a\nhosts: [h]\nhostTemplate: t\noperationalZone: 50\nquorum: 2\n",
    );
    assert!(matches!(unknown, Err(ControllerError::InvalidConfig(_))));

    let missing = ComponentParams::from_yaml("name: a\nhosts: [h]\noperationalZone: 50\n");
    assert!(matches!(missing, Err(ControllerError::InvalidConfig(_))));

    let bad_state = ComponentParams::from_yaml(
        "state: gone\nname: a\nhosts: [h]\nhostTemplate: t\noperationalZone: 50\n",
    );
    assert!(matches!(bad_state, Err(ControllerError::InvalidConfig(_))));

    let bad_id = ComponentParams::from_yaml(
        "objectId: abc\nname: a\nhosts: [h]\nhostTemplate: t\noperationalZone: 50\n",
    );
    assert!(matches!(bad_id, Err(ControllerError::InvalidConfig(_))));
}

#[test]
fn test_into_desired() {
    let params = ComponentParams::from_yaml(
        "state: absent\nname: prod-nginx\nhosts: [uk-web-01]\nhostTemplate: Application - NGINX\noperationalZone: 0\n",
    )
    .unwrap();

    let (desired, intent) = params.into_desired();
    assert_eq!(intent, StateIntent::Absent);
    assert_eq!(desired.name, "prod-nginx");
    assert_eq!(desired.object_id, None);
    assert_eq!(desired.hosts, vec!["uk-web-01"]);
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name: prod-nginx\nhosts: [uk-web-01]\nhostTemplate: Application - NGINX\noperationalZone: 50").unwrap();

    let params = ComponentParams::load(file.path()).unwrap();
    assert_eq!(params.name, "prod-nginx");

    let dir = tempfile::tempdir().unwrap();
    let missing = ComponentParams::load(&dir.path().join("missing.yaml"));
    assert!(matches!(missing, Err(ControllerError::InvalidConfig(_))));
}

#[test]
fn test_parse_verify_ssl() {
    for value in ["yes", "True", "1", "on", ""] {
        assert_eq!(parse_verify_ssl(value), TlsVerification::Enabled, "{:?}", value);
    }
    for value in ["no", "FALSE", "0", "off"] {
        assert_eq!(parse_verify_ssl(value), TlsVerification::Disabled, "{:?}", value);
    }
    assert_eq!(
        parse_verify_ssl("/etc/ssl/opsview-ca.pem"),
        TlsVerification::CaBundle(PathBuf::from("/etc/ssl/opsview-ca.pem"))
    );
}

#[test]
fn test_opsview_config_prefers_token() {
    let config = OpsviewConfig::new(
        Some("https://opsview.example.com/rest".to_string()),
        Some("admin".to_string()),
        Some("initial".to_string()),
        Some("abc123".to_string()),
        None,
    )
    .unwrap();

    assert!(matches!(config.credential, Credential::Token(ref t) if t == "abc123"));
    assert_eq!(config.tls, TlsVerification::Enabled);
}

#[test]
fn test_opsview_config_password_and_verify_ssl() {
    let config = OpsviewConfig::new(
        Some("https://opsview.example.com".to_string()),
        Some("admin".to_string()),
        Some("initial".to_string()),
        Some("  ".to_string()),
        Some("no"),
    )
    .unwrap();

    assert!(matches!(config.credential, Credential::Password(_)));
    assert_eq!(config.tls, TlsVerification::Disabled);
}

#[test]
fn test_opsview_config_requires_endpoint_user_and_secret() {
    let no_secret = OpsviewConfig::new(
        Some("https://opsview.example.com".to_string()),
        Some("admin".to_string()),
        None,
        None,
        None,
    );
    assert!(matches!(no_secret, Err(ControllerError::InvalidConfig(_))));

    let no_endpoint = OpsviewConfig::new(None, Some("admin".to_string()), Some("pw".to_string()), None, None);
    match no_endpoint {
        Err(ControllerError::InvalidConfig(message)) => assert!(message.contains("endpoint")),
        other => panic!("expected invalid config, got {:?}", other),
    }

    let no_user = OpsviewConfig::new(
        Some("https://opsview.example.com".to_string()),
        Some(String::new()),
        Some("pw".to_string()),
        None,
        None,
    );
    assert!(matches!(no_user, Err(ControllerError::InvalidConfig(_))));
}
