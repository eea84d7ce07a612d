//! Opsview API models
//!
//! These models match the JSON shapes served under `/rest/config/`.
//! Opsview serializes most numbers (ids, percentages, paging counters) as strings,
//! so the numeric fields here accept either form.

use serde::{Deserialize, Deserializer, Serialize};

/// List response wrapper (`GET /rest/config/<type>`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub list: Vec<T>,
    #[serde(default)]
    pub summary: ListSummary,
}

/// Paging information returned alongside a list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSummary {
    #[serde(default, deserialize_with = "lenient::optional_u64")]
    pub allrows: Option<u64>,
    #[serde(default, deserialize_with = "lenient::optional_u64")]
    pub rows: Option<u64>,
    #[serde(default, deserialize_with = "lenient::optional_u64")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient::optional_u64")]
    pub totalpages: Option<u64>,
}

/// Single object wrapper (`GET/POST/PUT /rest/config/<type>/<id>`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectResponse<T> {
    pub object: T,
}

/// Reference to another configuration object, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedRef {
    pub name: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl NestedRef {
    /// Reference an object by name only, as accepted in request bodies
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: None,
        }
    }
}

/// BSM component as stored in Opsview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BsmComponent {
    #[serde(deserialize_with = "lenient::u64")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<NestedRef>,
    #[serde(default)]
    pub host_template: Option<NestedRef>,
    /// Operational zone, as a percentage of hosts
    #[serde(deserialize_with = "lenient::f64")]
    pub quorum_pct: f64,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl BsmComponent {
    /// Names of the member hosts, in server order
    pub fn host_names(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(|h| h.name.as_str())
    }

    /// Name of the host template, if one is assigned
    pub fn host_template_name(&self) -> Option<&str> {
        self.host_template.as_ref().map(|t| t.name.as_str())
    }
}

/// Request body for creating a BSM component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BsmComponentRequest {
    pub name: String,
    pub hosts: Vec<NestedRef>,
    pub host_template: NestedRef,
    pub quorum_pct: String,
}

/// Request body for updating a BSM component
///
/// Only populated fields are serialized; Opsview leaves omitted fields unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BsmComponentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<NestedRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_template: Option<NestedRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorum_pct: Option<String>,
}

impl BsmComponentPatch {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.hosts.is_none()
            && self.host_template.is_none()
            && self.quorum_pct.is_none()
    }
}

/// Host template with its attached service checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostTemplate {
    #[serde(deserialize_with = "lenient::u64")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub servicechecks: Vec<NestedRef>,
}

/// Request body for `POST /rest/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response body for `POST /rest/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Format a percentage the way Opsview stores `quorum_pct`
pub fn format_quorum_pct(value: f64) -> String {
    format!("{value:.2}")
}

/// Deserializers accepting numbers encoded either as JSON numbers or strings
mod lenient {
    use super::{Deserialize, Deserializer};
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Int(u64),
        Float(f64),
        Str(String),
    }

    pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match NumOrString::deserialize(deserializer)? {
            NumOrString::Int(n) => Ok(n),
            NumOrString::Float(f) => Err(D::Error::custom(format!("expected integer, got {f}"))),
            NumOrString::Str(s) => s.trim().parse().map_err(D::Error::custom),
        }
    }

    pub fn optional_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Option::<NumOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumOrString::Int(n)) => Ok(Some(n)),
            Some(NumOrString::Float(f)) => Err(D::Error::custom(format!("expected integer, got {f}"))),
            // `rows` echoes the request parameter, which may be "all"
            Some(NumOrString::Str(s)) => Ok(s.trim().parse().ok()),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match NumOrString::deserialize(deserializer)? {
            NumOrString::Int(n) => Ok(n as f64),
            NumOrString::Float(f) => Ok(f),
            NumOrString::Str(s) => s.trim().trim_end_matches('%').parse().map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bsm_component_from_opsview_json() {
        let json = serde_json::json!({
            "id": "7",
            "name": "prod-nginx",
            "ref": "/rest/config/bsmcomponent/7",
            "hosts": [
                {"name": "uk-web-01", "ref": "/rest/config/host/12"},
                {"name": "uk-web-02", "ref": "/rest/config/host/13"}
            ],
            "host_template": {"name": "Application - NGINX", "ref": "/rest/config/hosttemplate/90"},
            "quorum_pct": "50.00"
        });

        let component: BsmComponent = serde_json::from_value(json).unwrap();
        assert_eq!(component.id, 7);
        assert_eq!(component.quorum_pct, 50.0);
        assert_eq!(component.host_names().collect::<Vec<_>>(), vec!["uk-web-01", "uk-web-02"]);
        assert_eq!(component.host_template_name(), Some("Application - NGINX"));
    }

    #[test]
    fn test_numeric_fields_accept_json_numbers() {
        let json = serde_json::json!({
            "id": 3,
            "name": "db",
            "hosts": [],
            "quorum_pct": 66.67
        });

        let component: BsmComponent = serde_json::from_value(json).unwrap();
        assert_eq!(component.id, 3);
        assert!((component.quorum_pct - 66.67).abs() < 1e-9);
        assert!(component.host_template.is_none());
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = BsmComponentPatch {
            quorum_pct: Some(format_quorum_pct(75.0)),
            ..Default::default()
        };

        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({"quorum_pct": "75.00"}));
        assert!(!patch.is_empty());
        assert!(BsmComponentPatch::default().is_empty());
    }

    #[test]
    fn test_list_summary_parses_string_counters() {
        let json = serde_json::json!({
            "list": [],
            "summary": {"allrows": "0", "rows": "0", "page": "1", "totalpages": "1"}
        });

        let response: ListResponse<BsmComponent> = serde_json::from_value(json).unwrap();
        assert_eq!(response.summary.totalpages, Some(1));
        assert_eq!(response.summary.allrows, Some(0));
    }
}
