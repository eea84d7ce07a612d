//! Parameters of a run: the component manifest and the Opsview connection settings.

use crate::desired::{DesiredSpec, StateIntent};
use crate::error::ControllerError;
use opsview_client::{Credential, OpsviewClient, OpsviewClientTrait, TlsVerification};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Component manifest, YAML or JSON
///
/// ```yaml
/// state: updated
/// name: prod-nginx
/// hosts: [uk-web-01, uk-web-02]
/// hostTemplate: Application - NGINX
/// operationalZone: 50
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComponentParams {
    #[serde(default)]
    pub state: StateIntent,
    #[serde(default, alias = "object_id", deserialize_with = "optional_id")]
    pub object_id: Option<u64>,
    pub name: String,
    pub hosts: Vec<String>,
    #[serde(alias = "host_template")]
    pub host_template: String,
    #[serde(alias = "operational_zone", deserialize_with = "percentage")]
    pub operational_zone: f64,
}

impl ComponentParams {
    pub fn from_yaml(source: &str) -> Result<Self, ControllerError> {
        serde_yaml::from_str(source)
            .map_err(|e| ControllerError::InvalidConfig(format!("Invalid component manifest: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self, ControllerError> {
        debug!("Loading component manifest from {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|e| {
            ControllerError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&source)
    }

    /// Split into what the reconciler needs
    pub fn into_desired(self) -> (DesiredSpec, StateIntent) {
        let desired = DesiredSpec {
            name: self.name,
            object_id: self.object_id,
            hosts: self.hosts,
            host_template: self.host_template,
            operational_zone: self.operational_zone,
        };
        (desired, self.state)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(u64),
    Float(f64),
    Str(String),
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Int(id)) => Ok(Some(id)),
        Some(NumberOrString::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("objectId must be an integer, got {:?}", s))),
        Some(NumberOrString::Float(f)) => Err(serde::de::Error::custom(format!(
            "objectId must be an integer, got {}",
            f
        ))),
    }
}

fn percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(i) => Ok(i as f64),
        NumberOrString::Float(f) => Ok(f),
        NumberOrString::Str(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("operationalZone must be a number, got {:?}", s))),
    }
}

/// Interpret `verifySsl`: a boolean word, or the path of a CA bundle
pub fn parse_verify_ssl(value: &str) -> TlsVerification {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "yes" | "true" | "1" | "on" => TlsVerification::Enabled,
        "no" | "false" | "0" | "off" => TlsVerification::Disabled,
        _ => TlsVerification::CaBundle(PathBuf::from(value.trim())),
    }
}

/// Connection settings for Opsview
#[derive(Debug, Clone)]
pub struct OpsviewConfig {
    pub endpoint: String,
    pub username: String,
    pub credential: Credential,
    pub tls: TlsVerification,
}

impl OpsviewConfig {
    /// Build from flag or environment values; a token wins over a password
    pub fn new(
        endpoint: Option<String>,
        username: Option<String>,
        password: Option<String>,
        token: Option<String>,
        verify_ssl: Option<&str>,
    ) -> Result<Self, ControllerError> {
        let endpoint = required(endpoint, "endpoint (OPSVIEW_ENDPOINT)")?;
        let username = required(username, "username (OPSVIEW_USERNAME)")?;

        let credential = match (non_blank(token), non_blank(password)) {
            (Some(token), _) => Credential::Token(token),
            (None, Some(password)) => Credential::Password(password),
            (None, None) => {
                return Err(ControllerError::InvalidConfig(
                    "either password (OPSVIEW_PASSWORD) or token (OPSVIEW_TOKEN) is required".to_string(),
                ));
            }
        };

        Ok(Self {
            endpoint,
            username,
            credential,
            tls: verify_ssl.map(parse_verify_ssl).unwrap_or_default(),
        })
    }

    /// Construct the client, logging in or checking the token
    pub async fn connect(&self) -> Result<OpsviewClient, ControllerError> {
        let client = OpsviewClient::connect(
            &self.endpoint,
            self.username.clone(),
            self.credential.clone(),
            &self.tls,
        )
        .await?;

        if let Credential::Token(_) = self.credential {
            client.validate_token().await?;
        }

        Ok(client)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, what: &str) -> Result<String, ControllerError> {
    non_blank(value).ok_or_else(|| ControllerError::InvalidConfig(format!("{} is required", what)))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
