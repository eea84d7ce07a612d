//! Opsview API client
//!
//! Implements the Opsview REST API client for BSM component configuration.
//! Based on the Opsview API structure: /rest/config/bsmcomponent and /rest/config/hosttemplate

use crate::common::query::query_resources;
use crate::common::{normalize_endpoint, HttpClient};
use crate::error::OpsviewError;
use crate::models::*;
use crate::opsview_trait::OpsviewClientTrait;
use reqwest::{Certificate, Client, StatusCode};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const BSM_COMPONENT: &str = "bsmcomponent";
const HOST_TEMPLATE: &str = "hosttemplate";

/// Secret used to authenticate against Opsview
#[derive(Clone)]
pub enum Credential {
    /// Exchanged for a session token via `POST /rest/login`
    Password(String),
    /// Session token obtained earlier
    Token(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Password(_) => f.write_str("Password(<redacted>)"),
            Credential::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

/// Server certificate verification for HTTPS endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TlsVerification {
    /// Verify against the bundled web PKI roots
    #[default]
    Enabled,
    /// Accept any certificate
    Disabled,
    /// Additionally trust the PEM certificate at this path
    CaBundle(PathBuf),
}

/// Opsview API client
#[derive(Debug, Clone)]
pub struct OpsviewClient {
    http: HttpClient,
}

impl OpsviewClient {
    /// Create a client from an existing session token
    ///
    /// # Arguments
    /// * `endpoint` - Opsview URL, with or without the `/rest` suffix
    /// * `username` - User the token belongs to
    /// * `token` - API token
    /// * `tls` - Certificate verification mode
    pub fn new(endpoint: &str, username: String, token: String, tls: &TlsVerification) -> Result<Self, OpsviewError> {
        let client = Self::build_http_client(tls)?;
        Ok(Self {
            http: HttpClient::new(client, endpoint, username, token),
        })
    }

    /// Create a client, logging in first when a password is supplied
    pub async fn connect(
        endpoint: &str,
        username: String,
        credential: Credential,
        tls: &TlsVerification,
    ) -> Result<Self, OpsviewError> {
        let client = Self::build_http_client(tls)?;
        let token = match credential {
            Credential::Token(token) => token,
            Credential::Password(password) => {
                Self::login(&client, &normalize_endpoint(endpoint), &username, &password).await?
            }
        };

        Ok(Self {
            http: HttpClient::new(client, endpoint, username, token),
        })
    }

    fn build_http_client(tls: &TlsVerification) -> Result<Client, OpsviewError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(30));

        match tls {
            TlsVerification::Enabled => {}
            TlsVerification::Disabled => {
                builder = builder.danger_accept_invalid_certs(true);
            }
            TlsVerification::CaBundle(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    OpsviewError::Configuration(format!("Failed to read CA bundle {}: {}", path.display(), e))
                })?;
                let certificate = Certificate::from_pem(&pem).map_err(|e| {
                    OpsviewError::Configuration(format!("Invalid CA bundle {}: {}", path.display(), e))
                })?;
                builder = builder.add_root_certificate(certificate);
            }
        }

        builder.build().map_err(OpsviewError::Http)
    }

    /// Exchange a username and password for a session token
    async fn login(client: &Client, base_url: &str, username: &str, password: &str) -> Result<String, OpsviewError> {
        let url = format!("{}/rest/login", base_url);
        debug!("Logging in to Opsview as {}", username);

        let response = client
            .post(&url)
            .header("Accept", "application/json")
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(OpsviewError::Authentication(format!(
                "Login rejected for {}: {} - {}",
                username, status, body
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpsviewError::Api(format!("Login failed: {} - {}", status, body)));
        }

        let login: LoginResponse = response.json().await?;
        info!("Logged in to Opsview as {}", username);
        Ok(login.token)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait::async_trait]
impl OpsviewClientTrait for OpsviewClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn validate_token(&self) -> Result<(), OpsviewError> {
        debug!("Validating Opsview token and connectivity");
        let _: serde_json::Value = self.http.get("/rest/serverinfo").await?;
        debug!("Token validated successfully");
        Ok(())
    }

    async fn get_bsm_component(&self, id: u64) -> Result<BsmComponent, OpsviewError> {
        debug!("Fetching BSM component {} from Opsview", id);
        let path = format!("/rest/config/{}/{}", BSM_COMPONENT, id);

        match self.http.get::<ObjectResponse<BsmComponent>>(&path).await {
            Ok(response) => Ok(response.object),
            Err(OpsviewError::NotFound(_)) => {
                Err(OpsviewError::NotFound(format!("BSM component {} not found", id)))
            }
            Err(e) => Err(e),
        }
    }

    async fn query_bsm_components(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<BsmComponent>, OpsviewError> {
        debug!("Querying BSM components with filters: {:?}", filters);
        query_resources(&self.http, BSM_COMPONENT, filters, fetch_all).await
    }

    async fn create_bsm_component(&self, request: &BsmComponentRequest) -> Result<BsmComponent, OpsviewError> {
        debug!("Creating BSM component {}", request.name);
        let body = serde_json::to_value(request)?;
        let path = format!("/rest/config/{}", BSM_COMPONENT);

        let response: ObjectResponse<BsmComponent> = self.http.post(&path, &body).await?;
        Ok(response.object)
    }

    async fn update_bsm_component(&self, id: u64, patch: &BsmComponentPatch) -> Result<BsmComponent, OpsviewError> {
        if patch.is_empty() {
            return Err(OpsviewError::InvalidRequest(format!(
                "Refusing empty update for BSM component {}",
                id
            )));
        }

        debug!("Updating BSM component {}", id);
        let body = serde_json::to_value(patch)?;
        let path = format!("/rest/config/{}/{}", BSM_COMPONENT, id);

        let response: ObjectResponse<BsmComponent> = self.http.put(&path, &body).await?;
        Ok(response.object)
    }

    async fn delete_bsm_component(&self, id: u64) -> Result<(), OpsviewError> {
        debug!("Deleting BSM component {}", id);
        let path = format!("/rest/config/{}/{}", BSM_COMPONENT, id);
        self.http.delete(&path).await
    }

    async fn get_host_template_service_checks(&self, name: &str) -> Result<BTreeSet<String>, OpsviewError> {
        debug!("Enumerating service checks of host template {}", name);
        let templates: Vec<HostTemplate> =
            query_resources(&self.http, HOST_TEMPLATE, &[("s.name", name), ("rows", "all")], false).await?;

        // s.name filters may be looser than an exact match
        let template = templates
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| OpsviewError::NotFound(format!("Host template {} not found", name)))?;

        Ok(template.servicechecks.into_iter().map(|sc| sc.name).collect())
    }
}
