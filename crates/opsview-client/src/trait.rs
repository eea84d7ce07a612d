//! OpsviewClient trait for mocking
//!
//! This trait abstracts the OpsviewClient to enable mocking in unit tests.
//! The concrete OpsviewClient implements this trait, and tests can use mock implementations.

use crate::error::OpsviewError;
use crate::models::*;
use std::collections::BTreeSet;

/// Trait for Opsview API client operations
///
/// All async methods must be `Send` to work with Tokio's runtimes.
#[async_trait::async_trait]
pub trait OpsviewClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API token
    async fn validate_token(&self) -> Result<(), OpsviewError>;

    // BSM component operations

    /// Fetch a component by id; a missing component is `OpsviewError::NotFound`
    async fn get_bsm_component(&self, id: u64) -> Result<BsmComponent, OpsviewError>;

    /// List components matching the filters (e.g. `[("s.name", "prod-nginx")]`)
    async fn query_bsm_components(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<BsmComponent>, OpsviewError>;

    async fn create_bsm_component(&self, request: &BsmComponentRequest) -> Result<BsmComponent, OpsviewError>;

    /// Apply a partial update; fields left as `None` are not sent
    async fn update_bsm_component(&self, id: u64, patch: &BsmComponentPatch) -> Result<BsmComponent, OpsviewError>;

    async fn delete_bsm_component(&self, id: u64) -> Result<(), OpsviewError>;

    // Host template operations

    /// Names of the service checks attached to a host template.
    /// An unknown template is `OpsviewError::NotFound`.
    async fn get_host_template_service_checks(&self, name: &str) -> Result<BTreeSet<String>, OpsviewError>;
}
