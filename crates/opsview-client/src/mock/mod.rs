//! Mock OpsviewClient for unit testing
//!
//! This module provides a mock implementation of OpsviewClientTrait that can be used
//! in unit tests without requiring a running Opsview instance.
//!
//! The mock is organized into domain-specific modules:
//! - `bsm.rs` - BSM component and host template operations
//! - `helpers.rs` - Helper functions for creating nested references
//!
//! Every call is recorded, so tests can assert exactly which remote operations a
//! reconciliation issued.

mod bsm;
mod helpers;

use crate::error::OpsviewError;
use crate::models::*;
use crate::opsview_trait::OpsviewClientTrait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A call received by the mock, in order of arrival
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ValidateToken,
    GetBsmComponent(u64),
    QueryBsmComponents(Vec<(String, String)>),
    CreateBsmComponent(BsmComponentRequest),
    UpdateBsmComponent(u64, BsmComponentPatch),
    DeleteBsmComponent(u64),
    GetHostTemplateServiceChecks(String),
}

impl MockCall {
    /// True for calls that change remote state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            MockCall::CreateBsmComponent(_) | MockCall::UpdateBsmComponent(..) | MockCall::DeleteBsmComponent(_)
        )
    }

    fn operation(&self) -> &'static str {
        match self {
            MockCall::ValidateToken => "validate_token",
            MockCall::GetBsmComponent(_) => "get_bsm_component",
            MockCall::QueryBsmComponents(_) => "query_bsm_components",
            MockCall::CreateBsmComponent(_) => "create_bsm_component",
            MockCall::UpdateBsmComponent(..) => "update_bsm_component",
            MockCall::DeleteBsmComponent(_) => "delete_bsm_component",
            MockCall::GetHostTemplateServiceChecks(_) => "get_host_template_service_checks",
        }
    }
}

/// Mock OpsviewClient for testing
///
/// This mock stores resources in memory and can be configured to fail
/// specific operations, or to answer slowly, for testing error paths.
#[derive(Clone)]
pub struct MockOpsviewClient {
    pub(crate) base_url: String,
    // In-memory storage for resources
    pub(crate) components: Arc<Mutex<HashMap<u64, BsmComponent>>>,
    pub(crate) host_templates: Arc<Mutex<HashMap<String, HostTemplate>>>,
    // Call log and injected failures (operation name -> error message)
    pub(crate) calls: Arc<Mutex<Vec<MockCall>>>,
    pub(crate) failures: Arc<Mutex<HashMap<&'static str, String>>>,
    pub(crate) latency: Arc<Mutex<Option<Duration>>>,
    // Counter for generating IDs
    pub(crate) next_id: Arc<Mutex<u64>>,
}

impl MockOpsviewClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            components: Arc::new(Mutex::new(HashMap::new())),
            host_templates: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            latency: Arc::new(Mutex::new(None)),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    /// Add a BSM component to the mock store (for test setup)
    pub fn add_bsm_component(&self, component: BsmComponent) {
        let mut next_id = self.next_id.lock().unwrap();
        if component.id >= *next_id {
            *next_id = component.id + 1;
        }
        self.components.lock().unwrap().insert(component.id, component);
    }

    /// Add a host template with the given service checks (for test setup)
    pub fn add_host_template(&self, name: &str, service_checks: &[&str]) {
        let id = self.next_id();
        let template = self.helpers().host_template(id, name, service_checks);
        self.host_templates.lock().unwrap().insert(name.to_string(), template);
    }

    /// Make every subsequent call of `operation` fail with an API error
    ///
    /// `operation` is the trait method name, e.g. `"update_bsm_component"`.
    pub fn fail_operation(&self, operation: &'static str, message: impl Into<String>) {
        self.failures.lock().unwrap().insert(operation, message.into());
    }

    /// Delay every subsequent call, to exercise deadlines
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Snapshot of a stored component
    pub fn bsm_component(&self, id: u64) -> Option<BsmComponent> {
        self.components.lock().unwrap().get(&id).cloned()
    }

    /// Number of stored components
    pub fn bsm_component_count(&self) -> usize {
        self.components.lock().unwrap().len()
    }

    /// All calls received so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that changed remote state
    pub fn mutating_calls(&self) -> Vec<MockCall> {
        self.calls().into_iter().filter(MockCall::is_mutation).collect()
    }

    /// Forget recorded calls, keeping stored resources
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Record a call and return the injected failure for it, if any
    pub(crate) async fn record(&self, call: MockCall) -> Result<(), OpsviewError> {
        let operation = call.operation();
        self.calls.lock().unwrap().push(call);

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failure = self.failures.lock().unwrap().get(operation).cloned();
        match failure {
            Some(message) => Err(OpsviewError::Api(message)),
            None => Ok(()),
        }
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }

    /// Get helpers instance
    pub(crate) fn helpers(&self) -> helpers::Helpers {
        helpers::Helpers
    }
}

#[async_trait::async_trait]
impl OpsviewClientTrait for MockOpsviewClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), OpsviewError> {
        self.record(MockCall::ValidateToken).await
    }

    async fn get_bsm_component(&self, id: u64) -> Result<BsmComponent, OpsviewError> {
        bsm::get_bsm_component(self, id).await
    }

    async fn query_bsm_components(&self, filters: &[(&str, &str)], fetch_all: bool) -> Result<Vec<BsmComponent>, OpsviewError> {
        bsm::query_bsm_components(self, filters, fetch_all).await
    }

    async fn create_bsm_component(&self, request: &BsmComponentRequest) -> Result<BsmComponent, OpsviewError> {
        bsm::create_bsm_component(self, request).await
    }

    async fn update_bsm_component(&self, id: u64, patch: &BsmComponentPatch) -> Result<BsmComponent, OpsviewError> {
        bsm::update_bsm_component(self, id, patch).await
    }

    async fn delete_bsm_component(&self, id: u64) -> Result<(), OpsviewError> {
        bsm::delete_bsm_component(self, id).await
    }

    async fn get_host_template_service_checks(&self, name: &str) -> Result<BTreeSet<String>, OpsviewError> {
        bsm::get_host_template_service_checks(self, name).await
    }
}
