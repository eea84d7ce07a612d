//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crate::desired::DesiredSpec;
use opsview_client::{BsmComponent, MockOpsviewClient, NestedRef};

/// Host template registered by `create_test_client`
pub const TEST_TEMPLATE: &str = "Application - NGINX";

/// Helper to create a desired state using `TEST_TEMPLATE`
pub fn create_test_desired(name: &str, hosts: &[&str], operational_zone: f64) -> DesiredSpec {
    DesiredSpec {
        name: name.to_string(),
        object_id: None,
        hosts: hosts.iter().map(|h| (*h).to_string()).collect(),
        host_template: TEST_TEMPLATE.to_string(),
        operational_zone,
    }
}

/// Helper to create a BSM component as Opsview would return it
pub fn create_test_component(
    id: u64,
    name: &str,
    hosts: &[&str],
    host_template: &str,
    quorum_pct: f64,
) -> BsmComponent {
    BsmComponent {
        id,
        name: name.to_string(),
        hosts: hosts
            .iter()
            .enumerate()
            .map(|(i, h)| NestedRef {
                name: (*h).to_string(),
                reference: Some(format!("/rest/config/host/{}", i + 10)),
            })
            .collect(),
        host_template: Some(NestedRef {
            name: host_template.to_string(),
            reference: Some("/rest/config/hosttemplate/90".to_string()),
        }),
        quorum_pct,
        reference: Some(format!("/rest/config/bsmcomponent/{}", id)),
    }
}

/// Helper to create a mock client that knows `TEST_TEMPLATE`
pub fn create_test_client() -> MockOpsviewClient {
    let client = MockOpsviewClient::new("http://test-opsview");
    client.add_host_template(TEST_TEMPLATE, &["NGINX - Active Connections", "NGINX - Requests"]);
    client
}
