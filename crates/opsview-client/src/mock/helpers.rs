//! Helper functions for creating nested Opsview model types

use crate::models::*;

/// Helper functions for creating nested types in mock implementations
///
/// Opsview references are server-relative paths, so no base URL is needed.
pub struct Helpers;

impl Helpers {
    /// Helper to create a host reference; mock host ids are derived from the name
    pub fn host_ref(&self, name: &str) -> NestedRef {
        let id = name.bytes().fold(0_u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b))) % 10_000;
        NestedRef {
            name: name.to_string(),
            reference: Some(format!("/rest/config/host/{}", id)),
        }
    }

    /// Helper to resolve request references into stored host references
    pub fn host_refs(&self, hosts: &[NestedRef]) -> Vec<NestedRef> {
        hosts.iter().map(|h| self.host_ref(&h.name)).collect()
    }

    /// Helper to create a host template reference
    pub fn host_template_ref(&self, name: &str, id: u64) -> NestedRef {
        NestedRef {
            name: name.to_string(),
            reference: Some(format!("/rest/config/hosttemplate/{}", id)),
        }
    }

    /// Helper to create a host template
    pub fn host_template(&self, id: u64, name: &str, service_checks: &[&str]) -> HostTemplate {
        HostTemplate {
            id,
            name: name.to_string(),
            servicechecks: service_checks
                .iter()
                .enumerate()
                .map(|(i, sc)| NestedRef {
                    name: (*sc).to_string(),
                    reference: Some(format!("/rest/config/servicecheck/{}", i + 1)),
                })
                .collect(),
        }
    }

    /// Helper to create the self reference of a component
    pub fn component_ref(&self, id: u64) -> String {
        format!("/rest/config/bsmcomponent/{}", id)
    }
}
