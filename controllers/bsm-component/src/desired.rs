//! Desired state of a BSM component and its field-level diff against Opsview.

use crate::error::ReconcileError;
use opsview_client::{format_quorum_pct, BsmComponent, BsmComponentPatch, BsmComponentRequest, NestedRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tolerance when comparing operational zones
pub const OPERATIONAL_ZONE_EPSILON: f64 = 1e-9;

/// What the caller wants to be true about the component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StateIntent {
    /// Create if missing; leave an existing component untouched
    Present,
    /// Create if missing; bring an existing component's attributes up to date
    #[default]
    Updated,
    /// Remove the component if it exists
    Absent,
}

/// Attributes of a BSM component as the caller wants them
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredSpec {
    pub name: String,
    /// Identifies the component instead of `name`; used for renames
    pub object_id: Option<u64>,
    pub hosts: Vec<String>,
    pub host_template: String,
    /// Percentage of hosts that must be available, 0 to 100
    pub operational_zone: f64,
}

impl DesiredSpec {
    /// Check the desired state before anything is sent to Opsview
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.name.trim().is_empty() {
            return Err(ReconcileError::Validation("name must not be empty".to_string()));
        }
        if self.hosts.is_empty() {
            return Err(ReconcileError::Validation("hosts must contain at least one host".to_string()));
        }
        if let Some(position) = self.hosts.iter().position(|h| h.trim().is_empty()) {
            return Err(ReconcileError::Validation(format!("hosts[{}] is empty", position)));
        }
        if self.host_template.trim().is_empty() {
            return Err(ReconcileError::Validation("hostTemplate must not be empty".to_string()));
        }
        if !(0.0..=100.0).contains(&self.operational_zone) {
            return Err(ReconcileError::Validation(format!(
                "operationalZone must be a percentage between 0 and 100, got {}",
                self.operational_zone
            )));
        }
        Ok(())
    }

    /// Hosts in caller order with duplicates removed
    pub fn unique_hosts(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.hosts
            .iter()
            .filter(|h| seen.insert(h.as_str()))
            .cloned()
            .collect()
    }

    /// Full create body
    pub fn to_request(&self) -> BsmComponentRequest {
        BsmComponentRequest {
            name: self.name.clone(),
            hosts: self.unique_hosts().into_iter().map(NestedRef::named).collect(),
            host_template: NestedRef::named(self.host_template.clone()),
            quorum_pct: format_quorum_pct(self.operational_zone),
        }
    }

    /// Fields of `remote` that differ from the desired state
    pub fn diff(&self, remote: &BsmComponent) -> ComponentPatch {
        let mut patch = ComponentPatch::default();

        if remote.name != self.name {
            patch.name = Some(self.name.clone());
        }

        let desired_hosts: BTreeSet<&str> = self.hosts.iter().map(String::as_str).collect();
        let remote_hosts: BTreeSet<&str> = remote.host_names().collect();
        if desired_hosts != remote_hosts {
            patch.hosts = Some(self.unique_hosts());
        }

        if remote.host_template_name() != Some(self.host_template.as_str()) {
            patch.host_template = Some(self.host_template.clone());
        }

        if !operational_zone_matches(self.operational_zone, remote.quorum_pct) {
            patch.operational_zone = Some(self.operational_zone);
        }

        patch
    }
}

/// Value Opsview will hold once `desired` is submitted as `quorum_pct`
pub fn stored_operational_zone(desired: f64) -> f64 {
    format_quorum_pct(desired).parse().unwrap_or(desired)
}

/// Compare at the precision Opsview stores, using the same formatting as the request body
pub fn operational_zone_matches(desired: f64, remote: f64) -> bool {
    (stored_operational_zone(desired) - remote).abs() <= OPERATIONAL_ZONE_EPSILON
}

/// Fields to change on an existing component; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComponentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operational_zone: Option<f64>,
}

impl ComponentPatch {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Names of the populated fields, for logging
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.hosts.is_some() {
            fields.push("hosts");
        }
        if self.host_template.is_some() {
            fields.push("host_template");
        }
        if self.operational_zone.is_some() {
            fields.push("operational_zone");
        }
        fields
    }

    /// Wire form of the patch
    pub fn to_request(&self) -> BsmComponentPatch {
        BsmComponentPatch {
            name: self.name.clone(),
            hosts: self
                .hosts
                .as_ref()
                .map(|hosts| hosts.iter().cloned().map(NestedRef::named).collect()),
            host_template: self.host_template.clone().map(NestedRef::named),
            quorum_pct: self.operational_zone.map(format_quorum_pct),
        }
    }
}

#[cfg(test)]
#[path = "desired_test.rs"]
mod desired_test;
