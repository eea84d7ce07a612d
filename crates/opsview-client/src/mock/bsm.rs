//! BSM operations for MockOpsviewClient
//!
//! Handles BSM components and host template lookups

use super::{MockCall, MockOpsviewClient};
use crate::error::OpsviewError;
use crate::models::*;
use std::collections::BTreeSet;

fn parse_quorum(value: &str) -> Result<f64, OpsviewError> {
    value
        .trim()
        .parse()
        .map_err(|_| OpsviewError::InvalidRequest(format!("Invalid quorum_pct: {}", value)))
}

/// Resolve a template reference the way Opsview does: it must name an existing template
fn resolve_host_template(client: &MockOpsviewClient, template: &NestedRef) -> Result<NestedRef, OpsviewError> {
    let id = client.host_templates
        .lock()
        .unwrap()
        .get(&template.name)
        .map(|t| t.id)
        .ok_or_else(|| OpsviewError::InvalidRequest(format!(
            "Host template {} does not exist",
            template.name
        )))?;
    Ok(client.helpers().host_template_ref(&template.name, id))
}

pub async fn get_bsm_component(client: &MockOpsviewClient, id: u64) -> Result<BsmComponent, OpsviewError> {
        client.record(MockCall::GetBsmComponent(id)).await?;
        client.components
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| OpsviewError::NotFound(format!("BSM component {} not found", id)))
}

pub async fn query_bsm_components(client: &MockOpsviewClient, filters: &[(&str, &str)], _fetch_all: bool) -> Result<Vec<BsmComponent>, OpsviewError> {
        client.record(MockCall::QueryBsmComponents(
            filters.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
        )).await?;

        let name_filter = filters.iter().find(|(k, _)| *k == "s.name").map(|(_, v)| *v);
        let components = client.components.lock().unwrap();
        let mut matches: Vec<BsmComponent> = components
            .values()
            .filter(|c| name_filter.is_none_or(|name| c.name == name))
            .cloned()
            .collect();
        matches.sort_by_key(|c| c.id);
        Ok(matches)
}

pub async fn create_bsm_component(client: &MockOpsviewClient, request: &BsmComponentRequest) -> Result<BsmComponent, OpsviewError> {
        client.record(MockCall::CreateBsmComponent(request.clone())).await?;

        let quorum_pct = parse_quorum(&request.quorum_pct)?;
        let host_template = resolve_host_template(client, &request.host_template)?;
        let id = client.next_id();
        let component = BsmComponent {
            id,
            name: request.name.clone(),
            hosts: client.helpers().host_refs(&request.hosts),
            host_template: Some(host_template),
            quorum_pct,
            reference: Some(client.helpers().component_ref(id)),
        };

        client.components.lock().unwrap().insert(id, component.clone());
        Ok(component)
}

pub async fn update_bsm_component(client: &MockOpsviewClient, id: u64, patch: &BsmComponentPatch) -> Result<BsmComponent, OpsviewError> {
        client.record(MockCall::UpdateBsmComponent(id, patch.clone())).await?;

        let quorum_pct = patch.quorum_pct.as_deref().map(parse_quorum).transpose()?;
        let host_template = patch
            .host_template
            .as_ref()
            .map(|t| resolve_host_template(client, t))
            .transpose()?;

        let mut components = client.components.lock().unwrap();
        let component = components
            .get_mut(&id)
            .ok_or_else(|| OpsviewError::NotFound(format!("BSM component {} not found", id)))?;

        if let Some(name) = &patch.name {
            component.name = name.clone();
        }
        if let Some(hosts) = &patch.hosts {
            component.hosts = client.helpers().host_refs(hosts);
        }
        if let Some(template) = host_template {
            component.host_template = Some(template);
        }
        if let Some(quorum_pct) = quorum_pct {
            component.quorum_pct = quorum_pct;
        }

        Ok(component.clone())
}

pub async fn delete_bsm_component(client: &MockOpsviewClient, id: u64) -> Result<(), OpsviewError> {
        client.record(MockCall::DeleteBsmComponent(id)).await?;
        client.components
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| OpsviewError::NotFound(format!("BSM component {} not found", id)))
}

pub async fn get_host_template_service_checks(client: &MockOpsviewClient, name: &str) -> Result<BTreeSet<String>, OpsviewError> {
        client.record(MockCall::GetHostTemplateServiceChecks(name.to_string())).await?;
        client.host_templates
            .lock()
            .unwrap()
            .get(name)
            .map(|t| t.servicechecks.iter().map(|sc| sc.name.clone()).collect())
            .ok_or_else(|| OpsviewError::NotFound(format!("Host template {} not found", name)))
}
