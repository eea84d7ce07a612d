//! Reconciliation of a single Opsview BSM component.
//!
//! A run is one linear pass: validate the desired state, locate the component,
//! decide an action from `(found, intent)`, and issue at most one mutating call.
//! With `dry_run` the mutating call is skipped and the would-be outcome returned.

use crate::desired::{ComponentPatch, DesiredSpec, StateIntent};
use crate::error::{ControllerError, ReconcileError, Step};
use opsview_client::{BsmComponent, OpsviewClientTrait, OpsviewError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Action decided for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    None,
    Create,
    Update,
    Delete,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub changed: bool,
    /// Id of the component after the run; unknown for dry-run creates and after deletes
    pub object_id: Option<u64>,
    pub action: Action,
    /// Fields submitted (or, in check mode, that would be submitted) by an update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<ComponentPatch>,
    /// Service checks of the host template, when it was resolved
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub service_checks: BTreeSet<String>,
    pub check_mode: bool,
}

impl Outcome {
    fn unchanged(object_id: Option<u64>, dry_run: bool) -> Self {
        Self {
            changed: false,
            object_id,
            action: Action::None,
            diff: None,
            service_checks: BTreeSet::new(),
            check_mode: dry_run,
        }
    }
}

/// First decision of a run, before any attribute comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Nothing to do; carries the id of the component if it exists
    NoOp(Option<u64>),
    Create,
    Delete(BsmComponent),
    DiffThenMaybeUpdate(BsmComponent),
}

/// Decide what to do from whether the component exists and what the caller wants
pub fn decide(existing: Option<BsmComponent>, intent: StateIntent) -> Decision {
    match (existing, intent) {
        (None, StateIntent::Absent) => Decision::NoOp(None),
        (None, StateIntent::Present | StateIntent::Updated) => Decision::Create,
        (Some(component), StateIntent::Absent) => Decision::Delete(component),
        (Some(component), StateIntent::Present) => Decision::NoOp(Some(component.id)),
        (Some(component), StateIntent::Updated) => Decision::DiffThenMaybeUpdate(component),
    }
}

/// Reconciles BSM components against Opsview.
pub struct Reconciler {
    pub(crate) opsview_client: Box<dyn OpsviewClientTrait + Send + Sync>,
}

impl Reconciler {
    pub fn new(opsview_client: Box<dyn OpsviewClientTrait + Send + Sync>) -> Self {
        Self { opsview_client }
    }

    /// Converge the component described by `desired` toward `intent`.
    ///
    /// Issues at most one create, update or delete call, and none with `dry_run`.
    pub async fn reconcile(
        &self,
        desired: &DesiredSpec,
        intent: StateIntent,
        dry_run: bool,
    ) -> Result<Outcome, ReconcileError> {
        info!(
            "Reconciling BSM component {} (state: {:?}, check mode: {})",
            desired.name, intent, dry_run
        );

        desired.validate()?;

        let existing = self.locate(desired).await?;
        let decision = decide(existing, intent);
        debug!("BSM component {}: decision {:?}", desired.name, decision);

        match decision {
            Decision::NoOp(object_id) => {
                match object_id {
                    Some(id) => debug!("BSM component {} exists (ID: {}), nothing to do", desired.name, id),
                    None => debug!("BSM component {} does not exist, nothing to do", desired.name),
                }
                Ok(Outcome::unchanged(object_id, dry_run))
            }
            Decision::Create => self.create(desired, dry_run).await,
            Decision::Delete(existing) => self.delete(&existing, dry_run).await,
            Decision::DiffThenMaybeUpdate(existing) => self.update(desired, &existing, dry_run).await,
        }
    }

    /// Like [`Reconciler::reconcile`], abandoning the run once `deadline` has passed
    pub async fn reconcile_within(
        &self,
        desired: &DesiredSpec,
        intent: StateIntent,
        dry_run: bool,
        deadline: Option<Duration>,
    ) -> Result<Outcome, ControllerError> {
        let run = self.reconcile(desired, intent, dry_run);
        let outcome = match deadline {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                error!("Reconciliation of BSM component {} exceeded {:?}", desired.name, limit);
                ControllerError::Timeout(limit)
            })??,
            None => run.await?,
        };
        Ok(outcome)
    }

    /// Find the component by explicit id, or else by exact name
    async fn locate(&self, desired: &DesiredSpec) -> Result<Option<BsmComponent>, ReconcileError> {
        if let Some(id) = desired.object_id {
            debug!("Looking up BSM component by ID {}", id);
            return match self.opsview_client.get_bsm_component(id).await {
                Ok(component) => Ok(Some(component)),
                Err(OpsviewError::NotFound(_)) => {
                    error!("BSM component with ID {} does not exist", id);
                    Err(ReconcileError::NotFound(id))
                }
                Err(e) => {
                    error!("Failed to look up BSM component {}: {}", id, e);
                    Err(ReconcileError::remote(Step::Lookup)(e))
                }
            };
        }

        debug!("Looking up BSM component by name {}", desired.name);
        let mut matches: Vec<BsmComponent> = self
            .opsview_client
            .query_bsm_components(&[("s.name", desired.name.as_str())], true)
            .await
            .map_err(|e| {
                error!("Failed to query BSM components named {}: {}", desired.name, e);
                ReconcileError::remote(Step::Lookup)(e)
            })?
            .into_iter()
            .filter(|c| c.name == desired.name)
            .collect();

        match matches.len() {
            0 | 1 => Ok(matches.pop()),
            count => {
                warn!("{} BSM components are named {}", count, desired.name);
                Err(ReconcileError::AmbiguousLookup {
                    name: desired.name.clone(),
                    count,
                })
            }
        }
    }

    /// Enumerate the service checks the host template brings into the component
    async fn resolve_service_checks(&self, host_template: &str) -> Result<BTreeSet<String>, ReconcileError> {
        let checks = match self.opsview_client.get_host_template_service_checks(host_template).await {
            Ok(checks) => checks,
            Err(OpsviewError::NotFound(_)) => {
                return Err(ReconcileError::Validation(format!(
                    "host template {:?} does not exist",
                    host_template
                )));
            }
            Err(e) => return Err(ReconcileError::remote(Step::Resolve)(e)),
        };

        if checks.is_empty() {
            return Err(ReconcileError::Validation(format!(
                "host template {:?} has no service checks",
                host_template
            )));
        }

        debug!("Host template {} provides service checks: {:?}", host_template, checks);
        Ok(checks)
    }

    async fn create(&self, desired: &DesiredSpec, dry_run: bool) -> Result<Outcome, ReconcileError> {
        let service_checks = self.resolve_service_checks(&desired.host_template).await?;

        let object_id = if dry_run {
            info!("Would create BSM component {} (check mode)", desired.name);
            None
        } else {
            let created = self
                .opsview_client
                .create_bsm_component(&desired.to_request())
                .await
                .map_err(|e| {
                    error!("Failed to create BSM component {} in Opsview: {}", desired.name, e);
                    ReconcileError::remote(Step::Create)(e)
                })?;
            info!("Created BSM component {} in Opsview (ID: {})", created.name, created.id);
            Some(created.id)
        };

        Ok(Outcome {
            changed: true,
            object_id,
            action: Action::Create,
            diff: None,
            service_checks,
            check_mode: dry_run,
        })
    }

    async fn update(
        &self,
        desired: &DesiredSpec,
        existing: &BsmComponent,
        dry_run: bool,
    ) -> Result<Outcome, ReconcileError> {
        let patch = desired.diff(existing);
        if patch.is_empty() {
            debug!("BSM component {} (ID: {}) already up-to-date", existing.name, existing.id);
            return Ok(Outcome::unchanged(Some(existing.id), dry_run));
        }

        info!(
            "BSM component {} (ID: {}) differs in {:?}",
            existing.name,
            existing.id,
            patch.changed_fields()
        );

        let service_checks = match &patch.host_template {
            Some(template) => self.resolve_service_checks(template).await?,
            None => BTreeSet::new(),
        };

        let object_id = if dry_run {
            info!("Would update BSM component {} (check mode)", existing.name);
            existing.id
        } else {
            let updated = self
                .opsview_client
                .update_bsm_component(existing.id, &patch.to_request())
                .await
                .map_err(|e| {
                    error!("Failed to update BSM component {} in Opsview: {}", existing.id, e);
                    ReconcileError::remote(Step::Update)(e)
                })?;
            info!("Updated BSM component {} in Opsview (ID: {})", updated.name, updated.id);
            updated.id
        };

        Ok(Outcome {
            changed: true,
            object_id: Some(object_id),
            action: Action::Update,
            diff: Some(patch),
            service_checks,
            check_mode: dry_run,
        })
    }

    async fn delete(&self, existing: &BsmComponent, dry_run: bool) -> Result<Outcome, ReconcileError> {
        if dry_run {
            info!("Would delete BSM component {} (ID: {}) (check mode)", existing.name, existing.id);
        } else {
            self.opsview_client
                .delete_bsm_component(existing.id)
                .await
                .map_err(|e| {
                    error!("Failed to delete BSM component {} from Opsview: {}", existing.id, e);
                    ReconcileError::remote(Step::Delete)(e)
                })?;
            info!("Deleted BSM component {} from Opsview (ID: {})", existing.name, existing.id);
        }

        Ok(Outcome {
            changed: true,
            object_id: None,
            action: Action::Delete,
            diff: None,
            service_checks: BTreeSet::new(),
            check_mode: dry_run,
        })
    }
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod reconciler_test;
