//! Controller-specific error types.
//!
//! `ReconcileError` is what a reconciliation run can fail with; `ControllerError`
//! adds the failures of the surrounding process (parameters, client setup, timeout).

use opsview_client::OpsviewError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Step of a reconciliation run, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Validation,
    Lookup,
    /// Host template service check enumeration
    Resolve,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Validation => "validation",
            Step::Lookup => "lookup",
            Step::Resolve => "resolve",
            Step::Create => "create",
            Step::Update => "update",
            Step::Delete => "delete",
        })
    }
}

/// Errors that abort a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Desired state is malformed or references a host template that cannot be used
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An explicit object id was given but Opsview has no such component
    #[error("BSM component {0} not found")]
    NotFound(u64),

    /// Name lookup matched more than one component
    #[error("Ambiguous lookup: {count} BSM components are named {name:?}")]
    AmbiguousLookup { name: String, count: usize },

    /// The Opsview client failed
    #[error("{step} failed: {source}")]
    Remote {
        step: Step,
        #[source]
        source: OpsviewError,
    },
}

impl ReconcileError {
    /// Step the run was in when it failed
    pub fn step(&self) -> Step {
        match self {
            ReconcileError::Validation(_) => Step::Validation,
            ReconcileError::NotFound(_) | ReconcileError::AmbiguousLookup { .. } => Step::Lookup,
            ReconcileError::Remote { step, .. } => *step,
        }
    }

    pub(crate) fn remote(step: Step) -> impl FnOnce(OpsviewError) -> Self {
        move |source| ReconcileError::Remote { step, source }
    }
}

/// Errors that can occur in the BSM component controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Invalid parameters or manifest
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Opsview client could not be constructed or authenticated
    #[error("Setup failed: {0}")]
    Setup(#[from] OpsviewError),

    /// Reconciliation failed
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// The whole run exceeded the caller's deadline
    #[error("Reconciliation timed out after {0:?}")]
    Timeout(Duration),
}

impl ControllerError {
    /// Short label of the phase that failed, for reporting
    pub fn step(&self) -> String {
        match self {
            ControllerError::InvalidConfig(_) => "config".to_string(),
            ControllerError::Setup(_) => "setup".to_string(),
            ControllerError::Reconcile(e) => e.step().to_string(),
            ControllerError::Timeout(_) => "timeout".to_string(),
        }
    }

    /// JSON printed on stdout when a run fails
    pub fn failure_report(&self) -> serde_json::Value {
        serde_json::json!({
            "failed": true,
            "msg": self.to_string(),
            "step": self.step(),
            "exception": format!("{:?}", self),
        })
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
