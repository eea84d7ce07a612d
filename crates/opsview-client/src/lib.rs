//! Opsview REST API Client
//!
//! A Rust client library for the Opsview configuration REST API.
//! Provides type-safe models and methods for BSM components and host templates.
//!
//! # Example
//!
//! ```no_run
//! use opsview_client::{Credential, OpsviewClient, OpsviewClientTrait, TlsVerification};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Log in and create a client
//! let client = OpsviewClient::connect(
//!     "https://opsview.example.com",
//!     "admin".to_string(),
//!     Credential::Password("initial".to_string()),
//!     &TlsVerification::Enabled,
//! ).await?;
//!
//! // Look up a BSM component by name
//! let components = client.query_bsm_components(&[("s.name", "prod-nginx")], true).await?;
//!
//! // Enumerate the service checks of a host template
//! let checks = client.get_host_template_service_checks("Application - NGINX").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **BSM Components**: Get, query, create, partially update and delete
//! - **Host Templates**: Enumerate attached service checks
//! - **Authentication**: Password login or pre-issued token
//! - **Pagination**: Support for fetching all pages of large result sets

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod opsview_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::{Credential, OpsviewClient, TlsVerification};
pub use common::HttpClient;
pub use error::OpsviewError;
pub use models::*;
pub use opsview_trait::OpsviewClientTrait;
#[cfg(feature = "test-util")]
pub use mock::{MockCall, MockOpsviewClient};
