//! Query utilities for the Opsview API
//!
//! Provides helpers for building list queries and handling pagination.

use crate::common::HttpClient;
use crate::error::OpsviewError;
use crate::models::ListResponse;
use serde::Deserialize;

/// Query configuration objects with optional filtering and pagination
///
/// `object_type` is the Opsview config type, e.g. `bsmcomponent`.
pub async fn query_resources<T: for<'de> Deserialize<'de>>(
    http: &HttpClient,
    object_type: &str,
    filters: &[(&str, &str)],
    fetch_all: bool,
) -> Result<Vec<T>, OpsviewError> {
    let mut path = format!("/rest/config/{}", object_type);

    if !filters.is_empty() {
        let query_string = http.build_query_string(filters);
        path = format!("{}?{}", path, query_string);
    }

    if fetch_all {
        http.fetch_all_pages(&path).await
    } else {
        let response: ListResponse<T> = http.get(&path).await?;
        Ok(response.list)
    }
}
