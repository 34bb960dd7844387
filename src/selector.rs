//! Tenant selection
//!
//! Determines which tenants are verification candidates: tenants in the
//! source collection that are `provisioned` within the requested
//! `(environment, cluster_index)` scope. Anything in another status, or out
//! of scope, is not a candidate even if it exists.

use std::collections::HashSet;

use mongodb::bson::doc;

use crate::config::VerifyConfig;
use crate::store::{DocumentStore, StoreResult};

/// Source lifecycle status that makes a tenant a verification candidate.
const PROVISIONED: &str = "provisioned";

/// Select the tenant identifiers to verify, in first-seen order without
/// duplicates.
///
/// An empty result is a valid outcome (nothing was provisioned in scope),
/// not an error.
pub async fn select_tenants(
    store: &dyn DocumentStore,
    config: &VerifyConfig,
) -> StoreResult<Vec<String>> {
    let filter = doc! {
        "record.entity": "tenant",
        "record.environment": &config.environment,
        "record.cluster_index": &config.cluster_index,
        "record.status": PROVISIONED,
    };
    let projection = doc! { "record.tenant": 1 };

    let docs = store
        .find(&config.entity_collection, filter, projection)
        .await?;

    let mut seen = HashSet::new();
    let mut tenant_ids = Vec::new();
    for document in docs {
        let Ok(record) = document.get_document("record") else {
            continue;
        };
        if let Ok(tenant_id) = record.get_str("tenant") {
            if !tenant_id.is_empty() && seen.insert(tenant_id.to_string()) {
                tenant_ids.push(tenant_id.to_string());
            }
        }
    }

    tracing::info!(
        environment = %config.environment,
        cluster_index = %config.cluster_index,
        tenants = tenant_ids.len(),
        "Selected provisioned tenants"
    );

    Ok(tenant_ids)
}
