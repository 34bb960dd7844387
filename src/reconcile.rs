//! Per-tenant reconciliation
//!
//! For one tenant: check that it exists in the destination collection,
//! derive the identity-key sets of its users on both sides, and compute
//! which source users are missing from the destination.

use std::collections::BTreeSet;

use mongodb::bson::{doc, Document};

use crate::config::VerifyConfig;
use crate::identity::{derive_key, IdentityKey};
use crate::store::{DocumentStore, StoreResult};

/// Identifier fields tried, in order, on source user records.
const SOURCE_ID_FIELDS: &[&str] = &["user", "username"];
/// Email fallback field on source user records.
const SOURCE_EMAIL_FIELD: &str = "useremail";
/// Identifier field tried on destination user records.
const DEST_ID_FIELDS: &[&str] = &["user_id"];
/// Email fallback field on destination user records.
const DEST_EMAIL_FIELD: &str = "user_email";

/// Outcome of reconciling one tenant. Immutable once computed.
#[derive(Debug, Clone)]
pub struct TenantResult {
    /// Environment scope of the run.
    pub environment: String,
    /// Cluster scope of the run.
    pub cluster_index: String,
    /// Source tenant identifier.
    pub tenant_id: String,
    /// Whether the tenant exists in the destination collection.
    pub found_in_destination: bool,
    /// Distinct identity keys among the tenant's source users.
    pub source_users: usize,
    /// Distinct identity keys among the tenant's destination users.
    pub destination_users: usize,
    /// Whether the two key-set cardinalities agree. This is a count
    /// comparison, not set equality; membership drift between equal-sized
    /// sets shows up in `missing_in_destination` instead.
    pub users_match: bool,
    /// Source keys absent from the destination, sorted.
    pub missing_in_destination: Vec<IdentityKey>,
}

impl TenantResult {
    /// Whether this tenant counts against the run verdict.
    ///
    /// Destination absence dominates: a tenant missing from the
    /// destination is discrepant even when both user sets are empty.
    #[must_use]
    pub fn has_discrepancy(&self) -> bool {
        !self.found_in_destination || !self.users_match || !self.missing_in_destination.is_empty()
    }
}

/// Reconciles tenants one at a time against both stores.
pub struct TenantReconciler<'a> {
    store: &'a dyn DocumentStore,
    config: &'a VerifyConfig,
}

impl<'a> TenantReconciler<'a> {
    /// Create a reconciler bound to one store and one run configuration.
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore, config: &'a VerifyConfig) -> Self {
        Self { store, config }
    }

    /// Reconcile a single tenant.
    pub async fn reconcile(&self, tenant_id: &str) -> StoreResult<TenantResult> {
        let found_in_destination = self.destination_tenant_exists(tenant_id).await?;
        let source_keys = self.source_user_keys(tenant_id).await?;
        let destination_keys = self.destination_user_keys(tenant_id).await?;

        let users_match = source_keys.len() == destination_keys.len();
        // BTreeSet difference iterates in key order, so the missing list is
        // deterministic across runs.
        let missing_in_destination: Vec<IdentityKey> = source_keys
            .difference(&destination_keys)
            .cloned()
            .collect();

        tracing::debug!(
            tenant_id = %tenant_id,
            found = found_in_destination,
            source_users = source_keys.len(),
            destination_users = destination_keys.len(),
            missing = missing_in_destination.len(),
            "Reconciled tenant"
        );

        Ok(TenantResult {
            environment: self.config.environment.clone(),
            cluster_index: self.config.cluster_index.clone(),
            tenant_id: tenant_id.to_string(),
            found_in_destination,
            source_users: source_keys.len(),
            destination_users: destination_keys.len(),
            users_match,
            missing_in_destination,
        })
    }

    /// Check destination presence. A tenant matched only through the
    /// alternate `ftra_tenant_id` identifier still counts as found.
    async fn destination_tenant_exists(&self, tenant_id: &str) -> StoreResult<bool> {
        let filter = doc! {
            "entity_type": "tenant",
            "environment": &self.config.environment,
            "cluster_index": &self.config.cluster_index,
            "$or": [
                { "tenant_id": tenant_id },
                { "ftra_tenant_id": tenant_id },
            ],
        };
        let projection = doc! { "_id": 1 };

        let tenant = self
            .store
            .find_one(&self.config.psm_collection, filter, projection)
            .await?;
        Ok(tenant.is_some())
    }

    /// Fetch the identity keys of the tenant's source users.
    async fn source_user_keys(&self, tenant_id: &str) -> StoreResult<BTreeSet<IdentityKey>> {
        let mut filter = doc! {
            "record.entity": "user",
            "record.environment": &self.config.environment,
            "record.tenant": tenant_id,
        };
        // Source user records are not always cluster-partitioned; the
        // extra filter is opt-in.
        if self.config.require_user_cluster_match {
            filter.insert("record.cluster_index", &self.config.cluster_index);
        }
        let projection = doc! {
            "record.user": 1,
            "record.username": 1,
            "record.useremail": 1,
        };

        let docs = self
            .store
            .find(&self.config.entity_collection, filter, projection)
            .await?;

        Ok(docs
            .iter()
            .filter_map(|d| d.get_document("record").ok())
            .map(source_user_key)
            .collect())
    }

    /// Fetch the identity keys of the tenant's destination users. No
    /// cluster filter applies here; destination user documents are assumed
    /// already scoped upstream.
    async fn destination_user_keys(&self, tenant_id: &str) -> StoreResult<BTreeSet<IdentityKey>> {
        let filter = doc! {
            "entity_type": "user",
            "environment": &self.config.environment,
            "tenant_id": tenant_id,
        };
        let projection = doc! { "user_id": 1, "user_email": 1 };

        let docs = self
            .store
            .find(&self.config.psm_collection, filter, projection)
            .await?;

        Ok(docs.iter().map(destination_user_key).collect())
    }
}

/// Extract a source user record's identity key.
#[must_use]
pub fn source_user_key(record: &Document) -> IdentityKey {
    derive_key(record, SOURCE_ID_FIELDS, SOURCE_EMAIL_FIELD)
}

/// Extract a destination user record's identity key.
#[must_use]
pub fn destination_user_key(record: &Document) -> IdentityKey {
    derive_key(record, DEST_ID_FIELDS, DEST_EMAIL_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(found: bool, source: usize, dest: usize, missing: Vec<IdentityKey>) -> TenantResult {
        TenantResult {
            environment: "qa2".to_string(),
            cluster_index: "013".to_string(),
            tenant_id: "t1".to_string(),
            found_in_destination: found,
            source_users: source,
            destination_users: dest,
            users_match: source == dest,
            missing_in_destination: missing,
        }
    }

    #[test]
    fn test_no_discrepancy_when_everything_matches() {
        assert!(!result(true, 2, 2, vec![]).has_discrepancy());
    }

    #[test]
    fn test_zero_users_on_both_sides_is_clean() {
        let r = result(true, 0, 0, vec![]);
        assert!(r.users_match);
        assert!(!r.has_discrepancy());
    }

    #[test]
    fn test_absence_dominates_even_with_matching_counts() {
        // Tenant missing from destination, both user sets empty.
        assert!(result(false, 0, 0, vec![]).has_discrepancy());
    }

    #[test]
    fn test_count_mismatch_is_a_discrepancy() {
        assert!(result(true, 2, 1, vec![IdentityKey::Id("u2".to_string())]).has_discrepancy());
    }

    #[test]
    fn test_equal_counts_with_missing_keys_is_a_discrepancy() {
        // Equal-sized but disjoint sets: users_match stays true by
        // definition, the missing list still flags the tenant.
        let r = result(true, 1, 1, vec![IdentityKey::Id("u1".to_string())]);
        assert!(r.users_match);
        assert!(r.has_discrepancy());
    }

    #[test]
    fn test_asymmetric_key_extraction() {
        use mongodb::bson::doc;

        let source = doc! { "username": "u9", "useremail": "u9@example.com" };
        assert_eq!(source_user_key(&source), IdentityKey::Id("u9".to_string()));

        // Destination schema does not know `username`; falls back to email.
        let dest = doc! { "username": "u9", "user_email": "u9@example.com" };
        assert_eq!(
            destination_user_key(&dest),
            IdentityKey::Email("u9@example.com".to_string())
        );
    }
}
