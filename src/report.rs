//! Aggregation and report output
//!
//! Folds per-tenant results into a summary table and a missing-users
//! table, and writes both as CSV. Aggregation never re-derives or filters;
//! it only reshapes what the reconciler produced.

use std::path::Path;

use serde::Serialize;

use crate::error::CliResult;
use crate::output::yes_no;
use crate::reconcile::TenantResult;

/// Column set of the summary CSV, also written when there are no rows.
const SUMMARY_HEADER: [&str; 7] = [
    "environment",
    "cluster_index",
    "tenant_id",
    "tenant_in_psm",
    "entity_users",
    "psm_users",
    "users_match",
];

/// Column set of the missing-users CSV.
const MISSING_HEADER: [&str; 5] = [
    "environment",
    "cluster_index",
    "tenant_id",
    "missing_user_key_type",
    "missing_user_key_value",
];

/// One summary row per verified tenant.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub environment: String,
    pub cluster_index: String,
    pub tenant_id: String,
    pub tenant_in_psm: String,
    pub entity_users: usize,
    pub psm_users: usize,
    pub users_match: String,
}

/// One row per (tenant, missing identity key).
#[derive(Debug, Clone, Serialize)]
pub struct MissingRow {
    pub environment: String,
    pub cluster_index: String,
    pub tenant_id: String,
    pub missing_user_key_type: String,
    pub missing_user_key_value: String,
}

/// Aggregated outcome of a verification run.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// Summary rows in tenant-selection order.
    pub summary: Vec<SummaryRow>,
    /// Missing-user rows, grouped by tenant in selection order and sorted
    /// by key within a tenant.
    pub missing: Vec<MissingRow>,
    /// Number of tenants with at least one discrepancy.
    pub discrepant_tenants: usize,
}

/// Fold per-tenant results into a report.
#[must_use]
pub fn aggregate(results: &[TenantResult]) -> VerificationReport {
    let mut summary = Vec::with_capacity(results.len());
    let mut missing = Vec::new();
    let mut discrepant_tenants = 0;

    for result in results {
        summary.push(SummaryRow {
            environment: result.environment.clone(),
            cluster_index: result.cluster_index.clone(),
            tenant_id: result.tenant_id.clone(),
            tenant_in_psm: yes_no(result.found_in_destination).to_string(),
            entity_users: result.source_users,
            psm_users: result.destination_users,
            users_match: yes_no(result.users_match).to_string(),
        });

        for key in &result.missing_in_destination {
            missing.push(MissingRow {
                environment: result.environment.clone(),
                cluster_index: result.cluster_index.clone(),
                tenant_id: result.tenant_id.clone(),
                missing_user_key_type: key.kind().to_string(),
                missing_user_key_value: key.value().to_string(),
            });
        }

        if result.has_discrepancy() {
            discrepant_tenants += 1;
        }
    }

    VerificationReport {
        summary,
        missing,
        discrepant_tenants,
    }
}

impl VerificationReport {
    /// Write the per-tenant summary CSV.
    pub fn write_summary_csv(&self, path: &Path) -> CliResult<()> {
        write_rows(path, &SUMMARY_HEADER, &self.summary)
    }

    /// Write the missing-users CSV. The file is created with a header row
    /// even when no users are missing, for pipeline consistency.
    pub fn write_missing_csv(&self, path: &Path) -> CliResult<()> {
        write_rows(path, &MISSING_HEADER, &self.missing)
    }
}

fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> CliResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        // serialize() emits the header implicitly, so an empty table needs
        // an explicit one.
        writer.write_record(header)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityKey;

    fn result(
        tenant_id: &str,
        found: bool,
        source: usize,
        dest: usize,
        missing: Vec<IdentityKey>,
    ) -> TenantResult {
        TenantResult {
            environment: "qa2".to_string(),
            cluster_index: "013".to_string(),
            tenant_id: tenant_id.to_string(),
            found_in_destination: found,
            source_users: source,
            destination_users: dest,
            users_match: source == dest,
            missing_in_destination: missing,
        }
    }

    #[test]
    fn test_aggregate_clean_run() {
        let report = aggregate(&[result("t1", true, 2, 2, vec![])]);
        assert_eq!(report.discrepant_tenants, 0);
        assert_eq!(report.summary.len(), 1);
        assert!(report.missing.is_empty());
        assert_eq!(report.summary[0].tenant_in_psm, "YES");
        assert_eq!(report.summary[0].users_match, "YES");
    }

    #[test]
    fn test_aggregate_counts_each_discrepant_tenant_once() {
        // t2 trips two conditions (count mismatch and missing keys) but
        // counts once.
        let report = aggregate(&[
            result("t1", false, 0, 0, vec![]),
            result(
                "t2",
                true,
                2,
                1,
                vec![IdentityKey::Id("u2".to_string())],
            ),
            result("t3", true, 1, 1, vec![]),
        ]);
        assert_eq!(report.discrepant_tenants, 2);
        assert_eq!(report.summary.len(), 3);
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.summary[0].tenant_in_psm, "NO");
        assert_eq!(report.summary[1].users_match, "NO");
        assert_eq!(report.missing[0].tenant_id, "t2");
        assert_eq!(report.missing[0].missing_user_key_type, "id");
        assert_eq!(report.missing[0].missing_user_key_value, "u2");
    }

    #[test]
    fn test_missing_rows_preserve_tenant_order() {
        let report = aggregate(&[
            result(
                "t1",
                true,
                1,
                0,
                vec![IdentityKey::Email("a@x".to_string())],
            ),
            result("t2", true, 1, 0, vec![IdentityKey::Id("b".to_string())]),
        ]);
        let tenants: Vec<&str> = report.missing.iter().map(|r| r.tenant_id.as_str()).collect();
        assert_eq!(tenants, vec!["t1", "t2"]);
        assert_eq!(report.missing[0].missing_user_key_type, "email");
    }

    #[test]
    fn test_empty_csv_files_still_carry_headers() {
        let dir = tempfile::tempdir().unwrap();
        let summary_path = dir.path().join("summary.csv");
        let missing_path = dir.path().join("missing.csv");

        let report = aggregate(&[]);
        report.write_summary_csv(&summary_path).unwrap();
        report.write_missing_csv(&missing_path).unwrap();

        let summary = std::fs::read_to_string(&summary_path).unwrap();
        assert_eq!(
            summary.trim_end(),
            "environment,cluster_index,tenant_id,tenant_in_psm,entity_users,psm_users,users_match"
        );
        let missing = std::fs::read_to_string(&missing_path).unwrap();
        assert_eq!(
            missing.trim_end(),
            "environment,cluster_index,tenant_id,missing_user_key_type,missing_user_key_value"
        );
    }

    #[test]
    fn test_csv_rows_round_out_with_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let report = aggregate(&[result("t1", true, 2, 1, vec![])]);
        report.write_summary_csv(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "environment,cluster_index,tenant_id,tenant_in_psm,entity_users,psm_users,users_match"
        );
        assert_eq!(lines.next().unwrap(), "qa2,013,t1,YES,2,1,NO");
        assert!(lines.next().is_none());
    }
}
