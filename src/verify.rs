//! Verification run orchestration
//!
//! Wires the selector, reconciler, and reporter together. Progress is
//! streamed per tenant so partial output survives an interrupted run; the
//! verdict line is always printed last.

use crate::config::VerifyConfig;
use crate::error::CliResult;
use crate::output::{print_failure, print_info, print_success};
use crate::reconcile::{TenantReconciler, TenantResult};
use crate::report::{aggregate, VerificationReport};
use crate::selector::select_tenants;
use crate::store::DocumentStore;

/// Run a full verification pass and return the aggregated report.
///
/// A report with `discrepant_tenants > 0` is a normal outcome, not an
/// error; only store failures and report-write failures return `Err`.
pub async fn execute(
    config: &VerifyConfig,
    store: &dyn DocumentStore,
) -> CliResult<VerificationReport> {
    let tenant_ids = select_tenants(store, config).await?;

    if tenant_ids.is_empty() {
        print_info(&format!(
            "No provisioned tenants in '{}' for env={} cluster={}. Nothing to verify.",
            config.entity_collection, config.environment, config.cluster_index
        ));
        let report = aggregate(&[]);
        write_reports(config, &report)?;
        return Ok(report);
    }

    print_info(&format!(
        "Provisioned tenants detected in '{}': {}",
        config.entity_collection,
        tenant_ids.len()
    ));

    let reconciler = TenantReconciler::new(store, config);
    let mut results = Vec::with_capacity(tenant_ids.len());
    for tenant_id in &tenant_ids {
        let result = reconciler.reconcile(tenant_id).await?;
        print_tenant_block(&result);
        results.push(result);
    }

    let report = aggregate(&results);
    write_reports(config, &report)?;

    println!();
    if report.discrepant_tenants == 0 {
        print_success("Verification OK. All tenants and migrated users match.");
    } else {
        print_failure(&format!(
            "Verification completed with discrepancies in {} tenant(s). See details above.",
            report.discrepant_tenants
        ));
    }

    Ok(report)
}

/// Print one human-readable progress block for a reconciled tenant.
fn print_tenant_block(result: &TenantResult) {
    println!(
        "\n=== Tenant: {} (env={}, cluster={}) ===",
        result.tenant_id, result.environment, result.cluster_index
    );
    println!(
        "Tenant in PSM: {}",
        if result.found_in_destination {
            "OK"
        } else {
            "MISSING"
        }
    );
    println!(
        "Users -> entity: {}  |  psm: {}  |  {}",
        result.source_users,
        result.destination_users,
        if result.users_match { "OK" } else { "MISMATCH" }
    );
    if !result.missing_in_destination.is_empty() {
        println!(" - Users missing in PSM:");
        for key in &result.missing_in_destination {
            println!("   * {key}");
        }
    }
}

fn write_reports(config: &VerifyConfig, report: &VerificationReport) -> CliResult<()> {
    if let Some(path) = &config.summary_out {
        report.write_summary_csv(path)?;
        print_info(&format!("Summary written to: {}", path.display()));
    }
    if let Some(path) = &config.missing_out {
        report.write_missing_csv(path)?;
        if report.missing.is_empty() {
            print_info(&format!(
                "No missing users. Header-only file created: {}",
                path.display()
            ));
        } else {
            print_info(&format!("Missing users written to: {}", path.display()));
        }
    }
    Ok(())
}
