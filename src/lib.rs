//! psm-verify - Migration verification for tenant and user records
//!
//! Compares the source "entity" collection against the destination
//! "provision-state-machine" collection for one `(environment,
//! cluster_index)` scope and reports, per provisioned tenant, whether the
//! tenant exists in the destination and whether its user population
//! survived the migration.
//!
//! The pipeline is strictly sequential: select tenants once, reconcile each
//! tenant independently, fold the results into a summary report and a
//! missing-users report, and derive the process verdict from the number of
//! discrepant tenants.

pub mod config;
pub mod error;
pub mod identity;
pub mod output;
pub mod reconcile;
pub mod report;
pub mod selector;
pub mod store;
pub mod verify;

pub use config::VerifyConfig;
pub use error::{CliError, CliResult, EXIT_DISCREPANCIES};
pub use identity::IdentityKey;
pub use reconcile::{TenantReconciler, TenantResult};
pub use report::VerificationReport;
pub use store::{DocumentStore, StoreError};
