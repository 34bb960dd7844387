//! psm-verify - Verify tenant/user migration between document collections
//!
//! Checks, for one `(environment, cluster_index)` scope, that every
//! provisioned tenant in the source "entity" collection exists in the
//! destination "provision-state-machine" collection and that its user
//! population migrated intact. Exits 0 when everything matches, 2 when
//! discrepancies were found, and 3 on store failures.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use psm_verify::config::{parse_bool_arg, VerifyConfig};
use psm_verify::store::MongoStore;
use psm_verify::{verify, CliError, CliResult, VerificationReport, EXIT_DISCREPANCIES};

/// Verify tenant and user migration from the entity store to the provision
/// state machine, per environment and cluster.
#[derive(Parser)]
#[command(name = "psm-verify")]
#[command(author, version, about)]
struct Cli {
    /// MongoDB connection URI
    #[arg(long)]
    mongo_uri: String,

    /// Database name
    #[arg(long)]
    db_name: String,

    /// Environment scope (e.g. dev, qa2, prod)
    #[arg(long)]
    environment: String,

    /// Cluster index scope (e.g. 013)
    #[arg(long)]
    cluster_index: String,

    /// Source collection name
    #[arg(long, default_value = "entity")]
    entity_collection: String,

    /// Destination collection name
    #[arg(long, default_value = "provision-state-machine")]
    psm_collection: String,

    /// If true, source users must also carry the requested cluster index
    #[arg(long, default_value = "false", value_parser = parse_bool_arg)]
    require_user_cluster_match: bool,

    /// Path for the per-tenant summary CSV
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Path for the missing-users CSV
    #[arg(long)]
    missing_out: Option<PathBuf>,
}

impl Cli {
    fn verify_config(&self) -> VerifyConfig {
        VerifyConfig {
            environment: self.environment.clone(),
            cluster_index: self.cluster_index.clone(),
            entity_collection: self.entity_collection.clone(),
            psm_collection: self.psm_collection.clone(),
            require_user_cluster_match: self.require_user_cluster_match,
            summary_out: self.csv_out.clone(),
            missing_out: self.missing_out.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(report) => {
            if report.discrepant_tenants == 0 {
                std::process::exit(0);
            }
            std::process::exit(EXIT_DISCREPANCIES);
        }
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<VerificationReport> {
    if cli.entity_collection == cli.psm_collection {
        return Err(CliError::Config(format!(
            "source and destination collections must differ, both are '{}'",
            cli.entity_collection
        )));
    }

    let config = cli.verify_config();
    let store = MongoStore::connect(&cli.mongo_uri, &cli.db_name).await?;
    verify::execute(&config, &store).await
}
