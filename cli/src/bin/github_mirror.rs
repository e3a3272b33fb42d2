//! Mirrors collected Bitbucket repositories into a GitHub organization.

use clap::Parser;
use repo_mirror::{
    load_optional_settings, load_settings, DestinationTransport, MigrationOutcome, MirrorSettings,
    RunSummary, Runner, RunnerConfig, RunnerError, DEFAULT_RECORDS_FILE, DEFAULT_SETTINGS_FILE,
};
use repo_mirror_cli::{init_tracing, install_crypto_provider};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

/// GitHub Mirror - Recreate collected repositories in a GitHub organization.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Records file written by bitbucket-collect.
    #[arg(long, default_value = DEFAULT_RECORDS_FILE)]
    input: PathBuf,

    /// Settings file (defaults to ./mirror.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Destination GitHub organization.
    #[arg(long, env = "GITHUB_ORG")]
    org: Option<String>,

    /// Slug of the team granted access to created repositories.
    #[arg(long, env = "GITHUB_TEAM")]
    team: Option<String>,

    /// GitHub Personal Access Token (not needed for --dry-run).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory in which mirror clones are created.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Name of the remote kept pointing at the source.
    #[arg(long)]
    source_remote: Option<String>,

    /// Push transport: ssh or https.
    #[arg(long)]
    transport: Option<DestinationTransport>,

    /// Maximum repositories migrated at once.
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Stop at the first failed repository.
    #[arg(long)]
    fail_fast: bool,

    /// Preview without cloning or creating repositories.
    #[arg(long)]
    dry_run: bool,

    /// GitHub API base URL.
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    install_crypto_provider();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.all_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let file_settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => load_optional_settings(Path::new(DEFAULT_SETTINGS_FILE))?,
    };
    let settings = file_settings.merge(MirrorSettings {
        organization: args.org,
        team: args.team,
        source_remote: args.source_remote,
        destination_transport: args.transport,
        work_dir: args.work_dir,
    });

    let mut config = RunnerConfig::from_settings(args.input, settings)?
        .with_concurrency(args.concurrency)
        .with_fail_fast(args.fail_fast)
        .with_dry_run(args.dry_run);
    if let Some(token) = args.token {
        config = config.with_token(token);
    }
    if let Some(api_url) = args.api_url {
        config = config.with_api_url(api_url);
    }

    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Records read: {}", summary.records_read);

    if summary.dry_run {
        println!("  Repositories planned: {}", summary.planned);
    } else {
        println!("  Repositories migrated: {}", summary.migrated);
    }
    println!("  Repositories failed: {}", summary.failed);

    if summary.aborted {
        println!("  Not attempted (fail-fast): {}", summary.not_attempted());
    }

    for outcome in &summary.outcomes {
        if let MigrationOutcome::Migrated {
            destination,
            url: Some(url),
            ..
        } = outcome
        {
            println!("    {destination}: {url}");
        }
    }

    for failure in summary.failures() {
        if let MigrationOutcome::Failed { repository, error } = failure {
            println!("    {repository}: {error}");
        }
    }
}
