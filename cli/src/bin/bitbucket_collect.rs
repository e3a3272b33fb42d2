//! Collects every repository of a Bitbucket workspace into a JSON file.

use clap::Parser;
use repo_mirror::{
    collect_to_file, CloneTransport, CollectError, CollectorConfig, DEFAULT_BITBUCKET_API_URL,
    DEFAULT_PAGE_SIZE,
};
use repo_mirror_cli::{init_tracing, install_crypto_provider};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Exit code when Bitbucket answers a page request with an error status.
const EXIT_FETCH_ERROR: u8 = 3;

/// Bitbucket Collect - List a workspace's repositories for mirroring.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bitbucket workspace slug.
    #[arg(long, short)]
    workspace: String,

    /// Bitbucket username.
    #[arg(long, env = "BITBUCKET_USERNAME")]
    username: String,

    /// Bitbucket app password or API token.
    #[arg(long, env = "BITBUCKET_APP_PASSWORD", hide_env_values = true)]
    app_password: String,

    /// Clone link to capture: https or ssh.
    #[arg(long, default_value = "https")]
    transport: CloneTransport,

    /// Output file.
    #[arg(long, short, default_value = "./bitbucket_repos.json")]
    output: PathBuf,

    /// Repositories requested per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=100))]
    page_size: u32,

    /// Bitbucket API base URL.
    #[arg(long, default_value = DEFAULT_BITBUCKET_API_URL)]
    api_url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    install_crypto_provider();

    // Usage errors exit with code 2
    let args = Args::parse();

    let config = CollectorConfig::new(args.workspace, args.username, args.app_password)
        .with_transport(args.transport)
        .with_page_size(args.page_size)
        .with_api_url(args.api_url);

    match collect_to_file(&config, &args.output).await {
        Ok(count) => {
            println!(
                "Wrote {count} repositories to {}",
                args.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e @ CollectError::HttpStatus { .. }) => {
            error!(error = %e, "Failed to fetch repositories");
            ExitCode::from(EXIT_FETCH_ERROR)
        }
        Err(e) => {
            error!(error = %e, "Collection failed");
            ExitCode::from(1)
        }
    }
}
