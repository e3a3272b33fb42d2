//! Repository collection from a Bitbucket workspace.
//!
//! This module pages through the workspace's repository listing, turns each
//! repository into a [`RepositoryRecord`] and writes the deduplicated set as
//! a JSON array.

mod config;
mod error;
mod page;

pub use config::{CloneTransport, CollectorConfig, DEFAULT_BITBUCKET_API_URL, DEFAULT_PAGE_SIZE};
pub use error::CollectError;

use crate::records::RepositoryRecord;
use page::RepositoryPage;
use reqwest::Client;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, info_span, warn, Instrument};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches every repository of the configured workspace.
///
/// Pagination follows the `next` URL of each page until it is absent or
/// empty. Repositories without a clone link for the configured transport
/// are skipped.
///
/// # Errors
///
/// Returns [`CollectError::HttpStatus`] on the first page answered with a
/// status of 400 or above; nothing is retried.
pub async fn collect(config: &CollectorConfig) -> Result<Vec<RepositoryRecord>, CollectError> {
    let span = info_span!(
        "collect",
        workspace = %config.workspace(),
        transport = %config.transport()
    );

    async {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        let mut records = Vec::new();
        let mut next = Some(config.first_page_url()?.to_string());
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let page = fetch_page(&client, config, &url).await?;
            pages += 1;

            for repository in &page.values {
                match repository.to_record(config.transport()) {
                    Some(record) => records.push(record),
                    None => warn!(
                        repo = %repository.full_name,
                        transport = %config.transport(),
                        "No clone link for transport, skipping"
                    ),
                }
            }

            debug!(page = pages, total = records.len(), "Fetched page");
            next = page.next_url().map(str::to_string);
        }

        info!(pages, count = records.len(), "Collection complete");
        Ok(records)
    }
    .instrument(span)
    .await
}

/// Fetches and decodes one listing page.
async fn fetch_page(
    client: &Client,
    config: &CollectorConfig,
    url: &str,
) -> Result<RepositoryPage, CollectError> {
    debug!(url = %url, "Fetching page");

    let response = client
        .get(url)
        .basic_auth(config.username(), Some(config.app_password()))
        .send()
        .await?;

    let status = response.status();
    if status.as_u16() >= 400 {
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), url = %url, body = %body, "Bitbucket API error");
        return Err(CollectError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| CollectError::DecodeError {
        url: url.to_string(),
        source: e,
    })
}

/// Serializes records into sorted, deduplicated JSON lines.
///
/// Duplicates are detected on the serialized text only: two records are
/// the same when their lines are byte-for-byte equal.
pub fn normalize_lines(records: &[RepositoryRecord]) -> Result<Vec<String>, CollectError> {
    let mut lines = BTreeSet::new();
    for record in records {
        let line = record.to_line().map_err(CollectError::SerializeError)?;
        let line = line.trim();
        if !line.is_empty() {
            lines.insert(line.to_string());
        }
    }
    Ok(lines.into_iter().collect())
}

/// Wraps record lines into a JSON array, one element per line.
pub fn render_array(lines: &[String]) -> String {
    if lines.is_empty() {
        return "[]\n".to_string();
    }
    format!("[\n{}\n]\n", lines.join(",\n"))
}

/// Atomically writes record lines to `output` as a JSON array.
///
/// The array is written to a temporary file next to `output` and then
/// renamed over it, so a failed run never leaves a partial file behind.
///
/// # Returns
///
/// The number of records written.
pub fn write_records(lines: &[String], output: &Path) -> Result<usize, CollectError> {
    let io_error = |e: std::io::Error| CollectError::IoError {
        path: output.display().to_string(),
        source: e,
    };

    let dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(render_array(lines).as_bytes())
        .map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(output).map_err(|e| io_error(e.error))?;

    info!(path = %output.display(), count = lines.len(), "Wrote records");
    Ok(lines.len())
}

/// Collects the workspace and writes the deduplicated records to `output`.
///
/// # Errors
///
/// On any error the previous contents of `output`, if any, are untouched.
pub async fn collect_to_file(
    config: &CollectorConfig,
    output: &Path,
) -> Result<usize, CollectError> {
    let records = collect(config).await?;
    let lines = normalize_lines(&records)?;
    write_records(&lines, output)
}
