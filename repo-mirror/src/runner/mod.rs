//! Orchestrates a batch of repository migrations.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::migration::{
    display_name, migrate_repository, resolve_team, MigrationContext, MigrationError,
    MigrationPlan, MirrorWorkspace,
};
use crate::records::{load_records, RepositoryRecord};
use crate::summary::{MigrationOutcome, RunSummary};
use futures::stream::{self, StreamExt};
use octocrab::Octocrab;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Runs a migration batch over the records produced by the collector.
pub struct Runner {
    config: RunnerConfig,
    octocrab: Octocrab,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] when a live run has no token, or
    /// [`RunnerError::Octocrab`] if the GitHub client can't be built.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        config.validate()?;

        let mut builder = Octocrab::builder();
        if let Some(token) = config.token() {
            builder = builder.personal_token(token.to_string());
        }
        if let Some(api_url) = config.api_url() {
            builder = builder.base_uri(api_url)?;
        }
        let octocrab = builder.build()?;
        Ok(Self { config, octocrab })
    }

    /// Executes the full batch.
    ///
    /// Each record is migrated independently and its outcome recorded in the
    /// returned summary. With fail-fast enabled the batch stops at the first
    /// failed record instead.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] only for problems that prevent the batch from
    /// starting: an unreadable records file, an unknown team, or an
    /// unusable work directory.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::new(self.config.dry_run());

        info!(path = %self.config.input_path().display(), "Loading records");
        let records = load_records(self.config.input_path())?;
        summary.records_read = records.len();

        if records.is_empty() {
            warn!("No records found");
            return Ok(summary);
        }

        info!(count = records.len(), "Found records");

        let conflicts = find_mirror_conflicts(&records);
        if !conflicts.is_empty() {
            warn!(
                count = conflicts.len(),
                "Records share a mirror directory with an earlier record and will be skipped"
            );
        }

        if self.config.dry_run() {
            print_dry_run_preview(&self.config, &records, &conflicts, &mut summary);
            return Ok(summary);
        }

        let team = resolve_team(&self.octocrab, self.config.organization(), self.config.team())
            .await?;
        info!(team = %team.slug, team_id = team.id, "Resolved team");

        let workspace = MirrorWorkspace::create(self.config.work_dir())?;
        let context = MigrationContext {
            octocrab: &self.octocrab,
            organization: self.config.organization(),
            team: &team,
            workspace: &workspace,
            source_remote: self.config.source_remote(),
            transport: self.config.destination_transport(),
            token: self.config.token().unwrap_or_default(),
        };

        let total = records.len();
        if self.config.fail_fast() || self.config.concurrency() == 1 {
            if self.config.fail_fast() && self.config.concurrency() > 1 {
                warn!("Fail-fast mode migrates sequentially, ignoring concurrency");
            }

            for (index, record) in records.iter().enumerate() {
                let outcome =
                    process_record(&context, record, conflicts.get(&index), index, total).await;
                let failed = outcome.is_failure();
                summary.record_outcome(outcome);

                if failed && self.config.fail_fast() {
                    summary.aborted = true;
                    warn!(
                        remaining = total - index - 1,
                        "Stopping after first failure"
                    );
                    break;
                }
            }
        } else {
            let outcomes: Vec<MigrationOutcome> = stream::iter(records.iter().enumerate())
                .map(|(index, record)| {
                    process_record(&context, record, conflicts.get(&index), index, total)
                })
                .buffer_unordered(self.config.concurrency())
                .collect()
                .await;

            for outcome in outcomes {
                summary.record_outcome(outcome);
            }
        }

        Ok(summary)
    }
}

/// Finds records whose mirror directory is already taken by an earlier record.
///
/// Keys are record indices; the first record to claim a directory keeps it.
/// Records without a derivable directory are left to fail on their own.
fn find_mirror_conflicts(records: &[RepositoryRecord]) -> HashMap<usize, MigrationError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    let mut conflicts = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        let Ok(plan) = MigrationPlan::for_record(record) else {
            continue;
        };
        match owners.get(&plan.dir_name) {
            Some(other) => {
                conflicts.insert(
                    index,
                    MigrationError::DuplicateMirror {
                        dir_name: plan.dir_name,
                        other: (*other).to_string(),
                    },
                );
            }
            None => {
                owners.insert(plan.dir_name, display_name(record));
            }
        }
    }

    conflicts
}

async fn process_record(
    context: &MigrationContext<'_>,
    record: &RepositoryRecord,
    conflict: Option<&MigrationError>,
    index: usize,
    total: usize,
) -> MigrationOutcome {
    let repository = display_name(record).to_string();

    println!("[{}/{}] {}", index + 1, total, repository);
    println!("  Clone URL: {}", record.clone_url);
    println!("  Project: {}", record.project_name);

    if let Some(conflict) = conflict {
        error!(repo = %repository, error = %conflict, "Skipping repository");
        return MigrationOutcome::Failed {
            repository,
            error: conflict.to_string(),
        };
    }

    match migrate_repository(context, record).await {
        Ok(migrated) => {
            println!("  Local mirror: {}", migrated.local_path.display());
            MigrationOutcome::Migrated {
                repository,
                destination: migrated.destination,
                topic: migrated.topic,
                url: migrated.url,
            }
        }
        Err(e) => {
            error!(repo = %repository, error = %e, "Failed to migrate repository");
            MigrationOutcome::Failed {
                repository,
                error: e.to_string(),
            }
        }
    }
}

fn print_dry_run_preview(
    config: &RunnerConfig,
    records: &[RepositoryRecord],
    conflicts: &HashMap<usize, MigrationError>,
    summary: &mut RunSummary,
) {
    println!("\n[DRY RUN] Destination: {}", config.organization());
    println!("  Team: {}", config.team());
    println!("  Found {} records:\n", records.len());

    for (i, record) in records.iter().enumerate() {
        let repository = display_name(record).to_string();
        println!("  [{}/{}] {}", i + 1, records.len(), repository);

        let plan = match conflicts.get(&i) {
            Some(conflict) => Err(conflict.to_string()),
            None => MigrationPlan::for_record(record).map_err(|e| e.to_string()),
        };

        let outcome = match plan {
            Ok(plan) => {
                println!(
                    "    Would create private repository: {}/{}",
                    config.organization(),
                    plan.name
                );
                match &plan.topic {
                    Some(topic) => println!("    Would attach topic: {topic}"),
                    None => println!("    No topic"),
                }
                MigrationOutcome::Planned {
                    repository,
                    destination: format!("{}/{}", config.organization(), plan.name),
                    topic: plan.topic,
                }
            }
            Err(error) => {
                println!("    Cannot migrate: {error}");
                MigrationOutcome::Failed { repository, error }
            }
        };
        summary.record_outcome(outcome);
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(clone_url: &str, full_name: &str) -> RepositoryRecord {
        RepositoryRecord {
            clone_url: clone_url.to_string(),
            project_name: "P".to_string(),
            repository_name: "repo".to_string(),
            full_name: full_name.to_string(),
        }
    }

    #[test]
    fn later_records_lose_a_shared_mirror_directory() {
        let records = vec![
            record("https://h/a/repo.git", "a/repo"),
            record("https://h/b/other.git", "b/other"),
            record("git@h:b/repo.git", "b/repo"),
            record("https://h/a/repo.git", "a/repo"),
        ];

        let conflicts = find_mirror_conflicts(&records);

        assert_eq!(conflicts.len(), 2);
        assert!(!conflicts.contains_key(&0));
        assert!(!conflicts.contains_key(&1));
        match &conflicts[&2] {
            MigrationError::DuplicateMirror { dir_name, other } => {
                assert_eq!(dir_name, "repo.git");
                assert_eq!(other, "a/repo");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(conflicts.contains_key(&3));
    }

    #[test]
    fn unplannable_records_claim_nothing() {
        let records = vec![
            record("https://h/ns/.git", "ns/broken"),
            record("https://h/ns/.git", "ns/broken-too"),
        ];

        assert!(find_mirror_conflicts(&records).is_empty());
    }
}
