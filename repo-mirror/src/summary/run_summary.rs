//! Run summary types.

use super::result::MigrationOutcome;

/// Summary of a complete migration batch.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of records read from the input file.
    pub records_read: usize,

    /// Number of repositories migrated.
    pub migrated: usize,

    /// Number of repositories planned in a dry run.
    pub planned: usize,

    /// Number of repositories that failed.
    pub failed: usize,

    /// Whether the batch stopped early after a failure.
    pub aborted: bool,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Individual outcomes, in completion order.
    pub outcomes: Vec<MigrationOutcome>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing outcome.
    pub fn record_outcome(&mut self, outcome: MigrationOutcome) {
        match &outcome {
            MigrationOutcome::Migrated { .. } => self.migrated += 1,
            MigrationOutcome::Planned { .. } => self.planned += 1,
            MigrationOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Returns the number of records never attempted.
    #[must_use]
    pub fn not_attempted(&self) -> usize {
        self.records_read.saturating_sub(self.outcomes.len())
    }

    /// Returns an iterator over failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &MigrationOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_failure())
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Returns true if every record was processed successfully.
    #[must_use]
    pub fn all_success(&self) -> bool {
        self.failed == 0 && !self.aborted
    }
}
