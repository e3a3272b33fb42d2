//! Per-repository outcome types.

use serde::Serialize;

/// Outcome of processing a single record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The repository was created and the mirror pushed.
    Migrated {
        /// Source repository.
        repository: String,
        /// Destination full name.
        destination: String,
        /// Attached topic, if any.
        topic: Option<String>,
        /// Web URL of the destination repository.
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// Dry run: the repository would have been migrated.
    Planned {
        /// Source repository.
        repository: String,
        /// Destination full name.
        destination: String,
        /// Topic that would be attached, if any.
        topic: Option<String>,
    },

    /// Migration failed.
    Failed {
        /// Source repository.
        repository: String,
        /// Error message.
        error: String,
    },
}

impl MigrationOutcome {
    /// Returns the source repository this outcome is about.
    #[must_use]
    pub fn repository(&self) -> &str {
        match self {
            Self::Migrated { repository, .. }
            | Self::Planned { repository, .. }
            | Self::Failed { repository, .. } => repository,
        }
    }

    /// Returns true for a failed migration.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
