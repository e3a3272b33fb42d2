#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod collector;
pub mod config;
pub mod migration;
pub mod records;
pub mod runner;
pub mod summary;
pub mod topic;

pub use collector::{
    collect, collect_to_file, normalize_lines, render_array, write_records, CloneTransport,
    CollectError, CollectorConfig, DEFAULT_BITBUCKET_API_URL, DEFAULT_PAGE_SIZE,
};
pub use config::{
    load_optional_settings, load_settings, ConfigError, MirrorSettings, DEFAULT_SETTINGS_FILE,
};
pub use migration::{
    migrate_repository, DestinationRepository, DestinationTransport, GitHubTeam, LocalMirror,
    MigratedRepository, MigrationContext, MigrationError, MigrationPlan, MirrorWorkspace,
};
pub use records::{
    load_records, RecordsError, RepositoryRecord, DEFAULT_RECORDS_FILE, UNCATEGORIZED,
};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::{MigrationOutcome, RunSummary};
pub use topic::{attachable_topic, sanitize};
