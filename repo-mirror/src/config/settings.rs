//! Migrator settings deserialization.

use crate::migration::DestinationTransport;
use serde::Deserialize;
use std::path::PathBuf;

/// Settings read from a `mirror.toml` file.
///
/// Every field is optional so command-line flags can fill the gaps; see
/// [`MirrorSettings::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MirrorSettings {
    /// Destination GitHub organization.
    pub organization: Option<String>,

    /// Slug of the team granted access to created repositories.
    pub team: Option<String>,

    /// Name of the remote that keeps pointing at the source.
    pub source_remote: Option<String>,

    /// Transport used to push to GitHub.
    pub destination_transport: Option<DestinationTransport>,

    /// Directory in which mirror clones are created.
    pub work_dir: Option<PathBuf>,
}

impl MirrorSettings {
    /// Layers `overrides` on top of these settings.
    ///
    /// Values present in `overrides` win.
    #[must_use]
    pub fn merge(self, overrides: MirrorSettings) -> Self {
        Self {
            organization: overrides.organization.or(self.organization),
            team: overrides.team.or(self.team),
            source_remote: overrides.source_remote.or(self.source_remote),
            destination_transport: overrides
                .destination_transport
                .or(self.destination_transport),
            work_dir: overrides.work_dir.or(self.work_dir),
        }
    }
}
