//! Mirroring a single Bitbucket repository into GitHub.
//!
//! A migration mirror-clones the source, creates the private destination
//! repository for the configured team, tags it with the project topic, and
//! pushes every ref.

mod destination;
mod error;
mod git;

pub use destination::{
    authenticated_url, create_repository, replace_topics, resolve_team, DestinationRepository,
    DestinationTransport, GitHubTeam,
};
pub use error::MigrationError;
pub use git::{destination_name, mirror_dir_name, LocalMirror, MirrorWorkspace};

use crate::records::RepositoryRecord;
use crate::topic::attachable_topic;
use octocrab::Octocrab;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, info_span, Instrument};

/// Default name of the remote that keeps pointing at the source.
pub const DEFAULT_SOURCE_REMOTE: &str = "bitbucket";

/// What a migration will do for a record, derived without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    /// Local mirror directory name (last segment of the clone URL).
    pub dir_name: String,

    /// Destination repository name.
    pub name: String,

    /// Topic to attach, if any.
    pub topic: Option<String>,
}

impl MigrationPlan {
    /// Derives the plan for a record.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::InvalidCloneUrl`] if no repository name can
    /// be derived from the clone URL.
    pub fn for_record(record: &RepositoryRecord) -> Result<Self, MigrationError> {
        let dir_name = mirror_dir_name(&record.clone_url)?;
        let name = destination_name(&dir_name).ok_or_else(|| MigrationError::InvalidCloneUrl {
            url: record.clone_url.clone(),
        })?;

        Ok(Self {
            dir_name,
            name,
            topic: attachable_topic(&record.project_name),
        })
    }
}

/// Everything a migration needs besides the record itself.
#[derive(Clone, Copy)]
pub struct MigrationContext<'a> {
    /// Authenticated GitHub client.
    pub octocrab: &'a Octocrab,
    /// Destination organization.
    pub organization: &'a str,
    /// Team granted access to created repositories.
    pub team: &'a GitHubTeam,
    /// Where mirror clones are created.
    pub workspace: &'a MirrorWorkspace,
    /// Name of the remote pointing back at the source.
    pub source_remote: &'a str,
    /// How the mirror is pushed to GitHub.
    pub transport: DestinationTransport,
    /// GitHub token, used for HTTPS pushes.
    pub token: &'a str,
}

/// A repository that was fully migrated.
#[derive(Debug, Clone, Serialize)]
pub struct MigratedRepository {
    /// Source full name (or clone URL when the record lacks one).
    pub source: String,

    /// Destination full name in "owner/name" format.
    pub destination: String,

    /// Destination web URL, when GitHub reports one.
    pub url: Option<String>,

    /// Attached topic, if any.
    pub topic: Option<String>,

    /// Local mirror clone, left on disk.
    pub local_path: PathBuf,
}

/// Migrates one repository.
///
/// Steps, in order:
/// 1. Mirror-clone the source
/// 2. Create the private destination repository for the team
/// 3. Attach the project topic unless it is empty or `uncategorized`
/// 4. Point `origin` at the destination and add the source as a second remote
/// 5. Push the mirror to `origin`
///
/// Nothing is rolled back on failure; a created destination repository
/// stays in place.
///
/// # Errors
///
/// Returns [`MigrationError`] from the first failing step.
pub async fn migrate_repository(
    context: &MigrationContext<'_>,
    record: &RepositoryRecord,
) -> Result<MigratedRepository, MigrationError> {
    let span = info_span!(
        "migrate",
        repo = %display_name(record),
        organization = %context.organization
    );

    async {
        let plan = MigrationPlan::for_record(record)?;

        let mirror = context
            .workspace
            .mirror_clone(&record.clone_url, &plan.dir_name)
            .await?;
        debug!(path = %mirror.path().display(), "Mirror clone ready");

        let destination = create_repository(
            context.octocrab,
            context.organization,
            &plan.name,
            context.team,
        )
        .await?;
        info!(destination = %destination.full_name, "Created destination repository");

        if let Some(topic) = &plan.topic {
            replace_topics(
                context.octocrab,
                context.organization,
                &destination.name,
                std::slice::from_ref(topic),
            )
            .await?;
            debug!(topic = %topic, "Attached topic");
        }

        let remote_url = destination.remote_url(context.transport);
        mirror.set_origin(remote_url).await?;
        mirror
            .add_remote(context.source_remote, &record.clone_url)
            .await?;

        let push_target = match context.transport {
            DestinationTransport::Ssh => "origin".to_string(),
            DestinationTransport::Https => authenticated_url(remote_url, context.token),
        };
        mirror.push_mirror(&push_target).await?;
        info!(destination = %destination.full_name, "Mirror pushed");

        Ok(MigratedRepository {
            source: display_name(record).to_string(),
            destination: destination.full_name,
            url: destination.html_url,
            topic: plan.topic,
            local_path: mirror.path().to_path_buf(),
        })
    }
    .instrument(span)
    .await
}

/// Returns the name used to identify a record in logs and summaries.
pub fn display_name(record: &RepositoryRecord) -> &str {
    if record.full_name.is_empty() {
        &record.clone_url
    } else {
        &record.full_name
    }
}
