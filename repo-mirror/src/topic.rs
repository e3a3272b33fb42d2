//! Conversion of Bitbucket project names into GitHub topics.
//!
//! GitHub topics must be lowercase, may only contain ASCII letters, digits
//! and hyphens, and are limited to 50 characters.

use crate::records::UNCATEGORIZED;

/// Maximum length of a GitHub topic.
pub const MAX_TOPIC_LEN: usize = 50;

/// Sanitizes a human-readable project name into a GitHub topic.
///
/// The steps run in a fixed order:
/// 1. ASCII letters are lowercased (other characters are left as they are)
/// 2. Spaces become hyphens
/// 3. Anything outside `[a-z0-9-]` is deleted (underscores, punctuation and
///    non-ASCII characters vanish rather than becoming separators)
/// 4. Hyphen runs collapse to a single hyphen
/// 5. Truncate to [`MAX_TOPIC_LEN`] characters
/// 6. Leading and trailing hyphens are stripped
///
/// An empty result means no topic. Callers should use [`attachable_topic`]
/// to also filter out the `uncategorized` sentinel.
///
/// # Examples
///
/// ```
/// use repo_mirror::sanitize;
///
/// assert_eq!(sanitize("My Cool Project!!"), "my-cool-project");
/// assert_eq!(sanitize(""), "");
/// ```
pub fn sanitize(raw: &str) -> String {
    let hyphenated = raw.to_ascii_lowercase().replace(' ', "-");

    let mut collapsed = String::with_capacity(hyphenated.len());
    for c in hyphenated.chars().filter(is_topic_char) {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    // Everything left is ASCII, so the byte index is a char boundary.
    collapsed.truncate(MAX_TOPIC_LEN.min(collapsed.len()));
    collapsed.trim_matches('-').to_string()
}

/// Returns the topic to attach for a project name, if any.
///
/// Yields `None` when sanitization produces an empty string or the
/// `uncategorized` sentinel.
pub fn attachable_topic(project_name: &str) -> Option<String> {
    let topic = sanitize(project_name);
    if topic.is_empty() || topic == UNCATEGORIZED {
        None
    } else {
        Some(topic)
    }
}

fn is_topic_char(c: &char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'
}
