//! Guesses the package name and version from a component-update issue.
//!
//! The update issues are opened by several bots and humans, each with their
//! own title conventions, so the rules below are tried in a fixed order and
//! the first match wins.
use log::*;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::{
    error::{ComponentUpdateError, Result},
    package::{CROSS_TRACK_PREFIX, KnownPackage, strip_cross_track_prefix},
};

/// Matches "[New <package> version] [Some Words ]<version>[ patch <n>]"
static NEW_VERSION_TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[New (\S+) version\] (?:[^0-9]+\s+)?(\S+(?:\s+patch\s+\d+)?)",
    )
    .unwrap()
});

/// Matches "<package>: update to [v]<version>"
static UPDATE_TO_TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+): update to v?(\d[0-9.]\S*)").unwrap()
});

/// Same as the title rule, but as the heading that starts the body
static NEW_VERSION_BODY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^# \[New (\S+) version\] (?:[^0-9]+\s+)?(\S+(?:\s+patch\s+\d+)?)",
    )
    .unwrap()
});

static PATCH_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+patch\s+").unwrap());

/// Upstream tag prefixes, tried in order. At most one is removed.
const VERSION_PREFIXES: &[&str] = &[
    "GCM ", "openssl-", "OpenSSL_", "v", "V_", "GnuTLS ", "tig-", "Heimdal ",
    "cygwin-", "PCRE2-", "Bash-", "curl-",
];

/// Titles of the form "[New foo version] 3 new items" announce feed
/// updates rather than a release.
const FEED_ITEMS_MARKER: &str = "new items";

/// Canonical identity of one component update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateDescriptor {
    /// Normalized package name, possibly carrying the cross-track prefix.
    pub package_name: String,
    /// Normalized version without upstream prefixes.
    pub version: String,
}

impl UpdateDescriptor {
    /// Package name without the cross-track prefix.
    pub fn unprefixed_name(&self) -> &str {
        strip_cross_track_prefix(&self.package_name)
    }
}

/// Parse an issue's title (and, as a last resort, its body) into an
/// [`UpdateDescriptor`].
pub fn guess_component_update_details(
    title: &str,
    body: &str,
) -> Result<UpdateDescriptor> {
    let (package_name, version) = match_raw_details(title, body)
        .ok_or_else(|| ComponentUpdateError::extraction(title))?;

    let descriptor = UpdateDescriptor {
        package_name: normalize_package_name(package_name),
        version: normalize_version(version),
    };

    debug!(
        "guessed {} {} from title '{title}'",
        descriptor.package_name, descriptor.version
    );

    Ok(descriptor)
}

fn match_raw_details<'a>(
    title: &'a str,
    body: &'a str,
) -> Option<(&'a str, &'a str)> {
    let new_version_title = if title.contains(FEED_ITEMS_MARKER) {
        None
    } else {
        NEW_VERSION_TITLE_REGEX.captures(title)
    };

    let captures = new_version_title
        .or_else(|| UPDATE_TO_TITLE_REGEX.captures(title))
        .or_else(|| NEW_VERSION_BODY_REGEX.captures(body))?;

    let package_name = captures.get(1)?.as_str();
    let version = captures.get(2)?.as_str();

    if package_name.is_empty() || version.is_empty() {
        return None;
    }

    Some((package_name, version))
}

/// Map upstream aliases onto the names used in the package repositories.
pub fn normalize_package_name(name: &str) -> String {
    match KnownPackage::lookup(name) {
        Some(KnownPackage::GitLfs) => format!("{CROSS_TRACK_PREFIX}{name}"),
        Some(KnownPackage::GitCredentialManager) => format!(
            "{CROSS_TRACK_PREFIX}{}",
            KnownPackage::GitCredentialManager
        ),
        _ => match name {
            "gcm-core" | "gcm" => format!(
                "{CROSS_TRACK_PREFIX}{}",
                KnownPackage::GitCredentialManager
            ),
            "cygwin" => KnownPackage::Msys2Runtime.to_string(),
            _ => name.to_string(),
        },
    }
}

/// Strip a known upstream prefix, turn "patch N" and underscores into dot
/// separators and drop a trailing "-release".
pub fn normalize_version(raw: &str) -> String {
    let unprefixed = VERSION_PREFIXES
        .iter()
        .find_map(|prefix| raw.strip_prefix(prefix))
        .unwrap_or(raw);

    let dotted = PATCH_SEPARATOR_REGEX
        .replace_all(unprefixed, ".")
        .replace('_', ".");

    dotted
        .strip_suffix("-release")
        .unwrap_or(&dotted)
        .to_string()
}
