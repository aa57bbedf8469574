//! Package classification for the two packaging tracks.
//!
//! Packages are built either on the MSYS track (POSIX-layer packages named
//! as-is) or on the MinGW cross track (native packages carrying the
//! `mingw-w64-` prefix). A handful of libraries are built on both.
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Prefix carried by every package built on the MinGW cross track.
pub const CROSS_TRACK_PREFIX: &str = "mingw-w64-";

/// Every package that some rule table treats specially. Names not listed
/// here follow the generic rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
pub enum KnownPackage {
    #[strum(serialize = "bash")]
    Bash,
    #[strum(serialize = "curl")]
    Curl,
    #[strum(serialize = "git-credential-manager")]
    GitCredentialManager,
    #[strum(serialize = "git-extra")]
    GitExtra,
    #[strum(serialize = "git-lfs")]
    GitLfs,
    #[strum(serialize = "gnutls")]
    Gnutls,
    #[strum(serialize = "heimdal")]
    Heimdal,
    #[strum(serialize = "mintty")]
    Mintty,
    #[strum(serialize = "msys2-runtime")]
    Msys2Runtime,
    #[strum(serialize = "msys2-runtime-3.3")]
    Msys2Runtime33,
    #[strum(serialize = "openssh")]
    Openssh,
    #[strum(serialize = "openssl")]
    Openssl,
    #[strum(serialize = "pcre2")]
    Pcre2,
    #[strum(serialize = "perl")]
    Perl,
    #[strum(serialize = "tig")]
    Tig,
    #[strum(serialize = "wintoast")]
    Wintoast,
}

impl KnownPackage {
    /// Look up a package by its un-prefixed name.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// Human-readable name used in release notes.
    pub fn display_name(&self) -> Option<&'static str> {
        match self {
            Self::GitCredentialManager => Some("Git Credential Manager"),
            Self::GitLfs => Some("Git LFS"),
            Self::Msys2Runtime => Some("MSYS2 runtime"),
            Self::Msys2Runtime33 => {
                Some("MSYS2 runtime (Windows 7/8 variant)")
            }
            Self::Bash => Some("Bash"),
            Self::Curl => Some("cURL"),
            Self::Gnutls => Some("GNU TLS"),
            Self::Heimdal => Some("Heimdal"),
            Self::Mintty => Some("MinTTY"),
            Self::Openssh => Some("OpenSSH"),
            Self::Openssl => Some("OpenSSL"),
            Self::Pcre2 => Some("PCRE2"),
            Self::Perl => Some("Perl"),
            Self::Tig => Some("Tig"),
            Self::GitExtra | Self::Wintoast => None,
        }
    }

    /// Libraries that ship both an MSYS and a MinGW flavor.
    pub fn needs_both_tracks(&self) -> bool {
        matches!(self, Self::Openssl | Self::Curl | Self::Gnutls | Self::Pcre2)
    }

    /// Cross-track packages whose ARM64 flavor comes out of the regular
    /// build (prebuilt or architecture independent).
    fn skips_separate_arm64_build(&self) -> bool {
        matches!(
            self,
            Self::GitCredentialManager | Self::GitLfs | Self::Wintoast
        )
    }
}

/// Remove the cross-track prefix if present.
pub fn strip_cross_track_prefix(name: &str) -> &str {
    name.strip_prefix(CROSS_TRACK_PREFIX).unwrap_or(name)
}

/// Whether the package is built on the MSYS track.
pub fn is_msys_package(name: &str) -> bool {
    name != KnownPackage::GitExtra.as_ref()
        && !name.starts_with(CROSS_TRACK_PREFIX)
}

/// Whether the package is built once per track. Accepts prefixed or
/// un-prefixed names.
pub fn needs_both_tracks(name: &str) -> bool {
    KnownPackage::lookup(strip_cross_track_prefix(name))
        .is_some_and(|pkg| pkg.needs_both_tracks())
}

/// Whether the package needs a dedicated ARM64 build.
pub fn needs_separate_arm64_build(name: &str) -> bool {
    if name == KnownPackage::GitExtra.as_ref() {
        return true;
    }

    match name.strip_prefix(CROSS_TRACK_PREFIX) {
        Some(unprefixed) => !KnownPackage::lookup(unprefixed)
            .is_some_and(|pkg| pkg.skips_separate_arm64_build()),
        None => false,
    }
}

/// Display name for an un-prefixed package name, falling back to the name
/// itself.
pub fn pretty_name(name: &str) -> String {
    KnownPackage::lookup(name)
        .and_then(|pkg| pkg.display_name())
        .unwrap_or(name)
        .to_string()
}
