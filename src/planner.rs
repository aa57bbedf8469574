//! Computes the package URLs a deployment must have produced.
//!
//! Packages land in one directory per architecture. MSYS packages are named
//! `<name>-<version>-1-<arch>.pkg.tar.xz`, MinGW packages
//! `mingw-w64-<arch>-<name>-<version>-1-any.pkg.tar.xz`.
use crate::{
    config::{ArtifactsConfig, DEFAULT_ARCHITECTURES, DEFAULT_ARTIFACT_BASE_URL},
    package::{
        CROSS_TRACK_PREFIX, KnownPackage, is_msys_package, needs_both_tracks,
        strip_cross_track_prefix,
    },
};

/// Package release (pkgrel) of freshly deployed versions.
const PACKAGE_RELEASE: u32 = 1;

/// MinTTY's package version carries an epoch.
const MINTTY_EPOCH: &str = "1";

#[derive(Debug, Clone)]
pub struct ArtifactPlanner {
    base_url: String,
    architectures: Vec<String>,
}

impl Default for ArtifactPlanner {
    fn default() -> Self {
        Self::new(
            DEFAULT_ARTIFACT_BASE_URL,
            DEFAULT_ARCHITECTURES.iter().map(|arch| arch.to_string()),
        )
    }
}

impl From<&ArtifactsConfig> for ArtifactPlanner {
    fn from(config: &ArtifactsConfig) -> Self {
        Self::new(&config.base_url, config.architectures.iter().cloned())
    }
}

impl ArtifactPlanner {
    pub fn new(
        base_url: &str,
        architectures: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            architectures: architectures.into_iter().collect(),
        }
    }

    /// The configured architectures, before per-package exclusions.
    pub fn architectures(&self) -> &[String] {
        &self.architectures
    }

    /// Drop the architectures a package is not built for: the current MSYS2
    /// runtime no longer supports the first one, its 3.3 variant exists
    /// only for the first one.
    pub fn architectures_for<S: AsRef<str>>(
        package: &str,
        architectures: &[S],
    ) -> Vec<String> {
        let mut archs: Vec<String> = architectures
            .iter()
            .map(|arch| arch.as_ref().to_string())
            .collect();

        match KnownPackage::lookup(package) {
            Some(KnownPackage::Msys2Runtime) if !archs.is_empty() => {
                archs.remove(0);
            }
            Some(KnownPackage::Msys2Runtime33) => {
                archs.pop();
            }
            _ => {}
        }

        archs
    }

    /// The version as it appears in package file names.
    pub fn versioned(package: &str, version: &str) -> String {
        match KnownPackage::lookup(package) {
            Some(KnownPackage::Mintty) => format!("{MINTTY_EPOCH}~{version}"),
            _ => version.to_string(),
        }
    }

    /// Every URL that must exist once `package` `version` is deployed, in
    /// a stable order: per track, then per architecture.
    pub fn plan_urls<S: AsRef<str>>(
        &self,
        package: &str,
        version: &str,
        architectures: &[S],
    ) -> Vec<String> {
        let archs = Self::architectures_for(package, architectures);
        let version = Self::versioned(package, version);
        let unprefixed = strip_cross_track_prefix(package);

        if needs_both_tracks(unprefixed) {
            let mut urls = self.msys_urls(unprefixed, &version, &archs);
            urls.extend(self.mingw_urls(unprefixed, &version, &archs));
            urls
        } else if is_msys_package(package) {
            self.msys_urls(package, &version, &archs)
        } else {
            self.mingw_urls(unprefixed, &version, &archs)
        }
    }

    fn arch_url(&self, arch: &str, file_name: &str) -> String {
        format!("{}/{}/{file_name}", self.base_url, arch.replace('_', "-"))
    }

    fn msys_urls(
        &self,
        name: &str,
        version: &str,
        archs: &[String],
    ) -> Vec<String> {
        archs
            .iter()
            .map(|arch| {
                self.arch_url(
                    arch,
                    &format!(
                        "{name}-{version}-{PACKAGE_RELEASE}-{arch}.pkg.tar.xz"
                    ),
                )
            })
            .collect()
    }

    fn mingw_urls(
        &self,
        name: &str,
        version: &str,
        archs: &[String],
    ) -> Vec<String> {
        archs
            .iter()
            .map(|arch| {
                self.arch_url(
                    arch,
                    &format!(
                        "{CROSS_TRACK_PREFIX}{arch}-{name}-{version}-{PACKAGE_RELEASE}-any.pkg.tar.xz"
                    ),
                )
            })
            .collect()
    }
}
