//! Derives the release-note line for a component update.
//!
//! The changelog URL comes from the first resolver that produces one:
//! fixed per-package templates, then an explicit "See <URL> for details"
//! in a pull request, then the issue a pull request refers to, and finally
//! the body of the issue itself.
use async_trait::async_trait;
use log::*;
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, LazyLock};

use crate::{
    config::GithubConfig,
    error::{ComponentUpdateError, Result},
    extract::guess_component_update_details,
    forge::{
        request::Issue,
        traits::{GithubApi, get_issue},
    },
    package::{KnownPackage, pretty_name},
};

/// Label carried by every component-update issue.
pub const COMPONENT_UPDATE_LABEL: &str = "component-update";

static EXPLICIT_MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"See (https://\S+) for details").unwrap());

/// A URL on the last non-blank line of the body
static TRAILING_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\n)(https://\S+)\s*\z").unwrap());

/// The first URL that starts a line
static LEADING_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(https://\S+)").unwrap());

/// Any URL at all
static ANY_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https://\S+)").unwrap());

static MAJOR_MINOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Feature,
}

/// One release-note entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseNote {
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub message: String,
    /// Package name without the cross-track prefix.
    pub package: String,
    pub version: String,
}

/// What a resolver gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub issue: &'a Issue,
    /// Package name without the cross-track prefix.
    pub package: &'a str,
    pub version: &'a str,
}

/// One strategy for finding the changelog URL.
#[async_trait]
pub trait ChangelogResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` hands over to the next resolver.
    async fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<String>>;
}

/// Changelog URL for packages whose upstream publishes release notes at a
/// predictable location.
pub fn changelog_template_url(package: &str, version: &str) -> Option<String> {
    match KnownPackage::lookup(package)? {
        KnownPackage::Perl => Some(format!(
            "http://search.cpan.org/dist/perl-{version}/pod/perldelta.pod"
        )),
        KnownPackage::Curl => Some(format!(
            "https://curl.se/changes.html#{}",
            version.replace('.', "_")
        )),
        KnownPackage::Openssl => {
            let major_minor = MAJOR_MINOR_REGEX
                .find(version)
                .map_or(version, |m| m.as_str());
            Some(format!(
                "https://www.openssl.org/news/openssl-{major_minor}-notes.html"
            ))
        }
        KnownPackage::Mintty => Some(format!(
            "https://github.com/mintty/mintty/releases/tag/{version}"
        )),
        _ => None,
    }
}

/// Pick the changelog URL out of an issue body. Bash announcements list the
/// release notes first; Heimdal's are embedded in running text; everybody
/// else ends the body with the URL on a line of its own.
pub fn match_url_in_body(package: &str, body: &str) -> Option<String> {
    let regex = match KnownPackage::lookup(package) {
        Some(KnownPackage::Bash) => &LEADING_URL_REGEX,
        Some(KnownPackage::Heimdal) => &ANY_URL_REGEX,
        _ => &TRAILING_URL_REGEX,
    };

    regex
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

pub struct TemplateResolver;

#[async_trait]
impl ChangelogResolver for TemplateResolver {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<String>> {
        Ok(changelog_template_url(ctx.package, ctx.version))
    }
}

pub struct ExplicitMentionResolver;

#[async_trait]
impl ChangelogResolver for ExplicitMentionResolver {
    fn name(&self) -> &'static str {
        "explicit mention"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<String>> {
        if !ctx.issue.is_pull_request() {
            return Ok(None);
        }

        Ok(EXPLICIT_MENTION_REGEX
            .captures(ctx.issue.body())
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string()))
    }
}

/// Follows a pull request's reference to an issue in the sibling
/// repository and reads the URL from that issue's body.
pub struct CrossReferenceResolver {
    api: Arc<dyn GithubApi>,
    owner: String,
    repo: String,
    issue_link: Regex,
}

impl CrossReferenceResolver {
    pub fn new(
        api: Arc<dyn GithubApi>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Result<Self> {
        let owner = owner.into();
        let repo = repo.into();
        let issue_link = Regex::new(&format!(
            r"https://github\.com/{}/{}/issues/(\d+)",
            regex::escape(&owner),
            regex::escape(&repo)
        ))
        .map_err(|err| ComponentUpdateError::invalid_config(err.to_string()))?;

        Ok(Self {
            api,
            owner,
            repo,
            issue_link,
        })
    }
}

#[async_trait]
impl ChangelogResolver for CrossReferenceResolver {
    fn name(&self) -> &'static str {
        "cross reference"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<String>> {
        if !ctx.issue.is_pull_request() {
            return Ok(None);
        }

        let Some(number) = self
            .issue_link
            .captures(ctx.issue.body())
            .and_then(|captures| captures.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
        else {
            return Ok(None);
        };

        info!(
            "following reference to {}/{}#{number}",
            self.owner, self.repo
        );

        let referenced =
            get_issue(self.api.as_ref(), &self.owner, &self.repo, number)
                .await?;

        Ok(match_url_in_body(ctx.package, referenced.body()))
    }
}

pub struct IssueBodyResolver;

#[async_trait]
impl ChangelogResolver for IssueBodyResolver {
    fn name(&self) -> &'static str {
        "issue body"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<String>> {
        if ctx.issue.is_pull_request() {
            return Ok(None);
        }

        Ok(match_url_in_body(ctx.package, ctx.issue.body()))
    }
}

pub struct ReleaseNoteComposer {
    resolvers: Vec<Box<dyn ChangelogResolver>>,
}

impl ReleaseNoteComposer {
    /// Composer with the standard resolver chain. `api` carries the
    /// authentication context for the cross-reference lookup.
    pub fn new(api: Arc<dyn GithubApi>, config: &GithubConfig) -> Result<Self> {
        Ok(Self::with_resolvers(vec![
            Box::new(TemplateResolver),
            Box::new(ExplicitMentionResolver),
            Box::new(CrossReferenceResolver::new(
                api,
                &config.sibling_owner,
                &config.sibling_repo,
            )?),
            Box::new(IssueBodyResolver),
        ]))
    }

    pub fn with_resolvers(resolvers: Vec<Box<dyn ChangelogResolver>>) -> Self {
        Self { resolvers }
    }

    /// Build the release note for a component-update issue or pull request.
    pub async fn compose(&self, issue: &Issue) -> Result<ReleaseNote> {
        if !issue.is_pull_request()
            && issue.label_count(COMPONENT_UPDATE_LABEL) != 1
        {
            return Err(ComponentUpdateError::Precondition {
                number: issue.number,
            });
        }

        let details = guess_component_update_details(&issue.title, issue.body())?;
        let package = details.unprefixed_name();

        let ctx = ResolveContext {
            issue,
            package,
            version: &details.version,
        };

        let mut url = None;
        for resolver in self.resolvers.iter() {
            if let Some(found) = resolver.resolve(&ctx).await? {
                debug!("{} resolver found {found}", resolver.name());
                url = Some(found);
                break;
            }
        }

        let url = url.ok_or(ComponentUpdateError::Resolution {
            number: issue.number,
        })?;

        let message = format!(
            "Comes with [{} v{}]({url}).",
            pretty_name(package),
            details.version
        );

        info!("issue {}: {message}", issue.number);

        Ok(ReleaseNote {
            kind: NoteKind::Feature,
            message,
            package: package.to_string(),
            version: details.version.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::{request::Label, traits::MockGithubApi};

    fn component_issue(number: u64, title: &str, body: &str) -> Issue {
        Issue {
            number,
            title: title.to_string(),
            body: Some(body.to_string()),
            labels: vec![Label {
                name: COMPONENT_UPDATE_LABEL.to_string(),
            }],
            pull_request: None,
        }
    }

    fn pull_request(number: u64, title: &str, body: &str) -> Issue {
        Issue {
            number,
            title: title.to_string(),
            body: Some(body.to_string()),
            labels: vec![],
            pull_request: Some(serde_json::json!({})),
        }
    }

    fn offline_composer() -> ReleaseNoteComposer {
        let mut api = MockGithubApi::new();
        api.expect_request().never();
        ReleaseNoteComposer::new(Arc::new(api), &GithubConfig::default())
            .unwrap()
    }

    #[tokio::test]
    async fn perl_uses_template_without_network() {
        let issue = component_issue(1, "[New perl version] 5.38.0", "");

        let note = offline_composer().compose(&issue).await.unwrap();

        assert_eq!(
            note.message,
            "Comes with [Perl v5.38.0](http://search.cpan.org/dist/perl-5.38.0/pod/perldelta.pod)."
        );
        assert_eq!(note.kind, NoteKind::Feature);
        assert_eq!(note.package, "perl");
        assert_eq!(note.version, "5.38.0");
    }

    #[test]
    fn templates_format_versions_per_package() {
        assert_eq!(
            changelog_template_url("curl", "8.4.0").unwrap(),
            "https://curl.se/changes.html#8_4_0"
        );
        assert_eq!(
            changelog_template_url("openssl", "3.1.4").unwrap(),
            "https://www.openssl.org/news/openssl-3.1-notes.html"
        );
        assert_eq!(
            changelog_template_url("mintty", "3.6.5").unwrap(),
            "https://github.com/mintty/mintty/releases/tag/3.6.5"
        );
        assert!(changelog_template_url("bash", "5.2.21").is_none());
        assert!(changelog_template_url("libfoo", "1.0").is_none());
    }

    #[test]
    fn body_url_heuristics_depend_on_package() {
        let body = "Release notes:\nhttps://first.example/notes trailing\nhttps://second.example/notes\n";

        assert_eq!(
            match_url_in_body("bash", body).unwrap(),
            "https://first.example/notes"
        );
        assert_eq!(
            match_url_in_body("git-lfs", body).unwrap(),
            "https://second.example/notes"
        );

        let prose = "Details are at https://heimdal.example/7.8.0 today";
        assert_eq!(
            match_url_in_body("heimdal", prose).unwrap(),
            "https://heimdal.example/7.8.0"
        );
        assert!(match_url_in_body("tig", prose).is_none());
    }

    #[test]
    fn default_heuristic_takes_trailing_url() {
        let body = "Upstream announcement:\nhttps://lists.example/announce/1234\n\nRelease notes:\nhttps://github.com/jonas/tig/releases/tag/tig-2.5.8";

        assert_eq!(
            match_url_in_body("tig", body).unwrap(),
            "https://github.com/jonas/tig/releases/tag/tig-2.5.8"
        );
        assert_eq!(
            match_url_in_body("bash", body).unwrap(),
            "https://lists.example/announce/1234"
        );
    }

    #[test]
    fn default_heuristic_ignores_urls_followed_by_text() {
        let body = "https://github.com/jonas/tig/releases/tag/tig-2.5.8\n\nThanks!";

        assert!(match_url_in_body("tig", body).is_none());
    }

    #[test]
    fn line_url_tolerates_crlf_bodies() {
        let body = "New release\r\nhttps://github.com/jonas/tig/releases/tag/tig-2.5.8\r\n";

        assert_eq!(
            match_url_in_body("tig", body).unwrap(),
            "https://github.com/jonas/tig/releases/tag/tig-2.5.8"
        );
    }

    #[tokio::test]
    async fn issue_body_supplies_url_for_other_packages() {
        let issue = component_issue(
            4711,
            "[New git-lfs version] v3.4.1",
            "A new version is out:\n\nhttps://github.com/git-lfs/git-lfs/releases/tag/v3.4.1",
        );

        let note = offline_composer().compose(&issue).await.unwrap();

        assert_eq!(
            note.message,
            "Comes with [Git LFS v3.4.1](https://github.com/git-lfs/git-lfs/releases/tag/v3.4.1)."
        );
        assert_eq!(note.package, "git-lfs");
    }

    #[tokio::test]
    async fn pull_request_explicit_mention_wins() {
        let pr = pull_request(
            99,
            "tig: update to 2.5.8",
            "See https://github.com/jonas/tig/releases/tag/tig-2.5.8 for details\nhttps://github.com/git-for-windows/git/issues/4711",
        );

        let note = offline_composer().compose(&pr).await.unwrap();

        assert_eq!(
            note.message,
            "Comes with [Tig v2.5.8](https://github.com/jonas/tig/releases/tag/tig-2.5.8)."
        );
    }

    #[test_log::test(tokio::test)]
    async fn pull_request_follows_cross_reference() {
        let mut api = MockGithubApi::new();
        api.expect_request()
            .withf(|req| req.path == "/repos/git-for-windows/git/issues/4711")
            .times(1)
            .returning(|_| {
                Ok(serde_json::json!({
                    "number": 4711,
                    "title": "[New bash version] 5.2 patch 21",
                    "body": "https://ftp.gnu.org/gnu/bash/bash-5.2-patches/bash52-021\nhttps://other.example/\n",
                    "labels": [{ "name": "component-update" }]
                }))
            });

        let composer =
            ReleaseNoteComposer::new(Arc::new(api), &GithubConfig::default())
                .unwrap();

        let pr = pull_request(
            100,
            "bash: update to 5.2.21",
            "This closes https://github.com/git-for-windows/git/issues/4711",
        );

        let note = composer.compose(&pr).await.unwrap();

        assert_eq!(
            note.message,
            "Comes with [Bash v5.2.21](https://ftp.gnu.org/gnu/bash/bash-5.2-patches/bash52-021)."
        );
    }

    #[tokio::test]
    async fn cross_reference_fetch_failure_propagates() {
        let mut api = MockGithubApi::new();
        api.expect_request().times(1).returning(|req| {
            Err(ComponentUpdateError::Transport {
                status: 404,
                status_message: "Not Found".into(),
                method: req.method.to_string(),
                path: req.path,
                body: "{}".into(),
                json: None,
            })
        });

        let composer =
            ReleaseNoteComposer::new(Arc::new(api), &GithubConfig::default())
                .unwrap();

        let pr = pull_request(
            101,
            "tig: update to 2.5.8",
            "https://github.com/git-for-windows/git/issues/1",
        );

        let result = composer.compose(&pr).await;

        assert!(matches!(
            result,
            Err(ComponentUpdateError::Transport { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn pull_request_without_hints_cannot_resolve() {
        let pr = pull_request(
            102,
            "tig: update to 2.5.8",
            "https://github.com/jonas/tig/releases/tag/tig-2.5.8",
        );

        let result = offline_composer().compose(&pr).await;

        assert!(matches!(
            result,
            Err(ComponentUpdateError::Resolution { number: 102 })
        ));
    }

    #[tokio::test]
    async fn issues_need_exactly_one_component_update_label() {
        let mut unlabeled =
            component_issue(7, "[New perl version] 5.38.0", "");
        unlabeled.labels.clear();

        let mut doubly_labeled =
            component_issue(8, "[New perl version] 5.38.0", "");
        doubly_labeled.labels.push(Label {
            name: COMPONENT_UPDATE_LABEL.to_string(),
        });

        let composer = offline_composer();

        assert!(matches!(
            composer.compose(&unlabeled).await,
            Err(ComponentUpdateError::Precondition { number: 7 })
        ));
        assert!(matches!(
            composer.compose(&doubly_labeled).await,
            Err(ComponentUpdateError::Precondition { number: 8 })
        ));
    }

    #[tokio::test]
    async fn unparseable_titles_fail_extraction() {
        let issue = component_issue(9, "Please update things", "");

        let result = offline_composer().compose(&issue).await;

        assert!(matches!(
            result,
            Err(ComponentUpdateError::Extraction { .. })
        ));
    }

    #[tokio::test]
    async fn custom_resolver_chain_is_tried_in_order() {
        struct Fixed(&'static str);

        #[async_trait]
        impl ChangelogResolver for Fixed {
            fn name(&self) -> &'static str {
                "fixed"
            }

            async fn resolve(
                &self,
                _ctx: &ResolveContext<'_>,
            ) -> Result<Option<String>> {
                Ok(Some(self.0.to_string()))
            }
        }

        let composer = ReleaseNoteComposer::with_resolvers(vec![
            Box::new(ExplicitMentionResolver),
            Box::new(Fixed("https://first.example/")),
            Box::new(Fixed("https://second.example/")),
        ]);

        let issue = component_issue(10, "[New mintty version] 3.6.5", "");
        let note = composer.compose(&issue).await.unwrap();

        assert_eq!(
            note.message,
            "Comes with [MinTTY v3.6.5](https://first.example/)."
        );
    }

    #[test]
    fn release_note_serializes_with_type_field() {
        let note = ReleaseNote {
            kind: NoteKind::Feature,
            message: "Comes with [cURL v8.4.0](https://curl.se/changes.html#8_4_0).".into(),
            package: "curl".into(),
            version: "8.4.0".into(),
        };

        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["type"], "feature");
        assert_eq!(json["package"], "curl");
    }
}
