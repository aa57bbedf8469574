//! Traits related to the remote collaborators
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use crate::{
    error::Result,
    forge::request::{ApiRequest, Issue},
};

/// Authenticated access to the GitHub API. The implementor carries the
/// session (token, user agent); callers never inspect it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// Perform the request and decode the response as JSON.
    async fn request(&self, req: ApiRequest) -> Result<Value>;
}

/// Existence check for published artifacts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UrlProbe: Send + Sync {
    /// `true` if the URL answers 404, `false` if it answers 200.
    async fn returns_404(&self, url: &str) -> Result<bool>;
}

/// Fetch a single issue (or pull request) from `owner/repo`.
pub async fn get_issue(
    api: &dyn GithubApi,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<Issue> {
    let value = api
        .request(ApiRequest::get(format!(
            "/repos/{owner}/{repo}/issues/{number}"
        )))
        .await?;

    Ok(serde_json::from_value(value)?)
}
