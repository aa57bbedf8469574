use reqwest::{Method, header::HeaderMap};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone)]
/// A single call against the GitHub API (or another JSON host).
pub struct ApiRequest {
    /// Host to talk to; `None` selects the configured API host.
    pub hostname: Option<String>,
    pub method: Method,
    /// Absolute request path, e.g. `/repos/owner/repo/issues/1`.
    pub path: String,
    /// Optional JSON payload.
    pub body: Option<Value>,
    /// Extra headers; these replace the defaults on conflict.
    pub headers: HeaderMap,
}

impl ApiRequest {
    /// GET request against the default API host.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            hostname: None,
            method: Method::GET,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
/// The subset of a GitHub issue or pull request this crate reads.
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Present (as an object) only when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Body text, empty when GitHub reports `null`.
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// Number of labels with the given name.
    pub fn label_count(&self, name: &str) -> usize {
        self.labels.iter().filter(|label| label.name == name).count()
    }
}
