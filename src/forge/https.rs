//! Raw HTTPS access to artifact hosts and upstream web pages.
use async_trait::async_trait;
use log::*;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, USER_AGENT},
    redirect::Policy,
};
use url::Url;

use crate::{
    error::{ComponentUpdateError, Result},
    forge::traits::UrlProbe,
};

/// Parse a `https://host[:port][/path]` URL. Any other scheme is rejected.
pub fn parse_https_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|_| ComponentUpdateError::InvalidUrl(url.to_string()))?;

    if parsed.scheme() != "https" || parsed.host_str().is_none() {
        return Err(ComponentUpdateError::InvalidUrl(url.to_string()));
    }

    Ok(parsed)
}

/// Client for unauthenticated HTTPS requests. Redirects are not followed,
/// so a moved artifact surfaces as an unexpected status.
pub struct HttpsClient {
    client: Client,
    user_agent: String,
}

impl HttpsClient {
    pub fn new(user_agent: impl Into<String>) -> Result<Self> {
        let client = Client::builder().redirect(Policy::none()).build()?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
        })
    }

    /// Fetch an HTML page.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let parsed = parse_https_url(url)?;
        let path = parsed.path().to_string();

        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "text/html")
            .send()
            .await?;

        let status = response.status();
        let html = response.text().await?;

        html_result(status, path, html)
    }
}

/// Keep the page on success; on any non-2xx status the page becomes the
/// body of the transport error.
fn html_result(status: StatusCode, path: String, html: String) -> Result<String> {
    if !status.is_success() {
        return Err(ComponentUpdateError::Transport {
            status: status.as_u16(),
            status_message: status
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
            method: "GET".to_string(),
            path,
            body: html,
            json: None,
        });
    }

    Ok(html)
}

/// Interpret a HEAD status: only 404 and 200 carry an answer.
fn probe_result(url: &str, status: StatusCode) -> Result<bool> {
    match status {
        StatusCode::NOT_FOUND => Ok(true),
        StatusCode::OK => Ok(false),
        _ => Err(ComponentUpdateError::Probe {
            url: url.to_string(),
            status: status.as_u16(),
        }),
    }
}

#[async_trait]
impl UrlProbe for HttpsClient {
    async fn returns_404(&self, url: &str) -> Result<bool> {
        let parsed = parse_https_url(url)?;

        let response = self
            .client
            .head(parsed)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        debug!("HEAD {url}: {}", response.status());

        probe_result(url, response.status())
    }
}
