//! Implements the GithubApi trait on top of reqwest
use async_trait::async_trait;
use log::*;
use reqwest::{
    Client, Method, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::{
    config::GithubConfig,
    error::{ComponentUpdateError, Result},
    forge::{request::ApiRequest, traits::GithubApi},
};

/// GitHub REST client. Owns the authentication context handed to every
/// request.
pub struct GithubClient {
    config: GithubConfig,
    token: Option<SecretString>,
    client: Client,
}

impl GithubClient {
    pub fn new(config: GithubConfig, token: Option<SecretString>) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            config,
            token,
            client,
        })
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, header_value(&self.config.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            let value = format!("Bearer {}", token.expose_secret());
            let mut value = header_value(&value)?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| {
        ComponentUpdateError::invalid_config(format!(
            "invalid header value: {err}"
        ))
    })
}

/// Reply used for 204 responses, which carry no JSON body.
fn no_content(status: StatusCode) -> Value {
    serde_json::json!({
        "statusCode": status.as_u16(),
        "statusMessage": status.canonical_reason().unwrap_or_default(),
    })
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn request(&self, req: ApiRequest) -> Result<Value> {
        let host = req.hostname.as_deref().unwrap_or(&self.config.api_host);
        let url = format!("https://{host}{}", req.path);

        let mut headers = self.default_headers()?;

        let mut builder = self.client.request(req.method.clone(), &url);

        if let Some(body) = &req.body {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            builder = builder.body(serde_json::to_string(body)?);
        }

        headers.extend(req.headers);

        debug!("{} {url}", req.method);

        let response = builder.headers(headers).send().await?;
        let status = response.status();
        let text = response.text().await?;

        decode_response(status, text, &req.method, &req.path)
    }
}

/// Turn a status and body into the JSON reply. 204 carries no body, any
/// other non-2xx becomes a transport error.
fn decode_response(
    status: StatusCode,
    text: String,
    method: &Method,
    path: &str,
) -> Result<Value> {
    if status == StatusCode::NO_CONTENT {
        return Ok(no_content(status));
    }

    if !status.is_success() {
        error!("{method} {path} failed with status {status}");
        return Err(ComponentUpdateError::Transport {
            status: status.as_u16(),
            status_message: status
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
            method: method.to_string(),
            path: path.to_string(),
            json: serde_json::from_str(&text).ok(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|_| ComponentUpdateError::Parse(text))
}
