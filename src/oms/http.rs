use super::{AppSecret, OmsApi, Query, Record, collect_pages};
use crate::error::{Error, Result};
use crate::measure::LatencyMeasurer;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use spdlog::{debug, info};
use std::time::Duration;

pub struct OmsClientOptions {
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for OmsClientOptions {
    fn default() -> Self {
        Self {
            base_url: "https://cmsoms.cern.ch/agg/api".to_string(),
            api_version: "v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Deserialize)]
struct Page {
    data: Vec<Record>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

/// Blocking HTTP client for the OMS aggregation API.
pub struct OmsClient {
    http: Client,
    base_url: String,
    api_version: String,
    token: Option<String>,
    latency: LatencyMeasurer,
}

impl OmsClient {
    pub fn new(options: OmsClientOptions) -> Result<Self> {
        let base_url = options.base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|source| Error::Http {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            api_version: options.api_version,
            token: None,
            latency: LatencyMeasurer::new(),
        })
    }

    /// Uses an already issued bearer token instead of the credentials flow.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Exchanges the application credentials for a bearer token.
    pub fn authenticate(&mut self, secret: &AppSecret, token_url: &str, audience: &str) -> Result<()> {
        info!("[OMS] Requesting token for client {}", secret.client_id);
        let response = self
            .http
            .post(token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("audience", audience),
            ])
            .send()
            .map_err(|source| Error::Http {
                url: token_url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().map_err(|source| Error::Http {
            url: token_url.to_string(),
            source,
        })?;
        self.token = Some(token_from_response(status, &body)?);
        Ok(())
    }

    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_version, resource)
    }

    pub fn latency(&self) -> &LatencyMeasurer {
        &self.latency
    }

    fn page_request(&self, query: &Query, offset: usize) -> RequestBuilder {
        let url = self.resource_url(&query.resource);
        let params = query.page_params(offset);
        debug!("[OMS] GET {} {:?}", url, params);

        let request = self.http.get(&url).query(&params);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn fetch_page(&mut self, query: &Query, offset: usize) -> Result<Vec<Record>> {
        let url = self.resource_url(&query.resource);
        let request = self.page_request(query, offset);

        let _guard = self.latency.measure_with_guard();
        let response = request.send().map_err(|source| Error::Http {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        let body = response.text().map_err(|source| Error::Http {
            url: url.clone(),
            source,
        })?;
        page_from_response(&url, status, &body)
    }
}

fn token_from_response(status: StatusCode, body: &str) -> Result<String> {
    let token: TokenResponse = serde_json::from_str(body)
        .map_err(|e| Error::Auth(format!("HTTP {}: undecodable token response: {}", status, e)))?;

    match token.access_token {
        Some(access_token) if status.is_success() => Ok(access_token),
        _ => Err(Error::Auth(format!(
            "HTTP {}: {}",
            status,
            token
                .error_description
                .unwrap_or_else(|| "no access_token in response".to_string())
        ))),
    }
}

fn page_from_response(url: &str, status: StatusCode, body: &str) -> Result<Vec<Record>> {
    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: body.to_string(),
        });
    }
    parse_page(body).map_err(|e| Error::Decode(format!("{}: {}", url, e)))
}

fn parse_page(body: &str) -> serde_json::Result<Vec<Record>> {
    let page: Page = serde_json::from_str(body)?;
    Ok(page.data)
}

impl OmsApi for OmsClient {
    fn fetch(&mut self, query: &Query) -> Result<Vec<Record>> {
        collect_pages(query, |offset| self.fetch_page(query, offset))
    }
}
