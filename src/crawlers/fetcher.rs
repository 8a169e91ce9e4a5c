use crate::config::{RequestHeaders, ScraperConfig};
use crate::crawlers::crawler::PageSource;
use crate::error::{Error, Result};
use crate::parsers::RawDocument;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::{Certificate, Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// A single page request, built per page and dropped after use
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub company: String,
    pub page: u32,
    pub url: Url,
}

impl PageRequest {
    /// Substitute `{company}` and `{page}` into the template
    pub fn new(template: &str, company: &str, page: u32) -> Result<Self> {
        let raw = template
            .replace("{company}", company)
            .replace("{page}", &page.to_string());
        let url = Url::parse(&raw).map_err(|e| Error::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            company: company.to_string(),
            page,
            url,
        })
    }
}

/// HTTP fetcher for review pages.
///
/// Holds a verifying client and a non-verifying one. With `bypass_ssl` only
/// the latter is used; otherwise the verifying client goes first and, when
/// `insecure_fallback` is on, any failure is retried once without
/// certificate checks. Responses on that path are unauthenticated.
pub struct Fetcher {
    company: String,
    url_template: String,
    verified: Option<Client>,
    insecure: Client,
    insecure_fallback: bool,
}

impl Fetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let headers = build_headers(&config.headers)?;

        let verified = if config.bypass_ssl {
            ::log::warn!("SSL verification disabled; responses are not authenticated");
            None
        } else {
            Some(build_client(config, headers.clone(), false)?)
        };

        Ok(Self {
            company: config.company.clone(),
            url_template: config.url_template.clone(),
            verified,
            insecure: build_client(config, headers, true)?,
            insecure_fallback: config.insecure_fallback,
        })
    }

    /// GET the request's URL; anything but 200 becomes `Error::Status`
    pub async fn fetch(&self, request: &PageRequest) -> Result<String> {
        let response = self.send(request).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn send(&self, request: &PageRequest) -> Result<Response> {
        let Some(client) = &self.verified else {
            return Ok(self.insecure.get(request.url.clone()).send().await?);
        };

        match client.get(request.url.clone()).send().await {
            Ok(response) => Ok(response),
            Err(e) if self.insecure_fallback => {
                ::log::warn!("Certificate error: {}", e);
                ::log::warn!("Retrying page {} with SSL verification disabled...", request.page);
                Ok(self.insecure.get(request.url.clone()).send().await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl PageSource for Fetcher {
    async fn fetch_page(&self, page: u32) -> Result<RawDocument> {
        let request = PageRequest::new(&self.url_template, &self.company, page)?;
        ::log::debug!("GET {}", request.url);
        let body = self.fetch(&request).await?;
        Ok(RawDocument::new(page, body))
    }
}

fn build_headers(headers: &RequestHeaders) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in [
        (USER_AGENT, &headers.user_agent),
        (ACCEPT_LANGUAGE, &headers.accept_language),
        (ACCEPT, &headers.accept),
        (REFERER, &headers.referer),
    ] {
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Config(format!("invalid {} header: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn build_client(config: &ScraperConfig, headers: HeaderMap, accept_invalid: bool) -> Result<Client> {
    let mut builder = Client::builder()
        .default_headers(headers)
        .danger_accept_invalid_certs(accept_invalid);

    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    if !accept_invalid {
        if let Some(path) = &config.ca_bundle {
            let pem = std::fs::read(path)?;
            builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
        }
    }

    Ok(builder.build()?)
}
