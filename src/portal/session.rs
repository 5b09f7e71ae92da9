//! Blocking HTTP transport used by the portal client.
//!
//! Two kinds of requests are made against the portal:
//! - plain requests that carry an explicit `Cookie` header (login page, data
//!   endpoints) and never touch a cookie jar
//! - the login form submission, which goes through an [`HttpSession`] whose
//!   jar records every cookie set along the redirect chain

use crate::error::TransportError;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;

/// What the client keeps of a portal response.
#[derive(Debug, Clone)]
pub struct PortalResponse {
    /// Final URL after redirects
    pub url: String,
    pub status: reqwest::StatusCode,
    /// `name=value` pairs from the response's `Set-Cookie` headers
    pub cookies: Vec<(String, String)>,
    pub body: String,
}

impl PortalResponse {
    /// Builds a `Cookie` header value from the cookies this response set.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Returns the body of a successful response, or a status error.
    pub fn into_success_body(self) -> Result<String, TransportError> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(TransportError::status(self.status, self.body))
        }
    }
}

/// Builds a blocking client following redirects, optionally with a cookie
/// jar. The timeout applies uniformly to every request made with it.
pub fn build_http_client(
    timeout: Option<Duration>,
    jar: Option<Arc<Jar>>,
) -> Result<HttpClient, TransportError> {
    let mut builder = HttpClient::builder().redirect(Policy::limited(MAX_REDIRECTS));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(jar) = jar {
        builder = builder.cookie_provider(jar);
    }
    Ok(builder.build()?)
}

/// Sends a request and reads the whole response.
pub fn send(request: RequestBuilder) -> Result<PortalResponse, TransportError> {
    let response = request.send()?;
    let url = response.url().to_string();
    let status = response.status();
    let cookies = response
        .cookies()
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect();
    let body = response.text()?;

    Ok(PortalResponse {
        url,
        status,
        cookies,
        body,
    })
}

/// Login session: an HTTP client bound to its own cookie jar.
///
/// Owned by exactly one portal client and dropped when the session is
/// closed.
pub struct HttpSession {
    client: HttpClient,
    jar: Arc<Jar>,
}

impl HttpSession {
    pub fn open(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let client = build_http_client(timeout, Some(Arc::clone(&jar)))?;
        Ok(Self { client, jar })
    }

    /// Posts a url-encoded form, following redirects.
    pub fn post_form(
        &self,
        url: &str,
        headers: HeaderMap,
        form: &[(&str, &str)],
    ) -> Result<PortalResponse, TransportError> {
        send(self.client.post(url).headers(headers).form(form))
    }

    /// Value of the cookie `name` the jar would send to `url`.
    pub fn cookie(&self, name: &str, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let header = self.jar.cookies(&url)?;
        let header = header.to_str().ok()?;
        crate::portal::scrape::find_cookie(header, name)
    }
}
