//! Session-authenticated client for a ktistec server.
//!
//! Posting is a four step exchange over one cookie-carrying client:
//! fetch the login form token, log in, fetch a fresh token from the
//! authenticated home page, then submit to the actor's outbox.

use std::time::Duration;

use reqwest::{
    blocking::{Client, Response},
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use scraper::{Html, Selector};
use tracing::debug;

use crate::{error::AppError, message::anchor, profile::ProfileConfig};

/// Default timeout for connecting and for each request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Name of the hidden form field carrying the CSRF token
const TOKEN_FIELD: &str = "authenticity_token";

/// Client bound to one profile's server and credentials
pub struct KtistecSession<'a> {
    http: Client,
    profile: &'a ProfileConfig,
    base_url: String,
}

impl<'a> KtistecSession<'a> {
    pub fn new(profile: &'a ProfileConfig, timeout: Duration) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));

        let http = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(KtistecSession {
            http,
            profile,
            base_url: profile.server_url().trim_end_matches('/').to_string(),
        })
    }

    fn sessions_url(&self) -> String {
        format!("{}/sessions", self.base_url)
    }

    fn outbox_url(&self) -> String {
        format!("{}/actors/{}/outbox", self.base_url, self.profile.user_name())
    }

    /// Fetches `url` and pulls the CSRF token out of its HTML
    fn fetch_token(&self, url: &str) -> Result<String, AppError> {
        let res = self.http.get(url).send()?;
        let body = read_body(res)?;
        extract_token(&body)
    }

    /// Logs in with the profile's credentials
    fn login(&self) -> Result<(), AppError> {
        let token = self.fetch_token(&self.sessions_url())?;
        let res = self
            .http
            .post(self.sessions_url())
            .form(&[
                ("username", self.profile.user_name()),
                ("password", self.profile.password()),
                (TOKEN_FIELD, token.as_str()),
            ])
            .send()?;
        debug!(status = %res.status(), "login response");
        if !res.status().is_success() {
            return Err(AppError::Auth(res.status()));
        }
        Ok(())
    }

    /// Publishes `message`, followed by one line per link, to the actor's outbox
    pub fn post(&self, message: &str, links: &[String]) -> Result<(), AppError> {
        self.login()?;
        let token = self.fetch_token(&format!("{}/", self.base_url))?;
        let content = build_content(message, links);
        debug!(%content, "submitting post");

        let res = self
            .http
            .post(self.outbox_url())
            .form(&[
                ("type", "Publish"),
                ("public", "true"),
                ("content", content.as_str()),
                (TOKEN_FIELD, token.as_str()),
            ])
            .send()?;
        debug!(status = %res.status(), "outbox response");
        if !res.status().is_success() {
            return Err(AppError::Submit(res.status()));
        }
        Ok(())
    }
}

fn read_body(res: Response) -> Result<String, AppError> {
    debug!(status = %res.status(), url = %res.url(), "token page response");
    let body = res.error_for_status()?.text()?;
    debug!(%body);
    Ok(body)
}

/// Reads the value of the hidden `authenticity_token` input
pub fn extract_token(html: &str) -> Result<String, AppError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"input[type="hidden"][name="authenticity_token"]"#)
        .map_err(|e| AppError::Protocol(format!("invalid token selector: {e}")))?;

    document
        .select(&selector)
        .find_map(|input| input.value().attr("value"))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Protocol("failed to get CSRF token".to_string()))
}

/// `<div>{message}<br><a ..>link</a>...</div>`, links in the given order
pub fn build_content(message: &str, links: &[String]) -> String {
    let link_tags: String = links
        .iter()
        .map(|url| format!("<br>{}", anchor(url)))
        .collect();
    format!("<div>{message}{link_tags}</div>")
}
