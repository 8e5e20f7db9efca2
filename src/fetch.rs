use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use std::time::{Duration, Instant};
use url::Url;
use crate::error::{ErrorCode, Result, WlmError, WithContext};

/// Start and end of one page load on the monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub start: Instant,
    pub end: Instant,
}

impl Timing {
    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }
}

/// Loads a page and reports how long the load took.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Timing>;
}

/// Times a full GET: request, status line, headers and the whole body.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wlm/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .with_context(|| "building HTTP client".to_string())?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Timing> {
        let parsed = parse_page_url(url)?;

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .with_context(|| format!("fetching {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let code = if status.is_server_error() { ErrorCode::E203 } else { ErrorCode::E202 };
            return Err(WlmError::fetch(code, format!("{} answered {}", url, status)));
        }
        if !is_text_content(response.headers().get(CONTENT_TYPE)) {
            return Err(WlmError::fetch(
                ErrorCode::E206,
                format!("{} did not return a text document", url),
            ));
        }

        response
            .bytes()
            .with_context(|| format!("reading body of {}", url))?;
        let end = Instant::now();

        Ok(Timing { start, end })
    }
}

/// Only absolute http(s) URLs can be fetched.
pub fn parse_page_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).with_context(|| format!("parsing {}", url))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(WlmError::fetch(
            ErrorCode::E204,
            format!("unsupported scheme '{}' in {}", other, url),
        )),
    }
}

/// Missing content type is treated as text.
fn is_text_content(header: Option<&HeaderValue>) -> bool {
    let Some(value) = header.and_then(|v| v.to_str().ok()) else {
        return true;
    };
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime.starts_with("text/")
        || mime.ends_with("+xml")
        || mime.ends_with("/xml")
        || mime.ends_with("/json")
        || mime == "application/javascript"
        || mime == "application/xhtml+xml"
}
