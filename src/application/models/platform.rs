use crate::constants::{INSTAGRAM_HOSTS, INSTAGRAM_LOGIN_URL, THREADS_HOSTS, THREADS_LOGIN_URL};
use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Social network a post lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Threads,
    Instagram,
}

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[Platform::Threads, Platform::Instagram]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Threads => "threads",
            Platform::Instagram => "instagram",
        }
    }

    pub fn login_url(&self) -> &'static str {
        match self {
            Platform::Threads => THREADS_LOGIN_URL,
            Platform::Instagram => INSTAGRAM_LOGIN_URL,
        }
    }

    fn hosts(&self) -> &'static [&'static str] {
        match self {
            Platform::Threads => THREADS_HOSTS,
            Platform::Instagram => INSTAGRAM_HOSTS,
        }
    }

    /// Case-insensitive substring match of `host` against each allow-list.
    pub fn from_host(host: &str) -> Option<Platform> {
        let host = host.to_lowercase();
        Platform::all()
            .iter()
            .copied()
            .find(|p| p.hosts().iter().any(|known| host.contains(known)))
    }

    /// Derives the platform of a post URL without touching the network.
    pub fn detect(url: &str) -> Result<Platform, FetchError> {
        let parsed = parse_http_url(url)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl(format!("missing host in {url}")))?;
        Platform::from_host(host).ok_or_else(|| FetchError::UnsupportedPlatform(host.to_string()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "threads" => Ok(Platform::Threads),
            "instagram" => Ok(Platform::Instagram),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

fn parse_http_url(url: &str) -> Result<Url, FetchError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidUrl("empty url".to_string()));
    }
    let parsed =
        Url::parse(trimmed).map_err(|e| FetchError::InvalidUrl(format!("{trimmed}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl(format!("unsupported scheme {other}"))),
    }
}

/// A validated post URL with the pieces the pipeline logs and routes on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUrl {
    pub url: String,
    pub platform: Platform,
    pub host: String,
    pub post_id: Option<String>,
}

impl PostUrl {
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        let platform = Platform::detect(raw)?;
        let parsed = parse_http_url(raw)?;
        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let markers: &[&str] = match platform {
            Platform::Instagram => &["p", "reel", "reels", "tv"],
            Platform::Threads => &["post", "t"],
        };
        let post_id = segments
            .windows(2)
            .find(|pair| markers.contains(&pair[0]))
            .map(|pair| pair[1].to_string());

        Ok(Self {
            url: raw.trim().to_string(),
            platform,
            host,
            post_id,
        })
    }
}

/// Outcome of the URL-validation surface.
#[derive(Debug, Clone, Serialize)]
pub struct UrlValidation {
    pub valid: bool,
    pub platform: Option<Platform>,
    pub post_id: Option<String>,
    pub supported_platforms: Vec<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn validate_url(url: &str) -> UrlValidation {
    let supported_platforms = Platform::all().to_vec();
    match PostUrl::parse(url) {
        Ok(post) => UrlValidation {
            valid: true,
            platform: Some(post.platform),
            post_id: post.post_id,
            supported_platforms,
            error: None,
        },
        Err(e) => UrlValidation {
            valid: false,
            platform: None,
            post_id: None,
            supported_platforms,
            error: Some(e.to_string()),
        },
    }
}
