// Release check - is there a newer playlift on GitHub?
// Asks at most once a week, remembers the answer, never fails the run

pub mod cache;
pub mod version;

pub use cache::VersionCache;
pub use version::AppVersion;

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Where releases are published
pub const GITHUB_REPO: &str = "himokai/playlift";

/// How long a cached answer stays good
pub const CHECK_INTERVAL_DAYS: i64 = 7;

static TAG_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""tag_name"\s*:\s*"([^"]+)""#).expect("tag_name regex should compile"));

/// Upper bound on the one network call
pub const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("release check request failed: {0}")]
    Transport(String),
}

/// A response arrived, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub success: bool,
    pub body: String,
}

/// Something that can ask for the latest release of a repo
#[allow(async_fn_in_trait)]
pub trait ReleaseFetcher {
    /// `Err` only when no response came back at all
    async fn fetch_latest(&self, repo: &str, user_agent: &str) -> Result<FetchResponse, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCheckResult {
    pub update_available: bool,
    pub current: AppVersion,
    pub latest: Option<AppVersion>,
    pub repo: String,
}

/// Client identifier sent with the request, e.g. `himokai.playlift/0.1.0`
pub fn user_agent(repo: &str, current: AppVersion) -> String {
    format!("{}/{}", repo.replace('/', "."), current.semantic())
}

/// Pull `"tag_name": "<value>"` out of a release body
pub fn extract_tag_name(body: &str) -> Option<&str> {
    TAG_NAME_REGEX.captures(body)?.get(1).map(|m| m.as_str())
}

/// Tag to version: one leading `v`/`V` is dropped, the rest must be `major.minor.patch`
pub fn version_from_tag(tag: &str) -> Option<AppVersion> {
    let trimmed = tag.strip_prefix(['v', 'V']).unwrap_or(tag);
    AppVersion::parse_semantic(trimmed)
}

pub fn needs_check(cache: &VersionCache, now: DateTime<Utc>) -> bool {
    match cache.last_checked() {
        Some(last) => now - last >= Duration::days(CHECK_INTERVAL_DAYS),
        None => true,
    }
}

pub async fn check_latest_release<F: ReleaseFetcher>(
    current: AppVersion,
    repo: &str,
    cache_path: &Path,
    fetcher: &F,
) -> VersionCheckResult {
    check_latest_release_at(current, repo, cache_path, fetcher, Utc::now()).await
}

/// Same as [`check_latest_release`] with an explicit clock
pub async fn check_latest_release_at<F: ReleaseFetcher>(
    current: AppVersion,
    repo: &str,
    cache_path: &Path,
    fetcher: &F,
    now: DateTime<Utc>,
) -> VersionCheckResult {
    let mut cache = VersionCache::load(cache_path);
    let mut latest = cache.latest_version();

    if needs_check(&cache, now) {
        match fetcher.fetch_latest(repo, &user_agent(repo, current)).await {
            Ok(response) => {
                // Any response counts as a check, even an error page
                cache.set_last_checked(now);

                let fetched = response
                    .success
                    .then(|| extract_tag_name(&response.body).and_then(version_from_tag))
                    .flatten();
                match fetched {
                    Some(version) => {
                        cache.set_latest_version(version);
                        latest = Some(version);
                    }
                    None => debug!("No usable release tag in response (success: {})", response.success),
                }

                if let Err(e) = cache.save() {
                    debug!("Could not save version cache {}: {}", cache.path().display(), e);
                }
            }
            Err(e) => debug!("{}", e),
        }
    }

    VersionCheckResult {
        update_available: latest.is_some_and(|version| version > current),
        current,
        latest,
        repo: repo.to_string(),
    }
}

#[cfg(feature = "update-check")]
pub use http::HttpReleaseFetcher;

#[cfg(feature = "update-check")]
mod http {
    use super::{FetchError, FetchResponse, ReleaseFetcher, FETCH_TIMEOUT};
    use reqwest::header::{ACCEPT, USER_AGENT};

    /// GitHub releases API over reqwest
    #[derive(Debug, Clone)]
    pub struct HttpReleaseFetcher {
        client: reqwest::Client,
        api_base: String,
    }

    impl HttpReleaseFetcher {
        pub fn new() -> Result<Self, FetchError> {
            Self::with_api_base("https://api.github.com")
        }

        pub fn with_api_base(api_base: &str) -> Result<Self, FetchError> {
            let client = reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            Ok(Self {
                client,
                api_base: api_base.trim_end_matches('/').to_string(),
            })
        }

        pub fn release_url(&self, repo: &str) -> String {
            format!("{}/repos/{}/releases/latest", self.api_base, repo)
        }
    }

    impl ReleaseFetcher for HttpReleaseFetcher {
        async fn fetch_latest(&self, repo: &str, user_agent: &str) -> Result<FetchResponse, FetchError> {
            let response = self
                .client
                .get(self.release_url(repo))
                .header(USER_AGENT, user_agent)
                .header(ACCEPT, "application/vnd.github+json")
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                return Ok(FetchResponse {
                    success: false,
                    body: String::new(),
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            Ok(FetchResponse { success: true, body })
        }
    }
}
