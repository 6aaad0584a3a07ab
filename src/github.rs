//! Pull request fetching from GitHub.
//!
//! Uses reqwest against the GitHub REST API.

use crate::config::GitHubConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// User-Agent string; GitHub rejects requests without one
const USER_AGENT: &str = concat!("prsumma/", env!("CARGO_PKG_VERSION"));

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("failed to reach GitHub: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("GitHub API error fetching PR: {status} - {body}")]
    Api { status: StatusCode, body: String },
}

/// The parts of a pull request that get summarised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: i64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: i64,
    title: String,
    body: Option<String>,
}

impl From<PullRequestResponse> for PullRequest {
    fn from(pr: PullRequestResponse) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            // GitHub sends null for an empty description
            body: pr.body.unwrap_or_default(),
        }
    }
}

/// Anything that can look up a pull request by number.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Returns `Ok(None)` when the pull request or repository does not exist.
    async fn fetch_pull_request(&self, pr_number: i64) -> Result<Option<PullRequest>, GitHubError>;
}

/// Token-authenticated client bound to a single repository.
pub struct GitHubClient {
    client: Client,
    config: GitHubConfig,
}

/// Create a configured HTTP client for the GitHub API
fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(USER_AGENT).build()
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        Ok(Self {
            client: create_client()?,
            config: config.clone(),
        })
    }

    fn pull_url(&self, pr_number: i64) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.config.api_url, self.config.owner, self.config.repo, pr_number
        )
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn fetch_pull_request(&self, pr_number: i64) -> Result<Option<PullRequest>, GitHubError> {
        info!(
            "Fetching PR #{} from {}/{}",
            pr_number, self.config.owner, self.config.repo
        );

        let response = self
            .client
            .get(self.pull_url(pr_number))
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            info!("PR #{} not found", pr_number);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api { status, body });
        }

        let pr: PullRequestResponse = response.json().await?;
        Ok(Some(pr.into()))
    }
}
