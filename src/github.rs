use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::parser::record::Author;

pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const USER_AGENT: &str = concat!("readme_scoreboard/", env!("CARGO_PKG_VERSION"));

const ISSUE_QUERY: &str = r#"
query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) {
      title
      bodyText
      updatedAt
      author {
        login
        url
        avatarUrl(size: 24)
      }
    }
  }
}
"#;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GraphQL request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GraphQL endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed GraphQL response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("GraphQL errors: {0}")]
    GraphQl(String),
    #[error("issue #{number} not found in {repo}")]
    NotFound { repo: RepoRef, number: u64 },
}

/// `owner/name` of the repository holding the issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, name) = full_name.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The fields of a submission issue the scoreboard reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub title: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// `None` when the account was deleted.
    #[serde(default)]
    pub author: Option<Author>,
}

impl Issue {
    pub fn author(&self) -> Author {
        self.author.clone().unwrap_or_else(Author::ghost)
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<IssueData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct IssueData {
    repository: Option<RepositoryData>,
}

#[derive(Deserialize)]
struct RepositoryData {
    issue: Option<Issue>,
}

pub struct GithubClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GithubClient {
    pub fn new(endpoint: &str, token: &str) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(GithubClient {
            http,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }

    /// Single query, no retry: any failure ends the run.
    pub async fn fetch_issue(&self, repo: &RepoRef, number: u64) -> Result<Issue, FetchError> {
        info!("Fetching issue #{} from {}", number, repo);
        let payload = json!({
            "query": ISSUE_QUERY,
            "variables": {
                "owner": repo.owner,
                "name": repo.name,
                "number": number,
            },
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        parse_issue_response(&body, repo, number)
    }
}

pub fn parse_issue_response(body: &str, repo: &RepoRef, number: u64) -> Result<Issue, FetchError> {
    let parsed: GraphQlResponse = serde_json::from_str(body)?;
    if !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
        return Err(FetchError::GraphQl(messages.join("; ")));
    }

    parsed
        .data
        .and_then(|d| d.repository)
        .and_then(|r| r.issue)
        .ok_or_else(|| FetchError::NotFound {
            repo: repo.clone(),
            number,
        })
}

// ── Tests ──
