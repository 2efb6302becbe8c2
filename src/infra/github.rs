use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, RequestBuilder, Response,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::config::Repository;
use crate::error::{AppError, AppResult};
use crate::services::{CreatedIssue, IssueDraft, IssueTrackerService, LabelOutcome};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const CLIENT_USER_AGENT: &str = concat!("sf2gh/", env!("CARGO_PKG_VERSION"));
const ALREADY_EXISTS: &str = "already_exists";

pub struct GitHubClient {
    http: Client,
    api_url: String,
    repository: Repository,
    auth: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, repository: Repository, user: &str, token: &str) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            repository,
            auth: Self::auth_header(user, token),
        }
    }

    fn auth_header(user: &str, token: &str) -> String {
        let credentials = format!("{user}:{token}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn repo_endpoint(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.repository.owner, self.repository.name, path
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, &self.auth)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        self.authorized(request)
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call GitHub: {err}")))
    }

    async fn expect_success<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::http_error(response).await);
        }
        response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse GitHub response: {err}"))
        })
    }

    async fn http_error(response: Response) -> AppError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        AppError::Http { status, body }
    }
}

#[async_trait]
impl IssueTrackerService for GitHubClient {
    async fn create_issue(&self, issue: &IssueDraft) -> AppResult<CreatedIssue> {
        let url = self.repo_endpoint("issues");
        debug!(%url, title = %issue.title, "creating issue");
        let request = self.http.post(url).json(&CreateIssueRequest {
            title: &issue.title,
            body: &issue.body,
            labels: &issue.labels,
        });
        let payload: IssueResponse = Self::expect_success(self.send(request).await?).await?;
        Ok(CreatedIssue {
            number: payload.number,
        })
    }

    async fn close_issue(&self, number: u64) -> AppResult<()> {
        let url = self.repo_endpoint(&format!("issues/{number}"));
        debug!(%url, "closing issue");
        let request = self.http.patch(url).json(&UpdateIssueRequest { state: "closed" });
        let _: serde_json::Value = Self::expect_success(self.send(request).await?).await?;
        Ok(())
    }

    async fn create_comment(&self, number: u64, body: &str) -> AppResult<()> {
        let url = self.repo_endpoint(&format!("issues/{number}/comments"));
        debug!(%url, "creating comment");
        let request = self.http.post(url).json(&CreateCommentRequest { body });
        let _: serde_json::Value = Self::expect_success(self.send(request).await?).await?;
        Ok(())
    }

    async fn create_label(&self, name: &str, color: &str) -> AppResult<LabelOutcome> {
        let url = self.repo_endpoint("labels");
        debug!(%url, name, "creating label");
        let request = self.http.post(url).json(&CreateLabelRequest { name, color });
        let response = self.send(request).await?;
        if response.status().is_success() {
            return Ok(LabelOutcome::Created);
        }

        match Self::http_error(response).await {
            AppError::Http { body, .. } if is_already_exists(&body) => {
                Ok(LabelOutcome::AlreadyExists)
            }
            err => Err(err),
        }
    }
}

fn is_already_exists(body: &str) -> bool {
    serde_json::from_str::<ValidationErrorResponse>(body)
        .map(|payload| {
            payload
                .errors
                .iter()
                .any(|error| error.code.as_deref() == Some(ALREADY_EXISTS))
        })
        .unwrap_or(false)
}

#[derive(Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [String],
}

#[derive(Serialize)]
struct UpdateIssueRequest {
    state: &'static str,
}

#[derive(Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct CreateLabelRequest<'a> {
    name: &'a str,
    color: &'a str,
}

#[derive(Deserialize)]
struct IssueResponse {
    number: u64,
}

#[derive(Deserialize)]
struct ValidationErrorResponse {
    #[serde(default)]
    errors: Vec<ValidationError>,
}

#[derive(Deserialize)]
struct ValidationError {
    code: Option<String>,
}
