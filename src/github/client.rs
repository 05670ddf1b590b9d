use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::{NotesSyncError, Result};

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("notes-sync/", env!("CARGO_PKG_VERSION"));

/// A repository on the hosted service, as far as provisioning cares.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRepo {
    pub name: String,
    pub clone_url: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

/// The hosted Git service operations the provisioner needs.
#[async_trait]
pub trait RepoHost {
    /// Account login the client authenticated as
    fn login(&self) -> &str;

    /// Existence probe: Some(repo) if `owner/name` exists, None if free
    async fn repo_exists(&self, owner: &str, name: &str) -> Result<Option<RemoteRepo>>;

    /// Create a private repository under the authenticated account
    async fn create_private(&self, name: &str, description: &str) -> Result<RemoteRepo>;
}

/// GitHub REST API client. Credentials are verified at construction by
/// resolving the account login, so an invalid token fails before any
/// local state is touched.
pub struct GithubClient {
    http: reqwest::Client,
    token: String,
    login: String,
}

impl GithubClient {
    pub async fn connect(token: String) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        let resp = http
            .get(format!("{}/user", API_BASE))
            .bearer_auth(&token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(NotesSyncError::AuthFailure(
                "token rejected by GitHub; check its scopes and expiry".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(api_error(status, resp).await);
        }

        let user: UserInfo = resp.json().await?;

        Ok(Self {
            http,
            token,
            login: user.login,
        })
    }
}

#[async_trait]
impl RepoHost for GithubClient {
    fn login(&self) -> &str {
        &self.login
    }

    async fn repo_exists(&self, owner: &str, name: &str) -> Result<Option<RemoteRepo>> {
        let resp = self
            .http
            .get(format!("{}/repos/{}/{}", API_BASE, owner, name))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(NotesSyncError::AuthFailure(
                "token rejected while probing repository names".to_string(),
            )),
            status if status.is_success() => Ok(Some(resp.json().await?)),
            status => Err(api_error(status, resp).await),
        }
    }

    async fn create_private(&self, name: &str, description: &str) -> Result<RemoteRepo> {
        let body = json!({
            "name": name,
            "private": true,
            "description": description,
        });

        let resp = self
            .http
            .post(format!("{}/user/repos", API_BASE))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await?;

        match resp.status() {
            StatusCode::CREATED => Ok(resp.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(NotesSyncError::AuthFailure(
                "token rejected while creating the repository; it needs the 'repo' scope"
                    .to_string(),
            )),
            status => Err(api_error(status, resp).await),
        }
    }
}

async fn api_error(status: StatusCode, resp: reqwest::Response) -> NotesSyncError {
    let message = resp
        .json::<ApiMessage>()
        .await
        .map(|m| m.message)
        .unwrap_or_default();

    NotesSyncError::Api {
        status: status.as_u16(),
        message,
    }
}
