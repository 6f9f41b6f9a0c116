use anyhow::{bail, Context};
use serde::Serialize;
use serde_json::Value;

/// GitHub operations the publisher needs.
///
/// Kept behind a trait so the client is explicitly constructed and injected
/// rather than living in process-wide state; tests substitute a mock.
pub trait GithubApi {
    fn repo_exists(&self, org: &str, repo: &str) -> anyhow::Result<bool>;
    /// Create a repository in the organization; returns its html URL.
    fn create_repo(
        &self,
        org: &str,
        repo: &str,
        description: &str,
        private: bool,
    ) -> anyhow::Result<String>;
    fn delete_repo(&self, org: &str, repo: &str) -> anyhow::Result<()>;
    /// The commit sha a branch head points at.
    fn branch_sha(&self, org: &str, repo: &str, branch: &str) -> anyhow::Result<String>;
    fn create_branch(&self, org: &str, repo: &str, branch: &str, sha: &str) -> anyhow::Result<()>;
    fn add_collaborator(
        &self,
        org: &str,
        repo: &str,
        username: &str,
        permission: &str,
    ) -> anyhow::Result<()>;
}

/// REST implementation over `api.github.com` (base overridable for tests).
pub struct RestGithub {
    http: reqwest::blocking::Client,
    token: String,
    api_base: String,
}

#[derive(Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
}

impl RestGithub {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base(token, "https://api.github.com")
    }

    pub fn with_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        RestGithub {
            http: reqwest::blocking::Client::new(),
            token: token.into(),
            api_base: api_base.into(),
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::blocking::RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.api_base))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "microgen")
    }
}

impl GithubApi for RestGithub {
    fn repo_exists(&self, org: &str, repo: &str) -> anyhow::Result<bool> {
        let resp = self
            .request(reqwest::Method::GET, &format!("/repos/{org}/{repo}"))
            .send()
            .context("failed to query repository")?;
        match resp.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            code => bail!("unexpected status {code} while checking repo '{repo}'"),
        }
    }

    fn create_repo(
        &self,
        org: &str,
        repo: &str,
        description: &str,
        private: bool,
    ) -> anyhow::Result<String> {
        let resp = self
            .request(reqwest::Method::POST, &format!("/orgs/{org}/repos"))
            .json(&CreateRepoBody {
                name: repo,
                description,
                private,
                auto_init: false,
            })
            .send()
            .context("failed to create repository")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            bail!("failed to create repo '{repo}': {status} - {body}");
        }
        let body: Value = resp.json().context("malformed create-repo response")?;
        body.get("html_url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("create-repo response missing html_url"))
    }

    fn delete_repo(&self, org: &str, repo: &str) -> anyhow::Result<()> {
        let resp = self
            .request(reqwest::Method::DELETE, &format!("/repos/{org}/{repo}"))
            .send()
            .context("failed to delete repository")?;
        if !resp.status().is_success() {
            bail!("failed to delete repo '{repo}': {}", resp.status());
        }
        Ok(())
    }

    fn branch_sha(&self, org: &str, repo: &str, branch: &str) -> anyhow::Result<String> {
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("/repos/{org}/{repo}/git/ref/heads/{branch}"),
            )
            .send()
            .context("failed to fetch branch ref")?;
        if !resp.status().is_success() {
            bail!("failed to fetch ref 'heads/{branch}': {}", resp.status());
        }
        let body: Value = resp.json().context("malformed ref response")?;
        body.pointer("/object/sha")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("ref response missing object.sha"))
    }

    fn create_branch(&self, org: &str, repo: &str, branch: &str, sha: &str) -> anyhow::Result<()> {
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/repos/{org}/{repo}/git/refs"),
            )
            .json(&serde_json::json!({
                "ref": format!("refs/heads/{branch}"),
                "sha": sha,
            }))
            .send()
            .context("failed to create branch ref")?;
        if !resp.status().is_success() {
            bail!("failed to create branch '{branch}': {}", resp.status());
        }
        Ok(())
    }

    fn add_collaborator(
        &self,
        org: &str,
        repo: &str,
        username: &str,
        permission: &str,
    ) -> anyhow::Result<()> {
        let resp = self
            .request(
                reqwest::Method::PUT,
                &format!("/repos/{org}/{repo}/collaborators/{username}"),
            )
            .json(&serde_json::json!({ "permission": permission }))
            .send()
            .context("failed to add collaborator")?;
        if !resp.status().is_success() {
            bail!(
                "failed to add collaborator '{username}' to '{repo}': {}",
                resp.status()
            );
        }
        Ok(())
    }
}
