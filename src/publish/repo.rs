use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context};
use rand::Rng;
use regex::Regex;
use tracing::{error, info};

use super::client::GithubApi;

const MAIN_BRANCH: &str = "main";
const DEV_BRANCH: &str = "dev";
const NAME_ATTEMPTS: usize = 50;

/// What a successful publication produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRepo {
    pub repo_name: String,
    pub repo_url: String,
    pub main_branch: String,
    pub dev_branch: String,
}

/// Identity and credentials used for the git push.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub org: String,
    pub token: String,
    pub bot_name: String,
    pub bot_email: String,
}

/// Publishes a generated project tree to a fresh GitHub repository.
///
/// The client is injected so lifecycle and credentials stay test-controllable.
pub struct Publisher<'a> {
    api: &'a dyn GithubApi,
    config: PublisherConfig,
}

/// Normalize a human project name into a repository slug: strip characters
/// outside `[a-zA-Z0-9 _-]`, collapse whitespace and underscore runs to one
/// underscore, lowercase, trim underscores.
pub fn sanitize_repo_name(base_name: &str) -> String {
    // The patterns are literals; construction cannot fail.
    #[allow(clippy::unwrap_used)]
    let cleaned = {
        let illegal = Regex::new(r"[^a-zA-Z0-9 _-]").unwrap();
        let spaces = Regex::new(r"\s+").unwrap();
        let underscores = Regex::new(r"_+").unwrap();
        let s = illegal.replace_all(base_name, "");
        let s = spaces.replace_all(&s, "_");
        let s = underscores.replace_all(&s, "_");
        s.to_lowercase()
    };
    cleaned.trim_matches('_').to_string()
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(3..=5);
    (0..len)
        .map(|_| {
            const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
            CHARS[rng.gen_range(0..CHARS.len())] as char
        })
        .collect()
}

impl<'a> Publisher<'a> {
    pub fn new(api: &'a dyn GithubApi, config: PublisherConfig) -> Self {
        Publisher { api, config }
    }

    /// Find a repository name not yet taken in the organization by suffixing
    /// the sanitized base name with a short random tag.
    fn available_repo_name(&self, base_name: &str) -> anyhow::Result<String> {
        let original = sanitize_repo_name(base_name);
        if original.is_empty() {
            bail!("project name '{base_name}' sanitizes to nothing; choose a saner name");
        }
        for _ in 0..NAME_ATTEMPTS {
            let candidate = format!("{original}_{}", random_suffix());
            if !self.api.repo_exists(&self.config.org, &candidate)? {
                return Ok(candidate);
            }
        }
        bail!("could not find an available repository name for '{original}'")
    }

    /// Create a remote repository and push the local tree to it.
    ///
    /// Sequential saga: pick a name → create the repo → init/commit/push the
    /// local tree → create the dev branch → optionally add a collaborator.
    /// Any failure after repository creation deletes the remote repository
    /// before the error is surfaced; a rollback failure is logged but never
    /// masks the original error.
    pub fn publish(
        &self,
        base_name: &str,
        description: &str,
        code_path: &Path,
        private: bool,
        collaborator: Option<&str>,
    ) -> anyhow::Result<PublishedRepo> {
        let repo_name = self.available_repo_name(base_name)?;
        self.api
            .create_repo(&self.config.org, &repo_name, description, private)?;
        info!(repo = %repo_name, "repository created");

        match self.push_and_finish(&repo_name, code_path, collaborator) {
            Ok(result) => Ok(result),
            Err(err) => {
                if let Err(del_err) = self.api.delete_repo(&self.config.org, &repo_name) {
                    error!(repo = %repo_name, "rollback delete failed: {del_err}");
                } else {
                    info!(repo = %repo_name, "repository deleted after failure");
                }
                Err(err)
            }
        }
    }

    fn push_and_finish(
        &self,
        repo_name: &str,
        code_path: &Path,
        collaborator: Option<&str>,
    ) -> anyhow::Result<PublishedRepo> {
        if code_path.join(".git").exists() {
            bail!(
                "directory '{}' already has a .git folder; clean it or use a new directory",
                code_path.display()
            );
        }

        let git = |args: &[&str]| -> anyhow::Result<std::process::Output> {
            let git_bin = std::env::var("MICROGEN_GIT_BIN").unwrap_or_else(|_| "git".to_string());
            let output = Command::new(git_bin)
                .args(args)
                .output()
                .with_context(|| format!("failed to run git {}", args.join(" ")))?;
            if !output.status.success() {
                bail!(
                    "git {} failed: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&output.stderr)
                );
            }
            Ok(output)
        };

        let path = code_path
            .to_str()
            .context("code path is not valid UTF-8")?;

        git(&["init", "--initial-branch", MAIN_BRANCH, path])?;
        git(&["-C", path, "config", "user.name", &self.config.bot_name])?;
        git(&["-C", path, "config", "user.email", &self.config.bot_email])?;
        git(&["-C", path, "add", "."])?;

        let status = git(&["-C", path, "status", "--porcelain"])?;
        if status.stdout.is_empty() {
            bail!("no files found in '{path}' to commit");
        }

        git(&["-C", path, "commit", "-m", "Initial commit"])?;
        let remote_url = format!(
            "https://oauth2:{}@github.com/{}/{repo_name}.git",
            self.config.token, self.config.org
        );
        git(&["-C", path, "remote", "add", "origin", &remote_url])?;
        git(&["-C", path, "push", "origin", MAIN_BRANCH])?;
        info!(repo = %repo_name, "pushed to {MAIN_BRANCH}");

        let sha = self
            .api
            .branch_sha(&self.config.org, repo_name, MAIN_BRANCH)?;
        self.api
            .create_branch(&self.config.org, repo_name, DEV_BRANCH, &sha)?;
        info!(repo = %repo_name, "created {DEV_BRANCH} branch");

        if let Some(username) = collaborator {
            self.api
                .add_collaborator(&self.config.org, repo_name, username, "pull")?;
            info!(repo = %repo_name, %username, "added collaborator");
        }

        Ok(PublishedRepo {
            repo_name: repo_name.to_string(),
            repo_url: format!("https://github.com/{}/{repo_name}", self.config.org),
            main_branch: MAIN_BRANCH.to_string(),
            dev_branch: DEV_BRANCH.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_and_collapses() {
        assert_eq!(sanitize_repo_name("My Cool App!"), "my_cool_app");
        assert_eq!(sanitize_repo_name("a  b__c"), "a_b_c");
        assert_eq!(sanitize_repo_name("_edges_"), "edges");
        assert_eq!(sanitize_repo_name("!!!"), "");
    }

    #[test]
    fn suffix_shape() {
        for _ in 0..20 {
            let s = random_suffix();
            assert!((3..=5).contains(&s.len()));
            assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
