//! Publisher lifecycle tests with a recorded mock GitHub client and a
//! stubbed git binary.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use microgen::publish::{GithubApi, PublishedRepo, Publisher, PublisherConfig};
use tempfile::TempDir;

// Tests mutate MICROGEN_GIT_BIN; serialize them.
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
struct MockGithub {
    calls: Mutex<Vec<String>>,
    /// Repo names `repo_exists` should report as taken.
    taken: Vec<String>,
    fail_create_branch: bool,
}

impl MockGithub {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

impl GithubApi for MockGithub {
    fn repo_exists(&self, _org: &str, repo: &str) -> anyhow::Result<bool> {
        Ok(self.taken.iter().any(|t| t == repo))
    }

    fn create_repo(
        &self,
        org: &str,
        repo: &str,
        _description: &str,
        _private: bool,
    ) -> anyhow::Result<String> {
        self.record(format!("create_repo {repo}"));
        Ok(format!("https://github.com/{org}/{repo}"))
    }

    fn delete_repo(&self, _org: &str, repo: &str) -> anyhow::Result<()> {
        self.record(format!("delete_repo {repo}"));
        Ok(())
    }

    fn branch_sha(&self, _org: &str, _repo: &str, branch: &str) -> anyhow::Result<String> {
        self.record(format!("branch_sha {branch}"));
        Ok("abc123".to_string())
    }

    fn create_branch(&self, _org: &str, _repo: &str, branch: &str, sha: &str) -> anyhow::Result<()> {
        self.record(format!("create_branch {branch} {sha}"));
        if self.fail_create_branch {
            anyhow::bail!("boom: branch creation rejected");
        }
        Ok(())
    }

    fn add_collaborator(
        &self,
        _org: &str,
        _repo: &str,
        username: &str,
        permission: &str,
    ) -> anyhow::Result<()> {
        self.record(format!("add_collaborator {username} {permission}"));
        Ok(())
    }
}

fn config() -> PublisherConfig {
    PublisherConfig {
        org: "acme".to_string(),
        token: "token123".to_string(),
        bot_name: "acme-bot".to_string(),
        bot_email: "bot@acme.test".to_string(),
    }
}

/// Write an executable git stub. It succeeds quietly, prints a fake entry
/// for `status --porcelain`, and fails when asked to run `fail_verb`.
fn git_stub(dir: &Path, fail_verb: Option<&str>) -> PathBuf {
    let fail = fail_verb.unwrap_or("");
    let script = format!(
        "#!/bin/sh\n\
         for a in \"$@\"; do\n\
           if [ -n \"{fail}\" ] && [ \"$a\" = \"{fail}\" ]; then\n\
             echo 'stub failure' >&2\n\
             exit 1\n\
           fi\n\
         done\n\
         case \"$*\" in\n\
           *'status --porcelain'*) echo 'A  run.py' ;;\n\
         esac\n\
         exit 0\n"
    );
    let path = dir.join("git-stub.sh");
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn project_dir(tmp: &TempDir) -> PathBuf {
    let dir = tmp.path().join("project");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("run.py"), "print('hi')\n").unwrap();
    dir
}

#[test]
fn publish_happy_path() {
    let _guard = env_lock();
    let tmp = TempDir::new().unwrap();
    let stub = git_stub(tmp.path(), None);
    std::env::set_var("MICROGEN_GIT_BIN", &stub);

    let api = MockGithub::default();
    let publisher = Publisher::new(&api, config());
    let result = publisher
        .publish("My Shop", "demo", &project_dir(&tmp), true, Some("reviewer"))
        .unwrap();
    std::env::remove_var("MICROGEN_GIT_BIN");

    assert!(result.repo_name.starts_with("my_shop_"));
    assert_eq!(
        result,
        PublishedRepo {
            repo_name: result.repo_name.clone(),
            repo_url: format!("https://github.com/acme/{}", result.repo_name),
            main_branch: "main".to_string(),
            dev_branch: "dev".to_string(),
        }
    );

    let calls = api.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[0].starts_with("create_repo my_shop_"));
    assert_eq!(calls[1], "branch_sha main");
    assert_eq!(calls[2], "create_branch dev abc123");
    assert_eq!(calls[3], "add_collaborator reviewer pull");
}

#[test]
fn push_failure_rolls_back_created_repo() {
    let _guard = env_lock();
    let tmp = TempDir::new().unwrap();
    let stub = git_stub(tmp.path(), Some("push"));
    std::env::set_var("MICROGEN_GIT_BIN", &stub);

    let api = MockGithub::default();
    let publisher = Publisher::new(&api, config());
    let err = publisher
        .publish("My Shop", "demo", &project_dir(&tmp), true, None)
        .unwrap_err();
    std::env::remove_var("MICROGEN_GIT_BIN");

    assert!(err.to_string().contains("push"), "got: {err}");
    let calls = api.calls();
    assert!(calls[0].starts_with("create_repo my_shop_"));
    assert!(
        calls.last().unwrap().starts_with("delete_repo my_shop_"),
        "rollback missing: {calls:?}"
    );
}

#[test]
fn api_failure_after_push_still_rolls_back() {
    let _guard = env_lock();
    let tmp = TempDir::new().unwrap();
    let stub = git_stub(tmp.path(), None);
    std::env::set_var("MICROGEN_GIT_BIN", &stub);

    let api = MockGithub {
        fail_create_branch: true,
        ..MockGithub::default()
    };
    let publisher = Publisher::new(&api, config());
    let err = publisher
        .publish("My Shop", "demo", &project_dir(&tmp), true, None)
        .unwrap_err();
    std::env::remove_var("MICROGEN_GIT_BIN");

    // The original error surfaces, not the rollback outcome.
    assert!(err.to_string().contains("boom"), "got: {err}");
    assert!(api
        .calls()
        .last()
        .unwrap()
        .starts_with("delete_repo my_shop_"));
}

#[test]
fn refuses_directory_that_is_already_a_repo() {
    let _guard = env_lock();
    let tmp = TempDir::new().unwrap();
    let stub = git_stub(tmp.path(), None);
    std::env::set_var("MICROGEN_GIT_BIN", &stub);

    let dir = project_dir(&tmp);
    fs::create_dir_all(dir.join(".git")).unwrap();

    let api = MockGithub::default();
    let publisher = Publisher::new(&api, config());
    let err = publisher
        .publish("My Shop", "demo", &dir, true, None)
        .unwrap_err();
    std::env::remove_var("MICROGEN_GIT_BIN");

    assert!(err.to_string().contains(".git"), "got: {err}");
    // The remote repo was created and must be rolled back.
    assert!(api
        .calls()
        .last()
        .unwrap()
        .starts_with("delete_repo my_shop_"));
}

#[test]
fn unsanitizable_name_is_rejected_before_any_api_call() {
    let api = MockGithub::default();
    let publisher = Publisher::new(&api, config());
    let tmp = TempDir::new().unwrap();
    let err = publisher
        .publish("!!!", "demo", &project_dir(&tmp), true, None)
        .unwrap_err();
    assert!(err.to_string().contains("sanitizes"), "got: {err}");
    assert!(api.calls().is_empty());
}
