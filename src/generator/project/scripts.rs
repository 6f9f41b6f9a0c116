use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Result of one post-create script.
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    pub script: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

/// Restores the original working directory when dropped, so the directory
/// change around script execution survives any early return.
struct CwdGuard {
    original: PathBuf,
}

impl CwdGuard {
    fn enter(dir: &Path) -> std::io::Result<Self> {
        let original = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        Ok(CwdGuard { original })
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.original) {
            tracing::error!("failed to restore working directory: {e}");
        }
    }
}

/// Run the configured post-create scripts inside the output directory.
///
/// Scripts run sequentially in declared order, each drained line-by-line to
/// stdout before the next starts. A failing script is reported and does not
/// stop the remaining scripts; nothing here is fatal to the overall run.
pub fn run_post_create_scripts(
    output_dir: &Path,
    scripts: &[String],
) -> anyhow::Result<Vec<ScriptOutcome>> {
    if scripts.is_empty() {
        println!("ℹ️  No post-create scripts configured");
        return Ok(Vec::new());
    }

    let _cwd = CwdGuard::enter(output_dir)?;
    println!("📁 Running {} post-create script(s) in {}", scripts.len(), output_dir.display());

    let mut outcomes = Vec::with_capacity(scripts.len());
    for (i, script) in scripts.iter().enumerate() {
        println!("⚡ Script {}/{}: {script}", i + 1, scripts.len());
        outcomes.push(run_one(script));
    }
    Ok(outcomes)
}

fn run_one(script: &str) -> ScriptOutcome {
    let mut parts = script.split_whitespace();
    let Some(program) = parts.next() else {
        return ScriptOutcome {
            script: script.to_string(),
            success: false,
            exit_code: None,
        };
    };

    let spawned = Command::new(program)
        .args(parts)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            eprintln!("❌ Failed to start '{script}': {e}");
            return ScriptOutcome {
                script: script.to_string(),
                success: false,
                exit_code: None,
            };
        }
    };

    // Drain output before waiting so the child never blocks on a full pipe
    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            println!("{line}");
        }
    }
    if let Some(stderr) = child.stderr.take() {
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            eprintln!("{line}");
        }
    }

    match child.wait() {
        Ok(status) => {
            let success = status.success();
            if success {
                println!("✅ Script succeeded: {script}");
            } else {
                eprintln!("❌ Script failed ({status}): {script}");
            }
            ScriptOutcome {
                script: script.to_string(),
                success,
                exit_code: status.code(),
            }
        }
        Err(e) => {
            eprintln!("❌ Error waiting for '{script}': {e}");
            ScriptOutcome {
                script: script.to_string(),
                success: false,
                exit_code: None,
            }
        }
    }
}
