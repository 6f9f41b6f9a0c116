//! Post-create script execution tests.
//!
//! Kept in their own test binary: script execution changes the process
//! working directory, which would race with other tests sharing the
//! harness process. The tests here still share one process, so they
//! serialize on a lock before touching the cwd or PATH.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use microgen::generator::{generate_microservice, run_post_create_scripts, GenerateOptions};
use serde_json::json;
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// Put a no-op `uv` stub at the front of PATH so the default post-create
/// script never reaches the real tool.
fn stub_uv(dir: &Path) {
    let stub = dir.join("uv");
    fs::write(&stub, "#!/bin/sh\nexit 0\n").unwrap();
    let mut perms = fs::metadata(&stub).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&stub, perms).unwrap();
    let path = std::env::var("PATH").unwrap_or_default();
    std::env::set_var("PATH", format!("{}:{path}", dir.display()));
}

#[test]
fn failing_script_does_not_stop_the_rest() {
    let _guard = env_lock();
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    fs::create_dir_all(&out).unwrap();

    let scripts = vec!["false".to_string(), "true".to_string()];
    let outcomes = run_post_create_scripts(&out, &scripts).unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(!outcomes[0].success);
    assert_eq!(outcomes[0].exit_code, Some(1));
    assert!(outcomes[1].success);
    assert_eq!(outcomes[1].exit_code, Some(0));
}

#[test]
fn scripts_run_inside_output_dir_and_cwd_is_restored() {
    let _guard = env_lock();
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let before = std::env::current_dir().unwrap();

    let scripts = vec!["touch marker.txt".to_string()];
    let outcomes = run_post_create_scripts(&out, &scripts).unwrap();

    assert!(outcomes[0].success);
    assert!(out.join("marker.txt").exists(), "script ran outside output dir");
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
fn unknown_program_is_reported_not_fatal() {
    let _guard = env_lock();
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    fs::create_dir_all(&out).unwrap();

    let scripts = vec!["definitely-not-a-real-binary-zz".to_string()];
    let outcomes = run_post_create_scripts(&out, &scripts).unwrap();
    assert!(!outcomes[0].success);
    assert_eq!(outcomes[0].exit_code, None);
}

#[test]
fn overlapping_runs_restore_the_original_cwd() {
    let origin = {
        let _guard = env_lock();
        std::env::current_dir().unwrap()
    };

    // Two threads race to run long-enough scripts; the lock keeps their
    // directory changes from nesting into each other's temp dirs.
    let handles: Vec<_> = (0..2)
        .map(|_| {
            std::thread::spawn(|| {
                let _guard = env_lock();
                let tmp = TempDir::new().unwrap();
                let out = tmp.path().join("out");
                fs::create_dir_all(&out).unwrap();
                let scripts = vec!["sleep 0.2".to_string(), "touch marker.txt".to_string()];
                let outcomes = run_post_create_scripts(&out, &scripts).unwrap();
                assert!(outcomes.iter().all(|o| o.success));
                assert!(out.join("marker.txt").exists());
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let _guard = env_lock();
    assert_eq!(std::env::current_dir().unwrap(), origin);
}

#[test]
fn generation_completes_despite_script_failures() {
    let _guard = env_lock();
    let tmp = TempDir::new().unwrap();
    stub_uv(tmp.path());
    let config_path = tmp.path().join("config.json");
    fs::write(
        &config_path,
        serde_json::to_string(&json!({
            "settings": {"app_name": "shop", "app_primary_service_name": "orders"},
            "post_create_scripts": ["false", "true"]
        }))
        .unwrap(),
    )
    .unwrap();

    let out = tmp.path().join("shop");
    let opts = GenerateOptions {
        skip_format: true,
        skip_scripts: false,
    };
    let report = generate_microservice(&config_path, &out, &opts).unwrap();

    // Defaults prepend "uv sync"; the user scripts follow in declared order.
    let declared: Vec<&str> = report.scripts.iter().map(|o| o.script.as_str()).collect();
    assert_eq!(declared, vec!["uv sync", "false", "true"]);
    assert!(!report.scripts[1].success);
    assert!(report.scripts[2].success);
    assert!(out.join("run.py").exists());
}
