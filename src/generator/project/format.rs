use std::path::Path;
use std::process::Command;

/// Run the source formatter over a generated project.
///
/// Uses `ruff format .` by default; tests (and exotic environments) can
/// point `MICROGEN_FMT_BIN` at another binary without mutating PATH.
pub fn format_project(dir: &Path) -> anyhow::Result<()> {
    let fmt_bin = std::env::var("MICROGEN_FMT_BIN").unwrap_or_else(|_| "ruff".to_string());

    let mut cmd = Command::new(fmt_bin);
    cmd.arg("format").arg(".").current_dir(dir);
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("formatter exited with {status}");
    }
    Ok(())
}
