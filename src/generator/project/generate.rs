use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use askama::Template;

use super::format::format_project;
use super::scripts::{run_post_create_scripts, ScriptOutcome};
use crate::config::Config;
use crate::generator::schema::{compile_schema, effective_schema};
use crate::generator::templates::{
    db_conf_template_data, orchestrator_template_data, py_literal, render_env,
    service_template_data, AdminServiceTemplate, AppPyTemplate, AppSchemaInitTemplate,
    ConversionsTemplate, DockerfileTemplateData, EntrypointTemplate, FactoryEntry,
    FactoryTemplateData, GitignoreTemplate, MigrationsTemplateData, PyprojectTemplateData,
    RunPyTemplate, SchemaPyTemplateData, SettingsPyTemplateData, SystemLoggerTemplate,
    ValidationsTemplate,
};

/// Knobs for one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Skip the post-generation formatter pass.
    pub skip_format: bool,
    /// Skip the configured post-create scripts.
    pub skip_scripts: bool,
}

/// What one generation run produced.
#[derive(Debug)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    /// Schema service names, in schema order.
    pub services: Vec<String>,
    /// One outcome per post-create script, in declared order.
    pub scripts: Vec<ScriptOutcome>,
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    println!("✅ Generated {}", path.display());
    Ok(())
}

/// Generate a complete microservice project from a JSON configuration file.
///
/// Linear pipeline: load and validate config → create the output directory →
/// pre-create declared files → emit environment/database/dependency files →
/// emit schema-driven service files → emit core/runtime/Docker/root files →
/// optional format pass → post-create scripts.
///
/// # Errors
///
/// Configuration and schema errors fail before any file is written. I/O
/// errors during emission are fatal and may leave a partially populated
/// output directory; no partial-success recovery is attempted. Post-create
/// script failures are reported in the returned report, not as errors.
pub fn generate_microservice(
    config_path: &Path,
    output_dir: &Path,
    opts: &GenerateOptions,
) -> anyhow::Result<GenerationReport> {
    println!("🔧 Loading configuration from {}", config_path.display());
    let config = Config::load(config_path)?;

    let app_name = config.setting_str("app_name", "microservice");
    let primary = config.setting_str("app_primary_service_name", "default");

    // Compile the schema before touching the filesystem so schema errors
    // never leave a half-written tree behind.
    let schema = effective_schema(&config.schema(), &primary);
    let services = compile_schema(&schema)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
    println!("📁 Output directory: {}", output_dir.display());

    // Pre-create declared empty files
    for rel in config.files() {
        let path = output_dir.join(&rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        if !path.exists() {
            fs::write(&path, "")
                .with_context(|| format!("failed to create {}", path.display()))?;
        }
    }
    println!("✅ Pre-created {} declared files", config.files().len());

    write_file(&output_dir.join(".gitignore"), &GitignoreTemplate.render()?)?;

    // .env: append to whatever is already there
    let env_path = output_dir.join(".env");
    let existing = fs::read_to_string(&env_path).unwrap_or_default();
    write_file(&env_path, &render_env(&config, &existing))?;

    if !config.databases().is_empty() {
        let rendered = db_conf_template_data(&config).render()?;
        write_file(&output_dir.join("database").join("db_conf.py"), &rendered)?;
    }

    let pyproject = PyprojectTemplateData {
        name: app_name.clone(),
        version: config.setting_str("app_version", "0.1.0"),
        description: config.setting_str("app_description", "A microservice"),
        requires_python: config.setting_str("requires_python", ">=3.12"),
        dependencies: config.dependencies(),
        has_additional: config.setting_opt("pyproject_additional_content").is_some(),
        additional: config
            .setting_opt("pyproject_additional_content")
            .unwrap_or_default(),
    };
    write_file(&output_dir.join("pyproject.toml"), &pyproject.render()?)?;

    // Schema-driven files
    let app_schema_dir = output_dir.join("app_schema");
    let schema_py = SchemaPyTemplateData {
        schema_literal: py_literal(&schema, 0),
    };
    write_file(&app_schema_dir.join("schema.py"), &schema_py.render()?)?;
    write_file(
        &app_schema_dir.join("conversion_functions.py"),
        &ConversionsTemplate.render()?,
    )?;
    write_file(
        &app_schema_dir.join("validation_functions.py"),
        &ValidationsTemplate.render()?,
    )?;
    write_file(
        &app_schema_dir.join("__init__.py"),
        &AppSchemaInitTemplate.render()?,
    )?;

    let services_dir = output_dir.join("services");
    let primary_service = format!("{}_SERVICE", primary.to_uppercase());
    let mut factory_entries = Vec::with_capacity(services.len());
    for service in &services {
        let rendered = service_template_data(&app_name, service).render()?;
        write_file(&services_dir.join(&service.file_name), &rendered)?;

        let orchestrator_dir = output_dir.join("src").join(&service.base);
        let rendered = orchestrator_template_data(service).render()?;
        write_file(
            &orchestrator_dir.join(format!("{}_orchestrator.py", service.base)),
            &rendered,
        )?;
        write_file(&orchestrator_dir.join("__init__.py"), "")?;

        let key = if service.service_name == primary_service {
            "default_service".to_string()
        } else {
            service.service_name.to_lowercase()
        };
        factory_entries.push(FactoryEntry {
            module: format!("{}_service", service.base),
            class_name: service.class_name.clone(),
            key,
        });
    }
    write_file(
        &services_dir.join("admin_service.py"),
        &AdminServiceTemplate.render()?,
    )?;
    let factory = FactoryTemplateData {
        services: factory_entries,
    };
    write_file(&services_dir.join("app_factory.py"), &factory.render()?)?;
    write_file(&services_dir.join("__init__.py"), "")?;

    // Core runtime files
    let core_dir = output_dir.join("core");
    write_file(&core_dir.join("app.py"), &AppPyTemplate.render()?)?;
    let settings_py = SettingsPyTemplateData {
        app_name: app_name.clone(),
    };
    write_file(&core_dir.join("settings.py"), &settings_py.render()?)?;
    write_file(
        &core_dir.join("system_logger.py"),
        &SystemLoggerTemplate.render()?,
    )?;
    write_file(&core_dir.join("__init__.py"), "")?;

    // Docker assets
    write_file(&output_dir.join(".python-version"), "3.13\n")?;
    let dockerfile = DockerfileTemplateData {
        app_name: app_name.clone(),
    };
    write_file(&output_dir.join("Dockerfile"), &dockerfile.render()?)?;
    write_file(
        &output_dir.join("entrypoint.sh"),
        &EntrypointTemplate.render()?,
    )?;

    // Root-level execution files
    let migrations = MigrationsTemplateData {
        database_project: config
            .setting_opt("app_primary_database_project")
            .unwrap_or_else(|| app_name.clone()),
    };
    write_file(&output_dir.join("migrations.py"), &migrations.render()?)?;
    write_file(&output_dir.join("run.py"), &RunPyTemplate.render()?)?;

    if !opts.skip_format {
        if let Err(e) = format_project(output_dir) {
            eprintln!("⚠️  formatter pass failed: {e}");
        }
    }

    let scripts = if opts.skip_scripts {
        Vec::new()
    } else {
        run_post_create_scripts(output_dir, &config.post_create_scripts())?
    };

    println!("🎉 Generation complete → {}", output_dir.display());
    Ok(GenerationReport {
        output_dir: output_dir.to_path_buf(),
        services: services.iter().map(|s| s.service_name.clone()).collect(),
        scripts,
    })
}
