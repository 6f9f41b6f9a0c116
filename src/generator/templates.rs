//! File emitters.
//!
//! Each emitted file class has an askama template under `templates/` and a
//! data struct here; emitters render text, the orchestrator in
//! [`super::project`] performs the writes. Centralizing rendering in
//! templates keeps identifier substitution and escaping in one place
//! instead of ad hoc string concatenation per emitter.

use askama::Template;
use serde_json::Value;

use super::schema::CompiledService;
use crate::config::Config;

/// Task entry handed to the service and orchestrator templates.
#[derive(Debug, Clone)]
pub struct TaskDisplay {
    pub task_name: String,
    pub method_name: String,
    pub is_mic_check: bool,
}

/// One registration line in the generated service factory.
#[derive(Debug, Clone)]
pub struct FactoryEntry {
    /// Module to import from, e.g. `orders_service`.
    pub module: String,
    /// Class to import and register, e.g. `OrdersService`.
    pub class_name: String,
    /// Registration key: `default_service` for the primary service,
    /// the lowercased service name otherwise.
    pub key: String,
}

#[derive(Template)]
#[template(path = "gitignore.txt", escape = "none")]
pub struct GitignoreTemplate;

#[derive(Template)]
#[template(path = "pyproject.toml.txt", escape = "none")]
pub struct PyprojectTemplateData {
    pub name: String,
    pub version: String,
    pub description: String,
    pub requires_python: String,
    pub dependencies: Vec<String>,
    pub has_additional: bool,
    pub additional: String,
}

/// One database block in the generated `database/db_conf.py`.
#[derive(Debug, Clone)]
pub struct DbDisplay {
    pub index: usize,
    pub project_name: String,
    pub port: String,
    /// Pre-rendered Python literal for the free-form code config.
    pub code_basics: String,
    /// Pre-rendered Python literal for the manager overrides.
    pub manager_overrides: String,
}

#[derive(Template)]
#[template(path = "db_conf.py.txt", escape = "none")]
pub struct DbConfTemplateData {
    pub databases: Vec<DbDisplay>,
}

#[derive(Template)]
#[template(path = "schema.py.txt", escape = "none")]
pub struct SchemaPyTemplateData {
    pub schema_literal: String,
}

#[derive(Template)]
#[template(path = "service.py.txt", escape = "none")]
pub struct ServiceTemplateData {
    pub app_name: String,
    pub service_name: String,
    pub base: String,
    pub class_name: String,
    pub orchestrator_class: String,
    pub fields: Vec<String>,
    pub tasks: Vec<TaskDisplay>,
}

#[derive(Template)]
#[template(path = "orchestrator.py.txt", escape = "none")]
pub struct OrchestratorTemplateData {
    pub service_name: String,
    pub orchestrator_class: String,
    /// Non-mic-check tasks only; the self-test never reaches business logic.
    pub tasks: Vec<TaskDisplay>,
}

#[derive(Template)]
#[template(path = "app_factory.py.txt", escape = "none")]
pub struct FactoryTemplateData {
    pub services: Vec<FactoryEntry>,
}

#[derive(Template)]
#[template(path = "admin_service.py.txt", escape = "none")]
pub struct AdminServiceTemplate;

#[derive(Template)]
#[template(path = "conversion_functions.py.txt", escape = "none")]
pub struct ConversionsTemplate;

#[derive(Template)]
#[template(path = "validation_functions.py.txt", escape = "none")]
pub struct ValidationsTemplate;

#[derive(Template)]
#[template(path = "app_schema_init.py.txt", escape = "none")]
pub struct AppSchemaInitTemplate;

#[derive(Template)]
#[template(path = "app.py.txt", escape = "none")]
pub struct AppPyTemplate;

#[derive(Template)]
#[template(path = "settings.py.txt", escape = "none")]
pub struct SettingsPyTemplateData {
    pub app_name: String,
}

#[derive(Template)]
#[template(path = "system_logger.py.txt", escape = "none")]
pub struct SystemLoggerTemplate;

#[derive(Template)]
#[template(path = "Dockerfile.txt", escape = "none")]
pub struct DockerfileTemplateData {
    pub app_name: String,
}

#[derive(Template)]
#[template(path = "entrypoint.sh.txt", escape = "none")]
pub struct EntrypointTemplate;

#[derive(Template)]
#[template(path = "run.py.txt", escape = "none")]
pub struct RunPyTemplate;

#[derive(Template)]
#[template(path = "migrations.py.txt", escape = "none")]
pub struct MigrationsTemplateData {
    pub database_project: String,
}

impl From<&super::schema::CompiledTask> for TaskDisplay {
    fn from(task: &super::schema::CompiledTask) -> Self {
        TaskDisplay {
            task_name: task.task_name.clone(),
            method_name: task.method_name.clone(),
            is_mic_check: task.is_mic_check,
        }
    }
}

/// Build the template data for one generated service file.
pub fn service_template_data(app_name: &str, service: &CompiledService) -> ServiceTemplateData {
    ServiceTemplateData {
        app_name: app_name.to_string(),
        service_name: service.service_name.clone(),
        base: service.base.clone(),
        class_name: service.class_name.clone(),
        orchestrator_class: service.orchestrator_class.clone(),
        fields: service.fields.clone(),
        tasks: service.tasks.iter().map(TaskDisplay::from).collect(),
    }
}

/// Build the template data for one orchestrator stub.
pub fn orchestrator_template_data(service: &CompiledService) -> OrchestratorTemplateData {
    OrchestratorTemplateData {
        service_name: service.service_name.clone(),
        orchestrator_class: service.orchestrator_class.clone(),
        tasks: service
            .tasks
            .iter()
            .filter(|t| !t.is_mic_check)
            .map(TaskDisplay::from)
            .collect(),
    }
}

fn env_scalar(value: &Value) -> String {
    match value {
        // .env booleans are conventionally lowercase
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render the `.env` file: environment variables, derived `APP_*` settings,
/// then one connection block per database in input order.
///
/// Appends to `existing` rather than replacing it; re-running generation
/// into a populated output directory therefore accumulates duplicate
/// entries. That is documented behavior, not a defect to mask.
pub fn render_env(config: &Config, existing: &str) -> String {
    let mut out = existing.to_string();

    if let Some(env) = config.env_vars() {
        if !env.is_empty() {
            out.push_str("\n# Environment variables\n");
            for (key, value) in env {
                out.push_str(&format!("{key}={}\n", env_scalar(value)));
            }
        }
    }

    let app_name = config.setting_opt("app_name");
    let app_version = config.setting_opt("app_version");
    let app_description = config.setting_opt("app_description");
    let primary = config.setting_opt("app_primary_service_name");
    if app_name.is_some() || app_version.is_some() || app_description.is_some() {
        out.push_str("\n# Application settings\n");
        if let Some(name) = app_name {
            out.push_str(&format!("APP_NAME={name}\n"));
        }
        if let Some(version) = app_version {
            out.push_str(&format!("APP_VERSION={version}\n"));
        }
        if let Some(description) = app_description {
            out.push_str(&format!("APP_DESCRIPTION={description}\n"));
        }
        if let Some(primary) = primary {
            out.push_str(&format!("APP_PRIMARY_SERVICE_NAME={primary}_service\n"));
        }
    }

    for (index, db) in config.databases().iter().enumerate() {
        let get = |key: &str| {
            db.get(key)
                .filter(|v| !v.is_null())
                .map(env_scalar)
                .unwrap_or_default()
        };
        let db_name = db
            .get("db_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("database_{index}"));
        out.push_str(&format!("\n# Database {index} - {db_name}\n"));
        out.push_str(&format!("DB_USER_{index}={}\n", get("db_user")));
        out.push_str(&format!("DB_PASS_{index}={}\n", get("db_password")));
        out.push_str(&format!("DB_HOST_{index}={}\n", get("db_host")));
        out.push_str(&format!("DB_NAME_{index}={}\n", get("db_name")));
    }

    out
}

/// Build the per-database display entries for `database/db_conf.py`.
pub fn db_conf_template_data(config: &Config) -> DbConfTemplateData {
    let databases = config
        .databases()
        .iter()
        .enumerate()
        .map(|(index, db)| {
            let project_name = db
                .get("db_project_name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("database_{index}"));
            let port = db
                .get("db_port")
                .filter(|v| !v.is_null())
                .map(env_scalar)
                .unwrap_or_else(|| "5432".to_string());
            let empty = Value::Object(serde_json::Map::new());
            let code_basics = py_literal(db.get("code_basics").unwrap_or(&empty), 0);
            let manager_overrides = py_literal(db.get("manager_configs").unwrap_or(&empty), 0);
            DbDisplay {
                index,
                project_name,
                port,
                code_basics,
                manager_overrides,
            }
        })
        .collect();
    DbConfTemplateData { databases }
}

fn py_str(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Render a JSON value as a Python literal with stable recursive formatting.
///
/// Mappings and sequences get one entry per line at four-space indents;
/// booleans and null become `True`/`False`/`None`. String values under a
/// `root` key that mention `ADMIN_TS_ROOT` or `ADMIN_PYTHON_ROOT` are
/// rewritten as f-strings against the generated settings module, matching
/// how the emitted code resolves those paths at runtime.
pub fn py_literal(value: &Value, indent: usize) -> String {
    let spaces = "    ".repeat(indent);
    match value {
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let mut out = String::from("{\n");
            for (key, val) in map {
                if key == "root" {
                    if let Value::String(s) = val {
                        out.push_str(&format!(
                            "{spaces}    {}: {},\n",
                            py_str(key),
                            py_root_path(s)
                        ));
                        continue;
                    }
                }
                out.push_str(&format!(
                    "{spaces}    {}: {},\n",
                    py_str(key),
                    py_literal(val, indent + 1)
                ));
            }
            out.push_str(&format!("{spaces}}}"));
            out
        }
        Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let mut out = String::from("[\n");
            for item in items {
                out.push_str(&format!("{spaces}    {},\n", py_literal(item, indent + 1)));
            }
            out.push_str(&format!("{spaces}]"));
            out
        }
        Value::String(s) => py_str(s),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        Value::Number(n) => n.to_string(),
    }
}

fn py_root_path(s: &str) -> String {
    if s.contains("ADMIN_TS_ROOT") {
        format!("f\"{}\"", s.replace("ADMIN_TS_ROOT", "{settings.ADMIN_TS_ROOT}"))
    } else if s.contains("ADMIN_PYTHON_ROOT") {
        format!(
            "f\"{}\"",
            s.replace("ADMIN_PYTHON_ROOT", "{settings.ADMIN_PYTHON_ROOT}")
        )
    } else {
        format!("\"{s}\"")
    }
}
