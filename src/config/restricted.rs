//! Restricted-name validation.
//!
//! Four fixed sets of reserved identifiers protect names the generated code
//! claims for itself. Environment-variable names are checked case-sensitively
//! (the runtime reads them verbatim); service, task/definition and field
//! names are checked case-insensitively because the generator lowercases
//! them when deriving identifiers.
//!
//! Validation collects every violation across the whole configuration and
//! reports them as one aggregated error, so a user fixes all collisions in a
//! single round trip.

use serde_json::Value;

/// Environment-variable names the generator itself emits into `.env`.
pub const RESTRICTED_ENV_VARS: &[&str] = &[
    "APP_NAME",
    "APP_VERSION",
    "APP_DESCRIPTION",
    "APP_PRIMARY_SERVICE_NAME",
];

/// Service names claimed by the generated factory.
pub const RESTRICTED_SERVICE_NAMES: &[&str] = &["ADMIN_SERVICE", "DEFAULT_SERVICE"];

/// Task and definition names reserved for the built-in connectivity check
/// and the service dispatch surface.
pub const RESTRICTED_TASK_NAMES: &[&str] = &[
    "MIC_CHECK",
    "MIC_CHECK_DEFINITION",
    "PROCESS_TASK",
    "EXECUTE_TASK",
];

/// Field names the generated service constructor already declares.
pub const RESTRICTED_FIELD_NAMES: &[&str] = &[
    "MIC_CHECK_MESSAGE",
    "STREAM_HANDLER",
    "ORCHESTRATOR",
    "APP_NAME",
    "SERVICE_NAME",
    "LOG_LEVEL",
];

/// One validation violation: which name, which category, where.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Render a batch of issues as a single multi-line error message.
pub fn format_issues(issues: &[ValidationIssue]) -> String {
    let mut out = format!("configuration validation failed, {} issue(s):", issues.len());
    for issue in issues {
        out.push_str(&format!("\n  [{}] {}: {}", issue.kind, issue.location, issue.message));
    }
    out
}

/// True when `name` lowercases to a legal Python identifier.
///
/// Task and field names become generated method and attribute names, so a
/// restricted-name check alone is not enough; names with characters illegal
/// in an identifier are rejected at validation time.
pub fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn reserved_ci(set: &[&str], name: &str) -> bool {
    set.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Validate a user configuration against the restricted-name sets.
///
/// Checks every environment-variable key, definition name, service name,
/// task name, and field name; all violations are collected, none aborts the
/// walk. An empty result means the configuration is acceptable.
pub fn validate_config(user: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Some(env) = user.get("env").and_then(Value::as_object) {
        for key in env.keys() {
            if RESTRICTED_ENV_VARS.contains(&key.as_str()) {
                issues.push(ValidationIssue::new(
                    "env",
                    "RestrictedEnvVar",
                    format!("environment variable '{key}' is reserved"),
                ));
            }
        }
    }

    let schema = user.get("schema");

    if let Some(defs) = schema
        .and_then(|s| s.get("definitions"))
        .and_then(Value::as_object)
    {
        for (def_name, def) in defs {
            if reserved_ci(RESTRICTED_TASK_NAMES, def_name) {
                issues.push(ValidationIssue::new(
                    "schema.definitions",
                    "RestrictedDefinitionName",
                    format!("definition '{def_name}' is reserved"),
                ));
            }
            if !is_safe_identifier(def_name) {
                issues.push(ValidationIssue::new(
                    "schema.definitions",
                    "InvalidIdentifier",
                    format!("definition '{def_name}' is not a legal identifier"),
                ));
            }
            if let Some(fields) = def.as_object() {
                for field in fields.keys() {
                    check_field(&mut issues, field, &format!("schema.definitions.{def_name}"));
                }
            }
        }
    }

    if let Some(services) = schema
        .and_then(|s| s.get("tasks"))
        .and_then(Value::as_object)
    {
        for (service_name, tasks) in services {
            if reserved_ci(RESTRICTED_SERVICE_NAMES, service_name) {
                issues.push(ValidationIssue::new(
                    "schema.tasks",
                    "RestrictedServiceName",
                    format!("service '{service_name}' is reserved"),
                ));
            }
            if !is_safe_identifier(service_name) {
                issues.push(ValidationIssue::new(
                    "schema.tasks",
                    "InvalidIdentifier",
                    format!("service '{service_name}' is not a legal identifier"),
                ));
            }
            let Some(tasks) = tasks.as_object() else {
                continue;
            };
            for (task_name, task_def) in tasks {
                let location = format!("schema.tasks.{service_name}");
                if reserved_ci(RESTRICTED_TASK_NAMES, task_name) {
                    issues.push(ValidationIssue::new(
                        &location,
                        "RestrictedTaskName",
                        format!("task '{task_name}' is reserved"),
                    ));
                }
                if !is_safe_identifier(task_name) {
                    issues.push(ValidationIssue::new(
                        &location,
                        "InvalidIdentifier",
                        format!("task '{task_name}' is not a legal identifier"),
                    ));
                }
                // inline task definitions carry their own field mapping;
                // $ref fields are validated at their definition site
                if let Some(fields) = task_def.as_object() {
                    if !fields.contains_key("$ref") {
                        for field in fields.keys() {
                            check_field(&mut issues, field, &format!("{location}.{task_name}"));
                        }
                    }
                }
            }
        }
    }

    issues
}

fn check_field(issues: &mut Vec<ValidationIssue>, field: &str, location: &str) {
    if reserved_ci(RESTRICTED_FIELD_NAMES, field) {
        issues.push(ValidationIssue::new(
            location,
            "RestrictedFieldName",
            format!("field '{field}' is reserved"),
        ));
    }
    if !is_safe_identifier(field) {
        issues.push(ValidationIssue::new(
            location,
            "InvalidIdentifier",
            format!("field '{field}' is not a legal identifier"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reserved_env_var_exact_case_fails() {
        let issues = validate_config(&json!({"env": {"APP_NAME": "x"}}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, "RestrictedEnvVar");
    }

    #[test]
    fn env_var_check_is_case_sensitive() {
        let issues = validate_config(&json!({"env": {"app_name": "x"}}));
        assert!(issues.is_empty());
    }

    #[test]
    fn task_name_check_is_case_insensitive() {
        let issues = validate_config(&json!({
            "schema": {"tasks": {"ORDERS_SERVICE": {"mic_check": {}}}}
        }));
        assert!(issues.iter().any(|i| i.kind == "RestrictedTaskName"));
    }

    #[test]
    fn all_violations_are_collected() {
        let issues = validate_config(&json!({
            "env": {"APP_NAME": "x", "APP_VERSION": "y"},
            "schema": {
                "definitions": {"MIC_CHECK_DEFINITION": {"stream_handler": {}}},
                "tasks": {"ADMIN_SERVICE": {"EXECUTE_TASK": {}}}
            }
        }));
        let kinds: Vec<&str> = issues.iter().map(|i| i.kind.as_str()).collect();
        assert!(kinds.contains(&"RestrictedEnvVar"));
        assert!(kinds.contains(&"RestrictedDefinitionName"));
        assert!(kinds.contains(&"RestrictedFieldName"));
        assert!(kinds.contains(&"RestrictedServiceName"));
        assert!(kinds.contains(&"RestrictedTaskName"));
        assert!(issues.len() >= 6);
    }

    #[test]
    fn issue_names_containing_service_and_task() {
        let issues = validate_config(&json!({
            "schema": {"tasks": {"ORDERS_SERVICE": {"PLACE_ORDER": {"bad-name": {}}}}}
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, "InvalidIdentifier");
        assert_eq!(issues[0].location, "schema.tasks.ORDERS_SERVICE.PLACE_ORDER");
    }

    #[test]
    fn illegal_task_identifier_is_rejected() {
        let issues = validate_config(&json!({
            "schema": {"tasks": {"ORDERS_SERVICE": {"PLACE ORDER": {}}}}
        }));
        assert!(issues.iter().any(|i| i.kind == "InvalidIdentifier"));
    }

    #[test]
    fn safe_identifier_rules() {
        assert!(is_safe_identifier("place_order"));
        assert!(is_safe_identifier("_private"));
        assert!(is_safe_identifier("PLACE_ORDER2"));
        assert!(!is_safe_identifier("2fast"));
        assert!(!is_safe_identifier("place-order"));
        assert!(!is_safe_identifier(""));
    }
}
