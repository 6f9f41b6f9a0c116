//! Service schema compilation.
//!
//! The schema has two sections: `definitions` (named, reusable field-schema
//! fragments) and `tasks` (service name → task name → task definition, where
//! a task definition is either an inline field mapping or a
//! `{"$ref": "definitions/<Name>"}` pointer). Compilation resolves every
//! reference and produces one [`CompiledService`] per service: the structured
//! intermediate representation the emitters render.

use super::names;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Field name carried by every service for the built-in connectivity check.
pub const MIC_CHECK_FIELD: &str = "mic_check_message";

/// The reserved connectivity self-test task present on every service.
pub const MIC_CHECK_TASK: &str = "MIC_CHECK";

/// Name of the built-in definition backing the reserved task.
pub const MIC_CHECK_DEFINITION: &str = "MIC_CHECK_DEFINITION";

/// A field descriptor: the fixed-shape record the schema attaches to each
/// field name inside a definition or inline task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    #[serde(rename = "REQUIRED", default)]
    pub required: bool,
    #[serde(rename = "DEFAULT", default)]
    pub default: Value,
    #[serde(rename = "VALIDATION", default)]
    pub validation: Option<String>,
    #[serde(rename = "DATA_TYPE", default)]
    pub data_type: Option<String>,
    #[serde(rename = "CONVERSION", default)]
    pub conversion: Option<String>,
    #[serde(rename = "REFERENCE", default)]
    pub reference: Value,
    #[serde(rename = "COMPONENT", default)]
    pub component: Option<String>,
    #[serde(rename = "COMPONENT_PROPS", default)]
    pub component_props: Map<String, Value>,
    #[serde(rename = "DESCRIPTION", default)]
    pub description: Option<String>,
    #[serde(rename = "ICON_NAME", default)]
    pub icon_name: Option<String>,
}

/// One task of a compiled service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTask {
    /// Schema task name, e.g. `PLACE_ORDER`.
    pub task_name: String,
    /// Generated method name, e.g. `place_order`.
    pub method_name: String,
    /// Whether this is the reserved connectivity self-test.
    pub is_mic_check: bool,
}

/// Everything the emitters need to render one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledService {
    /// Schema service name, e.g. `ORDERS_SERVICE`.
    pub service_name: String,
    /// Clean lowercase base name, e.g. `orders`.
    pub base: String,
    /// Service class name, e.g. `OrdersService`.
    pub class_name: String,
    /// Orchestrator class name, e.g. `OrdersOrchestrator`.
    pub orchestrator_class: String,
    /// Service source file name, e.g. `orders_service.py`.
    pub file_name: String,
    /// Resolved field names: `mic_check_message` first, the rest sorted.
    pub fields: Vec<String>,
    /// Tasks in schema order.
    pub tasks: Vec<CompiledTask>,
}

fn default_mic_check_definition(primary_service_name: &str) -> Value {
    let field = FieldSpec {
        required: false,
        default: json!("Service mic check"),
        validation: Some("validate_mic_check_min_length".to_string()),
        data_type: Some("string".to_string()),
        conversion: Some("convert_mic_check".to_string()),
        reference: Value::Null,
        component: Some("input".to_string()),
        component_props: Map::new(),
        description: Some(format!(
            "Test message for {primary_service_name} service connectivity"
        )),
        icon_name: Some("Mic".to_string()),
    };
    json!({ MIC_CHECK_FIELD: field })
}

/// The built-in schema every run starts from: the mic-check definition plus
/// a `<PRIMARY>_SERVICE` entry whose only task is the reserved self-test.
pub fn default_schema(primary_service_name: &str) -> Value {
    let primary = format!("{}_SERVICE", primary_service_name.to_uppercase());
    json!({
        "definitions": {
            MIC_CHECK_DEFINITION: default_mic_check_definition(primary_service_name)
        },
        "tasks": {
            primary: {
                MIC_CHECK_TASK: {"$ref": format!("definitions/{MIC_CHECK_DEFINITION}")}
            }
        }
    })
}

/// Merge the user schema over the built-in default and synthesize the
/// reserved `MIC_CHECK` task into every service that lacks it.
pub fn effective_schema(user_schema: &Value, primary_service_name: &str) -> Value {
    let mut merged = crate::config::merge_values(&default_schema(primary_service_name), user_schema);
    if let Some(services) = merged
        .get_mut("tasks")
        .and_then(Value::as_object_mut)
    {
        for tasks in services.values_mut() {
            if let Some(tasks) = tasks.as_object_mut() {
                if !tasks.contains_key(MIC_CHECK_TASK) {
                    tasks.insert(
                        MIC_CHECK_TASK.to_string(),
                        json!({"$ref": format!("definitions/{MIC_CHECK_DEFINITION}")}),
                    );
                }
            }
        }
    }
    merged
}

/// Resolve a `$ref` pointer to the definition it names.
///
/// A pointer must have exactly two `/`-separated segments, the first being
/// `definitions`. A malformed or dangling pointer is a hard error naming the
/// offending service and task; fields are never silently dropped.
fn resolve_ref<'a>(
    schema: &'a Value,
    pointer: &str,
    service: &str,
    task: &str,
) -> anyhow::Result<&'a Map<String, Value>> {
    let segments: Vec<&str> = pointer.split('/').collect();
    if segments.len() != 2 || segments[0] != "definitions" {
        bail!(
            "malformed $ref '{pointer}' in task '{task}' of service '{service}': \
             expected 'definitions/<Name>'"
        );
    }
    let def_name = segments[1];
    schema
        .get("definitions")
        .and_then(|d| d.get(def_name))
        .and_then(Value::as_object)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "unresolved $ref in task '{task}' of service '{service}': \
                 definition '{def_name}' does not exist"
            )
        })
}

/// Compile an effective schema into one [`CompiledService`] per service.
///
/// Side-effect-free and idempotent: compiling the same schema twice yields
/// identical results. Fields are the union of every task's inline fields and
/// every `$ref`-resolved definition's fields, and always include
/// [`MIC_CHECK_FIELD`].
pub fn compile_schema(schema: &Value) -> anyhow::Result<Vec<CompiledService>> {
    let Some(services) = schema.get("tasks").and_then(Value::as_object) else {
        bail!("schema has no 'tasks' section");
    };

    let mut compiled = Vec::with_capacity(services.len());
    for (service_name, tasks) in services {
        let Some(tasks) = tasks.as_object() else {
            bail!("service '{service_name}' tasks must be a mapping");
        };

        let mut fields: Vec<String> = Vec::new();
        let mut task_list = Vec::with_capacity(tasks.len());
        for (task_name, task_def) in tasks {
            let Some(def) = task_def.as_object() else {
                bail!("task '{task_name}' of service '{service_name}' must be a mapping");
            };
            let field_map = match def.get("$ref").and_then(Value::as_str) {
                Some(pointer) => resolve_ref(schema, pointer, service_name, task_name)?,
                None => def,
            };
            for field in field_map.keys() {
                if !fields.contains(field) {
                    fields.push(field.clone());
                }
            }
            task_list.push(CompiledTask {
                task_name: task_name.clone(),
                method_name: names::method_name(task_name),
                is_mic_check: task_name == MIC_CHECK_TASK,
            });
        }

        fields.retain(|f| f != MIC_CHECK_FIELD);
        fields.sort();
        fields.insert(0, MIC_CHECK_FIELD.to_string());

        compiled.push(CompiledService {
            service_name: service_name.clone(),
            base: names::base(service_name),
            class_name: names::class_name(service_name),
            orchestrator_class: names::orchestrator_class_name(service_name),
            file_name: names::file_name(service_name),
            fields,
            tasks: task_list,
        });
    }
    Ok(compiled)
}
