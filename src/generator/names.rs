//! Name derivation for generated code.
//!
//! Pure, deterministic string transforms mapping a logical service or task
//! name from the schema onto the identifiers used in the emitted source.

/// Lowercase the service name and strip a trailing `_service` suffix.
///
/// ```rust
/// assert_eq!(microgen::generator::base("ORDERS_SERVICE"), "orders");
/// assert_eq!(microgen::generator::base("billing"), "billing");
/// ```
pub fn base(service_name: &str) -> String {
    let lower = service_name.to_lowercase();
    lower
        .strip_suffix("_service")
        .unwrap_or(&lower)
        .to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The generated service class name, e.g. `ORDERS_SERVICE` → `OrdersService`.
pub fn class_name(service_name: &str) -> String {
    format!("{}Service", capitalize(&base(service_name)))
}

/// The generated orchestrator class name, e.g. `ORDERS_SERVICE` → `OrdersOrchestrator`.
pub fn orchestrator_class_name(service_name: &str) -> String {
    format!("{}Orchestrator", capitalize(&base(service_name)))
}

/// The generated service source file name, e.g. `ORDERS_SERVICE` → `orders_service.py`.
pub fn file_name(service_name: &str) -> String {
    format!("{}_service.py", base(service_name))
}

/// The generated method name for a task: the task name, lowercased.
///
/// Validation guarantees task names lowercase to legal identifiers before
/// generation starts.
pub fn method_name(task_name: &str) -> String {
    task_name.to_lowercase()
}
