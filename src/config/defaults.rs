use serde_json::{json, Value};

/// The built-in default configuration.
///
/// Every generation run starts from this tree; the user configuration is
/// merged over it key-by-key ([`super::merge_values`]), so defaults the user
/// never mentions are always kept.
pub fn default_config() -> Value {
    json!({
        "databases": [],
        "env": {
            "DEBUG": false,
            "ENVIRONMENT": "remote",
            "LOG_LEVEL": "INFO",
            "PORT": 8000,
            "LOG_EVENTS": false
        },
        "settings": {
            "app_name": "basic-service",
            "app_version": "0.0.1",
            "app_description": "A basic generated microservice",
            "app_primary_service_name": "basic",
            "app_primary_database_project": null,
            "requires_python": ">=3.12"
        },
        "dependencies": [
            "servio-connect",
            "servio-orm",
            "uvicorn",
            "pydantic-settings",
            "python-socketio",
            "python-dotenv",
            "requests"
        ],
        "schema": {},
        "files": [
            "__init__.py",
            "src/__init__.py",
            "requirements.txt",
            "docker-compose.yml",
            ".env.example",
            "README.md"
        ],
        "post_create_scripts": [
            "uv sync"
        ]
    })
}
