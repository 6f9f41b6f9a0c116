//! # Generator Module
//!
//! Turns an effective configuration into a project tree on disk.
//!
//! ## Architecture
//!
//! ```text
//! Config → Name Derivation → Schema Compilation → Template Rendering → Generated Tree
//! ```
//!
//! 1. **Names** ([`names`]) - pure transforms from schema names to the
//!    identifiers used in emitted code
//! 2. **Schema** ([`schema`]) - merges the built-in schema with the user's,
//!    resolves `$ref` pointers, and produces one [`CompiledService`] per
//!    service
//! 3. **Templates** ([`templates`]) - askama template data for every emitted
//!    file class
//! 4. **Project** ([`project`]) - the orchestrator that writes the tree,
//!    runs the optional formatter pass, and executes post-create scripts

pub mod names;
pub mod schema;
pub mod templates;

mod project;

pub use names::{base, class_name, file_name, method_name, orchestrator_class_name};
pub use project::{
    format_project, generate_microservice, run_post_create_scripts, GenerateOptions,
    GenerationReport, ScriptOutcome,
};
pub use schema::{
    compile_schema, default_schema, effective_schema, CompiledService, CompiledTask, FieldSpec,
    MIC_CHECK_DEFINITION, MIC_CHECK_FIELD, MIC_CHECK_TASK,
};
