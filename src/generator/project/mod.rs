mod format;
mod generate;
mod scripts;

pub use format::format_project;
pub use generate::{generate_microservice, GenerateOptions, GenerationReport};
pub use scripts::{run_post_create_scripts, ScriptOutcome};
