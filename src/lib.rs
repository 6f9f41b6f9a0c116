//! # microgen
//!
//! **microgen** is a config-driven scaffolding generator: it reads a JSON
//! configuration describing a microservice (app metadata, environment
//! variables, database connections, a service/task schema, dependencies) and
//! materializes a complete, runnable project tree of source files.
//!
//! ## Architecture
//!
//! The crate is organized into a few key modules:
//!
//! - **[`config`]** - configuration loading, restricted-name validation, and
//!   the recursive default/user merge
//! - **[`generator`]** - name derivation, schema compilation, askama-based
//!   file emitters, and the generation orchestrator
//! - **[`publish`]** - GitHub repository creation and push with rollback
//! - **[`cli`]** - the `microgen` command-line interface
//!
//! ## Generation Flow
//!
//! ```text
//! JSON config → validate → merge defaults → compile schema → render templates → project tree
//! ```
//!
//! 1. **Load** - parse the JSON configuration, rejecting restricted names
//! 2. **Merge** - deep-merge the built-in defaults under the user config
//! 3. **Compile** - resolve the service schema (`$ref` pointers, implicit
//!    `MIC_CHECK` tasks) into one [`generator::CompiledService`] per service
//! 4. **Emit** - render askama templates and write the output tree
//! 5. **Post-create** - optionally format the tree and run configured scripts
//!
//! ## Generated Structure
//!
//! ```text
//! my-service/
//! ├── .env                    # environment variables + database connections
//! ├── .gitignore
//! ├── pyproject.toml          # project metadata and dependencies
//! ├── Dockerfile
//! ├── entrypoint.sh
//! ├── run.py
//! ├── migrations.py
//! ├── app_schema/             # schema registration + validation/conversion fns
//! ├── database/db_conf.py     # one registered connection per configured database
//! ├── services/               # one transport-facing service class per schema service
//! ├── src/<service>/          # one orchestrator stub per service (business logic)
//! └── core/                   # app entry point, settings, logging config
//! ```
//!
//! ## Usage
//!
//! ```bash
//! microgen create-microservice --config service.json --output-dir ./out
//! ```

pub mod cli;
pub mod config;
pub mod generator;
pub mod publish;
