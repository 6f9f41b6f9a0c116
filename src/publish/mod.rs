//! Repository publishing: create a GitHub repository and push a generated
//! project tree to it, deleting the repository again if any later step fails.

mod client;
mod repo;

pub use client::{GithubApi, RestGithub};
pub use repo::{sanitize_repo_name, PublishedRepo, Publisher, PublisherConfig};
