pub mod auth;
pub mod client;
pub mod errors;
pub mod loader;
pub mod signals;
pub mod types;

pub use auth::{AuthScheme, Credential, CREDENTIAL_ENV_VARS};
pub use client::{GitHubClient, IssueState};
pub use errors::GitHubError;
pub use loader::ArchitectureLoader;
pub use types::*;
