pub mod auth;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod import;
pub mod logging;
mod oauth_utils;
pub mod orchestrator;
pub mod youtube;

pub use credential::{Credential, CredentialStore};
pub use error::TubeportError;
pub use orchestrator::{ImportContinuation, Orchestrator, RunSummary};
