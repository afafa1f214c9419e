//! CI backend abstraction.
//!
//! This module provides a `CiClient` trait with the three calls the
//! orchestrator needs (dispatch, list in-progress runs, get run) and a
//! GitHub Actions implementation.

mod github;
mod types;

pub use github::GithubClient;
pub use types::*;
