use std::path::PathBuf;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::Deserialize;

use crate::github::{RepoRef, DEFAULT_GRAPHQL_URL};

/// Values supplied by the workflow environment. CLI flags override them.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub github_token: Option<String>,
    /// `owner/name`, as GitHub Actions sets it.
    pub github_repository: Option<String>,
    pub issue_number: Option<u64>,
    pub readme_path: PathBuf,
    pub github_graphql_url: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(Config::builder().add_source(Environment::default()))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .set_default("readme_path", "README.md")?
            .set_default("github_graphql_url", DEFAULT_GRAPHQL_URL)?
            .build()
            .context("Failed to read settings from environment")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn token(&self) -> Result<&str> {
        self.github_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .context("GITHUB_TOKEN is not set")
    }

    pub fn repository(&self) -> Result<RepoRef> {
        let full = self
            .github_repository
            .as_deref()
            .context("GITHUB_REPOSITORY is not set")?;
        RepoRef::parse(full)
            .with_context(|| format!("GITHUB_REPOSITORY must look like owner/name, got {full:?}"))
    }
}

// ── Tests ──
