//! Core error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unable to find a git repository starting from {0}")]
    GitRepoNotFound(PathBuf),

    #[error("unable to resolve git HEAD: {0}")]
    GitHead(String),

    #[error("git remote 'origin' is not configured")]
    GitRemoteMissing,
}

pub type Result<T> = std::result::Result<T, CoreError>;
