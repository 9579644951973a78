use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::model::ArtifactPaths;

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub classifier_path: PathBuf,
    pub vectorizer_path: PathBuf,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            classifier_path: env_or("CLASSIFIER_PATH", "svm_resume_classifier.json").into(),
            vectorizer_path: env_or("VECTORIZER_PATH", "tfidf_vectorizer.json").into(),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", "10485760")
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            classifier: self.classifier_path.clone(),
            vectorizer: self.vectorizer_path.clone(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
