//! Artifact loading and the process-wide artifact cache.
//!
//! `ArtifactStore::get_or_load` deserializes both artifacts on first use and
//! hands out the same `Arc<Artifacts>` afterwards. Concurrent first callers
//! block on the one initializer instead of racing to deserialize.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use super::linear::{ClassifierArtifact, LinearClassifier};
use super::vectorizer::{TfidfVectorizer, VectorizerArtifact};
use super::ARTIFACT_VERSION;

#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("Artifact not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read artifact {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to deserialize artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Artifact {} has format version {found}, expected {expected}", .path.display())]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("Invalid artifact {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub vectorizer: PathBuf,
}

/// The fitted vectorizer and classifier, loaded together.
#[derive(Debug)]
pub struct Artifacts {
    pub vectorizer: TfidfVectorizer,
    pub classifier: LinearClassifier,
}

impl Artifacts {
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let classifier: ClassifierArtifact = read_artifact(&paths.classifier)?;
        let classifier =
            LinearClassifier::try_from(classifier).map_err(|reason| ArtifactLoadError::Invalid {
                path: paths.classifier.clone(),
                reason,
            })?;

        let vectorizer: VectorizerArtifact = read_artifact(&paths.vectorizer)?;
        let vectorizer =
            TfidfVectorizer::try_from(vectorizer).map_err(|reason| ArtifactLoadError::Invalid {
                path: paths.vectorizer.clone(),
                reason,
            })?;

        if vectorizer.dim() != classifier.n_features() {
            warn!(
                "Artifacts disagree on feature width: vectorizer={} classifier={}; every prediction will fail",
                vectorizer.dim(),
                classifier.n_features()
            );
        }

        Ok(Self {
            vectorizer,
            classifier,
        })
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ArtifactLoadError::Missing {
            path: path.to_path_buf(),
        },
        _ => ArtifactLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let parse_error = |source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let probe: VersionProbe = serde_json::from_slice(&bytes).map_err(parse_error)?;
    if probe.version != ARTIFACT_VERSION {
        return Err(ArtifactLoadError::VersionMismatch {
            path: path.to_path_buf(),
            found: probe.version,
            expected: ARTIFACT_VERSION,
        });
    }
    serde_json::from_slice(&bytes).map_err(parse_error)
}

/// Process-wide holder for the loaded artifacts. Written at most once.
pub struct ArtifactStore {
    paths: ArtifactPaths,
    cell: OnceCell<Arc<Artifacts>>,
}

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            cell: OnceCell::new(),
        }
    }

    pub fn get_or_load(&self) -> Result<Arc<Artifacts>, ArtifactLoadError> {
        self.cell
            .get_or_try_init(|| {
                info!(
                    "Loading artifacts: classifier={} vectorizer={}",
                    self.paths.classifier.display(),
                    self.paths.vectorizer.display()
                );
                let artifacts = Artifacts::load(&self.paths)?;
                info!(
                    "Artifacts loaded: {} classes, {} vocabulary terms",
                    artifacts.classifier.classes().len(),
                    artifacts.vectorizer.vocabulary_size()
                );
                Ok(Arc::new(artifacts))
            })
            .cloned()
    }
}
