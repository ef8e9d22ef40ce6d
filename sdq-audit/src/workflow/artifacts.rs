//! Trained model artifact discovery

use sdq_common::config::ModelsConfig;
use sdq_common::Result;
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{info, warn};

/// Most recent artifact found for one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub model: String,
    pub latest: Option<PathBuf>,
}

/// Find the newest artifact (by modification time) for every configured model
///
/// A missing artifacts directory is not an error: every model is reported
/// without an artifact.
pub fn latest_artifacts(config: &ModelsConfig) -> Result<Vec<ArtifactStatus>> {
    let dir = &config.artifacts_dir;
    if !dir.is_dir() {
        warn!("Artifacts directory {} not found", dir.display());
        return Ok(config
            .artifacts
            .iter()
            .map(|pattern| ArtifactStatus {
                model: pattern.model.clone(),
                latest: None,
            })
            .collect());
    }

    let mut files: Vec<(String, PathBuf, SystemTime)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push((name, entry.path(), metadata.modified()?));
    }

    let statuses = config
        .artifacts
        .iter()
        .map(|pattern| {
            let latest = files
                .iter()
                .filter(|(name, _, _)| pattern.matches(name))
                .max_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(&b.0)))
                .map(|(_, path, _)| path.clone());

            match &latest {
                Some(path) => info!(model = %pattern.model, "Latest artifact: {}", path.display()),
                None => warn!(model = %pattern.model, "No artifact found"),
            }

            ArtifactStatus {
                model: pattern.model.clone(),
                latest,
            }
        })
        .collect();

    Ok(statuses)
}
