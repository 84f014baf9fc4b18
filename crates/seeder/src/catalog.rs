use crate::error::SeedError;
use api_client::BreedPath;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One breed as fetched from the image source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBreed {
    pub path: BreedPath,
    pub name: String,
    pub slug: String,
    pub images: Vec<String>,
}

/// The result of a fetch, and the manifest format of `fetch-images --output`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub source: String,
    pub breeds: Vec<CatalogBreed>,
    /// Breeds whose images could not be fetched, by API path.
    #[serde(default)]
    pub failed_breeds: Vec<String>,
}

impl Catalog {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn image_count(&self) -> usize {
        self.breeds.iter().map(|b| b.images.len()).sum()
    }

    pub fn read_from(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SeedError::Manifest {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<(), SeedError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| SeedError::Manifest {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            breeds = self.breeds.len(),
            images = self.image_count(),
            "Wrote catalog manifest."
        );
        Ok(())
    }
}
