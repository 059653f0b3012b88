//! Package selection: embeds the profile description and picks the package
//! whose description embedding is nearest.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::catalog::models::PackageSummary;

pub mod embedder;
pub mod index;

use embedder::{Embedder, EmbeddingError};
use index::FlatIndex;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector has dimension {actual}, index expects {expected}")]
    Dimension { expected: usize, actual: usize },

    #[error("no packages are indexed")]
    EmptyIndex,
}

/// A package chosen for a profile, with its embedding distance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageMatch {
    pub package: PackageSummary,
    pub distance: f32,
}

pub struct PackageMatcher {
    embedder: Arc<dyn Embedder>,
    index: FlatIndex,
    packages: Vec<PackageSummary>,
}

impl PackageMatcher {
    /// Embeds every package description and indexes it.
    pub async fn build(
        embedder: Arc<dyn Embedder>,
        packages: Vec<PackageSummary>,
    ) -> Result<Self, SelectionError> {
        if packages.is_empty() {
            return Err(SelectionError::EmptyIndex);
        }

        let descriptions: Vec<String> = packages.iter().map(|p| p.description.clone()).collect();
        let vectors = embedder.embed(&descriptions).await?;

        let dim = vectors.first().map(Vec::len).unwrap_or_default();
        let mut index = FlatIndex::new(dim);
        for v in vectors {
            index.add(v)?;
        }

        info!(
            "Indexed {} package descriptions ({} dims, embedder: {})",
            index.len(),
            index.dim(),
            embedder.name()
        );

        Ok(Self {
            embedder,
            index,
            packages,
        })
    }

    /// Up to `k` packages, closest first.
    pub async fn rank(
        &self,
        description: &str,
        k: usize,
    ) -> Result<Vec<PackageMatch>, SelectionError> {
        let query = self
            .embedder
            .embed(&[description.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::Count {
                expected: 1,
                actual: 0,
            })?;

        Ok(self
            .index
            .search(&query, k)?
            .into_iter()
            .map(|n| PackageMatch {
                package: self.packages[n.id].clone(),
                distance: n.distance,
            })
            .collect())
    }

    /// The nearest package.
    pub async fn select(&self, description: &str) -> Result<PackageMatch, SelectionError> {
        self.rank(description, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(SelectionError::EmptyIndex)
    }
}
