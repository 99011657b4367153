use thiserror::Error;

use crate::parse::ParseError;
use crate::types::{CatalogError, NormalizeError, ReorderError, ResolveError};

/// Unified error type covering parsing, resolution, normalization, and I/O.
///
/// Returned by convenience methods like
/// [`Platform::from_text()`](crate::Platform::from_text) and
/// [`ProductCatalog::from_file()`](crate::ProductCatalog::from_file).
#[derive(Debug, Error)]
pub enum CpealError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Reorder(#[from] ReorderError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
