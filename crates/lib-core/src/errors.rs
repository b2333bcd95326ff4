use std::error::Error;

/// A failed read against the database catalog. Carries the driver's error
/// as an opaque source; the engine logs these and moves on.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CatalogError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl CatalogError {
    pub fn new(message: impl Into<String>) -> Self {
        CatalogError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        CatalogError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The progress monitor was cancelled between catalog calls.
    #[error("completion canceled")]
    Canceled,
    #[error("catalog read failed")]
    Catalog(#[from] CatalogError),
    #[error("offset {0} is outside the document")]
    Document(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_error_wraps_into_completion_error() {
        let err: CompletionError = CatalogError::new("no such table").into();
        assert!(matches!(err, CompletionError::Catalog(_)));
    }
}
