use std::path::PathBuf;

/// Both variants reach the client as the same 404.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("path escapes content root: {0}")]
    PathEscape(String),
    #[error("no such entry: {0}")]
    NotFound(String),
}

impl ResolveError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn escape(path: impl Into<String>) -> Self {
        Self::PathEscape(path.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    #[error("{program} is not installed, or not in PATH")]
    Missing { program: String },
    #[error("failed running {program} on {}", .file.display())]
    Spawn {
        program: String,
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
